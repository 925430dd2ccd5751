//! Input schema for tool parameters.
//!
//! A deliberately small subset of JSON Schema: a flat object whose
//! properties each have one primitive type, an optional default, and a
//! required flag. That is enough to describe every tool the agents expose and
//! to check backend-generated input before it reaches an implementation.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use thiserror::Error;

/// JSON type of a single parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

impl ParamKind {
    /// JSON Schema type name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamKind::String => "string",
            ParamKind::Integer => "integer",
            ParamKind::Number => "number",
            ParamKind::Boolean => "boolean",
            ParamKind::Array => "array",
            ParamKind::Object => "object",
        }
    }

    /// Returns true if `value` is of this kind.
    ///
    /// Integers are accepted where a number is expected, not the reverse.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            ParamKind::String => value.is_string(),
            ParamKind::Integer => value.is_i64() || value.is_u64(),
            ParamKind::Number => value.is_number(),
            ParamKind::Boolean => value.is_boolean(),
            ParamKind::Array => value.is_array(),
            ParamKind::Object => value.is_object(),
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// One named parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    name: String,
    kind: ParamKind,
    description: String,
    required: bool,
    default: Option<Value>,
}

impl ParamSpec {
    /// A parameter the caller must supply.
    pub fn required(name: impl Into<String>, kind: ParamKind, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            description: description.into(),
            required: true,
            default: None,
        }
    }

    /// A parameter the caller may omit.
    pub fn optional(name: impl Into<String>, kind: ParamKind, description: impl Into<String>) -> Self {
        Self {
            required: false,
            ..Self::required(name, kind, description)
        }
    }

    /// Sets the value used when the parameter is absent.
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ParamKind {
        self.kind
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }
}

/// Ways an input can violate its schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaViolation {
    #[error("input must be a JSON object, got {actual}")]
    NotAnObject { actual: String },

    #[error("missing required field: {field}")]
    MissingRequired { field: String },

    #[error("invalid type for field {field}: expected {expected}, got {actual}")]
    InvalidType {
        field: String,
        expected: String,
        actual: String,
    },
}

/// Ordered parameter list of a tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputSchema {
    params: Vec<ParamSpec>,
}

impl InputSchema {
    /// Creates a schema with no parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a parameter.
    pub fn with_param(mut self, param: ParamSpec) -> Self {
        self.params.push(param);
        self
    }

    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    /// Looks up a parameter by name.
    pub fn param(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Checks required fields and declared types.
    ///
    /// Fields not declared in the schema are ignored. A `null` value counts
    /// as absent.
    pub fn validate(&self, input: &Value) -> Result<(), SchemaViolation> {
        let object = input.as_object().ok_or_else(|| SchemaViolation::NotAnObject {
            actual: json_type_name(input).to_string(),
        })?;

        for param in &self.params {
            match object.get(&param.name) {
                None | Some(Value::Null) => {
                    if param.required {
                        return Err(SchemaViolation::MissingRequired {
                            field: param.name.clone(),
                        });
                    }
                }
                Some(value) if !param.kind.accepts(value) => {
                    return Err(SchemaViolation::InvalidType {
                        field: param.name.clone(),
                        expected: param.kind.as_str().to_string(),
                        actual: json_type_name(value).to_string(),
                    });
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    /// Fills absent (or `null`) parameters that declare a default.
    ///
    /// Non-object input is returned unchanged.
    pub fn apply_defaults(&self, input: Value) -> Value {
        let mut object = match input {
            Value::Object(object) => object,
            other => return other,
        };
        for param in &self.params {
            if let Some(default) = &param.default {
                let absent = matches!(object.get(&param.name), None | Some(Value::Null));
                if absent {
                    object.insert(param.name.clone(), default.clone());
                }
            }
        }
        Value::Object(object)
    }

    /// Renders the schema as a JSON Schema object.
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        for param in &self.params {
            let mut property = json!({
                "type": param.kind.as_str(),
                "description": param.description,
            });
            if let Some(default) = &param.default {
                property["default"] = default.clone();
            }
            properties.insert(param.name.clone(), property);
        }
        let required: Vec<&str> = self
            .params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ratios_schema() -> InputSchema {
        InputSchema::new()
            .with_param(ParamSpec::required("ticker", ParamKind::String, "Stock ticker symbol"))
            .with_param(
                ParamSpec::optional("comparison_type", ParamKind::String, "sector or market")
                    .with_default(json!("sector")),
            )
            .with_param(ParamSpec::optional("days", ParamKind::Integer, "Lookback window"))
    }

    #[test]
    fn validate_accepts_required_fields() {
        assert!(ratios_schema().validate(&json!({"ticker": "AAPL"})).is_ok());
    }

    #[test]
    fn validate_rejects_missing_required() {
        let err = ratios_schema().validate(&json!({"days": 3})).unwrap_err();
        assert_eq!(
            err,
            SchemaViolation::MissingRequired {
                field: "ticker".to_string()
            }
        );
    }

    #[test]
    fn validate_treats_null_as_absent() {
        let schema = ratios_schema();
        assert!(schema.validate(&json!({"ticker": null})).is_err());
        assert!(schema.validate(&json!({"ticker": "MSFT", "days": null})).is_ok());
    }

    #[test]
    fn validate_rejects_wrong_type() {
        let err = ratios_schema()
            .validate(&json!({"ticker": "AAPL", "days": "seven"}))
            .unwrap_err();
        assert_eq!(err.to_string(), "invalid type for field days: expected integer, got string");
    }

    #[test]
    fn validate_rejects_float_for_integer() {
        assert!(ratios_schema().validate(&json!({"ticker": "AAPL", "days": 7.5})).is_err());
    }

    #[test]
    fn number_accepts_integers() {
        assert!(ParamKind::Number.accepts(&json!(1)));
        assert!(ParamKind::Number.accepts(&json!(0.05)));
        assert!(!ParamKind::Integer.accepts(&json!(0.05)));
    }

    #[test]
    fn validate_ignores_unknown_fields() {
        assert!(ratios_schema()
            .validate(&json!({"ticker": "AAPL", "verbose": true}))
            .is_ok());
    }

    #[test]
    fn validate_rejects_non_object() {
        let err = ratios_schema().validate(&json!(["AAPL"])).unwrap_err();
        assert!(matches!(err, SchemaViolation::NotAnObject { .. }));
    }

    #[test]
    fn apply_defaults_fills_absent_and_null() {
        let schema = ratios_schema();
        let filled = schema.apply_defaults(json!({"ticker": "AAPL"}));
        assert_eq!(filled["comparison_type"], "sector");

        let filled = schema.apply_defaults(json!({"ticker": "AAPL", "comparison_type": null}));
        assert_eq!(filled["comparison_type"], "sector");
    }

    #[test]
    fn apply_defaults_keeps_supplied_values() {
        let filled = ratios_schema().apply_defaults(json!({"ticker": "AAPL", "comparison_type": "market"}));
        assert_eq!(filled["comparison_type"], "market");
        assert!(filled.get("days").is_none());
    }

    #[test]
    fn to_json_schema_lists_properties_and_required() {
        let schema = ratios_schema().to_json_schema();

        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["ticker"]["type"], "string");
        assert_eq!(schema["properties"]["comparison_type"]["default"], "sector");
        assert_eq!(schema["required"], json!(["ticker"]));
    }
}
