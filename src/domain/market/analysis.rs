//! Analysis types and the coordinator queries they map to.

use std::fmt;
use std::str::FromStr;

/// Kind of analysis requested from the trading desk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AnalysisType {
    Fundamental,
    Technical,
    Sentiment,
    Risk,
    #[default]
    Comprehensive,
}

impl AnalysisType {
    pub const ALL: [AnalysisType; 5] = [
        AnalysisType::Fundamental,
        AnalysisType::Technical,
        AnalysisType::Sentiment,
        AnalysisType::Risk,
        AnalysisType::Comprehensive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisType::Fundamental => "fundamental",
            AnalysisType::Technical => "technical",
            AnalysisType::Sentiment => "sentiment",
            AnalysisType::Risk => "risk",
            AnalysisType::Comprehensive => "comprehensive",
        }
    }

    /// Parses a type name; anything unrecognised is comprehensive.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "fundamental" => AnalysisType::Fundamental,
            "technical" => AnalysisType::Technical,
            "sentiment" => AnalysisType::Sentiment,
            "risk" => AnalysisType::Risk,
            _ => AnalysisType::Comprehensive,
        }
    }

    /// Question put to the coordinator for `ticker`.
    pub fn query(&self, ticker: &str) -> String {
        match self {
            AnalysisType::Fundamental => format!(
                "Provide a fundamental analysis of {} including valuation, growth prospects, \
                 and investment recommendation.",
                ticker
            ),
            AnalysisType::Technical => format!(
                "Analyze the technical setup for {} including chart patterns, indicators, \
                 and entry/exit points.",
                ticker
            ),
            AnalysisType::Sentiment => format!(
                "Assess the current market sentiment for {} based on news and social media trends.",
                ticker
            ),
            AnalysisType::Risk => format!(
                "Evaluate the risk profile of {} including market risk, volatility, \
                 and portfolio impact.",
                ticker
            ),
            AnalysisType::Comprehensive => format!(
                "Should I buy {} shares? Provide a comprehensive analysis covering fundamentals, \
                 technicals, sentiment, and risk factors.",
                ticker
            ),
        }
    }
}

impl FromStr for AnalysisType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for AnalysisType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
