//! Risk tools: security risk metrics and portfolio impact.

use serde_json::json;
use std::sync::Arc;

use crate::domain::foundation::ValidationError;
use crate::domain::tools::{
    handler_fn, str_param, InputSchema, ParamKind, ParamSpec, ToolFailure, ToolOutput, ToolSpec,
};

use super::generators::{MockMarketData, RiskData};
use super::{ticker_param, ToolBinding};

pub const CALCULATE_RISK_METRICS: &str = "calculate_risk_metrics";
pub const PORTFOLIO_IMPACT_ANALYSIS: &str = "portfolio_impact_analysis";

pub const BETA_HIGH: f64 = 1.5;
pub const BETA_MEDIUM: f64 = 0.8;
pub const DEFAULT_POSITION_SIZE: f64 = 0.05;

pub fn risk_metrics_spec() -> Result<ToolSpec, ValidationError> {
    ToolSpec::new(
        CALCULATE_RISK_METRICS,
        "Calculate comprehensive risk metrics for the security.",
        InputSchema::new().with_param(ticker_param("\"JPM\" for JP Morgan")),
    )
}

pub fn portfolio_impact_spec() -> Result<ToolSpec, ValidationError> {
    ToolSpec::new(
        PORTFOLIO_IMPACT_ANALYSIS,
        "Analyze the impact of adding this position to a diversified portfolio.",
        InputSchema::new()
            .with_param(ticker_param("\"DIS\" for Disney"))
            .with_param(
                ParamSpec::optional(
                    "position_size",
                    ParamKind::Number,
                    "Fractional allocation to this position",
                )
                .with_default(json!(DEFAULT_POSITION_SIZE)),
            ),
    )
}

pub fn market_risk_level(beta: f64) -> &'static str {
    if beta > BETA_HIGH {
        "High"
    } else if beta > BETA_MEDIUM {
        "Medium"
    } else {
        "Low"
    }
}

pub fn risk_report(data: &RiskData) -> String {
    format!(
        "Risk Assessment for {}:\n\
         \n\
         Market Risk:\n\
         - Beta: {:.2} ({} market risk)\n\
         - Volatility: {:.1}% (annualized)\n\
         - 95% VaR: {:.1}% (daily)\n\
         \n\
         Correlation & Liquidity:\n\
         - S&P 500 Correlation: {:.2}\n\
         - Liquidity Score: {:.2}/1.0\n\
         \n\
         Other Risk Factors:\n\
         - Sector Risk: {}\n\
         - Regulatory Risk: {}\n\
         - ESG Score: {:.0}/100",
        data.ticker,
        data.beta,
        market_risk_level(data.beta),
        data.volatility * 100.0,
        data.var_95 * 100.0,
        data.correlation_spy,
        data.liquidity_score,
        data.sector_risk,
        data.regulatory_risk,
        data.esg_score,
    )
}

/// Largest allocation that keeps the position's beta contribution modest.
pub fn max_position_size(beta: f64) -> f64 {
    (1.0 / beta * 0.05).min(0.10)
}

pub fn portfolio_report(data: &RiskData, position_size: f64, diversification: f64) -> String {
    format!(
        "Portfolio Impact Analysis for {} (Position Size: {:.1}%):\n\
         \n\
         Risk Contribution:\n\
         - Beta Impact on Portfolio: +{:.3}\n\
         - Volatility Contribution: {:.2}%\n\
         - Diversification Benefit: {:.1}%\n\
         \n\
         Recommendations:\n\
         - Maximum Position Size: {:.1}%\n\
         - Risk-Adjusted Position: {:.1}%\n\
         - Hedging Requirement: {}",
        data.ticker,
        position_size * 100.0,
        data.beta * position_size,
        data.volatility * position_size * 100.0,
        diversification * 100.0,
        max_position_size(data.beta) * 100.0,
        position_size * diversification * 100.0,
        if data.beta > BETA_HIGH { "Yes" } else { "No" },
    )
}

pub fn tools(source: Arc<MockMarketData>) -> Result<Vec<ToolBinding>, ValidationError> {
    let metrics = source.clone();
    let portfolio = source;
    Ok(vec![
        (
            risk_metrics_spec()?,
            handler_fn(move |input| {
                let ticker = str_param(&input, "ticker")?;
                Ok(ToolOutput::text(risk_report(&metrics.risk(ticker))))
            }),
        ),
        (
            portfolio_impact_spec()?,
            handler_fn(move |input| {
                let ticker = str_param(&input, "ticker")?;
                let position_size = input
                    .get("position_size")
                    .and_then(|size| size.as_f64())
                    .ok_or_else(|| ToolFailure::new("parameter 'position_size' must be a number"))?;
                let data = portfolio.risk(ticker);
                let diversification = portfolio.uniform(0.7..0.95);
                Ok(ToolOutput::text(portfolio_report(&data, position_size, diversification)))
            }),
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market::generators::RiskLevel;

    fn risk(beta: f64) -> RiskData {
        RiskData {
            ticker: "JPM".to_string(),
            beta,
            volatility: 0.25,
            var_95: -0.083,
            correlation_spy: 0.71,
            liquidity_score: 0.9,
            sector_risk: RiskLevel::Medium,
            regulatory_risk: RiskLevel::High,
            esg_score: 64.4,
        }
    }

    #[test]
    fn beta_thresholds() {
        assert_eq!(market_risk_level(1.6), "High");
        assert_eq!(market_risk_level(1.5), "Medium");
        assert_eq!(market_risk_level(0.9), "Medium");
        assert_eq!(market_risk_level(0.8), "Low");
    }

    #[test]
    fn risk_report_formats_metrics() {
        let report = risk_report(&risk(1.2));
        assert!(report.starts_with("Risk Assessment for JPM:"));
        assert!(report.contains("- Beta: 1.20 (Medium market risk)"));
        assert!(report.contains("- Volatility: 25.0% (annualized)"));
        assert!(report.contains("- 95% VaR: -8.3% (daily)"));
        assert!(report.contains("- Regulatory Risk: High"));
        assert!(report.contains("- ESG Score: 64/100"));
    }

    #[test]
    fn portfolio_report_recommends_hedge_for_high_beta() {
        let report = portfolio_report(&risk(2.0), 0.05, 0.8);
        assert!(report.starts_with("Portfolio Impact Analysis for JPM (Position Size: 5.0%):"));
        assert!(report.contains("- Beta Impact on Portfolio: +0.100"));
        assert!(report.contains("- Volatility Contribution: 1.25%"));
        assert!(report.contains("- Diversification Benefit: 80.0%"));
        assert!(report.contains("- Maximum Position Size: 2.5%"));
        assert!(report.contains("- Risk-Adjusted Position: 4.0%"));
        assert!(report.contains("- Hedging Requirement: Yes"));
    }

    #[test]
    fn max_position_is_capped_at_ten_percent() {
        assert!((max_position_size(0.25) - 0.10).abs() < f64::EPSILON);
        assert!((max_position_size(1.0) - 0.05).abs() < 1e-12);
    }

    #[tokio::test]
    async fn portfolio_handler_reads_position_size() {
        let bindings = tools(Arc::new(MockMarketData::seeded(4))).unwrap();
        let (spec, handler) = &bindings[1];
        assert_eq!(spec.name(), PORTFOLIO_IMPACT_ANALYSIS);
        let output = handler
            .call(json!({"ticker": "DIS", "position_size": 0.1}))
            .await
            .unwrap();
        assert!(output.content()[0].to_text().contains("(Position Size: 10.0%)"));
    }
}
