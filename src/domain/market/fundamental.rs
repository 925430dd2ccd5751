//! Fundamental analysis tools: company financials and ratio comparison.

use serde_json::json;
use std::sync::Arc;

use crate::domain::foundation::ValidationError;
use crate::domain::tools::{handler_fn, str_param, InputSchema, ParamKind, ParamSpec, ToolOutput, ToolSpec};

use super::generators::{Financials, MockMarketData, SectorBenchmarks};
use super::{ticker_param, ToolBinding};

pub const GET_COMPANY_FINANCIALS: &str = "get_company_financials";
pub const CALCULATE_RATIOS: &str = "calculate_ratios";

pub fn company_financials_spec() -> Result<ToolSpec, ValidationError> {
    ToolSpec::new(
        GET_COMPANY_FINANCIALS,
        "Retrieve comprehensive financial data for a company including income statement, \
         balance sheet, and cash flow metrics.",
        InputSchema::new().with_param(ticker_param("\"AAPL\" for Apple Inc.")),
    )
}

pub fn ratios_spec() -> Result<ToolSpec, ValidationError> {
    ToolSpec::new(
        CALCULATE_RATIOS,
        "Calculate and compare financial ratios against sector or market benchmarks.",
        InputSchema::new()
            .with_param(ticker_param("\"MSFT\" for Microsoft"))
            .with_param(
                ParamSpec::optional(
                    "comparison_type",
                    ParamKind::String,
                    "The benchmark type to compare against (e.g., \"sector\", \"market\", \"industry\")",
                )
                .with_default(json!("sector")),
            ),
    )
}

pub fn financials_report(data: &Financials) -> String {
    format!(
        "Financial Analysis for {}:\n\
         \n\
         Valuation Metrics:\n\
         - Market Cap: ${:.1}B\n\
         - P/E Ratio: {:.1}\n\
         - Current Analyst Rating: {}\n\
         \n\
         Growth & Profitability:\n\
         - Revenue Growth: {:+.1}%\n\
         - Profit Margin: {:.1}%\n\
         - ROE: {:.1}%\n\
         \n\
         Financial Health:\n\
         - Debt-to-Equity: {:.2}\n\
         - Current Ratio: {:.2}\n\
         - Recent Earnings: {}",
        data.ticker,
        data.market_cap / 1e9,
        data.pe_ratio,
        data.analyst_rating.as_str(),
        data.revenue_growth * 100.0,
        data.profit_margin * 100.0,
        data.roe * 100.0,
        data.debt_to_equity,
        data.current_ratio,
        data.earnings_surprise.as_str(),
    )
}

pub fn ratios_report(data: &Financials, sector: &SectorBenchmarks, comparison_type: &str) -> String {
    let valuation = if data.pe_ratio > sector.pe_ratio {
        "Premium"
    } else {
        "Discount"
    };
    let performance = if data.roe > sector.roe {
        "Outperforming"
    } else {
        "Underperforming"
    };
    format!(
        "Ratio Analysis for {} vs {} average:\n\
         \n\
         Valuation Comparison:\n\
         - P/E Ratio: {:.1} (Sector: {:.1})\n\
         - Relative Valuation: {}\n\
         \n\
         Profitability Comparison:\n\
         - ROE: {:.1}% (Sector: {:.1}%)\n\
         - Profit Margin: {:.1}% (Sector: {:.1}%)\n\
         \n\
         Performance vs Peers: {}",
        data.ticker,
        comparison_type,
        data.pe_ratio,
        sector.pe_ratio,
        valuation,
        data.roe * 100.0,
        sector.roe * 100.0,
        data.profit_margin * 100.0,
        sector.profit_margin * 100.0,
        performance,
    )
}

/// Both fundamental tools, drawing from `source`.
pub fn tools(source: Arc<MockMarketData>) -> Result<Vec<ToolBinding>, ValidationError> {
    let financials = source.clone();
    let ratios = source;
    Ok(vec![
        (
            company_financials_spec()?,
            handler_fn(move |input| {
                let ticker = str_param(&input, "ticker")?;
                Ok(ToolOutput::text(financials_report(&financials.financials(ticker))))
            }),
        ),
        (
            ratios_spec()?,
            handler_fn(move |input| {
                let ticker = str_param(&input, "ticker")?;
                let comparison_type = str_param(&input, "comparison_type")?;
                let data = ratios.financials(ticker);
                let sector = ratios.sector_benchmarks();
                Ok(ToolOutput::text(ratios_report(&data, &sector, comparison_type)))
            }),
        ),
    ])
}
