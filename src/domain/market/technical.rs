//! Technical analysis tools: price action and chart patterns.

use std::sync::Arc;

use crate::domain::foundation::ValidationError;
use crate::domain::tools::{handler_fn, str_param, InputSchema, ToolOutput, ToolSpec};

use super::generators::{ChartPattern, MockMarketData, TechnicalData};
use super::{ticker_param, ToolBinding};

pub const GET_PRICE_HISTORY: &str = "get_price_history";
pub const IDENTIFY_PATTERNS: &str = "identify_patterns";

pub const RSI_OVERBOUGHT: f64 = 70.0;
pub const RSI_OVERSOLD: f64 = 30.0;

const RELIABILITY: &[&str] = &["High", "Medium", "Low"];
const ACTIONS: &[&str] = &["Buy", "Sell", "Hold", "Wait for breakout"];

pub fn price_history_spec() -> Result<ToolSpec, ValidationError> {
    ToolSpec::new(
        GET_PRICE_HISTORY,
        "Retrieve historical price data and basic technical indicators.",
        InputSchema::new().with_param(ticker_param("\"TSLA\" for Tesla")),
    )
}

pub fn patterns_spec() -> Result<ToolSpec, ValidationError> {
    ToolSpec::new(
        IDENTIFY_PATTERNS,
        "Identify chart patterns and technical signals.",
        InputSchema::new().with_param(ticker_param("\"NVDA\" for NVIDIA")),
    )
}

pub fn rsi_reading(rsi: f64) -> &'static str {
    if rsi > RSI_OVERBOUGHT {
        "Overbought"
    } else if rsi < RSI_OVERSOLD {
        "Oversold"
    } else {
        "Neutral"
    }
}

pub fn price_history_report(data: &TechnicalData) -> String {
    format!(
        "Technical Analysis for {}:\n\
         \n\
         Price Action:\n\
         - Current Price: ${:.2}\n\
         - 50-day SMA: ${:.2}\n\
         - 200-day SMA: ${:.2}\n\
         - Overall Trend: {}\n\
         \n\
         Key Levels:\n\
         - Support: ${:.2}\n\
         - Resistance: ${:.2}\n\
         \n\
         Volume Analysis:\n\
         - Volume Trend: {}",
        data.ticker,
        data.current_price,
        data.sma_50,
        data.sma_200,
        data.trend,
        data.support_level,
        data.resistance_level,
        data.volume_trend,
    )
}

/// Pattern detection output beyond the indicator readings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatternCall {
    pub pattern: ChartPattern,
    pub reliability: &'static str,
    pub action: &'static str,
}

impl PatternCall {
    pub fn draw(source: &MockMarketData) -> Self {
        Self {
            pattern: source.pick(ChartPattern::ALL).unwrap_or(ChartPattern::Wedge),
            reliability: source.pick(RELIABILITY).unwrap_or("Low"),
            action: source.pick(ACTIONS).unwrap_or("Hold"),
        }
    }
}

pub fn patterns_report(data: &TechnicalData, call: &PatternCall) -> String {
    format!(
        "Pattern Analysis for {}:\n\
         \n\
         Technical Indicators:\n\
         - RSI: {:.1} ({})\n\
         - MACD Signal: {}\n\
         - Bollinger Bands: Price at {} band\n\
         \n\
         Pattern Recognition:\n\
         - Detected Pattern: {}\n\
         - Pattern Reliability: {}\n\
         - Suggested Action: {}",
        data.ticker,
        data.rsi,
        rsi_reading(data.rsi),
        data.macd_signal,
        data.bollinger_position.as_str(),
        call.pattern,
        call.reliability,
        call.action,
    )
}

pub fn tools(source: Arc<MockMarketData>) -> Result<Vec<ToolBinding>, ValidationError> {
    let history = source.clone();
    let patterns = source;
    Ok(vec![
        (
            price_history_spec()?,
            handler_fn(move |input| {
                let ticker = str_param(&input, "ticker")?;
                Ok(ToolOutput::text(price_history_report(&history.technical(ticker))))
            }),
        ),
        (
            patterns_spec()?,
            handler_fn(move |input| {
                let ticker = str_param(&input, "ticker")?;
                let data = patterns.technical(ticker);
                let call = PatternCall::draw(&patterns);
                Ok(ToolOutput::text(patterns_report(&data, &call)))
            }),
        ),
    ])
}
