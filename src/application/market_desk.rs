//! Market desk - one agent answering questions with live market data.

use std::sync::Arc;

use crate::config::AgentSettings;
use crate::domain::agent::{Agent, AgentConfig, AgentResponse, BackendConfig};
use crate::domain::foundation::AgentId;
use crate::domain::market::{market_data_tool, MARKET_DATA_PROMPT};
use crate::ports::{MarketDataSource, ReasoningBackend};

use super::DeskError;

const MARKET_ANALYST: &str = "market_analyst";

/// A question about one ticker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketQuery {
    pub ticker: String,
}

impl MarketQuery {
    /// Upper-cases the ticker.
    pub fn new(ticker: impl AsRef<str>) -> Self {
        Self {
            ticker: ticker.as_ref().trim().to_uppercase(),
        }
    }

    pub fn question(&self) -> String {
        format!("What's the current market data for {}?", self.ticker)
    }
}

pub struct MarketDesk {
    agent: Agent,
}

impl MarketDesk {
    pub fn new(
        backend: Arc<dyn ReasoningBackend>,
        backend_config: BackendConfig,
        settings: &AgentSettings,
        source: Arc<dyn MarketDataSource>,
    ) -> Result<Self, DeskError> {
        let (spec, handler) = market_data_tool(source)?;
        let config = AgentConfig::builder(MARKET_DATA_PROMPT)
            .tool(spec, handler)
            .backend(backend_config)
            .max_cycles(settings.max_cycles)
            .tool_execution(settings.tool_execution)
            .build()?;
        Ok(Self {
            agent: Agent::new(AgentId::new(MARKET_ANALYST)?, config, backend),
        })
    }

    pub async fn ask(&self, query: &MarketQuery) -> Result<AgentResponse, DeskError> {
        tracing::info!(ticker = %query.ticker, "Fetching market data answer");
        Ok(self.agent.answer(&query.question()).await?)
    }
}
