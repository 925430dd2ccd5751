//! Trading desk - a trading advisor coordinating four analysis specialists.

use std::sync::Arc;

use crate::config::AgentSettings;
use crate::domain::agent::{Agent, AgentConfig, AgentConfigBuilder, AgentGraph, AgentResponse, BackendConfig};
use crate::domain::foundation::AgentId;
use crate::domain::market::{
    fundamental, risk, sentiment, technical, AnalysisType, MockMarketData, ToolBinding,
    FUNDAMENTAL_ANALYST_PROMPT, RISK_ANALYST_PROMPT, SENTIMENT_ANALYST_PROMPT,
    TECHNICAL_ANALYST_PROMPT, TRADING_COORDINATOR_PROMPT,
};
use crate::ports::ReasoningBackend;

use super::DeskError;

/// Name of the coordinator agent.
pub const TRADING_ADVISOR: &str = "trading_advisor";

/// The analysis specialists reachable from the trading advisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Specialist {
    Fundamental,
    Technical,
    Sentiment,
    Risk,
}

impl Specialist {
    pub const ALL: [Specialist; 4] = [
        Specialist::Fundamental,
        Specialist::Technical,
        Specialist::Sentiment,
        Specialist::Risk,
    ];

    /// Agent name, which is also the coordinator's tool name.
    pub fn agent_name(&self) -> &'static str {
        match self {
            Specialist::Fundamental => "fundamental_analyst",
            Specialist::Technical => "technical_analyst",
            Specialist::Sentiment => "sentiment_analyst",
            Specialist::Risk => "risk_analyst",
        }
    }

    /// Prefix of failure messages and metrics headings.
    pub fn label(&self) -> &'static str {
        match self {
            Specialist::Fundamental => "Fundamental analysis",
            Specialist::Technical => "Technical analysis",
            Specialist::Sentiment => "Sentiment analysis",
            Specialist::Risk => "Risk analysis",
        }
    }

    pub fn from_agent_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.agent_name() == name)
    }

    fn description(&self) -> &'static str {
        match self {
            Specialist::Fundamental => "Process fundamental analysis questions using specialized agent.",
            Specialist::Technical => "Process technical analysis questions using specialized agent.",
            Specialist::Sentiment => "Process sentiment analysis questions using specialized agent.",
            Specialist::Risk => "Process risk assessment questions using specialized agent.",
        }
    }

    fn prompt(&self) -> &'static str {
        match self {
            Specialist::Fundamental => FUNDAMENTAL_ANALYST_PROMPT,
            Specialist::Technical => TECHNICAL_ANALYST_PROMPT,
            Specialist::Sentiment => SENTIMENT_ANALYST_PROMPT,
            Specialist::Risk => RISK_ANALYST_PROMPT,
        }
    }

    fn tools(&self, data: Arc<MockMarketData>) -> Result<Vec<ToolBinding>, DeskError> {
        let tools = match self {
            Specialist::Fundamental => fundamental::tools(data)?,
            Specialist::Technical => technical::tools(data)?,
            Specialist::Sentiment => sentiment::tools(data)?,
            Specialist::Risk => risk::tools(data)?,
        };
        Ok(tools)
    }
}

/// Command to analyse one ticker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzeStockCommand {
    /// Upper-cased on construction.
    pub ticker: String,
    pub analysis_type: AnalysisType,
}

impl AnalyzeStockCommand {
    pub fn new(ticker: impl AsRef<str>, analysis_type: AnalysisType) -> Self {
        Self {
            ticker: ticker.as_ref().trim().to_uppercase(),
            analysis_type,
        }
    }

    /// The question put to the trading advisor.
    pub fn query(&self) -> String {
        self.analysis_type.query(&self.ticker)
    }
}

/// Coordinator plus specialists, built once and reused across tickers.
pub struct TradingDesk {
    advisor: Arc<Agent>,
}

impl TradingDesk {
    /// Builds the desk on one backend.
    ///
    /// Every agent shares `backend_config`; the specialists' tools draw from `data`.
    pub fn new(
        backend: Arc<dyn ReasoningBackend>,
        backend_config: BackendConfig,
        settings: &AgentSettings,
        data: Arc<MockMarketData>,
    ) -> Result<Self, DeskError> {
        let configure = |builder: AgentConfigBuilder| {
            builder
                .backend(backend_config.clone())
                .max_cycles(settings.max_cycles)
                .tool_execution(settings.tool_execution)
        };

        let advisor_id = AgentId::new(TRADING_ADVISOR)?;
        let mut graph = AgentGraph::new();
        for specialist in Specialist::ALL {
            let mut builder = AgentConfig::builder(specialist.prompt()).description(specialist.description());
            for (spec, handler) in specialist.tools(data.clone())? {
                builder = builder.tool(spec, handler);
            }
            graph = graph.agent(
                AgentId::new(specialist.agent_name())?,
                configure(builder),
                backend.clone(),
            )?;
        }
        graph = graph.agent(
            advisor_id.clone(),
            configure(
                AgentConfig::builder(TRADING_COORDINATOR_PROMPT)
                    .description("Synthesize specialist analysis into a trading recommendation."),
            ),
            backend,
        )?;
        for specialist in Specialist::ALL {
            graph = graph.delegate_labeled(
                &advisor_id,
                &AgentId::new(specialist.agent_name())?,
                specialist.label(),
            )?;
        }

        let agents = graph.build()?;
        let advisor = agents
            .get(TRADING_ADVISOR)
            .ok_or_else(|| DeskError::MissingAgent(TRADING_ADVISOR.to_string()))?;
        Ok(Self { advisor })
    }

    pub fn advisor(&self) -> &Arc<Agent> {
        &self.advisor
    }

    /// Runs the advisor on the query for `command.analysis_type`.
    pub async fn analyze(&self, command: &AnalyzeStockCommand) -> Result<AgentResponse, DeskError> {
        tracing::info!(
            ticker = %command.ticker,
            analysis_type = command.analysis_type.as_str(),
            "Analyzing stock"
        );
        let response = self.advisor.answer(&command.query()).await?;
        tracing::info!(
            ticker = %command.ticker,
            delegations = response.delegations.len(),
            wall_ms = response.wall_time().as_millis() as u64,
            "Analysis complete"
        );
        Ok(response)
    }

    /// Convenience form of [`TradingDesk::analyze`].
    pub async fn analyze_stock(
        &self,
        ticker: &str,
        analysis_type: AnalysisType,
    ) -> Result<AgentResponse, DeskError> {
        self.analyze(&AnalyzeStockCommand::new(ticker, analysis_type)).await
    }
}
