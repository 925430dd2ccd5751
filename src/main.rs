#![deny(unsafe_code)]
use clap::{Parser, Subcommand, ValueEnum};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use market_analyst::adapters::health::{remediation_steps, OllamaHealthCheck};
use market_analyst::application::report::{render_analysis, separator};
use market_analyst::application::{
    build_backend, build_market_source, offline, AnalyzeStockCommand, MarketDesk, MarketQuery,
    TradingDesk,
};
use market_analyst::config::{AppConfig, BackendProvider, LoggingSettings, Overrides};
use market_analyst::domain::market::{AnalysisType, MockMarketData};
use market_analyst::ports::ModelHealthCheck;

#[derive(Parser, Debug)]
#[command(name = "market-analyst", version, about = "Tool-calling agents for market analysis")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Reasoning backend, overriding MARKET_ANALYST__BACKEND__PROVIDER.
    #[arg(long, value_enum, global = true)]
    provider: Option<ProviderArg>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ask a market data agent about one ticker.
    Market {
        /// Ticker symbol to analyze.
        #[arg(default_value = "GOOGL")]
        ticker: String,

        /// Ollama server address for the local backend.
        #[arg(long)]
        host: Option<String>,

        /// Service region for the remote backend.
        #[arg(short, long)]
        region: Option<String>,

        /// Use the scripted backend and fixed market data.
        #[arg(long)]
        offline: bool,
    },

    /// Run the trading desk on one or more tickers.
    Trade {
        /// Stock ticker symbol(s) to analyze (e.g., AAPL MSFT).
        #[arg(required = true)]
        tickers: Vec<String>,

        /// Type of analysis to perform.
        #[arg(short = 't', long = "type", value_enum, default_value_t = AnalysisArg::Comprehensive)]
        analysis_type: AnalysisArg,

        /// Service region for the remote backend.
        #[arg(short, long)]
        region: Option<String>,

        /// Ollama server address for the local backend.
        #[arg(long)]
        host: Option<String>,

        /// Use the scripted backend.
        #[arg(long)]
        offline: bool,

        /// Seed for the generated analysis data.
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Check that the local Ollama server and model are available.
    Health {
        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        model: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ProviderArg {
    Anthropic,
    Ollama,
    Scripted,
}

impl From<ProviderArg> for BackendProvider {
    fn from(v: ProviderArg) -> Self {
        match v {
            ProviderArg::Anthropic => BackendProvider::Anthropic,
            ProviderArg::Ollama => BackendProvider::Ollama,
            ProviderArg::Scripted => BackendProvider::Scripted,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AnalysisArg {
    Fundamental,
    Technical,
    Sentiment,
    Risk,
    Comprehensive,
}

impl From<AnalysisArg> for AnalysisType {
    fn from(v: AnalysisArg) -> Self {
        match v {
            AnalysisArg::Fundamental => AnalysisType::Fundamental,
            AnalysisArg::Technical => AnalysisType::Technical,
            AnalysisArg::Sentiment => AnalysisType::Sentiment,
            AnalysisArg::Risk => AnalysisType::Risk,
            AnalysisArg::Comprehensive => AnalysisType::Comprehensive,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match AppConfig::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", err);
            return ExitCode::FAILURE;
        }
    };
    config.apply(Overrides {
        provider: cli.provider.map(BackendProvider::from),
        ..Overrides::default()
    });
    init_tracing(&config.logging);

    match cli.command {
        Commands::Market {
            ticker,
            host,
            region,
            offline: off,
        } => {
            config.apply(Overrides {
                ollama_host: host,
                region,
                ..Overrides::default()
            });
            let config = if off { offline(config) } else { config };
            cmd_market(config, ticker).await
        }
        Commands::Trade {
            tickers,
            analysis_type,
            region,
            host,
            offline: off,
            seed,
        } => {
            config.apply(Overrides {
                ollama_host: host,
                region,
                ..Overrides::default()
            });
            let config = if off { offline(config) } else { config };
            cmd_trade(config, tickers, analysis_type.into(), seed).await
        }
        Commands::Health { host, model } => {
            let host = host.unwrap_or_else(|| config.ollama.host.clone());
            let model = model.unwrap_or_else(|| config.ollama.model.clone());
            if check_ollama(&config, &host, &model).await {
                println!("Ollama is running at {} and model {} is available", host, model);
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

fn init_tracing(settings: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.filter));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if settings.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Validates the configuration and, for the local backend, its availability.
async fn preflight(config: &AppConfig) -> bool {
    if let Err(err) = config.validate() {
        eprintln!("Invalid configuration: {}", err);
        return false;
    }
    if config.backend.provider == BackendProvider::Ollama {
        return check_ollama(config, &config.ollama.host, &config.model_id()).await;
    }
    true
}

async fn check_ollama(config: &AppConfig, host: &str, model: &str) -> bool {
    let checker = match OllamaHealthCheck::with_timeout(host, config.ollama.health_timeout()) {
        Ok(checker) => checker,
        Err(err) => {
            eprintln!("Error checking Ollama: {}", err);
            return false;
        }
    };

    let server = checker.check_server().await;
    if !server.available {
        eprintln!("Ollama server error: {}", server.message);
        print_remediation(model);
        return false;
    }
    let found = checker.check_model(model).await;
    if !found.available {
        eprintln!("Model error: {}", found.message);
        print_remediation(model);
        return false;
    }
    true
}

fn print_remediation(model: &str) {
    eprintln!("To fix this:");
    for (i, step) in remediation_steps(model).iter().enumerate() {
        eprintln!("{}. {}", i + 1, step);
    }
}

async fn cmd_market(config: AppConfig, ticker: String) -> ExitCode {
    if !preflight(&config).await {
        return ExitCode::FAILURE;
    }
    let desk = match build_backend(&config).and_then(|backend| {
        let source = build_market_source(&config)?;
        MarketDesk::new(backend, config.backend_config(), &config.agent, source)
    }) {
        Ok(desk) => desk,
        Err(err) => {
            eprintln!("Cannot run analysis: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let query = MarketQuery::new(&ticker);
    match desk.ask(&query).await {
        Ok(response) => {
            println!("\n{}\n", separator());
            println!("{}", render_analysis(&query.ticker, &response));
            println!("\n{}\n", separator());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Analysis error: {}", err);
            ExitCode::FAILURE
        }
    }
}

async fn cmd_trade(
    config: AppConfig,
    tickers: Vec<String>,
    analysis_type: AnalysisType,
    seed: Option<u64>,
) -> ExitCode {
    if !preflight(&config).await {
        return ExitCode::FAILURE;
    }
    let data = Arc::new(match seed {
        Some(seed) => MockMarketData::seeded(seed),
        None => MockMarketData::from_entropy(),
    });
    let desk = match build_backend(&config)
        .and_then(|backend| TradingDesk::new(backend, config.backend_config(), &config.agent, data))
    {
        Ok(desk) => desk,
        Err(err) => {
            eprintln!("Cannot run analysis: {}", err);
            return ExitCode::FAILURE;
        }
    };

    println!("Ticker: {}", tickers.join(", ").to_uppercase());
    println!("Analysis Type: {}", analysis_type);
    println!("Region: {}", config.anthropic.region);

    let mut status = ExitCode::SUCCESS;
    for ticker in &tickers {
        let command = AnalyzeStockCommand::new(ticker, analysis_type);
        println!("\n{}\n", separator());
        match desk.analyze(&command).await {
            Ok(response) => println!("{}", render_analysis(&command.ticker, &response)),
            Err(err) => {
                eprintln!("Analysis error: {}", err);
                status = ExitCode::FAILURE;
            }
        }
    }
    println!("\n{}\n", separator());
    status
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn market_accepts_host_and_region() {
        let cli = Cli::try_parse_from([
            "market-analyst",
            "market",
            "AAPL",
            "--host",
            "http://gpu-box:11434",
            "-r",
            "eu-west-1",
        ])
        .unwrap();

        match cli.command {
            Commands::Market {
                ticker,
                host,
                region,
                offline,
            } => {
                assert_eq!(ticker, "AAPL");
                assert_eq!(host.as_deref(), Some("http://gpu-box:11434"));
                assert_eq!(region.as_deref(), Some("eu-west-1"));
                assert!(!offline);
            }
            other => panic!("expected market, got {other:?}"),
        }
    }

    #[test]
    fn market_defaults_to_googl() {
        let cli = Cli::try_parse_from(["market-analyst", "market"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Market { ref ticker, host: None, region: None, .. } if ticker == "GOOGL"
        ));
    }
}
