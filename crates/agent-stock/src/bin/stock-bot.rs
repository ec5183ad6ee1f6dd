//! Stock Analysis Chatbot CLI
//!
//! # Usage
//!
//! ```bash
//! # Set up environment variables (or put them in .env)
//! export OPENAI_API_KEY="sk-..."
//! export ALPHA_VANTAGE_API_KEY="..."
//!
//! # Run the bot
//! cargo run --bin stock-bot -p agent-stock -- --guardrail
//! ```

use agent_llm::providers::OpenAIProvider;
use agent_stock::{StockBot, StockConfig};
use agent_utils::{init_tracing, load_dotenv};
use clap::Parser;
use std::sync::Arc;
use tokio::io::BufReader;

/// Answer questions about stock prices and news events
#[derive(Debug, Parser)]
#[command(name = "stock-bot", version, about)]
struct Args {
    /// Chat model for every agent (overrides OPENAI_MODEL)
    #[arg(long)]
    model: Option<String>,

    /// Reject questions that are neither about stocks nor news events
    #[arg(long)]
    guardrail: bool,

    /// Model calls allowed per question (overrides STOCK_BOT_MAX_TURNS)
    #[arg(long)]
    max_turns: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    load_dotenv();
    init_tracing("warn,agent_stock=info")?;

    let mut builder = StockConfig::builder();
    if let Some(model) = args.model {
        builder = builder.model(model);
    }
    if let Some(max_turns) = args.max_turns {
        builder = builder.max_turns(max_turns);
    }
    if args.guardrail {
        builder = builder.enable_guardrail(true);
    }
    let config = builder.with_env()?.build()?;

    if config.alpha_vantage_api_key.is_none() {
        tracing::warn!("ALPHA_VANTAGE_API_KEY is not set, price requests will be rejected");
    }
    tracing::info!(
        model = %config.model,
        guardrail = config.enable_guardrail,
        max_turns = config.max_turns,
        "Starting stock bot"
    );

    let provider = Arc::new(OpenAIProvider::from_env()?);
    let bot = StockBot::new(provider, &config)?;

    bot.run_repl(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await?;
    Ok(())
}
