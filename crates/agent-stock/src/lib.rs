//! Stock and news analysis agents
//!
//! - [`fetcher`]: daily prices and news sentiment from Alpha Vantage, filtered
//!   to a date window and normalized into [`StockData`]
//! - [`tools`]: `get_stock_data` and `web_search` for the agents
//! - [`agents`]: the orchestrator with its Stock Analyzer and News Analyzer
//!   handoffs, plus the optional topic guardrail
//! - [`bot`]: the interactive chatbot behind the `stock-bot` binary
//!
//! # Example
//!
//! ```rust,ignore
//! use agent_stock::{StockConfig, StockDataFetcher, StockQuery};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = StockConfig::builder().with_env()?.build()?;
//!     let fetcher = StockDataFetcher::from_config(&config)?;
//!
//!     let query = StockQuery::new("IBM")
//!         .start_date("2024-01-01")
//!         .end_date("2024-01-31");
//!     let report = fetcher.fetch(&query).await?;
//!     println!("{} trading days", report.data.dates.len());
//!
//!     Ok(())
//! }
//! ```

pub mod agents;
pub mod api;
pub mod bot;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod prompts;
pub mod tools;

// Re-export main types for convenience
pub use agents::{StockAgents, TopicCheck, TopicGuardrail};
pub use bot::StockBot;
pub use config::StockConfig;
pub use error::{Result, StockError};
pub use fetcher::{
    DateWindow, NewsItem, NewsStatus, PricePoint, PriceStatus, StockData, StockDataFetcher,
    StockQuery, StockReport,
};
pub use tools::{StockDataTool, WebSearchTool};
