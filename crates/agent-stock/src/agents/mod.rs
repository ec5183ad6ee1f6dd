//! Agent definitions for stock and news analysis
//!
//! The orchestrator hands questions about a stock over a period to the
//! Stock Analyzer, and questions about a news event to the News Analyzer.

pub mod guardrail;

pub use guardrail::{TopicCheck, TopicGuardrail};

use agent_core::Result;
use agent_llm::LLMProvider;
use agent_runtime::{AgentDefinition, RunConfig, Runner};
use std::sync::Arc;

use crate::config::StockConfig;
use crate::fetcher::StockDataFetcher;
use crate::prompts;
use crate::tools::{StockDataTool, WebSearchTool};

/// Stock Analyzer agent name
pub const STOCK_ANALYZER: &str = "Stock Analyzer";
/// News Analyzer agent name
pub const NEWS_ANALYZER: &str = "News Analyzer";
/// Orchestrator agent name
pub const ORCHESTRATOR: &str = "Orchestrator";

/// The wired agent graph
#[derive(Debug, Clone)]
pub struct StockAgents {
    /// Entry point of every question
    pub orchestrator: Arc<AgentDefinition>,
    pub stock_analyzer: Arc<AgentDefinition>,
    pub news_analyzer: Arc<AgentDefinition>,
}

impl StockAgents {
    /// Build the agent graph
    ///
    /// The topic guardrail is attached to the orchestrator only when
    /// `config.enable_guardrail` is set.
    pub fn build(
        config: &StockConfig,
        provider: Arc<dyn LLMProvider>,
        fetcher: Arc<StockDataFetcher>,
    ) -> Result<Self> {
        let stock_data = Arc::new(StockDataTool::new(fetcher));
        let web_search = Arc::new(WebSearchTool::new(
            Arc::clone(&provider),
            config.search_model.clone(),
            config.max_tokens,
        ));

        let stock_analyzer = Arc::new(
            AgentDefinition::builder(STOCK_ANALYZER)
                .instructions(prompts::STOCK_ANALYZER)
                .handoff_description(prompts::STOCK_ANALYZER_HANDOFF)
                .tool(stock_data.clone())
                .build()?,
        );

        let news_analyzer = Arc::new(
            AgentDefinition::builder(NEWS_ANALYZER)
                .instructions(prompts::NEWS_ANALYZER)
                .handoff_description(prompts::NEWS_ANALYZER_HANDOFF)
                .tool(web_search)
                .tool(stock_data)
                .build()?,
        );

        let mut orchestrator = AgentDefinition::builder(ORCHESTRATOR)
            .instructions(prompts::ORCHESTRATOR)
            .handoff(Arc::clone(&stock_analyzer))
            .handoff(Arc::clone(&news_analyzer));
        if config.enable_guardrail {
            let runner = Runner::new(provider, run_config(config));
            orchestrator = orchestrator.input_guardrail(Arc::new(TopicGuardrail::new(runner)?));
        }

        Ok(Self {
            orchestrator: Arc::new(orchestrator.build()?),
            stock_analyzer,
            news_analyzer,
        })
    }
}

/// Run settings derived from the stock configuration
pub fn run_config(config: &StockConfig) -> RunConfig {
    RunConfig {
        model: config.model.clone(),
        max_tokens: config.max_tokens,
        temperature: config.temperature,
        max_turns: config.max_turns,
    }
}
