//! Configuration for the stock agent
//!
//! One explicit object carries the data provider settings and the agent run
//! settings; nothing is read from globals after construction.

use crate::error::{Result, StockError};
use agent_utils::{env_parse, env_var};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default Alpha Vantage query endpoint
pub const DEFAULT_ALPHA_VANTAGE_URL: &str = "https://www.alphavantage.co/query";

/// Configuration for the stock agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockConfig {
    /// Alpha Vantage API key; sent as-is, the provider rejects bad keys
    pub alpha_vantage_api_key: Option<String>,

    /// Alpha Vantage query endpoint
    pub alpha_vantage_base_url: String,

    /// Request timeout duration
    pub request_timeout: Duration,

    /// Days before the end date used when no start date is given
    pub lookback_days: u32,

    /// Articles requested from the news endpoint
    pub news_request_limit: u32,

    /// Articles kept after date filtering
    pub max_news_items: usize,

    /// Chat model used by every agent
    pub model: String,

    /// Search-capable chat model behind the `web_search` tool
    pub search_model: String,

    /// Max tokens per completion
    pub max_tokens: usize,

    /// Sampling temperature; provider default when unset
    pub temperature: Option<f32>,

    /// Model calls allowed per question
    pub max_turns: usize,

    /// Reject questions that are neither about stocks nor news events
    pub enable_guardrail: bool,
}

impl Default for StockConfig {
    fn default() -> Self {
        Self {
            alpha_vantage_api_key: None,
            alpha_vantage_base_url: DEFAULT_ALPHA_VANTAGE_URL.to_string(),
            request_timeout: Duration::from_secs(30),
            lookback_days: 30,
            news_request_limit: 10,
            max_news_items: 5,
            model: "gpt-4o".to_string(),
            search_model: "gpt-4o-search-preview".to_string(),
            max_tokens: 4096,
            temperature: None,
            max_turns: 10,
            enable_guardrail: false,
        }
    }
}

impl StockConfig {
    /// Create a new configuration builder
    pub fn builder() -> StockConfigBuilder {
        StockConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.alpha_vantage_base_url.trim().is_empty() {
            return Err(StockError::ConfigError(
                "alpha_vantage_base_url must not be empty".to_string(),
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(StockError::ConfigError(
                "request_timeout must be greater than 0".to_string(),
            ));
        }

        if self.news_request_limit == 0 || self.max_news_items == 0 {
            return Err(StockError::ConfigError(
                "news_request_limit and max_news_items must be greater than 0".to_string(),
            ));
        }

        if self.max_news_items > self.news_request_limit as usize {
            return Err(StockError::ConfigError(format!(
                "max_news_items ({}) cannot exceed news_request_limit ({})",
                self.max_news_items, self.news_request_limit
            )));
        }

        if self.max_turns == 0 || self.max_tokens == 0 {
            return Err(StockError::ConfigError(
                "max_turns and max_tokens must be greater than 0".to_string(),
            ));
        }

        if self.model.trim().is_empty() || self.search_model.trim().is_empty() {
            return Err(StockError::ConfigError(
                "model and search_model must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Key sent to the provider; absent keys go out empty
    pub fn api_key(&self) -> &str {
        self.alpha_vantage_api_key.as_deref().unwrap_or_default()
    }
}

/// Builder for StockConfig
#[derive(Debug, Default)]
pub struct StockConfigBuilder {
    alpha_vantage_api_key: Option<String>,
    alpha_vantage_base_url: Option<String>,
    request_timeout: Option<Duration>,
    lookback_days: Option<u32>,
    news_request_limit: Option<u32>,
    max_news_items: Option<usize>,
    model: Option<String>,
    search_model: Option<String>,
    max_tokens: Option<usize>,
    temperature: Option<f32>,
    max_turns: Option<usize>,
    enable_guardrail: Option<bool>,
}

impl StockConfigBuilder {
    /// Set Alpha Vantage API key
    pub fn alpha_vantage_api_key(mut self, key: impl Into<String>) -> Self {
        self.alpha_vantage_api_key = Some(key.into());
        self
    }

    /// Set the Alpha Vantage endpoint
    pub fn alpha_vantage_base_url(mut self, url: impl Into<String>) -> Self {
        self.alpha_vantage_base_url = Some(url.into());
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set the default lookback window
    pub fn lookback_days(mut self, days: u32) -> Self {
        self.lookback_days = Some(days);
        self
    }

    /// Set the number of articles requested from the provider
    pub fn news_request_limit(mut self, limit: u32) -> Self {
        self.news_request_limit = Some(limit);
        self
    }

    /// Set the number of articles kept
    pub fn max_news_items(mut self, max: usize) -> Self {
        self.max_news_items = Some(max);
        self
    }

    /// Set the chat model
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the search model
    pub fn search_model(mut self, model: impl Into<String>) -> Self {
        self.search_model = Some(model.into());
        self
    }

    /// Set max tokens per completion
    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the sampling temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set max model calls per question
    pub fn max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = Some(max_turns);
        self
    }

    /// Enable or disable the topic guardrail
    pub fn enable_guardrail(mut self, enabled: bool) -> Self {
        self.enable_guardrail = Some(enabled);
        self
    }

    /// Fill unset fields from the environment
    ///
    /// Reads `ALPHA_VANTAGE_API_KEY`, `ALPHA_VANTAGE_BASE_URL`, `OPENAI_MODEL`,
    /// `STOCK_BOT_SEARCH_MODEL` and `STOCK_BOT_MAX_TURNS`.
    pub fn with_env(mut self) -> Result<Self> {
        self.alpha_vantage_api_key = self
            .alpha_vantage_api_key
            .or_else(|| env_var("ALPHA_VANTAGE_API_KEY"));
        self.alpha_vantage_base_url = self
            .alpha_vantage_base_url
            .or_else(|| env_var("ALPHA_VANTAGE_BASE_URL"));
        self.model = self.model.or_else(|| env_var("OPENAI_MODEL"));
        self.search_model = self
            .search_model
            .or_else(|| env_var("STOCK_BOT_SEARCH_MODEL"));
        if self.max_turns.is_none() {
            self.max_turns = env_parse("STOCK_BOT_MAX_TURNS")
                .map_err(|e| StockError::ConfigError(e.to_string()))?;
        }
        Ok(self)
    }

    /// Build the configuration
    pub fn build(self) -> Result<StockConfig> {
        let defaults = StockConfig::default();

        let config = StockConfig {
            alpha_vantage_api_key: self.alpha_vantage_api_key,
            alpha_vantage_base_url: self
                .alpha_vantage_base_url
                .unwrap_or(defaults.alpha_vantage_base_url),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            lookback_days: self.lookback_days.unwrap_or(defaults.lookback_days),
            news_request_limit: self.news_request_limit.unwrap_or(defaults.news_request_limit),
            max_news_items: self.max_news_items.unwrap_or(defaults.max_news_items),
            model: self.model.unwrap_or(defaults.model),
            search_model: self.search_model.unwrap_or(defaults.search_model),
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
            temperature: self.temperature.or(defaults.temperature),
            max_turns: self.max_turns.unwrap_or(defaults.max_turns),
            enable_guardrail: self.enable_guardrail.unwrap_or(defaults.enable_guardrail),
        };

        config.validate()?;
        Ok(config)
    }
}
