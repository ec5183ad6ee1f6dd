//! Alpha Vantage API client

use crate::api::{MarketDataSource, NewsRequest};
use crate::config::StockConfig;
use crate::error::{Result, StockError};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::fmt;

/// Alpha Vantage API client
///
/// No local rate limiting or retries: the provider's own limits apply and
/// show up as notices in the response body.
#[derive(Clone)]
pub struct AlphaVantageClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl AlphaVantageClient {
    /// Create a client from the stock configuration
    pub fn new(config: &StockConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| StockError::ConfigError(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.alpha_vantage_base_url.clone(),
            api_key: config.api_key().to_string(),
        })
    }

    /// Endpoint all queries go to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn query(&self, symbol: &str, params: &[(&str, &str)]) -> Result<Value> {
        let retrieval = |reason: String| StockError::DataRetrieval {
            symbol: symbol.to_string(),
            reason,
        };

        let response = self
            .client
            .get(&self.base_url)
            .query(params)
            .query(&[("apikey", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| retrieval(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(retrieval(format!("HTTP error: {status}")));
        }

        let body = response.text().await.map_err(|e| retrieval(e.to_string()))?;
        serde_json::from_str(&body).map_err(|e| retrieval(format!("Invalid JSON response: {e}")))
    }
}

#[async_trait]
impl MarketDataSource for AlphaVantageClient {
    async fn daily_series(&self, symbol: &str) -> Result<Value> {
        tracing::debug!(symbol, "Requesting daily time series");
        self.query(
            symbol,
            &[
                ("function", "TIME_SERIES_DAILY"),
                ("outputsize", "full"),
                ("symbol", symbol),
            ],
        )
        .await
    }

    async fn news_sentiment(&self, request: &NewsRequest) -> Result<Value> {
        tracing::debug!(ticker = %request.ticker, limit = request.limit, "Requesting news sentiment");
        let time_from = request.time_from();
        let time_to = request.time_to();
        let limit = request.limit.to_string();
        self.query(
            &request.ticker,
            &[
                ("function", "NEWS_SENTIMENT"),
                ("tickers", request.ticker.as_str()),
                ("time_from", time_from.as_str()),
                ("time_to", time_to.as_str()),
                ("sort", "RELEVANCE"),
                ("limit", limit.as_str()),
            ],
        )
        .await
    }
}

impl fmt::Debug for AlphaVantageClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlphaVantageClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish_non_exhaustive()
    }
}
