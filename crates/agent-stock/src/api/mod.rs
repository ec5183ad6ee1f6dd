//! Market data provider clients
//!
//! [`MarketDataSource`] is the seam between the fetcher and the network: the
//! fetcher only sees raw provider JSON, so tests substitute a mock.

pub mod alpha_vantage;

pub use alpha_vantage::AlphaVantageClient;

use crate::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;

/// Parameters of one news-sentiment query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsRequest {
    /// Ticker the articles must mention
    pub ticker: String,
    /// First day of the window
    pub from: NaiveDate,
    /// Last day of the window
    pub to: NaiveDate,
    /// Articles requested, in relevance order
    pub limit: u32,
}

impl NewsRequest {
    /// `time_from` parameter, `YYYYMMDDT0000`
    pub fn time_from(&self) -> String {
        self.from.format("%Y%m%dT0000").to_string()
    }

    /// `time_to` parameter, `YYYYMMDDT0000`
    pub fn time_to(&self) -> String {
        self.to.format("%Y%m%dT0000").to_string()
    }
}

/// Source of raw daily prices and news sentiment
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Full daily time series for `symbol`
    ///
    /// Transport failures, non-success statuses and non-JSON bodies are
    /// `StockError::DataRetrieval`; provider-level notices come back as JSON.
    async fn daily_series(&self, symbol: &str) -> Result<Value>;

    /// News and sentiment articles matching `request`
    async fn news_sentiment(&self, request: &NewsRequest) -> Result<Value>;
}
