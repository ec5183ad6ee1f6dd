//! Stock price and news retrieval
//!
//! [`StockDataFetcher::fetch`] resolves a date window, pulls the daily time
//! series and the news-sentiment feed for a symbol, and normalizes both into
//! [`StockData`]. Only the price request can fail the call: any problem with
//! news degrades to an empty list, reported through [`NewsStatus`].

use crate::api::{AlphaVantageClient, MarketDataSource, NewsRequest};
use crate::config::StockConfig;
use crate::error::{Result, StockError};
use chrono::{Days, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

const DATE_FORMAT: &str = "%Y-%m-%d";
const PUBLISHED_FORMAT: &str = "%Y%m%dT%H%M";
const TIME_SERIES_KEY: &str = "Time Series (Daily)";
const CLOSE_KEY: &str = "4. close";
const VOLUME_KEY: &str = "5. volume";
const NOTICE_KEYS: [&str; 3] = ["Error Message", "Note", "Information"];

/// Input of a fetch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockQuery {
    /// Ticker symbol
    pub symbol: String,
    /// First day, `YYYY-MM-DD`; defaults to `end_date` minus the lookback
    #[serde(default)]
    pub start_date: Option<String>,
    /// Last day, `YYYY-MM-DD`; defaults to today
    #[serde(default)]
    pub end_date: Option<String>,
}

impl StockQuery {
    /// Query for `symbol` over the default window
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            start_date: None,
            end_date: None,
        }
    }

    /// Set the first day
    pub fn start_date(mut self, date: impl Into<String>) -> Self {
        self.start_date = Some(date.into());
        self
    }

    /// Set the last day
    pub fn end_date(mut self, date: impl Into<String>) -> Self {
        self.end_date = Some(date.into());
        self
    }
}

/// Inclusive calendar window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    /// Resolve caller-supplied bounds
    ///
    /// Only absent (or blank) bounds are defaulted; a malformed date is an
    /// error, never silently replaced.
    pub fn resolve(
        start: Option<&str>,
        end: Option<&str>,
        today: NaiveDate,
        lookback_days: u32,
    ) -> Result<Self> {
        let end = match non_blank(end) {
            Some(value) => parse_date("end_date", value)?,
            None => today,
        };
        let start = match non_blank(start) {
            Some(value) => parse_date("start_date", value)?,
            None => end
                .checked_sub_days(Days::new(u64::from(lookback_days)))
                .ok_or_else(|| {
                    StockError::Other(format!("Cannot go back {lookback_days} days from {end}"))
                })?,
        };

        if start > end {
            return Err(StockError::DateRange {
                start: start.format(DATE_FORMAT).to_string(),
                end: end.format(DATE_FORMAT).to_string(),
            });
        }

        Ok(Self { start, end })
    }

    /// Whether `date` lies inside the window
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate> {
    let invalid = || StockError::DateFormat {
        field,
        value: value.to_string(),
    };
    if value.len() != 10 {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| invalid())
}

/// Closing price and volume of one trading day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub close: f64,
    pub volume: f64,
}

/// One news article inside the window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    /// Publish day, `YYYY-MM-DD`
    pub date: String,
    pub title: String,
    pub summary: String,
    pub url: String,
    /// Overall sentiment score as text, `"0"` when the provider gave none
    pub sentiment: String,
}

/// Normalized price and news data for one symbol
///
/// `dates[i]` is the trading day of `prices[i]`; both follow the provider's
/// order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockData {
    pub symbol: String,
    pub dates: Vec<String>,
    pub prices: Vec<PricePoint>,
    pub news: Vec<NewsItem>,
    /// Resolved first day, `YYYY-MM-DD`
    pub start_date: String,
    /// Resolved last day, `YYYY-MM-DD`
    pub end_date: String,
}

/// Whether the provider returned a time series
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PriceStatus {
    /// The series was present (it may still have no day inside the window)
    Available,
    /// The series key was absent; unknown symbols and throttling look like this
    Missing {
        /// Provider's explanation, when it sent one
        notice: Option<String>,
    },
}

/// Whether news could be retrieved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewsStatus {
    /// News was retrieved (possibly zero articles in range)
    Available,
    /// Retrieval or parsing failed; `news` is empty
    Unavailable { reason: String },
}

/// Outcome of a fetch
#[derive(Debug, Clone, PartialEq)]
pub struct StockReport {
    pub data: StockData,
    pub prices: PriceStatus,
    pub news: NewsStatus,
}

impl StockReport {
    /// Whether either half of the data was degraded
    pub fn is_degraded(&self) -> bool {
        self.prices != PriceStatus::Available || self.news != NewsStatus::Available
    }

    /// Human-readable notes about degraded data
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if let PriceStatus::Missing { notice } = &self.prices {
            warnings.push(match notice {
                Some(notice) => format!("No price data for {}: {notice}", self.data.symbol),
                None => format!("No price data for {}", self.data.symbol),
            });
        }
        if let NewsStatus::Unavailable { reason } = &self.news {
            warnings.push(format!("News unavailable: {reason}"));
        }
        warnings
    }
}

/// Fetches and normalizes price and news data
pub struct StockDataFetcher {
    source: Arc<dyn MarketDataSource>,
    lookback_days: u32,
    news_request_limit: u32,
    max_news_items: usize,
}

impl StockDataFetcher {
    /// Create a fetcher over any data source
    pub fn new(source: Arc<dyn MarketDataSource>, config: &StockConfig) -> Self {
        Self {
            source,
            lookback_days: config.lookback_days,
            news_request_limit: config.news_request_limit,
            max_news_items: config.max_news_items,
        }
    }

    /// Create a fetcher backed by Alpha Vantage
    pub fn from_config(config: &StockConfig) -> Result<Self> {
        let client = AlphaVantageClient::new(config)?;
        Ok(Self::new(Arc::new(client), config))
    }

    /// Fetch data for `query`, defaulting the window relative to today
    pub async fn fetch(&self, query: &StockQuery) -> Result<StockReport> {
        self.fetch_as_of(query, Local::now().date_naive()).await
    }

    /// Fetch data for `query`, defaulting the window relative to `today`
    ///
    /// # Errors
    ///
    /// `InvalidSymbol`, `DateFormat` and `DateRange` are raised before any
    /// request; `DataRetrieval` when the price request fails.
    pub async fn fetch_as_of(&self, query: &StockQuery, today: NaiveDate) -> Result<StockReport> {
        let symbol = query.symbol.trim();
        if symbol.is_empty() {
            return Err(StockError::InvalidSymbol(query.symbol.clone()));
        }
        let window = DateWindow::resolve(
            query.start_date.as_deref(),
            query.end_date.as_deref(),
            today,
            self.lookback_days,
        )?;

        info!(
            symbol,
            start = %window.start,
            end = %window.end,
            "Fetching stock data"
        );

        let body = self.source.daily_series(symbol).await?;
        let series = parse_daily_series(&body, &window);
        if let PriceStatus::Missing { notice } = &series.status {
            info!(symbol, notice = ?notice, "No daily time series in provider response");
        }

        let (news, news_status) = match self.fetch_news(symbol, &window).await {
            Ok(news) => (news, NewsStatus::Available),
            Err(e) => {
                warn!(symbol, error = %e, "Error getting news data");
                (
                    Vec::new(),
                    NewsStatus::Unavailable {
                        reason: e.to_string(),
                    },
                )
            }
        };

        debug!(
            symbol,
            days = series.dates.len(),
            articles = news.len(),
            "Stock data normalized"
        );

        Ok(StockReport {
            data: StockData {
                symbol: symbol.to_string(),
                dates: series.dates,
                prices: series.prices,
                news,
                start_date: window.start.format(DATE_FORMAT).to_string(),
                end_date: window.end.format(DATE_FORMAT).to_string(),
            },
            prices: series.status,
            news: news_status,
        })
    }

    async fn fetch_news(&self, symbol: &str, window: &DateWindow) -> Result<Vec<NewsItem>> {
        let request = NewsRequest {
            ticker: symbol.to_string(),
            from: window.start,
            to: window.end,
            limit: self.news_request_limit,
        };
        let body = self.source.news_sentiment(&request).await?;
        parse_news_feed(&body, window, self.max_news_items)
    }
}

struct DailySeries {
    dates: Vec<String>,
    prices: Vec<PricePoint>,
    status: PriceStatus,
}

/// Keep the in-window days of a daily time series, in provider order
fn parse_daily_series(body: &Value, window: &DateWindow) -> DailySeries {
    let mut series = DailySeries {
        dates: Vec::new(),
        prices: Vec::new(),
        status: PriceStatus::Available,
    };

    let Some(entries) = body.get(TIME_SERIES_KEY).and_then(Value::as_object) else {
        series.status = PriceStatus::Missing {
            notice: provider_notice(body),
        };
        return series;
    };

    for (day, values) in entries {
        let Ok(date) = NaiveDate::parse_from_str(day, DATE_FORMAT) else {
            warn!(day = %day, "Skipping time series entry with unparsable date");
            continue;
        };
        if !window.contains(date) {
            continue;
        }

        let close = values.get(CLOSE_KEY).and_then(number);
        let volume = values.get(VOLUME_KEY).and_then(number);
        match (close, volume) {
            (Some(close), Some(volume)) => {
                series.dates.push(date.format(DATE_FORMAT).to_string());
                series.prices.push(PricePoint { close, volume });
            }
            _ => warn!(day = %day, "Skipping time series entry without close/volume"),
        }
    }

    series
}

/// First `max_items` in-window articles of a news feed, in provider order
fn parse_news_feed(body: &Value, window: &DateWindow, max_items: usize) -> Result<Vec<NewsItem>> {
    let feed = body.get("feed").and_then(Value::as_array).ok_or_else(|| {
        StockError::Other(match provider_notice(body) {
            Some(notice) => format!("News response has no feed: {notice}"),
            None => "News response has no feed".to_string(),
        })
    })?;

    let mut news = Vec::new();
    for article in feed {
        if news.len() >= max_items {
            break;
        }

        let published = published_at(article)?;
        if !window.contains(published.date()) {
            continue;
        }

        news.push(NewsItem {
            date: published.date().format(DATE_FORMAT).to_string(),
            title: text_field(article, "title")?,
            summary: text_field(article, "summary")?,
            url: text_field(article, "url")?,
            sentiment: sentiment_text(article.get("overall_sentiment_score")),
        });
    }

    Ok(news)
}

/// `time_published` (`YYYYMMDDTHHMMSS`) with the seconds dropped
fn published_at(article: &Value) -> Result<NaiveDateTime> {
    let raw = article
        .get("time_published")
        .and_then(Value::as_str)
        .ok_or_else(|| StockError::Other("Article has no time_published".to_string()))?;

    let minutes = raw
        .char_indices()
        .rev()
        .nth(1)
        .map(|(idx, _)| &raw[..idx])
        .unwrap_or_default();

    NaiveDateTime::parse_from_str(minutes, PUBLISHED_FORMAT)
        .map_err(|e| StockError::Other(format!("Invalid time_published '{raw}': {e}")))
}

fn text_field(article: &Value, key: &str) -> Result<String> {
    article
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| StockError::Other(format!("Article has no {key}")))
}

fn sentiment_text(score: Option<&Value>) -> String {
    match score {
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        _ => "0".to_string(),
    }
}

/// Provider values are usually numeric strings
fn number(value: &Value) -> Option<f64> {
    match value {
        Value::String(s) => s.trim().parse().ok(),
        other => other.as_f64(),
    }
}

fn provider_notice(body: &Value) -> Option<String> {
    NOTICE_KEYS
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}
