//! Tool for fetching stock prices and related news

use agent_core::{Error as AgentError, Result as AgentResult};
use agent_tools::{Tool, parse_params};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::debug;

use crate::fetcher::{StockDataFetcher, StockQuery};

/// Tool wrapping [`StockDataFetcher`]
///
/// Returns the `StockData` record; a `warnings` array is added when the price
/// series was missing or news could not be retrieved.
pub struct StockDataTool {
    fetcher: Arc<StockDataFetcher>,
}

impl StockDataTool {
    /// Tool name seen by the model
    pub const NAME: &'static str = "get_stock_data";

    /// Create a new stock data tool
    pub fn new(fetcher: Arc<StockDataFetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl Tool for StockDataTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let query: StockQuery = parse_params(Self::NAME, params)?;
        let report = self.fetcher.fetch(&query).await.map_err(|e| {
            if e.is_invalid_input() {
                AgentError::InvalidToolInput {
                    tool: Self::NAME.to_string(),
                    message: e.to_string(),
                }
            } else {
                e.into()
            }
        })?;

        let mut result = serde_json::to_value(&report.data).map_err(|e| {
            AgentError::ProcessingFailed(format!("Failed to serialize stock data: {e}"))
        })?;
        if report.is_degraded() {
            let warnings = report.warnings();
            debug!(symbol = %report.data.symbol, ?warnings, "Returning degraded stock data");
            result["warnings"] = json!(warnings);
        }

        Ok(result)
    }

    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Get the daily closing prices, trading volumes and up to five related news \
         articles of the specified stock within the given time range. \
         Defaults to the last 30 days when no dates are given."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "symbol": {
                    "type": "string",
                    "description": "Stock ticker symbol (e.g., 'IBM', 'AAPL')"
                },
                "start_date": {
                    "type": ["string", "null"],
                    "description": "Start date (YYYY-MM-DD)"
                },
                "end_date": {
                    "type": ["string", "null"],
                    "description": "End date (YYYY-MM-DD)"
                }
            },
            "required": ["symbol"]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockMarketDataSource;
    use crate::config::StockConfig;
    use crate::error::StockError;

    fn tool(source: MockMarketDataSource) -> StockDataTool {
        let fetcher = StockDataFetcher::new(Arc::new(source), &StockConfig::default());
        StockDataTool::new(Arc::new(fetcher))
    }

    #[test]
    fn test_tool_metadata() {
        let tool = tool(MockMarketDataSource::new());

        assert_eq!(tool.name(), "get_stock_data");
        assert!(!tool.description().is_empty());

        let schema = tool.input_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["required"], json!(["symbol"]));
        assert!(schema["properties"]["start_date"].is_object());
    }

    #[tokio::test]
    async fn test_execute_returns_stock_data() {
        let mut source = MockMarketDataSource::new();
        source.expect_daily_series().returning(|_| {
            Ok(json!({"Time Series (Daily)": {
                "2024-01-31": {"4. close": "183.66", "5. volume": "8876055"}
            }}))
        });
        source
            .expect_news_sentiment()
            .returning(|_| Ok(json!({"feed": []})));

        let result = tool(source)
            .execute(json!({"symbol": "IBM", "start_date": "2024-01-01", "end_date": "2024-01-31"}))
            .await
            .unwrap();

        assert_eq!(result["symbol"], "IBM");
        assert_eq!(result["dates"], json!(["2024-01-31"]));
        assert_eq!(result["prices"][0]["volume"], 8_876_055.0);
        assert!(result.get("warnings").is_none());
    }

    #[tokio::test]
    async fn test_execute_reports_news_outage() {
        let mut source = MockMarketDataSource::new();
        source
            .expect_daily_series()
            .returning(|_| Ok(json!({"Time Series (Daily)": {}})));
        source.expect_news_sentiment().returning(|_| {
            Err(StockError::Other("News response has no feed".to_string()))
        });

        let result = tool(source)
            .execute(json!({"symbol": "IBM", "start_date": null}))
            .await
            .unwrap();

        assert_eq!(result["news"], json!([]));
        assert_eq!(
            result["warnings"],
            json!(["News unavailable: News response has no feed"])
        );
    }

    #[tokio::test]
    async fn test_execute_rejects_bad_input() {
        let err = tool(MockMarketDataSource::new())
            .execute(json!({"start_date": "2024-01-01"}))
            .await
            .unwrap_err();
        assert!(matches!(err, agent_core::Error::InvalidToolInput { .. }));

        let err = tool(MockMarketDataSource::new())
            .execute(json!({"symbol": "IBM", "end_date": "31/01/2024"}))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            agent_core::Error::InvalidToolInput { ref tool, ref message }
                if tool == "get_stock_data" && message.contains("expected YYYY-MM-DD")
        ));

        let err = tool(MockMarketDataSource::new())
            .execute(json!({"symbol": "IBM", "start_date": "2024-02-01", "end_date": "2024-01-01"}))
            .await
            .unwrap_err();
        assert!(matches!(err, agent_core::Error::InvalidToolInput { .. }));
    }

    #[tokio::test]
    async fn test_execute_provider_failure_is_processing_error() {
        let mut source = MockMarketDataSource::new();
        source.expect_daily_series().returning(|_| {
            Err(StockError::DataRetrieval {
                symbol: "IBM".to_string(),
                reason: "HTTP error: 503 Service Unavailable".to_string(),
            })
        });
        source.expect_news_sentiment().times(0);

        let err = tool(source)
            .execute(json!({"symbol": "IBM"}))
            .await
            .unwrap_err();
        assert!(matches!(err, agent_core::Error::ProcessingFailed(ref msg) if msg.contains("503")));
    }

    #[tokio::test]
    async fn test_execute_reports_missing_series() {
        let mut source = MockMarketDataSource::new();
        source.expect_daily_series().returning(|_| {
            Ok(json!({"Error Message": "Invalid API call."}))
        });
        source
            .expect_news_sentiment()
            .returning(|_| Ok(json!({"feed": []})));

        let result = tool(source)
            .execute(json!({"symbol": "NOPE"}))
            .await
            .unwrap();

        assert_eq!(result["dates"], json!([]));
        assert_eq!(
            result["warnings"],
            json!(["No price data for NOPE: Invalid API call."])
        );
    }
}
