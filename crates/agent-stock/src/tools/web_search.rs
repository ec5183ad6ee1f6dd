//! Web search through a search-capable chat model

use agent_core::{Error, Result as AgentResult};
use agent_llm::{CompletionRequest, LLMProvider, Message};
use agent_tools::{Tool, parse_params};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::debug;

const SEARCH_INSTRUCTIONS: &str = "Search the web and answer with the facts found. \
     Include publication dates and source links for every event you mention.";

/// Tool that answers a query using a model with built-in web search
pub struct WebSearchTool {
    provider: Arc<dyn LLMProvider>,
    model: String,
    max_tokens: usize,
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    query: String,
}

impl WebSearchTool {
    /// Tool name seen by the model
    pub const NAME: &'static str = "web_search";

    /// Create a search tool backed by `model`
    pub fn new(provider: Arc<dyn LLMProvider>, model: impl Into<String>, max_tokens: usize) -> Self {
        Self {
            provider,
            model: model.into(),
            max_tokens,
        }
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let params: SearchParams = parse_params(Self::NAME, params)?;
        let query = params.query.trim();
        if query.is_empty() {
            return Err(Error::InvalidToolInput {
                tool: Self::NAME.to_string(),
                message: "query must not be empty".to_string(),
            });
        }

        debug!(model = %self.model, query, "Running web search");
        let request = CompletionRequest::builder(&self.model)
            .system(SEARCH_INSTRUCTIONS)
            .add_message(Message::user(query))
            .max_tokens(self.max_tokens)
            .build();

        let response = self
            .provider
            .complete(request)
            .await
            .map_err(|e| Error::ProcessingFailed(format!("Web search failed: {e}")))?;

        let answer = response
            .message
            .text()
            .ok_or_else(|| Error::ProcessingFailed("Web search returned no text".to_string()))?;

        Ok(json!({
            "query": query,
            "results": answer,
        }))
    }

    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Search the internet for recent information, such as when a news event happened. \
         Returns a text summary of what was found, with links."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "What to search for"
                }
            },
            "required": ["query"]
        })
    }
}
