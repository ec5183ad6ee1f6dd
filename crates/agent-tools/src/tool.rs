//! Tool trait definition

use agent_core::{Error, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Trait for tools that agents can execute
///
/// Each tool provides a name, a description the model reads when deciding
/// whether to call it, and a JSON schema for its input.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Execute the tool with given parameters
    ///
    /// `params` is the JSON object produced by the model and should match
    /// `input_schema`. The returned value is serialized back to the model.
    async fn execute(&self, params: Value) -> Result<Value>;

    /// Tool name, unique within a registry
    fn name(&self) -> &str;

    /// Description shown to the model
    fn description(&self) -> &str;

    /// Input schema (JSON Schema object)
    fn input_schema(&self) -> Value;
}

/// Deserialize tool parameters, reporting schema mismatches as
/// [`Error::InvalidToolInput`]
pub fn parse_params<T: DeserializeOwned>(tool: &str, params: Value) -> Result<T> {
    serde_json::from_value(params).map_err(|e| Error::InvalidToolInput {
        tool: tool.to_string(),
        message: e.to_string(),
    })
}
