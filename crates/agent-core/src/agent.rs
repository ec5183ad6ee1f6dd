//! Core Agent trait definition

use crate::{Context, Result};
use async_trait::async_trait;

/// Anything that turns a user request into a final text answer
///
/// Input and output stay plain strings; structured payloads travel through
/// tools and are serialized before they reach an agent.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Process input and return output
    async fn process(&self, input: String, context: &mut Context) -> Result<String>;

    /// Get the agent's name
    fn name(&self) -> &str;
}
