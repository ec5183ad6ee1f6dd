//! Execution context for agent runs
//!
//! A `Context` lives for one run (one user request). It records which agents
//! handled the request and carries arbitrary JSON values that guardrails and
//! tools may want to share.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Well-known context keys
pub mod keys {
    /// Session identifier for log correlation
    pub const SESSION_ID: &str = "session_id";
    /// Output of the most recent input guardrail
    pub const GUARDRAIL_OUTPUT: &str = "guardrail_output";
}

/// One delegation from an agent to another during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Handoff {
    /// Agent that gave up the turn
    pub from: String,
    /// Agent that took over
    pub to: String,
}

/// Context passed to agents during execution
///
/// # Example
///
/// ```
/// use agent_core::Context;
///
/// let mut ctx = Context::new().with_session_id("session-123");
/// ctx.record_handoff("Orchestrator", "Stock Analyzer");
///
/// assert_eq!(ctx.session_id(), Some("session-123"));
/// assert_eq!(ctx.current_agent(), Some("Stock Analyzer"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
    data: HashMap<String, serde_json::Value>,
    handoffs: Vec<Handoff>,
}

impl Context {
    /// Create a new empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the session ID
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.insert(keys::SESSION_ID, serde_json::json!(session_id.into()));
        self
    }

    /// Get the session ID
    pub fn session_id(&self) -> Option<&str> {
        self.get(keys::SESSION_ID).and_then(|v| v.as_str())
    }

    /// Record that `from` handed the conversation to `to`
    pub fn record_handoff(&mut self, from: impl Into<String>, to: impl Into<String>) {
        self.handoffs.push(Handoff {
            from: from.into(),
            to: to.into(),
        });
    }

    /// Handoffs recorded so far, oldest first
    pub fn handoffs(&self) -> &[Handoff] {
        &self.handoffs
    }

    /// The agent that received the latest handoff, if any
    pub fn current_agent(&self) -> Option<&str> {
        self.handoffs.last().map(|h| h.to.as_str())
    }

    /// Insert a value into the context
    pub fn insert(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.data.insert(key.into(), value);
    }

    /// Get a value from the context
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key)
    }
}
