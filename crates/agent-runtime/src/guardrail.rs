//! Input guardrails

use agent_core::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;

use crate::AgentDefinition;

/// Verdict of a guardrail check
#[derive(Debug, Clone, PartialEq)]
pub struct GuardrailOutput {
    /// Whatever the guardrail wants to report (stored in the run context)
    pub output_info: Value,
    /// When set, the run is aborted before the first model turn
    pub tripwire_triggered: bool,
}

impl GuardrailOutput {
    /// Human-readable reason: `output_info.reason` when present
    pub fn reason(&self) -> String {
        self.output_info
            .get("reason")
            .and_then(Value::as_str)
            .map_or_else(|| self.output_info.to_string(), str::to_string)
    }
}

/// Check run against the user input before an agent starts
#[async_trait]
pub trait InputGuardrail: Send + Sync {
    /// Guardrail name used in errors and logs
    fn name(&self) -> &str;

    /// Inspect `input` addressed to `agent`
    async fn check(
        &self,
        context: &Context,
        agent: &AgentDefinition,
        input: &str,
    ) -> Result<GuardrailOutput>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reason_prefers_reason_field() {
        let output = GuardrailOutput {
            output_info: json!({"is_stock": false, "reason": "asks about cooking"}),
            tripwire_triggered: true,
        };
        assert_eq!(output.reason(), "asks about cooking");
    }

    #[test]
    fn test_reason_falls_back_to_json() {
        let output = GuardrailOutput {
            output_info: json!({"ok": false}),
            tripwire_triggered: true,
        };
        assert_eq!(output.reason(), r#"{"ok":false}"#);
    }
}
