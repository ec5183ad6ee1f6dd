//! Handoffs exposed to the model as tools
//!
//! The model hands a conversation to another agent by calling the tool
//! `transfer_to_<agent_name>`; the runner intercepts that call instead of
//! executing anything.

use agent_llm::ToolDefinition;
use agent_llm::tools::schema;
use serde_json::json;

use crate::AgentDefinition;

const HANDOFF_PREFIX: &str = "transfer_to_";

/// Tool name used to hand off to `agent_name`
///
/// ```
/// use agent_runtime::handoff_tool_name;
///
/// assert_eq!(handoff_tool_name("Stock Analyzer"), "transfer_to_stock_analyzer");
/// ```
pub fn handoff_tool_name(agent_name: &str) -> String {
    let mut slug = String::with_capacity(agent_name.len());
    for c in agent_name.trim().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('_') {
            slug.push('_');
        }
    }
    format!("{HANDOFF_PREFIX}{}", slug.trim_matches('_'))
}

/// Tool definition the model sees for a handoff to `target`
pub(crate) fn handoff_definition(target: &AgentDefinition) -> ToolDefinition {
    let description = target.handoff_description().map_or_else(
        || format!("Handoff to the {} agent to handle the request.", target.name()),
        |d| format!("Handoff to the {} agent to handle the request. {d}", target.name()),
    );

    ToolDefinition::new(
        handoff_tool_name(target.name()),
        description,
        schema::strict_object(json!({}), &[]),
    )
}

/// Tool result returned to the model after a successful handoff
pub(crate) fn handoff_ack(target: &AgentDefinition) -> String {
    json!({ "assistant": target.name() }).to_string()
}
