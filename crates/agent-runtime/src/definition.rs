//! Agent definitions
//!
//! A definition is immutable once built and shared behind an `Arc`, so the
//! same sub-agent can be a handoff target of several parents.

use agent_core::{Error, Result};
use agent_llm::{ResponseFormat, ToolDefinition};
use agent_tools::{Tool, ToolRegistry};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::InputGuardrail;
use crate::handoff::{handoff_definition, handoff_tool_name};

/// Schema an agent's final answer must follow
#[derive(Debug, Clone, PartialEq)]
pub struct OutputType {
    /// Schema name reported to the provider
    pub name: String,
    /// JSON Schema of the answer
    pub schema: Value,
}

impl OutputType {
    /// Create an output type
    pub fn new(name: impl Into<String>, schema: Value) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }

    pub(crate) fn response_format(&self) -> ResponseFormat {
        ResponseFormat::JsonSchema {
            name: self.name.clone(),
            schema: self.schema.clone(),
        }
    }
}

/// Configuration of one agent
pub struct AgentDefinition {
    name: String,
    instructions: String,
    handoff_description: Option<String>,
    tools: ToolRegistry,
    handoffs: Vec<Arc<AgentDefinition>>,
    output_type: Option<OutputType>,
    input_guardrails: Vec<Arc<dyn InputGuardrail>>,
}

impl AgentDefinition {
    /// Start building a definition
    pub fn builder(name: impl Into<String>) -> AgentDefinitionBuilder {
        AgentDefinitionBuilder::new(name)
    }

    /// Agent name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// System instructions
    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    /// Extra text shown to parents deciding whether to hand off here
    pub fn handoff_description(&self) -> Option<&str> {
        self.handoff_description.as_deref()
    }

    /// Tools this agent may call
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Agents this agent may hand off to
    pub fn handoffs(&self) -> &[Arc<AgentDefinition>] {
        &self.handoffs
    }

    /// Structured output constraint, if any
    pub fn output_type(&self) -> Option<&OutputType> {
        self.output_type.as_ref()
    }

    /// Guardrails run against the user input before the first turn
    pub fn input_guardrails(&self) -> &[Arc<dyn InputGuardrail>] {
        &self.input_guardrails
    }

    /// Look up the handoff target behind a tool name
    pub fn handoff_target(&self, tool_name: &str) -> Option<&Arc<AgentDefinition>> {
        self.handoffs
            .iter()
            .find(|h| handoff_tool_name(h.name()) == tool_name)
    }

    /// Everything the model may call: tools first, then handoffs
    pub fn tool_definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .list_tools()
            .iter()
            .map(|t| ToolDefinition::new(t.name(), t.description(), t.input_schema()))
            .chain(self.handoffs.iter().map(|h| handoff_definition(h)))
            .collect()
    }
}

impl fmt::Debug for AgentDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentDefinition")
            .field("name", &self.name)
            .field("tools", &self.tools.names())
            .field(
                "handoffs",
                &self.handoffs.iter().map(|h| h.name()).collect::<Vec<_>>(),
            )
            .field("output_type", &self.output_type.as_ref().map(|o| &o.name))
            .field("input_guardrails", &self.input_guardrails.len())
            .finish_non_exhaustive()
    }
}

/// Builder for AgentDefinition
pub struct AgentDefinitionBuilder {
    name: String,
    instructions: String,
    handoff_description: Option<String>,
    tools: Vec<Arc<dyn Tool>>,
    handoffs: Vec<Arc<AgentDefinition>>,
    output_type: Option<OutputType>,
    input_guardrails: Vec<Arc<dyn InputGuardrail>>,
}

impl AgentDefinitionBuilder {
    /// Create a new builder
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instructions: String::new(),
            handoff_description: None,
            tools: Vec::new(),
            handoffs: Vec::new(),
            output_type: None,
            input_guardrails: Vec::new(),
        }
    }

    /// Set the system instructions
    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    /// Set the handoff description
    pub fn handoff_description(mut self, description: impl Into<String>) -> Self {
        self.handoff_description = Some(description.into());
        self
    }

    /// Add a tool
    pub fn tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    /// Add a handoff target
    pub fn handoff(mut self, agent: Arc<AgentDefinition>) -> Self {
        self.handoffs.push(agent);
        self
    }

    /// Constrain the final answer to a schema
    pub fn output_type(mut self, output_type: OutputType) -> Self {
        self.output_type = Some(output_type);
        self
    }

    /// Add an input guardrail
    pub fn input_guardrail(mut self, guardrail: Arc<dyn InputGuardrail>) -> Self {
        self.input_guardrails.push(guardrail);
        self
    }

    /// Build the definition
    ///
    /// # Errors
    ///
    /// Fails when the name or instructions are blank, or when two tools or
    /// handoffs would be exposed to the model under the same name.
    pub fn build(self) -> Result<AgentDefinition> {
        if self.name.trim().is_empty() {
            return Err(Error::InitializationFailed(
                "Agent name must not be empty".to_string(),
            ));
        }
        if self.instructions.trim().is_empty() {
            return Err(Error::InitializationFailed(format!(
                "Agent '{}' has no instructions",
                self.name
            )));
        }

        let mut seen = HashSet::new();
        let exposed = self
            .tools
            .iter()
            .map(|t| t.name().to_string())
            .chain(self.handoffs.iter().map(|h| handoff_tool_name(h.name())));
        for name in exposed {
            if !seen.insert(name.clone()) {
                return Err(Error::InitializationFailed(format!(
                    "Agent '{}' exposes '{name}' more than once",
                    self.name
                )));
            }
        }

        Ok(AgentDefinition {
            name: self.name,
            instructions: self.instructions,
            handoff_description: self.handoff_description,
            tools: ToolRegistry::from_tools(self.tools),
            handoffs: self.handoffs,
            output_type: self.output_type,
            input_guardrails: self.input_guardrails,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    struct NamedTool(&'static str);

    #[async_trait]
    impl Tool for NamedTool {
        async fn execute(&self, params: Value) -> Result<Value> {
            Ok(params)
        }

        fn name(&self) -> &str {
            self.0
        }

        fn description(&self) -> &str {
            "test tool"
        }

        fn input_schema(&self) -> Value {
            json!({"type": "object"})
        }
    }

    fn leaf(name: &str) -> Arc<AgentDefinition> {
        Arc::new(
            AgentDefinition::builder(name)
                .instructions("do the thing")
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn test_tool_definitions_order() {
        let agent = AgentDefinition::builder("Orchestrator")
            .instructions("route requests")
            .tool(Arc::new(NamedTool("web_search")))
            .handoff(leaf("Stock Analyzer"))
            .handoff(leaf("News Analyzer"))
            .build()
            .unwrap();

        let names: Vec<String> = agent.tool_definitions().into_iter().map(|d| d.name).collect();
        assert_eq!(
            names,
            vec![
                "web_search",
                "transfer_to_stock_analyzer",
                "transfer_to_news_analyzer"
            ]
        );
        assert_eq!(
            agent.handoff_target("transfer_to_news_analyzer").unwrap().name(),
            "News Analyzer"
        );
        assert!(agent.handoff_target("web_search").is_none());
    }

    #[test]
    fn test_blank_instructions_rejected() {
        let err = AgentDefinition::builder("Empty").build().unwrap_err();
        assert!(err.to_string().contains("no instructions"));
    }

    #[test]
    fn test_duplicate_exposed_names_rejected() {
        let err = AgentDefinition::builder("Orchestrator")
            .instructions("route")
            .handoff(leaf("Stock Analyzer"))
            .handoff(leaf("stock analyzer"))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("transfer_to_stock_analyzer"));
    }

    #[test]
    fn test_output_type_response_format() {
        let output = OutputType::new("topic_check", json!({"type": "object"}));
        assert_eq!(
            output.response_format(),
            ResponseFormat::JsonSchema {
                name: "topic_check".to_string(),
                schema: json!({"type": "object"}),
            }
        );
    }
}
