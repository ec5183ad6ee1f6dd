//! Agent runtime: definitions, handoffs, guardrails and the turn loop
//!
//! An [`AgentDefinition`] is configuration only: instructions, tools, the
//! agents it may hand off to, and optional input guardrails. The [`Runner`]
//! drives a definition against an [`agent_llm::LLMProvider`] until the model
//! produces a final answer.

pub mod definition;
pub mod guardrail;
pub mod handoff;
pub mod runner;

pub use definition::{AgentDefinition, AgentDefinitionBuilder, OutputType};
pub use guardrail::{GuardrailOutput, InputGuardrail};
pub use handoff::handoff_tool_name;
pub use runner::{RunConfig, RunResult, Runner};
