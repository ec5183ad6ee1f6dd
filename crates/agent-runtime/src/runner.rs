//! Turn loop driving agent definitions against an LLM provider
//!
//! Each turn sends the active agent's instructions, tools and handoffs with the
//! whole conversation so far:
//! 1. Tool calls are executed and their results appended
//! 2. A handoff call switches the active agent for the next turn
//! 3. A reply without tool calls is the final output

use agent_core::context::keys;
use agent_core::{Context, Error, Result};
use agent_llm::{CompletionRequest, LLMProvider, Message, StopReason, TokenUsage, ToolCall};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::AgentDefinition;
use crate::handoff::handoff_ack;

const MULTIPLE_HANDOFFS: &str = "Multiple handoffs detected, ignoring this one.";
const TRUNCATED: &str = "Response truncated due to token limit";

/// Settings shared by every turn of a run
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Model used for every agent
    pub model: String,

    /// Max tokens per completion
    pub max_tokens: usize,

    /// Sampling temperature; provider default when unset
    pub temperature: Option<f32>,

    /// Model calls allowed before the run is abandoned
    pub max_turns: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            max_tokens: 4096,
            temperature: None,
            max_turns: 10,
        }
    }
}

/// Outcome of a run
#[derive(Debug, Clone)]
pub struct RunResult {
    /// Text of the final answer
    pub final_output: String,

    /// Agent that produced the final answer
    pub last_agent: String,

    /// Model calls made
    pub turns: usize,

    /// Tokens consumed across all turns
    pub usage: TokenUsage,
}

impl RunResult {
    /// Parse the final answer as a structured output
    ///
    /// # Errors
    ///
    /// Fails when the answer is not JSON of the expected shape.
    pub fn final_output_as<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.final_output).map_err(|e| {
            Error::ProcessingFailed(format!(
                "Final output of '{}' is not valid structured output: {e}",
                self.last_agent
            ))
        })
    }
}

/// Runs agents until one of them produces a final answer
#[derive(Clone)]
pub struct Runner {
    provider: Arc<dyn LLMProvider>,
    config: RunConfig,
}

impl Runner {
    /// Create a runner
    pub fn new(provider: Arc<dyn LLMProvider>, config: RunConfig) -> Self {
        Self { provider, config }
    }

    /// Run settings
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Provider used for every turn
    pub fn provider(&self) -> &Arc<dyn LLMProvider> {
        &self.provider
    }

    /// Run `agent` on `input` with a fresh context
    ///
    /// # Errors
    ///
    /// See [`Runner::run_with_context`].
    pub async fn run(&self, agent: &Arc<AgentDefinition>, input: &str) -> Result<RunResult> {
        let mut context = Context::new();
        self.run_with_context(agent, input, &mut context).await
    }

    /// Run `agent` on `input`, recording guardrail output and handoffs in `context`
    ///
    /// # Errors
    ///
    /// - `GuardrailTripped` when an input guardrail rejects the input
    /// - `ToolNotFound` when the model calls a tool the active agent lacks
    /// - `MaxTurnsExceeded` when no final answer arrives within the budget
    /// - `ProcessingFailed` when the provider fails or filters the reply
    pub async fn run_with_context(
        &self,
        agent: &Arc<AgentDefinition>,
        input: &str,
        context: &mut Context,
    ) -> Result<RunResult> {
        Self::check_input(agent, input, context).await?;

        let mut agent = Arc::clone(agent);
        let mut conversation = vec![Message::user(input)];
        let mut usage = TokenUsage::default();

        for turn in 1..=self.config.max_turns {
            info!(
                turn,
                max_turns = self.config.max_turns,
                agent = agent.name(),
                "Agent turn started"
            );

            let request = self.build_request(&agent, &conversation);
            let response = self
                .provider
                .complete(request)
                .await
                .map_err(|e| Error::ProcessingFailed(e.to_string()))?;

            usage.input_tokens += response.usage.input_tokens;
            usage.output_tokens += response.usage.output_tokens;
            info!(
                stop_reason = ?response.stop_reason,
                input_tokens = response.usage.input_tokens,
                output_tokens = response.usage.output_tokens,
                "LLM response received"
            );

            let calls = response.message.tool_calls();
            let text = response.message.text();
            conversation.push(response.message);

            if !calls.is_empty() {
                if let Some(next) =
                    Self::dispatch(&agent, calls, &mut conversation, context).await?
                {
                    agent = next;
                }
                continue;
            }

            let final_output = match response.stop_reason {
                StopReason::EndTurn | StopReason::ToolUse => text.unwrap_or_default(),
                StopReason::MaxTokens => {
                    warn!(agent = agent.name(), "Hit max tokens in LLM response");
                    text.unwrap_or_else(|| TRUNCATED.to_string())
                }
                StopReason::ContentFilter => {
                    return Err(Error::ProcessingFailed(format!(
                        "Response from '{}' was withheld by the provider's content filter",
                        agent.name()
                    )));
                }
            };

            info!(
                turn,
                agent = agent.name(),
                response_length = final_output.len(),
                "Run completed"
            );
            return Ok(RunResult {
                final_output,
                last_agent: agent.name().to_string(),
                turns: turn,
                usage,
            });
        }

        warn!(max_turns = self.config.max_turns, "Max turns reached, stopping");
        Err(Error::MaxTurnsExceeded(self.config.max_turns))
    }

    async fn check_input(
        agent: &AgentDefinition,
        input: &str,
        context: &mut Context,
    ) -> Result<()> {
        for guardrail in agent.input_guardrails() {
            let output = guardrail.check(context, agent, input).await?;
            debug!(
                guardrail = guardrail.name(),
                tripwire = output.tripwire_triggered,
                "Input guardrail checked"
            );
            context.insert(keys::GUARDRAIL_OUTPUT, output.output_info.clone());

            if output.tripwire_triggered {
                warn!(guardrail = guardrail.name(), "Input guardrail tripped");
                return Err(Error::GuardrailTripped {
                    guardrail: guardrail.name().to_string(),
                    reason: output.reason(),
                });
            }
        }
        Ok(())
    }

    fn build_request(&self, agent: &AgentDefinition, conversation: &[Message]) -> CompletionRequest {
        let tools = agent.tool_definitions();
        debug!(tool_count = tools.len(), agent = agent.name(), "Available tools");

        let mut builder = CompletionRequest::builder(&self.config.model)
            .messages(conversation.to_vec())
            .system(agent.instructions())
            .max_tokens(self.config.max_tokens)
            .tools(tools);
        if let Some(temperature) = self.config.temperature {
            builder = builder.temperature(temperature);
        }
        if let Some(output_type) = agent.output_type() {
            builder = builder.response_format(output_type.response_format());
        }
        builder.build()
    }

    /// Answer every call of one turn; returns the handoff target, if any
    async fn dispatch(
        agent: &Arc<AgentDefinition>,
        calls: Vec<ToolCall>,
        conversation: &mut Vec<Message>,
        context: &mut Context,
    ) -> Result<Option<Arc<AgentDefinition>>> {
        let mut next: Option<Arc<AgentDefinition>> = None;

        for call in calls {
            if let Some(target) = agent.handoff_target(&call.name) {
                if next.is_some() {
                    warn!(tool_name = %call.name, "Ignoring extra handoff in the same turn");
                    conversation.push(Message::tool_result(call.id, MULTIPLE_HANDOFFS));
                    continue;
                }
                info!(from = agent.name(), to = target.name(), "Handing off");
                context.record_handoff(agent.name(), target.name());
                conversation.push(Message::tool_result(call.id, handoff_ack(target)));
                next = Some(Arc::clone(target));
                continue;
            }

            let Some(tool) = agent.tools().get(&call.name) else {
                warn!(tool_name = %call.name, agent = agent.name(), "Model called unknown tool");
                return Err(Error::ToolNotFound(call.name));
            };

            let input_preview: String = call.input.to_string().chars().take(500).collect();
            info!(
                tool_name = %call.name,
                tool_id = %call.id,
                input_preview = %input_preview,
                "Executing tool"
            );

            let start = Instant::now();
            let outcome = tool.execute(call.input).await;
            let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

            match outcome {
                Ok(result) => {
                    let result_str = result.to_string();
                    let result_preview: String = result_str.chars().take(500).collect();
                    info!(
                        tool_name = %call.name,
                        duration_ms,
                        result_length = result_str.len(),
                        result_preview = %result_preview,
                        "Tool execution succeeded"
                    );
                    conversation.push(Message::tool_result(call.id, result_str));
                }
                Err(e) => {
                    warn!(
                        tool_name = %call.name,
                        duration_ms,
                        error = %e,
                        "Tool execution failed"
                    );
                    conversation.push(Message::tool_error(call.id, format!("Error: {e}")));
                }
            }
        }

        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GuardrailOutput, InputGuardrail, OutputType};
    use agent_llm::{CompletionResponse, ContentBlock, MessageContent};
    use agent_tools::Tool;
    use async_trait::async_trait;
    use serde::Deserialize;
    use serde_json::{Value, json};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned responses and records every request
    #[derive(Default)]
    struct ScriptedProvider {
        responses: Mutex<VecDeque<CompletionResponse>>,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl ScriptedProvider {
        fn new(responses: Vec<CompletionResponse>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::default(),
            })
        }

        fn requests(&self) -> Vec<CompletionRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LLMProvider for ScriptedProvider {
        async fn complete(&self, request: CompletionRequest) -> agent_llm::Result<CompletionResponse> {
            self.requests.lock().unwrap().push(request);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| agent_llm::LLMError::RequestFailed("script exhausted".to_string()))
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn reply(text: &str) -> CompletionResponse {
        CompletionResponse {
            message: Message::assistant(text),
            stop_reason: StopReason::EndTurn,
            usage: TokenUsage {
                input_tokens: 10,
                output_tokens: 5,
            },
        }
    }

    fn call(id: &str, name: &str, input: Value) -> CompletionResponse {
        calls(&[(id, name, input)])
    }

    fn calls(requested: &[(&str, &str, Value)]) -> CompletionResponse {
        let blocks = requested
            .iter()
            .map(|(id, name, input)| ContentBlock::ToolUse {
                id: (*id).to_string(),
                name: (*name).to_string(),
                input: input.clone(),
            })
            .collect();
        CompletionResponse {
            message: Message::assistant_blocks(blocks),
            stop_reason: StopReason::ToolUse,
            usage: TokenUsage::default(),
        }
    }

    fn tool_results(request: &CompletionRequest) -> Vec<(String, String, Option<bool>)> {
        request
            .messages
            .iter()
            .filter_map(|m| match &m.content {
                Some(MessageContent::Blocks(blocks)) => Some(blocks),
                _ => None,
            })
            .flatten()
            .filter_map(|b| match b {
                ContentBlock::ToolResult {
                    tool_use_id,
                    content,
                    is_error,
                } => Some((tool_use_id.clone(), content.clone(), *is_error)),
                _ => None,
            })
            .collect()
    }

    struct PriceTool;

    #[async_trait]
    impl Tool for PriceTool {
        async fn execute(&self, params: Value) -> Result<Value> {
            match params["symbol"].as_str() {
                Some("IBM") => Ok(json!({"symbol": "IBM", "close": 185.2})),
                _ => Err(Error::ProcessingFailed("unknown symbol".to_string())),
            }
        }

        fn name(&self) -> &str {
            "get_stock_data"
        }

        fn description(&self) -> &str {
            "Fetch prices"
        }

        fn input_schema(&self) -> Value {
            json!({"type": "object", "properties": {"symbol": {"type": "string"}}})
        }
    }

    struct BlockEverything;

    #[async_trait]
    impl InputGuardrail for BlockEverything {
        fn name(&self) -> &str {
            "block_everything"
        }

        async fn check(
            &self,
            _context: &Context,
            _agent: &AgentDefinition,
            _input: &str,
        ) -> Result<GuardrailOutput> {
            Ok(GuardrailOutput {
                output_info: json!({"reason": "off topic"}),
                tripwire_triggered: true,
            })
        }
    }

    fn analyzer() -> Arc<AgentDefinition> {
        Arc::new(
            AgentDefinition::builder("Stock Analyzer")
                .instructions("Analyze stocks")
                .tool(Arc::new(PriceTool))
                .build()
                .unwrap(),
        )
    }

    fn orchestrator(target: Arc<AgentDefinition>) -> Arc<AgentDefinition> {
        Arc::new(
            AgentDefinition::builder("Orchestrator")
                .instructions("Route requests")
                .handoff(target)
                .build()
                .unwrap(),
        )
    }

    fn runner(provider: Arc<ScriptedProvider>) -> Runner {
        Runner::new(provider, RunConfig::default())
    }

    #[tokio::test]
    async fn test_plain_answer() {
        let provider = ScriptedProvider::new(vec![reply("IBM rose 3%.")]);
        let result = runner(provider.clone()).run(&analyzer(), "How did IBM do?").await.unwrap();

        assert_eq!(result.final_output, "IBM rose 3%.");
        assert_eq!(result.last_agent, "Stock Analyzer");
        assert_eq!(result.turns, 1);
        assert_eq!(result.usage.total(), 15);

        let requests = provider.requests();
        assert_eq!(requests[0].system.as_deref(), Some("Analyze stocks"));
        assert_eq!(requests[0].tools.as_ref().unwrap()[0].name, "get_stock_data");
    }

    #[tokio::test]
    async fn test_tool_round_trip() {
        let provider = ScriptedProvider::new(vec![
            call("call_1", "get_stock_data", json!({"symbol": "IBM"})),
            reply("IBM closed at 185.2."),
        ]);
        let result = runner(provider.clone()).run(&analyzer(), "IBM?").await.unwrap();

        assert_eq!(result.final_output, "IBM closed at 185.2.");
        assert_eq!(result.turns, 2);

        let results = tool_results(&provider.requests()[1]);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].0, "call_1");
        assert!(results[0].1.contains("185.2"));
        assert_eq!(results[0].2, None);
    }

    #[tokio::test]
    async fn test_tool_error_goes_back_to_model() {
        let provider = ScriptedProvider::new(vec![
            call("call_1", "get_stock_data", json!({"symbol": "NOPE"})),
            reply("I could not find that symbol."),
        ]);
        let result = runner(provider.clone()).run(&analyzer(), "NOPE?").await.unwrap();

        assert_eq!(result.final_output, "I could not find that symbol.");
        let results = tool_results(&provider.requests()[1]);
        assert_eq!(results[0].2, Some(true));
        assert!(results[0].1.starts_with("Error: "));
    }

    #[tokio::test]
    async fn test_unknown_tool_is_fatal() {
        let provider = ScriptedProvider::new(vec![call("call_1", "launch_rockets", json!({}))]);
        let err = runner(provider).run(&analyzer(), "go").await.unwrap_err();
        assert!(matches!(err, Error::ToolNotFound(name) if name == "launch_rockets"));
    }

    #[tokio::test]
    async fn test_handoff_switches_agent() {
        let provider = ScriptedProvider::new(vec![
            call("call_1", "transfer_to_stock_analyzer", json!({})),
            reply("IBM is up."),
        ]);
        let mut context = Context::new();
        let result = runner(provider.clone())
            .run_with_context(&orchestrator(analyzer()), "How is IBM?", &mut context)
            .await
            .unwrap();

        assert_eq!(result.last_agent, "Stock Analyzer");
        assert_eq!(context.current_agent(), Some("Stock Analyzer"));
        assert_eq!(context.handoffs()[0].from, "Orchestrator");

        let requests = provider.requests();
        assert_eq!(requests[0].system.as_deref(), Some("Route requests"));
        assert_eq!(requests[1].system.as_deref(), Some("Analyze stocks"));
        assert_eq!(
            tool_results(&requests[1])[0].1,
            r#"{"assistant":"Stock Analyzer"}"#
        );
    }

    #[tokio::test]
    async fn test_first_handoff_wins() {
        let news = Arc::new(
            AgentDefinition::builder("News Analyzer")
                .instructions("Analyze news")
                .build()
                .unwrap(),
        );
        let root = Arc::new(
            AgentDefinition::builder("Orchestrator")
                .instructions("Route requests")
                .handoff(analyzer())
                .handoff(news)
                .build()
                .unwrap(),
        );
        let provider = ScriptedProvider::new(vec![
            calls(&[
                ("call_1", "transfer_to_news_analyzer", json!({})),
                ("call_2", "transfer_to_stock_analyzer", json!({})),
            ]),
            reply("Headlines are mixed."),
        ]);
        let result = runner(provider.clone()).run(&root, "News?").await.unwrap();

        assert_eq!(result.last_agent, "News Analyzer");
        let results = tool_results(&provider.requests()[1]);
        assert_eq!(results[1].0, "call_2");
        assert_eq!(results[1].1, MULTIPLE_HANDOFFS);
    }

    #[tokio::test]
    async fn test_max_turns_exceeded() {
        let provider = ScriptedProvider::new(vec![
            call("call_1", "get_stock_data", json!({"symbol": "IBM"})),
            call("call_2", "get_stock_data", json!({"symbol": "IBM"})),
        ]);
        let runner = Runner::new(
            provider,
            RunConfig {
                max_turns: 2,
                ..RunConfig::default()
            },
        );
        let err = runner.run(&analyzer(), "loop").await.unwrap_err();
        assert!(matches!(err, Error::MaxTurnsExceeded(2)));
    }

    #[tokio::test]
    async fn test_guardrail_trips_before_any_model_call() {
        let guarded = Arc::new(
            AgentDefinition::builder("Orchestrator")
                .instructions("Route requests")
                .input_guardrail(Arc::new(BlockEverything))
                .build()
                .unwrap(),
        );
        let provider = ScriptedProvider::new(vec![reply("unreachable")]);
        let mut context = Context::new();
        let err = runner(provider.clone())
            .run_with_context(&guarded, "recipe for soup", &mut context)
            .await
            .unwrap_err();

        assert!(err.is_guardrail());
        assert!(err.to_string().contains("off topic"));
        assert!(provider.requests().is_empty());
        assert_eq!(
            context.get(keys::GUARDRAIL_OUTPUT),
            Some(&json!({"reason": "off topic"}))
        );
    }

    #[tokio::test]
    async fn test_structured_output() {
        #[derive(Deserialize)]
        struct Check {
            is_stock: bool,
        }

        let agent = Arc::new(
            AgentDefinition::builder("Checker")
                .instructions("Classify")
                .output_type(OutputType::new("check", json!({"type": "object"})))
                .build()
                .unwrap(),
        );
        let provider = ScriptedProvider::new(vec![reply(r#"{"is_stock": true}"#)]);
        let result = runner(provider.clone()).run(&agent, "IBM?").await.unwrap();

        let check: Check = result.final_output_as().unwrap();
        assert!(check.is_stock);
        assert!(provider.requests()[0].response_format.is_some());
        assert!(provider.requests()[0].tools.is_none());
    }

    #[tokio::test]
    async fn test_truncated_reply_without_text() {
        let provider = ScriptedProvider::new(vec![CompletionResponse {
            message: Message::assistant_blocks(vec![]),
            stop_reason: StopReason::MaxTokens,
            usage: TokenUsage::default(),
        }]);
        let result = runner(provider).run(&analyzer(), "long").await.unwrap();
        assert_eq!(result.final_output, TRUNCATED);
    }
}
