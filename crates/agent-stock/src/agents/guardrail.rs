//! Topic guardrail
//!
//! A small classifier agent decides whether a question is about a stock or a
//! news event. Anything else trips the wire before the orchestrator runs.

use agent_core::{Context, Error, Result};
use agent_llm::tools::schema;
use agent_runtime::{AgentDefinition, GuardrailOutput, InputGuardrail, OutputType, Runner};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

use crate::prompts;

/// Guardrail agent name
pub const GUARDRAIL_AGENT: &str = "Guardrail Agent";

/// Structured verdict of the guardrail agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicCheck {
    /// The user wants an analysis of a stock
    pub is_stock: bool,
    /// The user asks about a news event
    pub is_news: bool,
    /// Short justification
    pub reason: String,
}

impl TopicCheck {
    /// Output type the guardrail agent must answer with
    pub fn output_type() -> OutputType {
        OutputType::new(
            "topic_check",
            schema::strict_object(
                json!({
                    "is_stock": schema::boolean("The user is asking for a stock related analysis"),
                    "is_news": schema::boolean("The user is asking for a news event analysis"),
                    "reason": schema::string("Why the question was classified this way"),
                }),
                &["is_stock", "is_news", "reason"],
            ),
        )
    }

    /// Neither a stock nor a news question
    pub fn is_off_topic(&self) -> bool {
        !self.is_stock && !self.is_news
    }
}

/// Input guardrail backed by the guardrail agent
pub struct TopicGuardrail {
    runner: Runner,
    agent: Arc<AgentDefinition>,
}

impl TopicGuardrail {
    /// Create the guardrail; `runner` runs the classifier agent
    pub fn new(runner: Runner) -> Result<Self> {
        let agent = AgentDefinition::builder(GUARDRAIL_AGENT)
            .instructions(prompts::GUARDRAIL)
            .output_type(TopicCheck::output_type())
            .build()?;

        Ok(Self {
            runner,
            agent: Arc::new(agent),
        })
    }

    /// Classify `input`
    pub async fn classify(&self, input: &str) -> Result<TopicCheck> {
        let result = self.runner.run(&self.agent, input).await?;
        result.final_output_as()
    }
}

#[async_trait]
impl InputGuardrail for TopicGuardrail {
    fn name(&self) -> &str {
        "topic_guardrail"
    }

    async fn check(
        &self,
        _context: &Context,
        _agent: &AgentDefinition,
        input: &str,
    ) -> Result<GuardrailOutput> {
        let check = self.classify(input).await?;
        debug!(
            is_stock = check.is_stock,
            is_news = check.is_news,
            reason = %check.reason,
            "Topic classified"
        );

        let output_info = serde_json::to_value(&check)
            .map_err(|e| Error::ProcessingFailed(format!("Failed to serialize topic check: {e}")))?;
        Ok(GuardrailOutput {
            output_info,
            tripwire_triggered: check.is_off_topic(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_llm::{
        CompletionRequest, CompletionResponse, LLMProvider, Message, ResponseFormat, StopReason,
        TokenUsage,
    };
    use agent_runtime::RunConfig;
    use std::sync::Mutex;

    struct Verdict {
        answer: String,
        seen: Mutex<Vec<CompletionRequest>>,
    }

    #[async_trait]
    impl LLMProvider for Verdict {
        async fn complete(&self, request: CompletionRequest) -> agent_llm::Result<CompletionResponse> {
            self.seen.lock().unwrap().push(request);
            Ok(CompletionResponse {
                message: Message::assistant(self.answer.clone()),
                stop_reason: StopReason::EndTurn,
                usage: TokenUsage::default(),
            })
        }

        fn name(&self) -> &str {
            "verdict"
        }
    }

    fn guardrail(answer: &str) -> (TopicGuardrail, Arc<Verdict>) {
        let provider = Arc::new(Verdict {
            answer: answer.to_string(),
            seen: Mutex::new(Vec::new()),
        });
        let runner = Runner::new(provider.clone(), RunConfig::default());
        (TopicGuardrail::new(runner).unwrap(), provider)
    }

    fn orchestrator() -> AgentDefinition {
        AgentDefinition::builder("Orchestrator")
            .instructions("route")
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_stock_question_passes() {
        let (guardrail, provider) =
            guardrail(r#"{"is_stock": true, "is_news": false, "reason": "asks about IBM"}"#);
        let output = guardrail
            .check(&Context::new(), &orchestrator(), "How did IBM trade in January?")
            .await
            .unwrap();

        assert!(!output.tripwire_triggered);
        assert_eq!(output.output_info["reason"], "asks about IBM");

        let seen = provider.seen.lock().unwrap();
        assert!(matches!(
            &seen[0].response_format,
            Some(ResponseFormat::JsonSchema { name, .. }) if name == "topic_check"
        ));
    }

    #[tokio::test]
    async fn test_off_topic_trips() {
        let (guardrail, _) =
            guardrail(r#"{"is_stock": false, "is_news": false, "reason": "cooking question"}"#);
        let output = guardrail
            .check(&Context::new(), &orchestrator(), "How do I bake bread?")
            .await
            .unwrap();

        assert!(output.tripwire_triggered);
        assert_eq!(output.reason(), "cooking question");
    }

    #[tokio::test]
    async fn test_unparsable_verdict_is_error() {
        let (guardrail, _) = guardrail("sure, that's about stocks");
        let err = guardrail.classify("IBM?").await.unwrap_err();
        assert!(err.to_string().contains("not valid structured output"));
    }

    #[test]
    fn test_output_schema_is_strict() {
        let output = TopicCheck::output_type();
        assert_eq!(output.schema["additionalProperties"], false);
        assert_eq!(output.schema["required"], json!(["is_stock", "is_news", "reason"]));
    }
}
