//! Interactive stock analysis chatbot
//!
//! [`StockBot`] answers one question per run of the orchestrator;
//! [`StockBot::run_repl`] drives it from any line-based reader and writer.

use agent_core::{Agent, Context};
use agent_llm::LLMProvider;
use agent_runtime::{RunResult, Runner};
use async_trait::async_trait;
use chrono::Local;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{info, warn};

use crate::agents::{StockAgents, run_config};
use crate::config::StockConfig;
use crate::error::Result;
use crate::fetcher::StockDataFetcher;

const BANNER: &str = "Stock Analysis Chatbot\nEnter 'quit' to exit\n";
const PROMPT: &str = "\nWhat would you like to know about stocks? ";

/// Stock and news analysis chatbot
pub struct StockBot {
    runner: Runner,
    agents: StockAgents,
}

impl StockBot {
    /// Create a bot that fetches data from Alpha Vantage
    pub fn new(provider: Arc<dyn LLMProvider>, config: &StockConfig) -> Result<Self> {
        let fetcher = StockDataFetcher::from_config(config)?;
        Self::with_fetcher(provider, config, Arc::new(fetcher))
    }

    /// Create a bot over an existing fetcher
    pub fn with_fetcher(
        provider: Arc<dyn LLMProvider>,
        config: &StockConfig,
        fetcher: Arc<StockDataFetcher>,
    ) -> Result<Self> {
        let agents = StockAgents::build(config, Arc::clone(&provider), fetcher)?;
        Ok(Self {
            runner: Runner::new(provider, run_config(config)),
            agents,
        })
    }

    /// The agent graph
    pub fn agents(&self) -> &StockAgents {
        &self.agents
    }

    /// Answer one question, recording handoffs in `context`
    pub async fn ask(&self, question: &str, context: &mut Context) -> agent_core::Result<RunResult> {
        self.runner
            .run_with_context(&self.agents.orchestrator, question, context)
            .await
    }

    /// Run the question loop until `quit` or end of input
    pub async fn run_repl<R, W>(&self, reader: R, mut writer: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let session = Local::now().format("%Y%m%dT%H%M%S").to_string();
        let mut lines = reader.lines();
        let mut asked = 0_usize;

        writer.write_all(BANNER.as_bytes()).await?;
        loop {
            writer.write_all(PROMPT.as_bytes()).await?;
            writer.flush().await?;

            let Some(line) = lines.next_line().await? else {
                writer.write_all(b"\nGoodbye!\n").await?;
                break;
            };
            let input = line.trim();
            if input.eq_ignore_ascii_case("quit") {
                writer.write_all(b"Goodbye!\n").await?;
                break;
            }
            if input.is_empty() {
                continue;
            }

            asked += 1;
            info!(session = %session, question = asked, "Question received");
            writer.write_all(b"\nAnalyzing... Please wait...\n").await?;
            writer.flush().await?;

            let mut context = Context::new().with_session_id(format!("{session}-{asked}"));
            match self.process(input.to_string(), &mut context).await {
                Ok(answer) => {
                    writer
                        .write_all(format!("\nAnalysis Result:\n{answer}\n").as_bytes())
                        .await?;
                }
                Err(e) => {
                    warn!(session = %session, error = %e, "Question failed");
                    writer.write_all(format!("\nError: {e}\n").as_bytes()).await?;
                }
            }
        }

        writer.flush().await
    }
}

#[async_trait]
impl Agent for StockBot {
    async fn process(&self, input: String, context: &mut Context) -> agent_core::Result<String> {
        let result = self.ask(&input, context).await?;
        info!(
            session = context.session_id().unwrap_or_default(),
            agent = %result.last_agent,
            turns = result.turns,
            tokens = result.usage.total(),
            "Question answered"
        );
        Ok(result.final_output)
    }

    fn name(&self) -> &str {
        "stock-bot"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockMarketDataSource;
    use agent_llm::{
        CompletionRequest, CompletionResponse, ContentBlock, LLMError, Message, StopReason,
        TokenUsage,
    };
    use serde_json::{Value, json};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct ScriptedProvider {
        responses: Mutex<VecDeque<CompletionResponse>>,
        calls: Mutex<usize>,
    }

    #[async_trait]
    impl LLMProvider for ScriptedProvider {
        async fn complete(&self, _request: CompletionRequest) -> agent_llm::Result<CompletionResponse> {
            *self.calls.lock().unwrap() += 1;
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| LLMError::RequestFailed("script exhausted".to_string()))
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn scripted(responses: Vec<CompletionResponse>) -> Arc<ScriptedProvider> {
        Arc::new(ScriptedProvider {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(0),
        })
    }

    fn tool_call(id: &str, name: &str, input: Value) -> CompletionResponse {
        CompletionResponse {
            message: Message::assistant_blocks(vec![ContentBlock::ToolUse {
                id: id.to_string(),
                name: name.to_string(),
                input,
            }]),
            stop_reason: StopReason::ToolUse,
            usage: TokenUsage::default(),
        }
    }

    fn answer(text: &str) -> CompletionResponse {
        CompletionResponse {
            message: Message::assistant(text),
            stop_reason: StopReason::EndTurn,
            usage: TokenUsage::default(),
        }
    }

    fn ibm_source() -> MockMarketDataSource {
        let mut source = MockMarketDataSource::new();
        source.expect_daily_series().returning(|_| {
            Ok(json!({"Time Series (Daily)": {
                "2024-01-31": {"4. close": "183.66", "5. volume": "8876055"},
                "2024-01-02": {"4. close": "163.55", "5. volume": "3930135"}
            }}))
        });
        source
            .expect_news_sentiment()
            .returning(|_| Ok(json!({"feed": []})));
        source
    }

    fn bot(provider: Arc<ScriptedProvider>, source: MockMarketDataSource) -> StockBot {
        let config = StockConfig::default();
        let fetcher = StockDataFetcher::new(Arc::new(source), &config);
        StockBot::with_fetcher(provider, &config, Arc::new(fetcher)).unwrap()
    }

    async fn session(bot: &StockBot, input: &str) -> String {
        let mut output = Vec::new();
        bot.run_repl(input.as_bytes(), &mut output).await.unwrap();
        String::from_utf8(output).unwrap()
    }

    fn ibm_script() -> Vec<CompletionResponse> {
        vec![
            tool_call("call_1", "transfer_to_stock_analyzer", json!({})),
            tool_call(
                "call_2",
                "get_stock_data",
                json!({"symbol": "IBM", "start_date": "2024-01-01", "end_date": "2024-01-31"}),
            ),
            answer("IBM rose 12% in January 2024."),
        ]
    }

    #[tokio::test]
    async fn test_quit_exits_without_model_calls() {
        let provider = scripted(vec![]);
        let out = session(&bot(provider.clone(), MockMarketDataSource::new()), "QUIT\n").await;

        assert!(out.starts_with("Stock Analysis Chatbot\nEnter 'quit' to exit\n"));
        assert!(out.contains("What would you like to know about stocks? "));
        assert!(out.trim_end().ends_with("Goodbye!"));
        assert_eq!(*provider.calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_end_of_input_says_goodbye() {
        let out = session(&bot(scripted(vec![]), MockMarketDataSource::new()), "\n  \n").await;
        assert!(!out.contains("Analyzing"));
        assert!(out.trim_end().ends_with("Goodbye!"));
    }

    #[tokio::test]
    async fn test_question_is_answered() {
        let bot = bot(scripted(ibm_script()), ibm_source());
        let out = session(&bot, "How did IBM do in January 2024?\nquit\n").await;

        assert!(out.contains("\nAnalyzing... Please wait...\n"));
        assert!(out.contains("\nAnalysis Result:\nIBM rose 12% in January 2024.\n"));
        assert!(out.trim_end().ends_with("Goodbye!"));
    }

    #[tokio::test]
    async fn test_error_is_printed_and_loop_continues() {
        let bot = bot(scripted(vec![]), MockMarketDataSource::new());
        let out = session(&bot, "How is IBM?\nquit\n").await;

        assert!(out.contains("\nError: "));
        assert!(out.contains("script exhausted"));
        assert!(out.trim_end().ends_with("Goodbye!"));
    }

    #[tokio::test]
    async fn test_process_records_handoff() {
        let bot = bot(scripted(ibm_script()), ibm_source());
        let mut context = Context::new().with_session_id("test");

        let answer = bot
            .process("How did IBM do in January 2024?".to_string(), &mut context)
            .await
            .unwrap();

        assert_eq!(answer, "IBM rose 12% in January 2024.");
        assert_eq!(context.current_agent(), Some("Stock Analyzer"));
        assert_eq!(bot.name(), "stock-bot");
    }
}
