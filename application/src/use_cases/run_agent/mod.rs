//! Run Agent use case.
//!
//! Drives one conversational turn through the reasoning engine:
//!
//! 1. Discover tools from every backend (fresh for each run)
//! 2. Open an LLM session with the system prompt and prior turns
//! 3. Send the last user turn with the tool catalog
//! 4. While the engine requests tools: dispatch them concurrently, send the
//!    results back in call order
//! 5. Append the flattened final text as exactly one `ai` turn
//!
//! The number of dispatch rounds is bounded by
//! [`ExecutionParams::max_tool_rounds`]; running out ends the run in
//! [`AgentOutcome::Incomplete`] with a fixed apology turn.

mod types;

pub use types::{RunAgentError, RunAgentInput, RunAgentOutput};

use crate::config::ExecutionParams;
use crate::ports::llm_gateway::{LlmGateway, ToolResultMessage};
use crate::ports::tool_executor::{ToolDiscoveryPort, ToolExecutorPort};
use crate::use_cases::shared::{cancellable, check_cancelled};
use kowalski_domain::{
    AgentOutcome, AgentPhase, AgentPromptTemplate, AgentStep, DomainError, RunTrace, ToolCall,
    ToolDefinition, ToolResult, Turn,
};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Use case for running the tool-calling agent
#[derive(Clone)]
pub struct RunAgentUseCase {
    gateway: Arc<dyn LlmGateway>,
    discovery: Arc<dyn ToolDiscoveryPort>,
    params: ExecutionParams,
    cancellation_token: Option<CancellationToken>,
}

impl RunAgentUseCase {
    pub fn new(gateway: Arc<dyn LlmGateway>, discovery: Arc<dyn ToolDiscoveryPort>) -> Self {
        Self {
            gateway,
            discovery,
            params: ExecutionParams::default(),
            cancellation_token: None,
        }
    }

    pub fn with_params(mut self, params: ExecutionParams) -> Self {
        self.params = params;
        self
    }

    /// Set a cancellation token for graceful interruption
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    pub async fn execute(&self, input: RunAgentInput) -> Result<RunAgentOutput, RunAgentError> {
        let mut transcript = input.transcript;
        let (history, last) = match transcript.split_last_user() {
            Some(split) => split,
            None => {
                let err = match transcript.last() {
                    Some(turn) => DomainError::NotUserTurn(turn.role.to_string()),
                    None => DomainError::EmptyTranscript,
                };
                return Err(err.into());
            }
        };

        check_cancelled(&self.cancellation_token)?;
        let tools = self.discovery.discover().await?;
        let definitions: Vec<ToolDefinition> = tools.tool_spec().all().cloned().collect();
        info!(
            model = self.gateway.model_name(),
            tools = definitions.len(),
            turns = transcript.len(),
            "Starting agent run"
        );

        let system_prompt = AgentPromptTemplate::system(tools.tool_spec());
        let session = self
            .gateway
            .create_session(&system_prompt, history)
            .await?;

        let mut phase = AgentPhase::AwaitingGeneration;
        let mut response = cancellable(&self.cancellation_token, async {
            session
                .send_with_tools(&last.content, &definitions)
                .await
                .map_err(RunAgentError::from)
        })
        .await?;

        let mut trace = RunTrace::new();
        let max_rounds = self.params.max_tool_rounds;

        let outcome = loop {
            let calls = response.tool_calls();
            if calls.is_empty() {
                phase = advance(phase, AgentPhase::Final);
                break AgentOutcome::Final;
            }

            phase = advance(phase, AgentPhase::DispatchingTools);
            let round = trace.rounds() + 1;
            if round > max_rounds {
                warn!(max_rounds, "Agent exceeded its tool round budget");
                phase = advance(phase, AgentPhase::Incomplete);
                break AgentOutcome::Incomplete;
            }

            let results = cancellable(&self.cancellation_token, async {
                Ok::<_, RunAgentError>(dispatch(tools.as_ref(), &calls).await)
            })
            .await?;

            let messages: Vec<ToolResultMessage> = calls
                .iter()
                .zip(&results)
                .map(|(call, result)| ToolResultMessage {
                    tool_use_id: call.id.clone(),
                    tool_name: call.tool_name.clone(),
                    output: result.payload(),
                    is_error: !result.is_success(),
                })
                .collect();

            let step = AgentStep::new(round, calls, results);
            debug!(
                round,
                calls = step.calls.len(),
                failed = step.failed_count(),
                "Tool round finished"
            );
            trace.record(step);

            phase = advance(phase, AgentPhase::AwaitingGeneration);
            response = cancellable(&self.cancellation_token, async {
                session
                    .send_tool_results(&messages)
                    .await
                    .map_err(RunAgentError::from)
            })
            .await?;
        };

        let answer = match outcome {
            AgentOutcome::Final => response.text_content(),
            AgentOutcome::Incomplete => AgentPromptTemplate::incomplete_answer(max_rounds),
        };
        transcript.push(Turn::ai(answer));

        info!(
            phase = %phase,
            rounds = trace.rounds(),
            "Agent run finished"
        );

        Ok(RunAgentOutput {
            transcript,
            outcome,
            trace,
        })
    }
}

fn advance(from: AgentPhase, to: AgentPhase) -> AgentPhase {
    debug_assert!(from.can_transition_to(to), "illegal transition {from} -> {to}");
    to
}

/// Execute all calls of one generation concurrently.
///
/// Results come back index-aligned with `calls`, each tagged with its call id.
async fn dispatch(tools: &dyn ToolExecutorPort, calls: &[ToolCall]) -> Vec<ToolResult> {
    let futures = calls.iter().map(|call| async move {
        let started = Instant::now();
        let result = tools.execute(call).await;
        let elapsed = started.elapsed().as_millis() as u64;
        debug!(
            tool = %call.tool_name,
            success = result.is_success(),
            elapsed_ms = elapsed,
            "Tool call returned"
        );
        let result = result.for_call(call.id.clone());
        if result.duration_ms.is_some() {
            result
        } else {
            result.with_duration(elapsed)
        }
    });
    futures::future::join_all(futures).await
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::ports::llm_gateway::{GatewayError, LlmSession};
    use crate::ports::tool_executor::RegistryError;
    use async_trait::async_trait;
    use kowalski_domain::session::response::{ContentBlock, StopReason};
    use kowalski_domain::{LlmResponse, Role, ToolError, ToolSpec, Transcript};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    // ==================== Test Infrastructure ====================

    /// A scripted response for the mock session
    #[derive(Debug, Clone)]
    pub(crate) enum ScriptedResponse {
        Response(LlmResponse),
        Error(String),
    }

    pub(crate) fn text(s: &str) -> ScriptedResponse {
        ScriptedResponse::Response(LlmResponse::from_text(s))
    }

    pub(crate) fn tool_use(calls: &[(&str, &str, serde_json::Value)]) -> ScriptedResponse {
        ScriptedResponse::Response(LlmResponse {
            content: calls
                .iter()
                .map(|(id, name, input)| ContentBlock::ToolUse {
                    id: id.to_string(),
                    name: name.to_string(),
                    input: input
                        .as_object()
                        .map(|o| o.clone().into_iter().collect())
                        .unwrap_or_default(),
                })
                .collect(),
            stop_reason: Some(StopReason::ToolUse),
            model: None,
        })
    }

    /// Everything the scripted session was sent
    #[derive(Debug, Default)]
    pub(crate) struct SessionLog {
        pub system_prompt: String,
        pub history: Vec<Turn>,
        pub prompts: Vec<String>,
        pub offered_tools: Vec<String>,
        pub tool_results: Vec<Vec<ToolResultMessage>>,
    }

    struct ScriptedSession {
        responses: Arc<Mutex<VecDeque<ScriptedResponse>>>,
        log: Arc<Mutex<SessionLog>>,
    }

    impl ScriptedSession {
        fn next_response(&self) -> Result<LlmResponse, GatewayError> {
            match self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| text("(no more responses)"))
            {
                ScriptedResponse::Response(r) => Ok(r),
                ScriptedResponse::Error(e) => Err(GatewayError::RequestFailed(e)),
            }
        }
    }

    #[async_trait]
    impl LlmSession for ScriptedSession {
        async fn send_with_tools(
            &self,
            content: &str,
            tools: &[ToolDefinition],
        ) -> Result<LlmResponse, GatewayError> {
            {
                let mut log = self.log.lock().unwrap();
                log.prompts.push(content.to_string());
                log.offered_tools = tools.iter().map(|t| t.name.clone()).collect();
            }
            self.next_response()
        }

        async fn send_tool_results(
            &self,
            results: &[ToolResultMessage],
        ) -> Result<LlmResponse, GatewayError> {
            self.log.lock().unwrap().tool_results.push(results.to_vec());
            self.next_response()
        }
    }

    /// Mock gateway replaying one scripted session
    pub(crate) struct ScriptedGateway {
        responses: Arc<Mutex<VecDeque<ScriptedResponse>>>,
        pub log: Arc<Mutex<SessionLog>>,
        pub sessions_created: Mutex<usize>,
    }

    impl ScriptedGateway {
        pub(crate) fn new(responses: Vec<ScriptedResponse>) -> Self {
            Self {
                responses: Arc::new(Mutex::new(responses.into())),
                log: Arc::new(Mutex::new(SessionLog::default())),
                sessions_created: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl LlmGateway for ScriptedGateway {
        fn model_name(&self) -> &str {
            "scripted"
        }

        async fn create_session(
            &self,
            system_prompt: &str,
            history: &[Turn],
        ) -> Result<Box<dyn LlmSession>, GatewayError> {
            *self.sessions_created.lock().unwrap() += 1;
            {
                let mut log = self.log.lock().unwrap();
                log.system_prompt = system_prompt.to_string();
                log.history = history.to_vec();
            }
            Ok(Box::new(ScriptedSession {
                responses: self.responses.clone(),
                log: self.log.clone(),
            }))
        }
    }

    /// Tool executor with canned behaviour per tool name
    pub(crate) struct MockTools {
        spec: ToolSpec,
        delays: Vec<(String, Duration)>,
    }

    impl MockTools {
        pub(crate) fn new(names: &[&str]) -> Self {
            let spec = names.iter().fold(ToolSpec::new(), |spec, name| {
                spec.register(ToolDefinition::new(*name, format!("{name} tool")))
            });
            Self {
                spec,
                delays: Vec::new(),
            }
        }

        fn with_delay(mut self, name: &str, delay: Duration) -> Self {
            self.delays.push((name.to_string(), delay));
            self
        }
    }

    #[async_trait]
    impl ToolExecutorPort for MockTools {
        fn tool_spec(&self) -> &ToolSpec {
            &self.spec
        }

        async fn execute(&self, call: &ToolCall) -> ToolResult {
            if let Some((_, delay)) = self.delays.iter().find(|(n, _)| *n == call.tool_name) {
                tokio::time::sleep(*delay).await;
            }
            if !self.has_tool(&call.tool_name) {
                return ToolResult::failure(
                    &call.tool_name,
                    ToolError::not_found(format!("Unknown tool: {}", call.tool_name)),
                );
            }
            ToolResult::success(
                &call.tool_name,
                serde_json::json!({"echo": call.arguments_json()}),
            )
        }
    }

    pub(crate) struct FixedDiscovery(pub Arc<dyn ToolExecutorPort>);

    #[async_trait]
    impl ToolDiscoveryPort for FixedDiscovery {
        async fn discover(&self) -> Result<Arc<dyn ToolExecutorPort>, RegistryError> {
            Ok(self.0.clone())
        }
    }

    struct CollidingDiscovery;

    #[async_trait]
    impl ToolDiscoveryPort for CollidingDiscovery {
        async fn discover(&self) -> Result<Arc<dyn ToolExecutorPort>, RegistryError> {
            Err(RegistryError::NameCollision {
                tool: "search".to_string(),
                first: "search".to_string(),
                second: "data".to_string(),
            })
        }
    }

    fn use_case(gateway: Arc<ScriptedGateway>, tools: MockTools) -> RunAgentUseCase {
        RunAgentUseCase::new(gateway, Arc::new(FixedDiscovery(Arc::new(tools))))
    }

    fn question(s: &str) -> RunAgentInput {
        RunAgentInput::new(Transcript::new(vec![
            Turn::user("hi"),
            Turn::ai("<div>Hey!</div>"),
            Turn::user(s),
        ]))
    }

    // ==================== Error Tests ====================

    #[test]
    fn test_run_agent_error_cancelled() {
        let error = RunAgentError::Cancelled;
        assert_eq!(error.to_string(), "Operation cancelled");
        assert!(error.is_cancelled());
        assert!(!RunAgentError::from(DomainError::EmptyTranscript).is_cancelled());
    }

    // ==================== Flow Tests ====================

    #[tokio::test]
    async fn test_text_only_answer() {
        let gateway = Arc::new(ScriptedGateway::new(vec![text("<div>42</div>")]));
        let output = use_case(gateway.clone(), MockTools::new(&["search"]))
            .execute(question("meaning of life?"))
            .await
            .unwrap();

        assert_eq!(output.outcome, AgentOutcome::Final);
        assert_eq!(output.transcript.len(), 4);
        assert_eq!(output.transcript.last().unwrap(), &Turn::ai("<div>42</div>"));
        assert_eq!(output.trace.rounds(), 0);

        let log = gateway.log.lock().unwrap();
        assert_eq!(log.prompts, vec!["meaning of life?".to_string()]);
        assert_eq!(log.history.len(), 2);
        assert_eq!(log.offered_tools, vec!["search".to_string()]);
        assert!(log.system_prompt.contains("`search`"));
    }

    #[tokio::test]
    async fn test_tool_round_then_answer() {
        let gateway = Arc::new(ScriptedGateway::new(vec![
            tool_use(&[
                ("c1", "get_weather", serde_json::json!({"city": "Oslo"})),
                ("c2", "get_links", serde_json::json!({"query": "oslo news"})),
            ]),
            text("<div>Sunny</div>"),
        ]));
        let tools = MockTools::new(&["get_weather", "get_links"])
            // The first call finishes last; results must still keep call order
            .with_delay("get_weather", Duration::from_millis(50));

        let output = use_case(gateway.clone(), tools)
            .execute(question("weather in Oslo?"))
            .await
            .unwrap();

        assert_eq!(output.outcome, AgentOutcome::Final);
        assert_eq!(output.transcript.last().unwrap().content, "<div>Sunny</div>");
        // Tool turns stay out of the returned transcript
        assert!(
            output
                .transcript
                .messages
                .iter()
                .all(|t| t.role != Role::Tool)
        );
        assert_eq!(output.trace.rounds(), 1);
        assert_eq!(output.trace.steps[0].results[0].call_id, "c1");
        assert_eq!(output.trace.steps[0].results[1].call_id, "c2");

        let log = gateway.log.lock().unwrap();
        let sent = &log.tool_results[0];
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].tool_use_id, "c1");
        assert_eq!(sent[0].output["echo"]["city"], "Oslo");
        assert_eq!(sent[1].tool_use_id, "c2");
        assert!(!sent[1].is_error);
    }

    #[tokio::test]
    async fn test_failed_tool_is_reported_to_model() {
        let gateway = Arc::new(ScriptedGateway::new(vec![
            tool_use(&[("c1", "nope", serde_json::json!({}))]),
            text("<div>Sorry</div>"),
        ]));

        let output = use_case(gateway.clone(), MockTools::new(&["search"]))
            .execute(question("do it"))
            .await
            .unwrap();

        assert_eq!(output.outcome, AgentOutcome::Final);
        let log = gateway.log.lock().unwrap();
        let sent = &log.tool_results[0][0];
        assert!(sent.is_error);
        assert_eq!(sent.output["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_round_budget_exhausted() {
        let endless: Vec<_> = (0..10)
            .map(|i| tool_use(&[(&*format!("c{i}"), "search", serde_json::json!({}))]))
            .collect();
        let gateway = Arc::new(ScriptedGateway::new(endless));

        let output = use_case(gateway.clone(), MockTools::new(&["search"]))
            .with_params(ExecutionParams::default().with_max_tool_rounds(2))
            .execute(question("loop forever"))
            .await
            .unwrap();

        assert_eq!(output.outcome, AgentOutcome::Incomplete);
        assert_eq!(output.trace.rounds(), 2);
        assert_eq!(output.transcript.len(), 4);
        let last = output.transcript.last().unwrap();
        assert_eq!(last.role, Role::Ai);
        assert!(last.content.contains("could not complete"));
        assert_eq!(gateway.log.lock().unwrap().tool_results.len(), 2);
    }

    #[tokio::test]
    async fn test_multi_part_answer_is_flattened() {
        let gateway = Arc::new(ScriptedGateway::new(vec![ScriptedResponse::Response(
            LlmResponse {
                content: vec![
                    ContentBlock::Text("<div>a</div>".to_string()),
                    ContentBlock::Text("<div>b</div>".to_string()),
                ],
                stop_reason: Some(StopReason::EndTurn),
                model: None,
            },
        )]));

        let output = use_case(gateway, MockTools::new(&[]))
            .execute(question("two parts"))
            .await
            .unwrap();
        assert_eq!(
            output.transcript.last().unwrap().content,
            "<div>a</div>\n<div>b</div>"
        );
    }

    #[tokio::test]
    async fn test_rejects_transcript_not_ending_in_user() {
        let gateway = Arc::new(ScriptedGateway::new(vec![]));
        let uc = use_case(gateway.clone(), MockTools::new(&[]));

        let err = uc
            .execute(RunAgentInput::new(Transcript::new(vec![Turn::ai("x")])))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RunAgentError::InvalidTranscript(DomainError::NotUserTurn(_))
        ));

        let err = uc
            .execute(RunAgentInput::new(Transcript::default()))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RunAgentError::InvalidTranscript(DomainError::EmptyTranscript)
        ));
        assert_eq!(*gateway.sessions_created.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_discovery_collision_aborts_run() {
        let gateway = Arc::new(ScriptedGateway::new(vec![text("unused")]));
        let uc = RunAgentUseCase::new(gateway.clone(), Arc::new(CollidingDiscovery));

        let err = uc.execute(question("anything")).await.unwrap_err();
        assert!(matches!(err, RunAgentError::Discovery(_)));
        assert_eq!(*gateway.sessions_created.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_gateway_error_propagates() {
        let gateway = Arc::new(ScriptedGateway::new(vec![ScriptedResponse::Error(
            "quota".to_string(),
        )]));
        let err = use_case(gateway, MockTools::new(&[]))
            .execute(question("hello"))
            .await
            .unwrap_err();
        assert!(matches!(err, RunAgentError::GatewayError(_)));
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let gateway = Arc::new(ScriptedGateway::new(vec![text("unused")]));
        let token = CancellationToken::new();
        token.cancel();

        let err = use_case(gateway, MockTools::new(&[]))
            .with_cancellation(token)
            .execute(question("hello"))
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
    }
}
