//! Gemini `generateContent` adapter with native function calling.
//!
//! The session keeps the whole conversation (`contents`) and replays it on
//! every request. Model turns are stored exactly as returned so opaque
//! fields such as thought signatures survive the round trip.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use kowalski_application::{GatewayError, LlmGateway, LlmSession, ToolResultMessage};
use kowalski_domain::{ContentBlock, LlmResponse, Role, StopReason, ToolDefinition, Turn};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::config::FileAgentConfig;

pub struct GeminiGateway {
    client: reqwest::Client,
    api_base: String,
    model: String,
    api_key: String,
}

impl GeminiGateway {
    pub fn new(
        api_base: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let api_key = api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| GatewayError::MissingCredentials("GOOGLE_API_KEY is not set".into()))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::ConnectionError(e.to_string()))?;
        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key,
        })
    }

    pub fn from_config(config: &FileAgentConfig) -> Result<Self, GatewayError> {
        Self::new(
            &config.api_base,
            &config.model,
            config.api_key.clone(),
            Duration::from_secs(config.llm_timeout_secs),
        )
    }
}

fn history_content(turn: &Turn) -> Option<Value> {
    if turn.content.trim().is_empty() {
        return None;
    }
    let (role, text) = match &turn.role {
        Role::User | Role::Human => ("user", turn.content.clone()),
        Role::Ai => ("model", turn.content.clone()),
        Role::Tool => ("user", format!("Tool output:\n{}", turn.content)),
        Role::Other(name) => ("user", format!("{}: {}", name, turn.content)),
    };
    Some(json!({ "role": role, "parts": [{ "text": text }] }))
}

#[async_trait]
impl LlmGateway for GeminiGateway {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn create_session(
        &self,
        system_prompt: &str,
        history: &[Turn],
    ) -> Result<Box<dyn LlmSession>, GatewayError> {
        let contents = history.iter().filter_map(history_content).collect();
        Ok(Box::new(GeminiSession {
            client: self.client.clone(),
            url: format!("{}/models/{}:generateContent", self.api_base, self.model),
            api_key: self.api_key.clone(),
            model: self.model.clone(),
            system_instruction: json!({ "parts": [{ "text": system_prompt }] }),
            state: Mutex::new(SessionState {
                contents,
                declarations: Vec::new(),
                native_ids: HashSet::new(),
                generated_ids: 0,
            }),
        }))
    }
}

struct SessionState {
    contents: Vec<Value>,
    declarations: Vec<Value>,
    /// Call ids that came from the API and must be echoed back
    native_ids: HashSet<String>,
    generated_ids: u64,
}

pub struct GeminiSession {
    client: reqwest::Client,
    url: String,
    api_key: String,
    model: String,
    system_instruction: Value,
    state: Mutex<SessionState>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<Value>,
    model_version: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Value>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

fn declaration(tool: &ToolDefinition) -> Value {
    let has_params = tool
        .input_schema
        .get("properties")
        .and_then(Value::as_object)
        .is_some_and(|p| !p.is_empty());
    if has_params {
        json!({
            "name": tool.name,
            "description": tool.description,
            "parametersJsonSchema": tool.input_schema,
        })
    } else {
        json!({ "name": tool.name, "description": tool.description })
    }
}

fn map_transport_error(e: reqwest::Error) -> GatewayError {
    let e = e.without_url();
    if e.is_timeout() {
        GatewayError::Timeout
    } else if e.is_connect() {
        GatewayError::ConnectionError(e.to_string())
    } else {
        GatewayError::RequestFailed(e.to_string())
    }
}

fn map_http_error(status: reqwest::StatusCode, body: &str) -> GatewayError {
    let detail = serde_json::from_str::<ErrorWrapper>(body)
        .ok()
        .map(|w| {
            format!(
                "{} ({})",
                w.error.message.unwrap_or_default(),
                w.error.status.unwrap_or_default()
            )
        })
        .unwrap_or_else(|| body.chars().take(200).collect());
    match status.as_u16() {
        401 | 403 => GatewayError::MissingCredentials(detail),
        _ => GatewayError::RequestFailed(format!("HTTP {}: {}", status.as_u16(), detail)),
    }
}

impl GeminiSession {
    async fn generate(&self, state: &mut SessionState) -> Result<LlmResponse, GatewayError> {
        let mut body = json!({
            "systemInstruction": self.system_instruction,
            "contents": state.contents,
        });
        if !state.declarations.is_empty() {
            body["tools"] = json!([{ "functionDeclarations": state.declarations }]);
        }

        debug!(model = %self.model, turns = state.contents.len(), "Requesting generation");
        let response = self
            .client
            .post(&self.url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let text = response.text().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_http_error(status, &text));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&text)
            .map_err(|e| GatewayError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        let Some(candidate) = parsed.candidates.into_iter().next() else {
            let reason = parsed
                .prompt_feedback
                .and_then(|f| f.get("blockReason").cloned())
                .map(|r| r.to_string())
                .unwrap_or_else(|| "no candidates".to_string());
            return Err(GatewayError::InvalidResponse(format!("Empty response: {}", reason)));
        };

        let content = candidate
            .content
            .filter(|c| c.get("parts").and_then(Value::as_array).is_some_and(|p| !p.is_empty()))
            .ok_or_else(|| {
                GatewayError::InvalidResponse(format!(
                    "Candidate without content (finishReason: {})",
                    candidate.finish_reason.as_deref().unwrap_or("unknown")
                ))
            })?;

        let blocks = self.blocks(&content, state);
        state.contents.push(content);

        let has_calls = blocks
            .iter()
            .any(|b| matches!(b, ContentBlock::ToolUse { .. }));
        let stop_reason = if has_calls {
            StopReason::ToolUse
        } else {
            match candidate.finish_reason.as_deref() {
                None | Some("STOP") => StopReason::EndTurn,
                Some("MAX_TOKENS") => StopReason::MaxTokens,
                Some(other) => StopReason::Other(other.to_string()),
            }
        };

        Ok(LlmResponse {
            content: blocks,
            stop_reason: Some(stop_reason),
            model: parsed.model_version.or_else(|| Some(self.model.clone())),
        })
    }

    fn blocks(&self, content: &Value, state: &mut SessionState) -> Vec<ContentBlock> {
        let parts = content
            .get("parts")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        let mut blocks = Vec::new();
        for part in parts {
            if part.get("thought").and_then(Value::as_bool) == Some(true) {
                continue;
            }
            if let Some(call) = part.get("functionCall") {
                let Some(name) = call.get("name").and_then(Value::as_str) else {
                    warn!("Skipping function call without a name");
                    continue;
                };
                let id = match call.get("id").and_then(Value::as_str) {
                    Some(id) => {
                        state.native_ids.insert(id.to_string());
                        id.to_string()
                    }
                    None => {
                        state.generated_ids += 1;
                        format!("{}-{}", name, state.generated_ids)
                    }
                };
                let input = call
                    .get("args")
                    .and_then(Value::as_object)
                    .map(|args| args.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
                    .unwrap_or_default();
                blocks.push(ContentBlock::ToolUse {
                    id,
                    name: name.to_string(),
                    input,
                });
            } else if let Some(text) = part.get("text").and_then(Value::as_str) {
                blocks.push(ContentBlock::Text(text.to_string()));
            }
        }
        blocks
    }
}

#[async_trait]
impl LlmSession for GeminiSession {
    async fn send_with_tools(
        &self,
        content: &str,
        tools: &[ToolDefinition],
    ) -> Result<LlmResponse, GatewayError> {
        let mut state = self.state.lock().await;
        state.declarations = tools.iter().map(declaration).collect();
        state
            .contents
            .push(json!({ "role": "user", "parts": [{ "text": content }] }));
        self.generate(&mut state).await
    }

    async fn send_tool_results(
        &self,
        results: &[ToolResultMessage],
    ) -> Result<LlmResponse, GatewayError> {
        let mut state = self.state.lock().await;
        let parts: Vec<Value> = results
            .iter()
            .map(|result| {
                // The response field must be an object.
                let response = match (&result.output, result.is_error) {
                    (output, true) => json!({ "error": output }),
                    (Value::Object(_), false) => result.output.clone(),
                    (output, false) => json!({ "result": output }),
                };
                let mut function_response = json!({
                    "name": result.tool_name,
                    "response": response,
                });
                if state.native_ids.contains(&result.tool_use_id) {
                    function_response["id"] = json!(result.tool_use_id);
                }
                json!({ "functionResponse": function_response })
            })
            .collect();
        state.contents.push(json!({ "role": "user", "parts": parts }));
        self.generate(&mut state).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
    use std::sync::Arc;

    type Requests = Arc<std::sync::Mutex<Vec<Value>>>;

    async fn mock_generate(
        State(requests): State<Requests>,
        Json(body): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        let count = {
            let mut seen = requests.lock().unwrap();
            seen.push(body);
            seen.len()
        };
        let reply = if count == 1 {
            json!({"candidates": [{"content": {"role": "model", "parts": [
                {"text": "Checking."},
                {"functionCall": {"name": "get_weather", "args": {"city": "Paris"}}, "thoughtSignature": "sig"}
            ]}, "finishReason": "STOP"}]})
        } else {
            json!({"candidates": [{"content": {"role": "model", "parts": [
                {"text": "<div>Sunny</div>"}
            ]}, "finishReason": "STOP"}], "modelVersion": "gemini-test-001"})
        };
        (StatusCode::OK, Json(reply))
    }

    async fn spawn_mock() -> (String, Requests) {
        let requests: Requests = Arc::default();
        let app = Router::new()
            .route("/models/{action}", post(mock_generate))
            .with_state(requests.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}", addr), requests)
    }

    fn gateway(base: &str) -> GeminiGateway {
        GeminiGateway::new(base, "gemini-test", Some("k".into()), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_function_call_round_trip() {
        let (base, requests) = spawn_mock().await;
        let session = gateway(&base)
            .create_session("You are Kowalski.", &[Turn::user("hi"), Turn::ai("hello")])
            .await
            .unwrap();

        let tools = [ToolDefinition::new("get_weather", "Weather").with_parameter(
            kowalski_domain::ToolParameter::new("city", "City", true),
        )];
        let first = session
            .send_with_tools("Weather in Paris?", &tools)
            .await
            .unwrap();
        assert_eq!(first.stop_reason, Some(StopReason::ToolUse));
        let calls = first.tool_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].get_string("city"), Some("Paris"));

        let second = session
            .send_tool_results(&[ToolResultMessage {
                tool_use_id: calls[0].id.clone(),
                tool_name: "get_weather".into(),
                output: json!({"temperature": 21}),
                is_error: false,
            }])
            .await
            .unwrap();
        assert_eq!(second.text_content(), "<div>Sunny</div>");
        assert_eq!(second.model.as_deref(), Some("gemini-test-001"));

        let seen = requests.lock().unwrap();
        assert_eq!(seen.len(), 2);
        let first_body = &seen[0];
        assert_eq!(first_body["systemInstruction"]["parts"][0]["text"], "You are Kowalski.");
        assert_eq!(first_body["contents"][0]["role"], "user");
        assert_eq!(first_body["contents"][1]["role"], "model");
        assert_eq!(
            first_body["tools"][0]["functionDeclarations"][0]["name"],
            "get_weather"
        );

        let replay = seen[1]["contents"].as_array().unwrap();
        assert_eq!(replay.len(), 5);
        assert_eq!(replay[3]["parts"][1]["thoughtSignature"], "sig");
        let response = &replay[4]["parts"][0]["functionResponse"];
        assert_eq!(response["name"], "get_weather");
        assert_eq!(response["response"]["temperature"], 21);
        assert!(response.get("id").is_none());
    }

    #[tokio::test]
    async fn test_http_error_mapped() {
        let app = Router::new().route(
            "/models/{action}",
            post(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"error": {"code": 400, "message": "bad schema", "status": "INVALID_ARGUMENT"}})),
                )
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let session = gateway(&format!("http://{}", addr))
            .create_session("sys", &[])
            .await
            .unwrap();
        let err = session.send_with_tools("hi", &[]).await.unwrap_err();
        match err {
            GatewayError::RequestFailed(message) => assert!(message.contains("bad schema")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_key() {
        let result = GeminiGateway::new("http://x", "m", None, Duration::from_secs(1));
        assert!(matches!(result, Err(GatewayError::MissingCredentials(_))));
    }

    #[test]
    fn test_parameterless_tool_has_no_schema() {
        let decl = declaration(&ToolDefinition::new("list_scripts", "List"));
        assert!(decl.get("parametersJsonSchema").is_none());
    }
}
