//! Gateway routes: account endpoints and `/chat`.
//!
//! Account endpoints always answer with an [`Envelope`]. Caller mistakes
//! (taken username, wrong password, unknown session) come back as `200`
//! with `status: "error"`; backend faults are logged and answered with a
//! generic message and a `5xx` status.

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use kowalski_application::{AccountService, AuthError, ChatUseCase};
use kowalski_domain::{Envelope, Transcript};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

const LOGGED_OUT: &str = "Logged-Out of all devices";

/// Shared state of the gateway routes
#[derive(Clone)]
pub struct GatewayState {
    accounts: AccountService,
    chat: ChatUseCase,
    require_auth: bool,
}

impl GatewayState {
    pub fn new(accounts: AccountService, chat: ChatUseCase) -> Self {
        Self {
            accounts,
            chat,
            require_auth: false,
        }
    }

    /// Require a valid session token on `/chat`
    pub fn with_require_auth(mut self, require_auth: bool) -> Self {
        self.require_auth = require_auth;
        self
    }
}

#[derive(Debug, Deserialize)]
struct Credentials {
    username: String,
    password: String,
}

pub fn gateway_router(state: GatewayState) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/chat", post(chat))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Session token from `Authorization`, with an optional `Bearer ` prefix.
fn bearer_token(headers: &HeaderMap) -> &str {
    let raw = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .trim();
    raw.strip_prefix("Bearer ").unwrap_or(raw).trim()
}

fn envelope(status: StatusCode, envelope: Envelope) -> Response {
    (status, Json(envelope)).into_response()
}

fn success<T: Serialize>(content: &T, fallback: &str) -> Response {
    match serde_json::to_value(content) {
        Ok(value) => envelope(StatusCode::OK, Envelope::success(value)),
        Err(e) => {
            error!(error = %e, "Failed to serialize response");
            envelope(StatusCode::INTERNAL_SERVER_ERROR, Envelope::error(fallback))
        }
    }
}

fn auth_failure(err: AuthError, fallback: &str) -> Response {
    if err.is_client_error() {
        envelope(StatusCode::OK, Envelope::error(err.to_string()))
    } else {
        error!(error = %err, "Account operation failed");
        envelope(StatusCode::INTERNAL_SERVER_ERROR, Envelope::error(fallback))
    }
}

async fn register(State(state): State<GatewayState>, Json(body): Json<Credentials>) -> Response {
    const FALLBACK: &str = "An unexpected error occurred during registration";
    match state.accounts.register(&body.username, &body.password).await {
        Ok(user) => success(&user, FALLBACK),
        Err(e) => {
            warn!(username = %body.username, error = %e, "Registration failed");
            auth_failure(e, FALLBACK)
        }
    }
}

async fn login(State(state): State<GatewayState>, Json(body): Json<Credentials>) -> Response {
    const FALLBACK: &str = "An unexpected error occurred during login";
    match state.accounts.login(&body.username, &body.password).await {
        Ok(outcome) => success(&outcome, FALLBACK),
        Err(e) => {
            warn!(username = %body.username, error = %e, "Login failed");
            auth_failure(e, FALLBACK)
        }
    }
}

async fn logout(State(state): State<GatewayState>, headers: HeaderMap) -> Response {
    match state.accounts.logout(bearer_token(&headers)).await {
        Ok(removed) => {
            info!(sessions = removed, "Logged out");
            envelope(StatusCode::OK, Envelope::success(LOGGED_OUT))
        }
        Err(e) => auth_failure(e, "An unexpected error occurred during logout"),
    }
}

async fn chat(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    Json(transcript): Json<Transcript>,
) -> Response {
    if state.require_auth
        && let Err(e) = state.accounts.authenticate(bearer_token(&headers)).await
    {
        return if e.is_client_error() {
            envelope(StatusCode::UNAUTHORIZED, Envelope::error(e.to_string()))
        } else {
            auth_failure(e, "An unexpected error occurred during chat")
        };
    }

    match state.chat.execute(transcript).await {
        Ok(output) => {
            if let Some(outcome) = output.outcome {
                info!(?outcome, turns = output.transcript.len(), "Chat answered");
            }
            Json(output.transcript).into_response()
        }
        Err(e) => {
            error!(error = %e, "Chat failed");
            envelope(
                StatusCode::BAD_GATEWAY,
                Envelope::error("An unexpected error occurred during chat"),
            )
        }
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, header::CONTENT_TYPE};
    use kowalski_application::{
        GatewayError, LlmGateway, LlmSession, RunAgentUseCase, SessionStore, ToolResultMessage,
    };
    use kowalski_domain::{LlmResponse, ToolDefinition, Turn};
    use kowalski_infrastructure::{
        DocumentSessionRepository, DocumentUserRepository, MemoryDocumentStore,
        ProviderSetDiscovery, Sha256PasswordHasher,
    };
    use serde_json::Value;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    #[derive(Default)]
    struct EchoGateway {
        sessions: AtomicUsize,
    }

    struct EchoSession;

    #[async_trait]
    impl LlmGateway for EchoGateway {
        fn model_name(&self) -> &str {
            "echo"
        }

        async fn create_session(
            &self,
            _system_prompt: &str,
            _history: &[Turn],
        ) -> Result<Box<dyn LlmSession>, GatewayError> {
            self.sessions.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(EchoSession))
        }
    }

    #[async_trait]
    impl LlmSession for EchoSession {
        async fn send_with_tools(
            &self,
            content: &str,
            _tools: &[ToolDefinition],
        ) -> Result<LlmResponse, GatewayError> {
            Ok(LlmResponse::from_text(format!("You said: {content}")))
        }

        async fn send_tool_results(
            &self,
            _results: &[ToolResultMessage],
        ) -> Result<LlmResponse, GatewayError> {
            Ok(LlmResponse::from_text("done"))
        }
    }

    async fn app(require_auth: bool) -> (Router, Arc<EchoGateway>) {
        let store = Arc::new(MemoryDocumentStore::new());
        let users = Arc::new(DocumentUserRepository::new(store.clone(), "auth-test"));
        let session_rows = Arc::new(DocumentSessionRepository::new(store, "auth-test"));
        let sessions = Arc::new(SessionStore::init(session_rows).await);
        let accounts = AccountService::new(users, Arc::new(Sha256PasswordHasher::new()), sessions);

        let llm = Arc::new(EchoGateway::default());
        let agent = RunAgentUseCase::new(llm.clone(), Arc::new(ProviderSetDiscovery::new(vec![])));
        let state = GatewayState::new(accounts, ChatUseCase::new(agent)).with_require_auth(require_auth);
        (gateway_router(state), llm)
    }

    async fn post_json(
        app: &Router,
        uri: &str,
        token: Option<&str>,
        body: Value,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            request = request.header(AUTHORIZATION, token);
        }
        let response = app
            .clone()
            .oneshot(request.body(Body::from(body.to_string())).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn creds(username: &str, password: &str) -> Value {
        json!({ "username": username, "password": password })
    }

    #[tokio::test]
    async fn test_register_twice() {
        let (app, _) = app(false).await;

        let (status, first) = post_json(&app, "/register", None, creds("ana", "pw")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["status"], "success");
        assert_eq!(first["content"]["username"], "ana");
        assert!(first["content"]["_id"].is_string());
        assert!(first["content"].get("password").is_none());

        let (_, second) = post_json(&app, "/register", None, creds("ana", "other")).await;
        assert_eq!(second, json!({"status": "error", "content": "username already exists"}));
    }

    #[tokio::test]
    async fn test_login_errors() {
        let (app, _) = app(false).await;
        post_json(&app, "/register", None, creds("ana", "pw")).await;

        let (_, unknown) = post_json(&app, "/login", None, creds("bob", "pw")).await;
        assert_eq!(unknown["content"], "Username doesn't exist");

        let (_, wrong) = post_json(&app, "/login", None, creds("ana", "nope")).await;
        assert_eq!(wrong["content"], "Password doesn't match");
    }

    #[tokio::test]
    async fn test_logout_invalidates_every_device() {
        let (app, _) = app(false).await;
        post_json(&app, "/register", None, creds("ana", "pw")).await;

        let (_, first) = post_json(&app, "/login", None, creds("ana", "pw")).await;
        let (_, second) = post_json(&app, "/login", None, creds("ana", "pw")).await;
        assert_eq!(first["content"]["user"]["username"], "ana");
        let first_id = first["content"]["session_id"].as_str().unwrap().to_string();
        let second_id = second["content"]["session_id"].as_str().unwrap().to_string();
        assert_ne!(first_id, second_id);

        let bearer = format!("Bearer {first_id}");
        let (_, out) = post_json(&app, "/logout", Some(&bearer), json!({})).await;
        assert_eq!(out, json!({"status": "success", "content": LOGGED_OUT}));

        let (_, again) = post_json(&app, "/logout", Some(&second_id), json!({})).await;
        assert_eq!(again, json!({"status": "error", "content": "Invalid session"}));

        let (_, missing) = post_json(&app, "/logout", None, json!({})).await;
        assert_eq!(missing["content"], "Invalid session");
    }

    #[tokio::test]
    async fn test_chat_echoes_non_user_transcript() {
        let (app, llm) = app(false).await;
        let body = json!({"messages": [
            {"role": "user", "content": "hi"},
            {"role": "ai", "content": "hello"}
        ]});

        let (status, reply) = post_json(&app, "/chat", None, body.clone()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(reply, body);

        let foreign = json!({"messages": [
            {"role": "system", "content": "be brief"},
            {"role": "human", "content": "hi"},
            {"role": "assistant", "content": "hello"}
        ]});
        let (status, reply) = post_json(&app, "/chat", None, foreign.clone()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(reply, foreign);

        let (_, empty) = post_json(&app, "/chat", None, json!({"messages": []})).await;
        assert_eq!(empty, json!({"messages": []}));
        assert_eq!(llm.sessions.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_chat_appends_ai_turn() {
        let (app, llm) = app(false).await;
        let body = json!({"messages": [{"role": "human", "content": "ping"}]});

        let (status, reply) = post_json(&app, "/chat", None, body).await;
        assert_eq!(status, StatusCode::OK);
        let messages = reply["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "human");
        assert_eq!(messages[1], json!({"role": "ai", "content": "You said: ping"}));
        assert_eq!(llm.sessions.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_chat_requires_session_when_enabled() {
        let (app, llm) = app(true).await;
        let body = json!({"messages": [{"role": "user", "content": "ping"}]});

        let (status, reply) = post_json(&app, "/chat", None, body.clone()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(reply["content"], "Invalid session");
        assert_eq!(llm.sessions.load(Ordering::SeqCst), 0);

        post_json(&app, "/register", None, creds("ana", "pw")).await;
        let (_, login) = post_json(&app, "/login", None, creds("ana", "pw")).await;
        let token = login["content"]["session_id"].as_str().unwrap().to_string();
        let (status, _) = post_json(&app, "/chat", Some(&token), body).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = app(false).await;
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_bearer_prefix_is_optional() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), "");
        headers.insert(AUTHORIZATION, "Bearer abc".parse().unwrap());
        assert_eq!(bearer_token(&headers), "abc");
        headers.insert(AUTHORIZATION, "abc".parse().unwrap());
        assert_eq!(bearer_token(&headers), "abc");
    }
}
