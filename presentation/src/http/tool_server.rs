//! Generic JSON-RPC tool server.
//!
//! Exposes any [`ToolProvider`] at `POST /mcp`. Tool failures are returned
//! as successful responses with `isError: true`; JSON-RPC error objects are
//! used only for malformed requests, unknown methods and unknown tools.

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    routing::{get, post},
};
use kowalski_domain::ToolProvider;
use kowalski_domain::ToolCall;
use kowalski_domain::protocol::{
    CallToolParams, CallToolResult, INTERNAL_ERROR, INVALID_REQUEST, JsonRpcRequest,
    JsonRpcResponse, ListToolsResult, METHOD_CALL_TOOL, METHOD_LIST_TOOLS, PARSE_ERROR, RpcError,
};
use serde::Serialize;
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

pub const RPC_PATH: &str = "/mcp";

pub fn tool_server_router(provider: Arc<dyn ToolProvider>) -> Router {
    Router::new()
        .route(RPC_PATH, post(handle_rpc))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(provider)
}

async fn health(State(provider): State<Arc<dyn ToolProvider>>) -> Json<Value> {
    Json(json!({ "status": "ok", "provider": provider.id() }))
}

async fn handle_rpc(
    State(provider): State<Arc<dyn ToolProvider>>,
    body: Bytes,
) -> Json<JsonRpcResponse> {
    let request: JsonRpcRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            return Json(JsonRpcResponse::failure(
                Value::Null,
                RpcError::new(PARSE_ERROR, format!("Parse error: {}", e)),
            ));
        }
    };

    let id = request.id.clone();
    let outcome = if request.jsonrpc != "2.0" {
        Err(RpcError::new(INVALID_REQUEST, "jsonrpc must be \"2.0\""))
    } else {
        dispatch(provider.as_ref(), request).await
    };

    Json(match outcome {
        Ok(result) => JsonRpcResponse::success(id, result),
        Err(error) => {
            debug!(code = error.code, message = %error.message, "RPC request rejected");
            JsonRpcResponse::failure(id, error)
        }
    })
}

fn encode<T: Serialize>(value: &T) -> Result<Value, RpcError> {
    serde_json::to_value(value).map_err(|e| RpcError::new(INTERNAL_ERROR, e.to_string()))
}

async fn dispatch(provider: &dyn ToolProvider, request: JsonRpcRequest) -> Result<Value, RpcError> {
    match request.method.as_str() {
        METHOD_LIST_TOOLS => {
            let tools = provider.discover_tools().await.map_err(|e| {
                warn!(provider = provider.id(), error = %e, "Tool listing failed");
                RpcError::new(INTERNAL_ERROR, e.to_string())
            })?;
            encode(&ListToolsResult { tools })
        }
        METHOD_CALL_TOOL => {
            let params: CallToolParams = request
                .params
                .ok_or_else(|| RpcError::invalid_params("Missing params"))
                .and_then(|p| {
                    serde_json::from_value(p)
                        .map_err(|e| RpcError::invalid_params(format!("Invalid params: {}", e)))
                })?;

            if !provider.has_tool(&params.name).await {
                return Err(RpcError::invalid_params(format!(
                    "Unknown tool: {}",
                    params.name
                )));
            }

            let mut call = ToolCall::new(&params.name);
            call.arguments = params.arguments.into_iter().collect();
            let result = provider.execute(&call).await;
            debug!(
                provider = provider.id(),
                tool = %params.name,
                success = result.is_success(),
                "Tool call served"
            );
            encode(&CallToolResult {
                content: result.payload(),
                is_error: !result.is_success(),
            })
        }
        other => Err(RpcError::method_not_found(other)),
    }
}
