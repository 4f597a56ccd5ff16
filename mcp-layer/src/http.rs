use axum::Json;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::{
    IntoResponse, Response,
    sse::{Event, KeepAlive, Sse},
};
use futures::stream;
use serde_json::json;
use std::time::Duration;

use crate::dispatch::McpServer;
use crate::layer::McpLayerConfig;
use crate::security::{has_valid_protocol_version_with, is_authorized, is_origin_allowed};
use crate::tool::ReqMeta;

/// Largest JSON-RPC message accepted on the endpoint.
pub const MAX_BODY_BYTES: usize = 1 << 20;

fn reject(status: StatusCode, msg: &'static str) -> Response {
    tracing::debug!(%status, msg, "mcp request rejected");
    (status, msg).into_response()
}

fn check(headers: &axum::http::HeaderMap, config: &McpLayerConfig) -> Result<(), Response> {
    if config.require_version && !has_valid_protocol_version_with(headers, &config.version_policy) {
        return Err(reject(StatusCode::BAD_REQUEST, "missing/invalid MCP-Protocol-Version"));
    }
    if !is_origin_allowed(headers, &config.allowed_origins) {
        return Err(reject(StatusCode::FORBIDDEN, "forbidden origin"));
    }
    if !is_authorized(headers, &config.auth) {
        return Err(reject(StatusCode::UNAUTHORIZED, "unauthorized"));
    }
    Ok(())
}

/// Streamable-HTTP POST: one JSON-RPC message in, one JSON response out.
pub async fn handle_post(req: Request<Body>, server: &McpServer, config: &McpLayerConfig) -> Response {
    if let Err(resp) = check(req.headers(), config) {
        return resp;
    }

    let origin = req
        .headers()
        .get(axum::http::header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = match axum::body::to_bytes(req.into_body(), MAX_BODY_BYTES).await {
        Ok(b) => b,
        Err(_) => return reject(StatusCode::BAD_REQUEST, "invalid body"),
    };

    let meta = ReqMeta { transport: "streamable-http", origin };
    match server.handle_bytes(&bytes, meta).await {
        Some(resp) => Json(resp).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

/// 405 for any method the endpoint does not serve. GET is listed only when
/// the SSE stream is enabled.
pub fn method_not_allowed(config: &McpLayerConfig) -> Response {
    let allow = if config.enable_sse { "GET, POST" } else { "POST" };
    tracing::debug!(allow, "mcp request rejected: method not allowed");
    (StatusCode::METHOD_NOT_ALLOWED, [(axum::http::header::ALLOW, allow)]).into_response()
}

/// One-shot SSE stream announcing readiness and what the server exposes.
pub async fn handle_sse_get(req: Request<Body>, server: &McpServer, config: &McpLayerConfig) -> Response {
    if let Err(resp) = check(req.headers(), config) {
        return resp;
    }
    let tool_count = server.registry().list().await.len();
    let resource_count = server.registry().resources().await.len();
    let ready = json!({
        "event": "ready",
        "server": server.info().name,
        "tool_count": tool_count,
        "resource_count": resource_count,
    });
    let event = Event::default().event("ready").data(ready.to_string());
    let stream = stream::once(async move { Ok::<_, std::convert::Infallible>(event) });
    Sse::new(stream)
        .keep_alive(KeepAlive::new().interval(Duration::from_secs(15)).text("ping"))
        .into_response()
}
