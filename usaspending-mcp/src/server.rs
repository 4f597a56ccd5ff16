//! Wiring: registry, MCP server, REST routes and the HTTP serve loop.

use std::sync::Arc;

use axum::extract::Request;
use axum::routing::post;
use axum::Router;
use mcp_layer::layer::McpService;
use mcp_layer::{McpLayer, McpLayerConfig, McpServer, ToolRegistry};
use tokio::net::TcpListener;
use tower::Layer;

use crate::resource::openapi_resource;
use crate::tools::{
    recipient_autocomplete, recipient_children, recipient_list, spending_by_award, AppState,
};

pub const SERVER_NAME: &str = "USAspending Tools";

/// Every `#[mcp_tool]` in this crate, bound to `state`.
pub fn tool_registry(state: AppState) -> Arc<ToolRegistry> {
    ToolRegistry::gather_with_state(Arc::new(state))
}

pub async fn build_server(state: AppState, openapi_yaml: &str) -> McpServer {
    let registry = tool_registry(state);
    registry.insert_resource(openapi_resource(openapi_yaml)).await;
    McpServer::new(registry, SERVER_NAME, env!("CARGO_PKG_VERSION"))
}

/// Plain JSON routes, `POST /tools/<name>`, for callers that don't speak MCP.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/tools/recipient_autocomplete", post(recipient_autocomplete))
        .route("/tools/recipient_children", post(recipient_children))
        .route("/tools/recipient_list", post(recipient_list))
        .route("/tools/spending_by_award", post(spending_by_award))
        .with_state(state)
}

/// The REST router with the MCP endpoint in front of it.
pub fn app(server: McpServer, config: McpLayerConfig, state: AppState) -> McpService<Router> {
    McpLayer::new(server, config).layer(router(state))
}

pub async fn serve_http(
    listener: TcpListener,
    server: McpServer,
    config: McpLayerConfig,
    state: AppState,
) -> std::io::Result<()> {
    let service = app(server, config, state);
    axum::serve(listener, axum::ServiceExt::<Request>::into_make_service(service))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(%err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(%err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
