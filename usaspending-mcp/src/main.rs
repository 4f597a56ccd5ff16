use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;

use usaspending_mcp::config::{Cli, GatewayConfig, Transport};
use usaspending_mcp::gateway::{GatewayGuard, HttpGateway};
use usaspending_mcp::logging::init_tracing;
use usaspending_mcp::server::{build_server, serve_http};
use usaspending_mcp::tools::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log.tracing_config());

    let gateway_config = GatewayConfig::from_args(&cli.upstream)?;
    let gateway = Arc::new(HttpGateway::new(&gateway_config).context("failed to build HTTP client")?);
    let _guard = GatewayGuard::new(gateway.clone());

    let state = AppState::new(gateway);
    let server = build_server(state.clone(), &cli.upstream.openapi_yaml).await;
    tracing::info!(
        base_url = %state.gateway.base_url(),
        tools = server.registry().list().await.len(),
        transport = ?cli.serve.transport,
        "server ready"
    );

    match cli.serve.transport {
        Transport::Stdio => {
            mcp_layer::stdio::run_stdio(server).await.context("stdio transport failed")?;
        }
        Transport::StreamableHttp => {
            let addr = (cli.serve.host.as_str(), cli.serve.port);
            let listener = TcpListener::bind(addr)
                .await
                .with_context(|| format!("failed to bind {}:{}", cli.serve.host, cli.serve.port))?;
            tracing::info!(
                addr = %listener.local_addr()?,
                path = %cli.serve.path,
                "listening"
            );
            serve_http(listener, server, cli.serve.layer_config(), state)
                .await
                .context("http server failed")?;
        }
    }
    Ok(())
}
