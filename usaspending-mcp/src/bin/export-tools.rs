//! Print the tool catalogue as JSON, as `tools/list` would report it.

use std::sync::Arc;

use anyhow::Result;
use mcp_layer::schema::{output_to_wire, to_wire};
use serde_json::json;

use usaspending_mcp::config::GatewayConfig;
use usaspending_mcp::gateway::HttpGateway;
use usaspending_mcp::server::tool_registry;
use usaspending_mcp::tools::AppState;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let gateway = Arc::new(HttpGateway::new(&GatewayConfig::default())?);
    let registry = tool_registry(AppState::new(gateway));

    let tools: Vec<_> = registry
        .list()
        .await
        .into_iter()
        .map(|t| {
            json!({
                "name": t.name,
                "description": t.description,
                "inputSchema": to_wire(&t.input_schema),
                "outputSchema": output_to_wire(&t.output_schema),
            })
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&json!({ "tools": tools }))?);
    Ok(())
}
