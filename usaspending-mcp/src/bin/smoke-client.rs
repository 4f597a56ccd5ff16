//! Exercise a running server end to end: handshake, tool listing and one
//! sample call per tool.

use anyhow::{bail, Context, Result};
use clap::Parser;
use mcp_layer::security::{PROTOCOL_VERSION_HEADER, REQUIRED_PROTOCOL_VERSION};
use serde_json::{json, Value};

#[derive(Parser, Debug)]
#[command(name = "smoke-client", about = "Smoke test a running usaspending-mcp server")]
struct Args {
    /// MCP endpoint
    #[arg(long, default_value = "http://localhost:8000/mcp")]
    url: String,

    /// Bearer token, if the server requires one
    #[arg(long, env = "MCP_AUTH_TOKEN", hide_env_values = true)]
    token: Option<String>,
}

struct Client {
    http: reqwest::Client,
    url: String,
    token: Option<String>,
    next_id: i64,
}

impl Client {
    async fn request(&mut self, method: &str, params: Value) -> Result<Value> {
        self.next_id += 1;
        let msg = json!({"jsonrpc": "2.0", "id": self.next_id, "method": method, "params": params});
        let mut req = self
            .http
            .post(&self.url)
            .header(PROTOCOL_VERSION_HEADER, REQUIRED_PROTOCOL_VERSION)
            .json(&msg);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await.with_context(|| format!("{method}: request failed"))?;
        let status = resp.status();
        if !status.is_success() {
            bail!("{method}: HTTP {status}: {}", resp.text().await.unwrap_or_default());
        }
        let body: Value = resp.json().await.with_context(|| format!("{method}: invalid JSON"))?;
        if let Some(err) = body.get("error") {
            bail!("{method}: {err}");
        }
        Ok(body.get("result").cloned().unwrap_or(Value::Null))
    }

    async fn call_tool(&mut self, name: &str, arguments: Value, max: usize) -> Result<()> {
        println!("\ncalling {name}...");
        let result = self
            .request("tools/call", json!({"name": name, "arguments": arguments}))
            .await?;
        let text: String = result.to_string().chars().take(max).collect();
        println!("{name} result (truncated): {text}");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut client = Client {
        http: reqwest::Client::new(),
        url: args.url,
        token: args.token,
        next_id: 0,
    };

    let init = client
        .request(
            "initialize",
            json!({
                "protocolVersion": REQUIRED_PROTOCOL_VERSION,
                "capabilities": {},
                "clientInfo": {"name": "smoke-client", "version": env!("CARGO_PKG_VERSION")},
            }),
        )
        .await?;
    println!("connected to {}", init["serverInfo"]["name"]);

    client.request("ping", json!({})).await?;
    println!("ping ok");

    let tools = client.request("tools/list", json!({})).await?;
    println!("\ntools:");
    for t in tools["tools"].as_array().into_iter().flatten() {
        println!(" - {}: {}", t["name"].as_str().unwrap_or("?"), t["description"].as_str().unwrap_or(""));
    }

    client
        .call_tool("recipient_autocomplete", json!({"search_text": "Holdings", "limit": 5}), 500)
        .await?;
    client
        .call_tool(
            "spending_by_award",
            json!({
                "subawards": false,
                "limit": 2,
                "page": 1,
                "filters": {
                    "award_type_codes": ["A", "B", "C"],
                    "time_period": [{"start_date": "2018-10-01", "end_date": "2019-09-30"}],
                },
                "fields": ["Award ID", "Recipient Name", "Award Amount"],
                "order": "desc",
                "spending_level": "awards",
            }),
            800,
        )
        .await?;
    client
        .call_tool("recipient_children", json!({"duns_or_uei": "001006360", "year": "2017"}), 800)
        .await?;
    client
        .call_tool(
            "recipient_list",
            json!({"awarding_agency_id": 183, "fiscal_year": 2017, "limit": 5, "page": 1}),
            800,
        )
        .await?;

    println!("\ndone");
    Ok(())
}
