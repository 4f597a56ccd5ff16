#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request};
use mcp_layer::prelude::*;
use mcp_layer::security::{PROTOCOL_VERSION_HEADER, REQUIRED_PROTOCOL_VERSION};
use serde_json::{json, Value};

pub struct Echo;

#[async_trait]
impl ToolHandler for Echo {
    async fn call(&self, _ctx: &ToolCtx, args: Value) -> Result<Value, ToolError> {
        Ok(args)
    }
}

pub struct Broken;

#[async_trait]
impl ToolHandler for Broken {
    async fn call(&self, _ctx: &ToolCtx, _args: Value) -> Result<Value, ToolError> {
        Err(ToolError::Internal("db password is hunter2".into()))
    }
}

fn tool(name: &'static str, handler: Arc<dyn ToolHandler + Send + Sync>) -> ToolDescriptor {
    ToolDescriptor {
        name,
        description: "test tool",
        input_schema: schemars::schema_for!(Value),
        output_schema: schemars::schema_for!(Value),
        handler,
    }
}

pub async fn server() -> McpServer {
    let reg = ToolRegistry::empty_with_state(Arc::new(()));
    reg.insert(tool("echo", Arc::new(Echo))).await;
    reg.insert(tool("broken", Arc::new(Broken))).await;
    reg.insert_resource(ResourceDescriptor {
        uri: "test://notes".into(),
        name: "notes".into(),
        description: None,
        mime_type: "text/plain",
        reader: Arc::new(StaticText("hello".into())),
    })
    .await;
    McpServer::new(reg, "test-server", "0.0.0")
}

pub fn rpc(id: i64, method: &str, params: Value) -> Request<Body> {
    let msg = json!({"jsonrpc": "2.0", "id": id, "method": method, "params": params});
    Request::post("/mcp")
        .header(PROTOCOL_VERSION_HEADER, REQUIRED_PROTOCOL_VERSION)
        .header(header::ORIGIN, "http://127.0.0.1:3000")
        .body(Body::from(msg.to_string()))
        .unwrap()
}

pub async fn json_body(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
