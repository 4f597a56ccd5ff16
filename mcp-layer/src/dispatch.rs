//! Transport-independent handling of MCP JSON-RPC messages.
//!
//! Both the streamable HTTP layer and the stdio loop feed decoded requests
//! through [`McpServer::handle`], so tool listing, tool calls and resource
//! reads behave the same whichever transport carried them.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::protocol::*;
use crate::registry::ToolRegistry;
use crate::schema::{output_to_wire, to_wire};
use crate::security::{FALLBACK_PROTOCOL_VERSION, REQUIRED_PROTOCOL_VERSION};
use crate::tool::{ReqMeta, ToolError};

#[derive(Clone)]
pub struct McpServer {
    registry: Arc<ToolRegistry>,
    info: ServerInfo,
}

impl McpServer {
    pub fn new(registry: Arc<ToolRegistry>, name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            registry,
            info: ServerInfo { name: name.into(), version: version.into() },
        }
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    pub fn info(&self) -> &ServerInfo {
        &self.info
    }

    /// Decode and handle one raw message. `None` means no response is due.
    ///
    /// Bytes that are not JSON get -32700. JSON that is not a single 2.0
    /// request object (batches included) gets -32600, echoing its `id` when
    /// one can be read.
    pub async fn handle_bytes(&self, bytes: &[u8], meta: ReqMeta) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_slice(bytes) {
            Ok(v) => v,
            Err(e) => return Some(JsonRpcResponse::parse_error(&e.to_string())),
        };
        let id = value
            .get("id")
            .and_then(|id| serde_json::from_value::<JsonRpcId>(id.clone()).ok());
        match serde_json::from_value::<JsonRpcRequest>(value) {
            Ok(req) if req.jsonrpc == JSONRPC_VERSION => self.handle(req, meta).await,
            Ok(req) => Some(JsonRpcResponse::error(
                id,
                JsonRpcError::invalid_request(format!("unsupported jsonrpc version {:?}", req.jsonrpc)),
            )),
            Err(e) => Some(JsonRpcResponse::error(id, JsonRpcError::invalid_request(e.to_string()))),
        }
    }

    pub async fn handle(&self, req: JsonRpcRequest, meta: ReqMeta) -> Option<JsonRpcResponse> {
        if req.is_notification() {
            tracing::debug!(method = %req.method, "notification");
            return None;
        }
        let id = req.id.clone();
        let outcome = match req.method.as_str() {
            "initialize" => self.initialize(req.params),
            "ping" => Ok(json!({})),
            "tools/list" => self.list_tools().await,
            "tools/call" => self.call_tool(req.params, meta).await,
            "resources/list" => self.list_resources().await,
            "resources/read" => self.read_resource(req.params).await,
            other => Err(JsonRpcError::method_not_found(other)),
        };
        Some(match outcome {
            Ok(v) => JsonRpcResponse::success(id, v),
            Err(e) => JsonRpcResponse::error(id, e),
        })
    }

    fn initialize(&self, params: Option<Value>) -> Result<Value, JsonRpcError> {
        let params: InitializeParams = match params {
            Some(p) => parse_params(p)?,
            None => InitializeParams::default(),
        };
        let version = match params.protocol_version.as_deref() {
            Some(v) if v == REQUIRED_PROTOCOL_VERSION || v == FALLBACK_PROTOCOL_VERSION => v,
            _ => REQUIRED_PROTOCOL_VERSION,
        };
        let result = InitializeResult {
            protocol_version: version.to_string(),
            capabilities: ServerCapabilities {
                tools: ListChanged::default(),
                resources: ResourcesCapability::default(),
            },
            server_info: self.info.clone(),
        };
        to_value(result)
    }

    async fn list_tools(&self) -> Result<Value, JsonRpcError> {
        let tools: Vec<ToolInfo> = self
            .registry
            .list()
            .await
            .into_iter()
            .map(|t| ToolInfo {
                name: t.name,
                description: t.description,
                input_schema: to_wire(&t.input_schema),
                output_schema: Some(output_to_wire(&t.output_schema)),
            })
            .collect();
        Ok(json!({ "tools": tools }))
    }

    async fn call_tool(&self, params: Option<Value>, meta: ReqMeta) -> Result<Value, JsonRpcError> {
        let params: ToolCallParams =
            parse_params(params.ok_or_else(|| JsonRpcError::invalid_params("missing params"))?)?;
        let args = params.arguments.unwrap_or_else(|| json!({}));
        tracing::debug!(tool = %params.name, transport = meta.transport, "tools/call");

        let result = match self.registry.call_with_meta(&params.name, args, meta).await {
            Ok(v) => ToolCallResult::from_value(v),
            Err(ToolError::NotFound(name)) => {
                return Err(JsonRpcError::invalid_params(format!("Unknown tool: {name}")));
            }
            Err(e) => {
                if let ToolError::Internal(detail) = &e {
                    tracing::error!(tool = %params.name, %detail, "tool failed");
                }
                ToolCallResult::error(e.public_message(&params.name))
            }
        };
        to_value(result)
    }

    async fn list_resources(&self) -> Result<Value, JsonRpcError> {
        let resources: Vec<ResourceInfo> = self
            .registry
            .resources()
            .await
            .into_iter()
            .map(|r| ResourceInfo {
                uri: r.uri,
                name: r.name,
                description: r.description,
                mime_type: r.mime_type.to_string(),
            })
            .collect();
        Ok(json!({ "resources": resources }))
    }

    async fn read_resource(&self, params: Option<Value>) -> Result<Value, JsonRpcError> {
        let params: ResourceReadParams =
            parse_params(params.ok_or_else(|| JsonRpcError::invalid_params("missing params"))?)?;
        let (res, text) = self.registry.read_resource(&params.uri).await.ok_or_else(|| {
            JsonRpcError::new(RESOURCE_NOT_FOUND, format!("Resource not found: {}", params.uri))
        })?;
        let contents = ResourceContents {
            uri: res.uri,
            mime_type: res.mime_type.to_string(),
            text,
        };
        Ok(json!({ "contents": [contents] }))
    }
}

fn parse_params<T: DeserializeOwned>(params: Value) -> Result<T, JsonRpcError> {
    serde_json::from_value(params).map_err(|e| JsonRpcError::invalid_params(format!("invalid params: {e}")))
}

fn to_value<T: serde::Serialize>(v: T) -> Result<Value, JsonRpcError> {
    serde_json::to_value(v).map_err(|e| JsonRpcError::internal(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::{ToolCtx, ToolDescriptor, ToolHandler};
    use async_trait::async_trait;

    struct Fails(ToolError);
    #[async_trait]
    impl ToolHandler for Fails {
        async fn call(&self, _ctx: &ToolCtx, _args: Value) -> Result<Value, ToolError> {
            Err(self.0.clone())
        }
    }

    async fn server_with(name: &'static str, err: ToolError) -> McpServer {
        let reg = ToolRegistry::empty_with_state(Arc::new(()));
        reg.insert(ToolDescriptor {
            name,
            description: "always fails",
            input_schema: schemars::schema_for!(Value),
            output_schema: schemars::schema_for!(Value),
            handler: Arc::new(Fails(err)),
        })
        .await;
        McpServer::new(reg, "test", "0.0.0")
    }

    fn call(name: &str) -> JsonRpcRequest {
        JsonRpcRequest::new(1, "tools/call", Some(json!({"name": name, "arguments": {}})))
    }

    #[tokio::test]
    async fn initialize_negotiates_known_version() {
        let s = server_with("x", ToolError::Tool("x".into())).await;
        let req = JsonRpcRequest::new(
            1,
            "initialize",
            Some(json!({"protocolVersion": FALLBACK_PROTOCOL_VERSION})),
        );
        let resp = s.handle(req, ReqMeta::default()).await.unwrap();
        assert_eq!(resp.result.unwrap()["protocolVersion"], FALLBACK_PROTOCOL_VERSION);

        let req = JsonRpcRequest::new(2, "initialize", Some(json!({"protocolVersion": "1999-01-01"})));
        let resp = s.handle(req, ReqMeta::default()).await.unwrap();
        assert_eq!(resp.result.unwrap()["protocolVersion"], REQUIRED_PROTOCOL_VERSION);
    }

    #[tokio::test]
    async fn tool_error_becomes_error_result() {
        let s = server_with("lookup", ToolError::Tool("limit must be >= 1.".into())).await;
        let resp = s.handle(call("lookup"), ReqMeta::default()).await.unwrap();
        let result = resp.result.unwrap();
        assert_eq!(result["isError"], true);
        assert_eq!(result["content"][0]["text"], "limit must be >= 1.");
    }

    #[tokio::test]
    async fn internal_error_is_masked() {
        let s = server_with("lookup", ToolError::Internal("secret stack".into())).await;
        let resp = s.handle(call("lookup"), ReqMeta::default()).await.unwrap();
        let text = resp.result.unwrap()["content"][0]["text"].as_str().unwrap().to_string();
        assert_eq!(text, "Error calling tool 'lookup'");
    }

    #[tokio::test]
    async fn unknown_tool_is_protocol_error() {
        let s = server_with("lookup", ToolError::Tool("x".into())).await;
        let resp = s.handle(call("nope"), ReqMeta::default()).await.unwrap();
        let err = resp.error.unwrap();
        assert_eq!(err.code, INVALID_PARAMS);
        assert_eq!(err.message, "Unknown tool: nope");
    }

    #[tokio::test]
    async fn notifications_get_no_response() {
        let s = server_with("lookup", ToolError::Tool("x".into())).await;
        let resp = s
            .handle_bytes(br#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#, ReqMeta::default())
            .await;
        assert!(resp.is_none());
    }

    #[tokio::test]
    async fn tools_list_advertises_object_output_schemas() {
        let s = server_with("lookup", ToolError::Tool("x".into())).await;
        let resp = s.handle(JsonRpcRequest::new(1, "tools/list", None), ReqMeta::default()).await.unwrap();
        let tool = &resp.result.unwrap()["tools"][0];
        assert_eq!(tool["inputSchema"]["type"], "object");
        assert_eq!(tool["outputSchema"]["type"], "object");
    }

    #[tokio::test]
    async fn json_that_is_not_a_request_is_invalid_request() {
        let s = server_with("lookup", ToolError::Tool("x".into())).await;
        for body in [
            &br#"{"jsonrpc":"2.0","id":4}"#[..],
            &br#"{"jsonrpc":"1.0","id":4,"method":"ping"}"#[..],
        ] {
            let resp = s.handle_bytes(body, ReqMeta::default()).await.unwrap();
            assert_eq!(resp.error.unwrap().code, INVALID_REQUEST);
            assert_eq!(resp.id, Some(JsonRpcId::Number(4)));
        }
        let resp = s.handle_bytes(b"[]", ReqMeta::default()).await.unwrap();
        assert_eq!(resp.error.unwrap().code, INVALID_REQUEST);
        assert!(resp.id.is_none());
    }

    #[tokio::test]
    async fn garbage_is_parse_error() {
        let s = server_with("lookup", ToolError::Tool("x".into())).await;
        let resp = s.handle_bytes(b"{not json", ReqMeta::default()).await.unwrap();
        assert_eq!(resp.error.unwrap().code, PARSE_ERROR);
        assert!(resp.id.is_none());
    }

    #[tokio::test]
    async fn unknown_resource() {
        let s = server_with("lookup", ToolError::Tool("x".into())).await;
        let req = JsonRpcRequest::new(3, "resources/read", Some(json!({"uri": "x://y"})));
        let resp = s.handle(req, ReqMeta::default()).await.unwrap();
        assert_eq!(resp.error.unwrap().code, RESOURCE_NOT_FOUND);
    }
}
