mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use mcp_layer::security::{PROTOCOL_VERSION_HEADER, REQUIRED_PROTOCOL_VERSION};
use mcp_layer::McpLayerConfig;
use serde_json::{json, Value};
use tower::ServiceExt;

use usaspending_mcp::resource::OPENAPI_RESOURCE_URI;
use usaspending_mcp::server::{app, build_server, SERVER_NAME};
use usaspending_mcp::tools::{AppState, TOOL_NAMES};

use common::{echo_api, spawn};

const OPENAPI: &str = "\nopenapi: 3.0.0\ninfo:\n  title: USAspending excerpt\n";

async fn send(state: &AppState, req: Request<Body>) -> Response {
    let server = build_server(state.clone(), OPENAPI).await;
    app(server, McpLayerConfig::default(), state.clone()).oneshot(req).await.unwrap()
}

fn rpc(method: &str, params: Value) -> Request<Body> {
    let msg = json!({"jsonrpc": "2.0", "id": 1, "method": method, "params": params});
    Request::post("/mcp")
        .header(PROTOCOL_VERSION_HEADER, REQUIRED_PROTOCOL_VERSION)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(msg.to_string()))
        .unwrap()
}

async fn json_body(resp: Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn result(state: &AppState, method: &str, params: Value) -> Value {
    let resp = send(state, rpc(method, params)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert!(body.get("error").is_none(), "{body}");
    body["result"].clone()
}

#[tokio::test]
async fn initialize_reports_server_name() {
    let stub = spawn(echo_api()).await;
    let out = result(&stub.state(), "initialize", json!({"protocolVersion": "2025-03-26"})).await;
    assert_eq!(out["serverInfo"]["name"], SERVER_NAME);
    assert_eq!(out["protocolVersion"], "2025-03-26");
}

#[tokio::test]
async fn lists_the_four_tools_with_descriptions() {
    let stub = spawn(echo_api()).await;
    let out = result(&stub.state(), "tools/list", json!({})).await;
    let tools = out["tools"].as_array().unwrap();
    let names: Vec<_> = tools.iter().map(|t| t["name"].as_str().unwrap()).collect();
    assert_eq!(names, TOOL_NAMES);
    for t in tools {
        assert!(!t["description"].as_str().unwrap().is_empty());
        assert_eq!(t["inputSchema"]["type"], "object");
        assert_eq!(t["outputSchema"]["type"], "object", "{}", t["name"]);
    }
    let autocomplete = &tools[0];
    let required = autocomplete["inputSchema"]["required"].as_array().unwrap();
    assert_eq!(required, &vec![json!("search_text")]);
}

#[tokio::test]
async fn tool_call_returns_upstream_payload() {
    let stub = spawn(echo_api()).await;
    let out = result(
        &stub.state(),
        "tools/call",
        json!({"name": "recipient_list", "arguments": {"awarding_agency_id": 183, "fiscal_year": 2017}}),
    )
    .await;
    assert_eq!(out["isError"], false);
    assert_eq!(out["structuredContent"]["endpoint"], "recipient_list");
    let text: Value = serde_json::from_str(out["content"][0]["text"].as_str().unwrap()).unwrap();
    assert_eq!(text, out["structuredContent"]);
}

#[tokio::test]
async fn array_payloads_are_wrapped_as_structured_content() {
    let stub = spawn(echo_api()).await;
    let out = result(
        &stub.state(),
        "tools/call",
        json!({"name": "recipient_children", "arguments": {"duns_or_uei": "001006360"}}),
    )
    .await;
    assert_eq!(out["structuredContent"]["result"][0]["parent"], "001006360");
}

#[tokio::test]
async fn validation_failure_is_a_tool_error_result() {
    let stub = spawn(echo_api()).await;
    let out = result(
        &stub.state(),
        "tools/call",
        json!({"name": "recipient_autocomplete", "arguments": {"search_text": "x", "limit": 0}}),
    )
    .await;
    assert_eq!(out["isError"], true);
    assert_eq!(out["content"][0]["text"], "limit must be >= 1.");
    assert_eq!(stub.hits(), 0);
}

#[tokio::test]
async fn unknown_tool_is_invalid_params() {
    let stub = spawn(echo_api()).await;
    let body = json_body(send(&stub.state(), rpc("tools/call", json!({"name": "nope", "arguments": {}}))).await).await;
    assert_eq!(body["error"]["code"], -32602);
    assert_eq!(body["error"]["message"], "Unknown tool: nope");
}

#[tokio::test]
async fn openapi_resource_is_listed_and_readable() {
    let stub = spawn(echo_api()).await;
    let state = stub.state();
    let listed = result(&state, "resources/list", json!({})).await;
    assert_eq!(listed["resources"][0]["uri"], OPENAPI_RESOURCE_URI);

    let read = result(&state, "resources/read", json!({"uri": OPENAPI_RESOURCE_URI})).await;
    assert_eq!(read["contents"][0]["mimeType"], "text/yaml");
    assert_eq!(read["contents"][0]["text"], OPENAPI.trim());

    let body = json_body(send(&state, rpc("resources/read", json!({"uri": "usaspending://nope"}))).await).await;
    assert_eq!(body["error"]["code"], -32002);
}

#[tokio::test]
async fn unsupported_protocol_version_is_rejected() {
    let stub = spawn(echo_api()).await;
    let ping = |version: Option<&str>| {
        let mut b = Request::post("/mcp");
        if let Some(v) = version {
            b = b.header(PROTOCOL_VERSION_HEADER, v);
        }
        b.body(Body::from(r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#)).unwrap()
    };
    assert_eq!(send(&stub.state(), ping(Some("1999-01-01"))).await.status(), StatusCode::BAD_REQUEST);
    assert_eq!(send(&stub.state(), ping(None)).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn rest_route_maps_errors_to_status_codes() {
    let stub = spawn(echo_api()).await;
    let state = stub.state();

    let req = Request::post("/tools/recipient_children")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"duns_or_uei":"  "}"#))
        .unwrap();
    let resp = send(&state, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(resp).await, json!({"error": "duns_or_uei is required and cannot be empty."}));

    let req = Request::post("/tools/recipient_autocomplete")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"search_text":"Holdings","limit":3}"#))
        .unwrap();
    let resp = send(&state, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["body"], json!({"search_text": "Holdings", "limit": 3}));
}
