//! Stub USAspending API bound to an ephemeral local port.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, Query, RawQuery, Request};
use axum::http::{header, StatusCode};
use axum::middleware::{self, Next};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use usaspending_mcp::config::GatewayConfig;
use usaspending_mcp::gateway::HttpGateway;
use usaspending_mcp::tools::AppState;

pub struct Stub {
    pub addr: SocketAddr,
    hits: Arc<AtomicUsize>,
}

impl Stub {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn gateway(&self) -> Arc<HttpGateway> {
        let config = GatewayConfig::new(&self.base_url(), Duration::from_secs(5)).unwrap();
        Arc::new(HttpGateway::new(&config).unwrap())
    }

    pub fn state(&self) -> AppState {
        AppState::new(self.gateway())
    }
}

/// Serve `app` on 127.0.0.1:0, counting every request that reaches it.
pub async fn spawn(app: Router) -> Stub {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let app = app.layer(middleware::from_fn(move |req: Request, next: Next| {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            next.run(req).await
        }
    }));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    Stub { addr, hits }
}

/// Echoes what each endpoint received, tagged with the endpoint name.
pub fn echo_api() -> Router {
    Router::new()
        .route(
            "/api/v2/autocomplete/recipient/",
            post(|Json(body): Json<Value>| async move {
                Json(json!({"endpoint": "autocomplete", "body": body}))
            }),
        )
        .route(
            "/api/v2/search/spending_by_award/",
            post(|Json(body): Json<Value>| async move {
                Json(json!({"endpoint": "spending_by_award", "body": body}))
            }),
        )
        .route(
            "/api/v2/award_spending/recipient/",
            get(
                |Query(query): Query<BTreeMap<String, String>>, RawQuery(raw): RawQuery| async move {
                    Json(json!({"endpoint": "recipient_list", "query": query, "raw": raw}))
                },
            ),
        )
        .route(
            "/api/v2/recipient/children/{id}/",
            get(|Path(id): Path<String>, RawQuery(raw): RawQuery| async move {
                Json(json!([{"endpoint": "children", "parent": id, "raw": raw}]))
            }),
        )
}

/// Every path answers with the same status, content type and body.
pub fn failing_api(status: StatusCode, content_type: &'static str, body: Vec<u8>) -> Router {
    Router::new().fallback(move || {
        let body = body.clone();
        async move { (status, [(header::CONTENT_TYPE, content_type)], body).into_response() }
    })
}

/// Every path answers 200 with a body that is not JSON.
pub fn garbage_api() -> Router {
    Router::new().fallback(|| async { "<html>oops</html>" })
}

/// Answers only after `delay`.
pub fn slow_api(delay: Duration) -> Router {
    Router::new().fallback(move || async move {
        tokio::time::sleep(delay).await;
        Json(json!({}))
    })
}
