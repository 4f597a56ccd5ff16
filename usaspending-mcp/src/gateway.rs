//! Shared outbound HTTP connection to the USAspending API.
//!
//! One [`HttpGateway`] is built at startup and shared by every tool call;
//! `reqwest::Client` pools connections and is safe to use concurrently, so
//! calls never coordinate with each other beyond that pool.

use std::sync::{Arc, PoisonError, RwLock};

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde_json::Value;

use crate::config::GatewayConfig;
use crate::error::{TransportKind, UsaSpendingError};

/// Query parameters in the order they are sent.
pub type QueryParams = Vec<(&'static str, String)>;

/// The single HTTP request an adapter issues for one tool call.
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamRequest {
    Get { path: String, query: QueryParams },
    Post { path: String, body: Value },
}

/// Raw upstream answer, not yet checked for failure status.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub method: Method,
    /// Full request URL including the query string.
    pub url: String,
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl UpstreamResponse {
    pub fn json(&self) -> Result<Value, UsaSpendingError> {
        serde_json::from_slice(&self.body).map_err(|_| UsaSpendingError::Decode {
            method: self.method.clone(),
            url: self.url.clone(),
        })
    }
}

pub struct HttpGateway {
    base_url: String,
    /// `None` once closed.
    client: RwLock<Option<Client>>,
}

impl HttpGateway {
    pub fn new(config: &GatewayConfig) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .user_agent(concat!("usaspending-mcp/", env!("CARGO_PKG_VERSION")))
            .build()?;
        tracing::debug!(base_url = %config.base_url, timeout = ?config.timeout, "http gateway opened");
        Ok(Self {
            base_url: config.base_url.clone(),
            client: RwLock::new(Some(client)),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Release the connection pool. Safe to call more than once; returns
    /// `true` only for the call that actually closed it.
    pub fn close(&self) -> bool {
        let closed = self
            .client
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .is_some();
        if closed {
            tracing::info!(base_url = %self.base_url, "http gateway closed");
        }
        closed
    }

    fn client(&self) -> Option<Client> {
        self.client.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<UpstreamResponse, UsaSpendingError> {
        self.execute(Method::GET, path, |b| if query.is_empty() { b } else { b.query(query) })
            .await
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<UpstreamResponse, UsaSpendingError> {
        self.execute(Method::POST, path, |b| b.json(body)).await
    }

    pub async fn send(&self, request: &UpstreamRequest) -> Result<UpstreamResponse, UsaSpendingError> {
        match request {
            UpstreamRequest::Get { path, query } => self.get(path, query).await,
            UpstreamRequest::Post { path, body } => self.post(path, body).await,
        }
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        finish: impl FnOnce(RequestBuilder) -> RequestBuilder,
    ) -> Result<UpstreamResponse, UsaSpendingError> {
        let mut url = self.url_for(path);
        let transport = |url: &str, kind| UsaSpendingError::Transport {
            method: method.clone(),
            url: url.to_string(),
            kind,
        };

        let client = self.client().ok_or_else(|| transport(&url, TransportKind::Closed))?;
        let request = finish(client.request(method.clone(), url.as_str()))
            .build()
            .map_err(|e| transport(&url, TransportKind::classify(&e)))?;
        url = request.url().to_string();

        tracing::debug!(%method, %url, "upstream request");
        let response = client
            .execute(request)
            .await
            .map_err(|e| transport(&url, TransportKind::classify(&e)))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| transport(&url, TransportKind::classify(&e)))?;
        tracing::debug!(%method, %url, status = status.as_u16(), bytes = body.len(), "upstream response");

        Ok(UpstreamResponse { method, url, status, body: body.to_vec() })
    }
}

/// Closes the gateway when dropped, so the pool is released on every exit
/// path of `main`, unwinding included.
pub struct GatewayGuard(Arc<HttpGateway>);

impl GatewayGuard {
    pub fn new(gateway: Arc<HttpGateway>) -> Self {
        Self(gateway)
    }
}

impl Drop for GatewayGuard {
    fn drop(&mut self) {
        self.0.close();
    }
}
