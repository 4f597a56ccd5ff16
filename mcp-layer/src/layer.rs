use std::task::{Context, Poll};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response, Method};
use tower::{Layer, Service};

use crate::dispatch::McpServer;
use crate::http::{handle_post, handle_sse_get, method_not_allowed};
use crate::security::{AllowedOrigins, Auth, VersionPolicy};

#[derive(Clone, Debug)]
pub struct McpLayerConfig {
    pub path: String,
    pub require_version: bool,
    pub allowed_origins: AllowedOrigins,
    pub enable_sse: bool,
    pub auth: Auth,
    pub version_policy: VersionPolicy,
}

impl Default for McpLayerConfig {
    fn default() -> Self {
        Self {
            path: "/mcp".to_string(),
            require_version: true,
            allowed_origins: AllowedOrigins::Loopback,
            enable_sse: false,
            auth: Auth::None,
            version_policy: VersionPolicy::default(),
        }
    }
}

/// Intercepts the MCP endpoint on an axum router; every other request
/// reaches the wrapped service untouched.
#[derive(Clone)]
pub struct McpLayer {
    server: Arc<McpServer>,
    config: Arc<McpLayerConfig>,
}

impl McpLayer {
    pub fn new(server: McpServer, config: McpLayerConfig) -> Self {
        Self { server: Arc::new(server), config: Arc::new(config) }
    }
}

impl<S> Layer<S> for McpLayer {
    type Service = McpService<S>;
    fn layer(&self, inner: S) -> Self::Service {
        McpService { inner, server: self.server.clone(), config: self.config.clone() }
    }
}

#[derive(Clone)]
pub struct McpService<S> {
    inner: S,
    server: Arc<McpServer>,
    config: Arc<McpLayerConfig>,
}

impl<S> Service<Request<Body>> for McpService<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    S::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    S::Future: Send + 'static,
{
    type Response = Response<Body>;
    type Error = S::Error;
    type Future = futures::future::BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> { self.inner.poll_ready(cx) }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let on_endpoint = req.uri().path() == self.config.path;
        let intercept_post = on_endpoint && req.method() == Method::POST;
        let intercept_get = on_endpoint && req.method() == Method::GET && self.config.enable_sse;
        // The endpoint never reaches the wrapped router.
        let reject = on_endpoint && !intercept_post && !intercept_get;
        let mut inner = self.inner.clone();
        let server = self.server.clone();
        let config = self.config.clone();
        Box::pin(async move {
            if intercept_post {
                Ok(handle_post(req, &server, &config).await)
            } else if intercept_get {
                Ok(handle_sse_get(req, &server, &config).await)
            } else if reject {
                Ok(method_not_allowed(&config))
            } else {
                inner.call(req).await
            }
        })
    }
}
