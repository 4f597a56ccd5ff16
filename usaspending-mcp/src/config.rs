//! Process configuration.
//!
//! Every setting is a CLI flag with an environment fallback, so the server
//! can be configured either way:
//!
//! - `USASPENDING_BASE_URL` / `--base-url`: upstream API root
//! - `USASPENDING_SELECTED_OPENAPI_YAML` / `--openapi-yaml`: schema resource text
//! - `MCP_TRANSPORT`, `MCP_HOST`, `MCP_PORT`, `MCP_PATH`: front end binding

use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, ValueEnum};
use mcp_layer::security::{AllowedOrigins, Auth};
use mcp_layer::McpLayerConfig;
use reqwest::Url;

use crate::logging::{LogFormat, TracingConfig};

pub const DEFAULT_BASE_URL: &str = "https://api.usaspending.gov";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Parser, Debug)]
#[command(name = "usaspending-mcp")]
#[command(about = "MCP server for USAspending.gov recipient and award search")]
pub struct Cli {
    #[command(flatten)]
    pub upstream: UpstreamArgs,

    #[command(flatten)]
    pub serve: ServeArgs,

    #[command(flatten)]
    pub log: LogArgs,
}

/// Upstream API settings
#[derive(Args, Clone, Debug)]
pub struct UpstreamArgs {
    /// Root URL of the USAspending API. A trailing slash is ignored.
    #[arg(long, env = "USASPENDING_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Total timeout for one upstream request, in seconds
    #[arg(long, env = "USASPENDING_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// OpenAPI excerpt served at usaspending://openapi/selected.yaml
    #[arg(long, env = "USASPENDING_SELECTED_OPENAPI_YAML", default_value = "", hide_env_values = true)]
    pub openapi_yaml: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Transport {
    #[default]
    #[value(name = "streamable-http")]
    StreamableHttp,
    Stdio,
}

/// Front end settings
#[derive(Args, Clone, Debug)]
pub struct ServeArgs {
    /// Transport used to talk to MCP clients
    #[arg(long, env = "MCP_TRANSPORT", value_enum, default_value_t = Transport::StreamableHttp)]
    pub transport: Transport,

    /// Host to bind (streamable-http only)
    #[arg(long, env = "MCP_HOST", default_value = "localhost")]
    pub host: String,

    /// Port to bind (streamable-http only)
    #[arg(long, env = "MCP_PORT", default_value_t = 8000)]
    pub port: u16,

    /// Path of the MCP endpoint
    #[arg(long, env = "MCP_PATH", default_value = "/mcp")]
    pub path: String,

    /// Require `Authorization: Bearer <token>` on the MCP endpoint
    #[arg(long, env = "MCP_AUTH_TOKEN", hide_env_values = true)]
    pub auth_token: Option<String>,

    /// Browser origin allowed to call the endpoint (repeatable). Defaults to loopback origins.
    #[arg(long = "allow-origin", value_name = "ORIGIN")]
    pub allow_origins: Vec<String>,

    /// Serve a readiness event stream on GET
    #[arg(long, env = "MCP_ENABLE_SSE")]
    pub sse: bool,
}

/// Logging settings
#[derive(Args, Clone, Debug, Default)]
pub struct LogArgs {
    /// Log at INFO
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log at DEBUG
    #[arg(long, global = true)]
    pub debug: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty, global = true)]
    pub log_format: LogFormat,
}

impl LogArgs {
    pub fn tracing_config(&self) -> TracingConfig {
        TracingConfig {
            verbose: self.verbose,
            debug: self.debug,
            quiet: self.quiet,
            format: self.log_format.clone(),
        }
    }
}

/// Validated settings for the HTTP gateway.
#[derive(Clone, Debug)]
pub struct GatewayConfig {
    /// Absolute http(s) root without a trailing slash.
    pub base_url: String,
    pub timeout: Duration,
}

impl GatewayConfig {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let trimmed = base_url.trim().trim_end_matches('/');
        let parsed = Url::parse(trimmed).with_context(|| format!("invalid base URL '{base_url}'"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            bail!("base URL must be http or https, got '{}'", parsed.scheme());
        }
        if timeout.is_zero() {
            bail!("upstream timeout must be greater than zero");
        }
        Ok(Self { base_url: trimmed.to_string(), timeout })
    }

    pub fn from_args(args: &UpstreamArgs) -> Result<Self> {
        Self::new(&args.base_url, Duration::from_secs(args.timeout_secs))
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ServeArgs {
    pub fn layer_config(&self) -> McpLayerConfig {
        let allowed_origins = if self.allow_origins.is_empty() {
            AllowedOrigins::Loopback
        } else {
            AllowedOrigins::List(self.allow_origins.clone())
        };
        let auth = match &self.auth_token {
            Some(token) if !token.is_empty() => Auth::Bearer { token: token.clone() },
            _ => Auth::None,
        };
        McpLayerConfig {
            path: self.path.clone(),
            allowed_origins,
            enable_sse: self.sse,
            auth,
            ..McpLayerConfig::default()
        }
    }
}
