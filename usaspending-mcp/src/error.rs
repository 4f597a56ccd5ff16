use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use mcp_layer::tool::ToolError;
use reqwest::Method;

/// Why an upstream request never produced a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    Timeout,
    Connect,
    Request,
    Closed,
}

impl TransportKind {
    pub fn classify(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportKind::Timeout
        } else if err.is_connect() {
            TransportKind::Connect
        } else {
            TransportKind::Request
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TransportKind::Timeout => "timed out",
            TransportKind::Connect => "connection failed",
            TransportKind::Request => "request failed",
            TransportKind::Closed => "gateway closed",
        })
    }
}

/// Everything that can go wrong inside an adapter call. Each variant renders
/// the message the calling agent sees; none carries source errors.
#[derive(Debug, thiserror::Error)]
pub enum UsaSpendingError {
    #[error("{0}")]
    InvalidArgument(String),

    #[error("USAspending API error {status} for {method} {url}.{}", detail_suffix(.detail))]
    Http {
        status: u16,
        method: Method,
        url: String,
        detail: Option<String>,
    },

    #[error("USAspending API request failed for {method} {url}: {kind}.")]
    Transport {
        method: Method,
        url: String,
        kind: TransportKind,
    },

    #[error("USAspending API returned an invalid JSON body for {method} {url}.")]
    Decode { method: Method, url: String },
}

fn detail_suffix(detail: &Option<String>) -> String {
    match detail {
        Some(d) => format!(" Response: {d}"),
        None => String::new(),
    }
}

impl UsaSpendingError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        UsaSpendingError::InvalidArgument(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            UsaSpendingError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            UsaSpendingError::Http { .. } | UsaSpendingError::Decode { .. } => StatusCode::BAD_GATEWAY,
            UsaSpendingError::Transport { kind: TransportKind::Timeout, .. } => StatusCode::GATEWAY_TIMEOUT,
            UsaSpendingError::Transport { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl From<UsaSpendingError> for ToolError {
    fn from(e: UsaSpendingError) -> Self {
        ToolError::Tool(e.to_string())
    }
}

impl IntoResponse for UsaSpendingError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.to_string() });
        (self.status_code(), axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_message_with_and_without_detail() {
        let e = UsaSpendingError::Http {
            status: 404,
            method: Method::GET,
            url: "https://api.usaspending.gov/api/v2/x/".into(),
            detail: Some(r#"{"detail":"not found"}"#.into()),
        };
        assert_eq!(
            e.to_string(),
            r#"USAspending API error 404 for GET https://api.usaspending.gov/api/v2/x/. Response: {"detail":"not found"}"#
        );

        let e = UsaSpendingError::Http {
            status: 502,
            method: Method::POST,
            url: "https://api.usaspending.gov/api/v2/y/".into(),
            detail: None,
        };
        assert_eq!(e.to_string(), "USAspending API error 502 for POST https://api.usaspending.gov/api/v2/y/.");
    }

    #[test]
    fn transport_message_hides_source() {
        let e = UsaSpendingError::Transport {
            method: Method::GET,
            url: "http://127.0.0.1:9/api".into(),
            kind: TransportKind::Timeout,
        };
        assert_eq!(e.to_string(), "USAspending API request failed for GET http://127.0.0.1:9/api: timed out.");
        assert_eq!(e.status_code(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn converts_into_tool_error_verbatim() {
        let e: ToolError = UsaSpendingError::invalid("limit must be >= 1.").into();
        assert_eq!(e, ToolError::Tool("limit must be >= 1.".into()));
    }
}
