use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use crate::schema::RootSchema;

#[derive(Clone)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: RootSchema,
    pub output_schema: RootSchema,
    pub handler: Arc<dyn ToolHandler + Send + Sync>,
}

#[derive(Clone, Default, Debug)]
pub struct ReqMeta {
    pub transport: &'static str,
    pub origin: Option<String>,
}

pub struct ToolCtx {
    pub app_state: Arc<dyn Any + Send + Sync>,
    pub req_meta: ReqMeta,
}

/// Failure of a single tool call.
///
/// `Tool` is the user-facing error channel: its message reaches the caller
/// verbatim. `Internal` never does; see [`ToolError::public_message`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    NotFound(String),
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),
    #[error("{0}")]
    Tool(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl ToolError {
    /// Message shown to the caller of `tool`. Internal detail is replaced by
    /// a generic line; callers log it instead.
    pub fn public_message(&self, tool: &str) -> String {
        match self {
            ToolError::Internal(_) => format!("Error calling tool '{tool}'"),
            other => other.to_string(),
        }
    }
}

#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn call(&self, ctx: &ToolCtx, args: Value) -> Result<Value, ToolError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_errors_are_masked() {
        let e = ToolError::Internal("db pool exhausted at pool.rs:12".into());
        assert_eq!(e.public_message("lookup"), "Error calling tool 'lookup'");
        assert!(e.to_string().contains("pool.rs"));
    }

    #[test]
    fn tool_errors_pass_through() {
        let e = ToolError::Tool("limit must be >= 1.".into());
        assert_eq!(e.public_message("lookup"), "limit must be >= 1.");
    }
}
