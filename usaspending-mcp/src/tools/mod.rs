//! Tool adapters: one module per USAspending endpoint.
//!
//! Each adapter is an axum handler registered as an MCP tool with
//! `#[mcp_tool]`. It validates its arguments into an [`UpstreamRequest`]
//! before touching the network, forwards it through the shared gateway and
//! returns the decoded JSON untouched.

use std::sync::Arc;

use serde_json::Value;

use crate::error::UsaSpendingError;
use crate::gateway::{HttpGateway, UpstreamRequest};
use crate::normalize::raise_for_status;

pub mod recipient_autocomplete;
pub mod recipient_children;
pub mod recipient_list;
pub mod spending_by_award;

pub use recipient_autocomplete::{recipient_autocomplete, RecipientAutocompleteArgs};
pub use recipient_children::{recipient_children, RecipientChildrenArgs};
pub use recipient_list::{recipient_list, RecipientListArgs};
pub use spending_by_award::{spending_by_award, SpendingByAwardArgs};

pub const TOOL_NAMES: [&str; 4] = [
    "recipient_autocomplete",
    "recipient_children",
    "recipient_list",
    "spending_by_award",
];

/// State shared by every tool call.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<HttpGateway>,
}

impl AppState {
    pub fn new(gateway: Arc<HttpGateway>) -> Self {
        Self { gateway }
    }
}

/// Send one request, normalize failures, decode the body.
pub async fn forward(gateway: &HttpGateway, request: &UpstreamRequest) -> Result<Value, UsaSpendingError> {
    let response = gateway.send(request).await?;
    raise_for_status(&response)?;
    response.json()
}

/// Optional paging value: absent stays absent, present must be >= 1.
fn positive(name: &str, value: Option<i64>) -> Result<Option<i64>, UsaSpendingError> {
    match value {
        Some(v) if v < 1 => Err(UsaSpendingError::invalid(format!("{name} must be >= 1."))),
        other => Ok(other),
    }
}
