use axum::extract::State;
use axum::Json;
use mcp_layer_macros::mcp_tool;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;

use super::{forward, AppState};
use crate::error::UsaSpendingError;
use crate::gateway::UpstreamRequest;

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct RecipientChildrenArgs {
    /// DUNS or UEI of the parent recipient.
    pub duns_or_uei: String,
    /// Fiscal year (e.g. "2017"), "all" or "latest".
    #[serde(default)]
    pub year: Option<String>,
}

pub fn path_for(duns_or_uei: &str) -> String {
    format!("/api/v2/recipient/children/{duns_or_uei}/")
}

impl RecipientChildrenArgs {
    // `year` goes upstream verbatim; the API rejects unknown values.
    pub fn into_request(self) -> Result<UpstreamRequest, UsaSpendingError> {
        let id = self.duns_or_uei.trim();
        if id.is_empty() {
            return Err(UsaSpendingError::invalid("duns_or_uei is required and cannot be empty."));
        }
        let query = self.year.map(|y| vec![("year", y)]).unwrap_or_default();
        Ok(UpstreamRequest::Get { path: path_for(id), query })
    }
}

/// GET /api/v2/recipient/children/{duns_or_uei}/
#[mcp_tool(
    name = "recipient_children",
    desc = "Returns a list of child recipients for a parent DUNS or UEI. Optional year: fiscal year, or 'all', or 'latest'.",
    state = "AppState"
)]
pub async fn recipient_children(
    State(state): State<AppState>,
    Json(args): Json<RecipientChildrenArgs>,
) -> Result<Json<Value>, UsaSpendingError> {
    let request = args.into_request()?;
    forward(&state.gateway, &request).await.map(Json)
}
