use axum::extract::State;
use axum::Json;
use mcp_layer_macros::mcp_tool;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Number, Value};

use super::{forward, positive, AppState};
use crate::error::UsaSpendingError;
use crate::gateway::{QueryParams, UpstreamRequest};

pub const PATH: &str = "/api/v2/award_spending/recipient/";

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct RecipientListArgs {
    /// Awarding agency id.
    pub awarding_agency_id: Number,
    /// Fiscal year.
    pub fiscal_year: Number,
    /// Page size.
    #[serde(default)]
    pub limit: Option<i64>,
    /// Page number, starting at 1.
    #[serde(default)]
    pub page: Option<i64>,
}

impl RecipientListArgs {
    // Agency id and year are passed through unchecked; the API owns their range.
    pub fn into_request(self) -> Result<UpstreamRequest, UsaSpendingError> {
        let mut query: QueryParams = vec![
            ("awarding_agency_id", self.awarding_agency_id.to_string()),
            ("fiscal_year", self.fiscal_year.to_string()),
        ];
        if let Some(limit) = positive("limit", self.limit)? {
            query.push(("limit", limit.to_string()));
        }
        if let Some(page) = positive("page", self.page)? {
            query.push(("page", page.to_string()));
        }
        Ok(UpstreamRequest::Get { path: PATH.to_string(), query })
    }
}

/// GET /api/v2/award_spending/recipient/
#[mcp_tool(
    name = "recipient_list",
    desc = "Returns a list of recipients and their amounts for a given awarding_agency_id + fiscal_year.",
    state = "AppState"
)]
pub async fn recipient_list(
    State(state): State<AppState>,
    Json(args): Json<RecipientListArgs>,
) -> Result<Json<Value>, UsaSpendingError> {
    let request = args.into_request()?;
    forward(&state.gateway, &request).await.map(Json)
}
