use axum::extract::State;
use axum::Json;
use mcp_layer_macros::mcp_tool;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::{forward, AppState};
use crate::error::UsaSpendingError;
use crate::gateway::UpstreamRequest;

pub const PATH: &str = "/api/v2/autocomplete/recipient/";
pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 500;

fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct RecipientAutocompleteArgs {
    /// Text matched against recipient name, UEI and DUNS.
    pub search_text: String,
    /// Maximum number of results, 1 to 500.
    #[serde(default = "default_limit")]
    pub limit: i64,
    /// Restrict matches to these recipient levels (e.g. "P", "C", "R").
    #[serde(default)]
    pub recipient_levels: Option<Vec<String>>,
}

impl RecipientAutocompleteArgs {
    pub fn into_request(self) -> Result<UpstreamRequest, UsaSpendingError> {
        if self.search_text.trim().is_empty() {
            return Err(UsaSpendingError::invalid("search_text is required and cannot be empty."));
        }
        if self.limit < 1 {
            return Err(UsaSpendingError::invalid("limit must be >= 1."));
        }
        if self.limit > MAX_LIMIT {
            return Err(UsaSpendingError::invalid("limit must be <= 500."));
        }

        let mut body = Map::new();
        body.insert("search_text".into(), Value::from(self.search_text));
        body.insert("limit".into(), Value::from(self.limit));
        if let Some(levels) = self.recipient_levels {
            body.insert("recipient_levels".into(), Value::from(levels));
        }
        Ok(UpstreamRequest::Post { path: PATH.to_string(), body: Value::Object(body) })
    }
}

/// POST /api/v2/autocomplete/recipient/
#[mcp_tool(
    name = "recipient_autocomplete",
    desc = "Search recipients by text across recipient_name, uei, and duns.",
    state = "AppState"
)]
pub async fn recipient_autocomplete(
    State(state): State<AppState>,
    Json(args): Json<RecipientAutocompleteArgs>,
) -> Result<Json<Value>, UsaSpendingError> {
    let request = args.into_request()?;
    forward(&state.gateway, &request).await.map(Json)
}
