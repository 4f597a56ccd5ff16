use std::fmt;

use axum::extract::State;
use axum::Json;
use mcp_layer_macros::mcp_tool;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::{forward, positive, AppState};
use crate::error::UsaSpendingError;
use crate::gateway::UpstreamRequest;

pub const PATH: &str = "/api/v2/search/spending_by_award/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(s: &str) -> Result<Self, UsaSpendingError> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(UsaSpendingError::invalid("order must be 'asc' or 'desc'.")),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpendingLevel {
    Awards,
    Subawards,
}

impl SpendingLevel {
    pub fn parse(s: &str) -> Result<Self, UsaSpendingError> {
        match s {
            "awards" => Ok(SpendingLevel::Awards),
            "subawards" => Ok(SpendingLevel::Subawards),
            _ => Err(UsaSpendingError::invalid("spending_level must be 'awards' or 'subawards'.")),
        }
    }
}

impl fmt::Display for SpendingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SpendingLevel::Awards => "awards",
            SpendingLevel::Subawards => "subawards",
        })
    }
}

fn default_order() -> String {
    SortOrder::Desc.to_string()
}

fn default_spending_level() -> String {
    SpendingLevel::Awards.to_string()
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SpendingByAwardArgs {
    /// Award filters, e.g. `award_type_codes` and `time_period`. Must not be empty.
    pub filters: Map<String, Value>,
    /// Columns to return, e.g. "Award ID", "Recipient Name". Must not be empty.
    pub fields: Vec<String>,
    /// Page size.
    #[serde(default)]
    pub limit: Option<i64>,
    /// "asc" or "desc".
    #[serde(default = "default_order")]
    pub order: String,
    /// Page number, starting at 1.
    #[serde(default)]
    pub page: Option<i64>,
    /// Field to sort by.
    #[serde(default)]
    pub sort: Option<String>,
    #[serde(default)]
    pub subawards: bool,
    /// Keyset pagination: unique id of the last record of the previous page.
    #[serde(default)]
    pub last_record_unique_id: Option<i64>,
    /// Keyset pagination: sort value of the last record of the previous page.
    #[serde(default)]
    pub last_record_sort_value: Option<String>,
    /// "awards" or "subawards".
    #[serde(default = "default_spending_level")]
    pub spending_level: String,
}

impl SpendingByAwardArgs {
    /// Page- and keyset-based paging may both be set; the API decides.
    pub fn into_request(self) -> Result<UpstreamRequest, UsaSpendingError> {
        if self.filters.is_empty() {
            return Err(UsaSpendingError::invalid("filters must be a non-empty object."));
        }
        if self.fields.is_empty() {
            return Err(UsaSpendingError::invalid("fields must be a non-empty array of strings."));
        }
        let order = SortOrder::parse(&self.order)?;
        let spending_level = SpendingLevel::parse(&self.spending_level)?;

        let mut body = Map::new();
        body.insert("filters".into(), Value::Object(self.filters));
        body.insert("fields".into(), Value::from(self.fields));
        body.insert("order".into(), Value::from(order.to_string()));
        body.insert("subawards".into(), Value::from(self.subawards));
        body.insert("spending_level".into(), Value::from(spending_level.to_string()));
        if let Some(limit) = positive("limit", self.limit)? {
            body.insert("limit".into(), Value::from(limit));
        }
        if let Some(page) = positive("page", self.page)? {
            body.insert("page".into(), Value::from(page));
        }
        if let Some(sort) = self.sort {
            body.insert("sort".into(), Value::from(sort));
        }
        if let Some(id) = self.last_record_unique_id {
            body.insert("last_record_unique_id".into(), Value::from(id));
        }
        if let Some(value) = self.last_record_sort_value {
            body.insert("last_record_sort_value".into(), Value::from(value));
        }
        Ok(UpstreamRequest::Post { path: PATH.to_string(), body: Value::Object(body) })
    }
}

/// POST /api/v2/search/spending_by_award/
#[mcp_tool(
    name = "spending_by_award",
    desc = "Takes award filters + requested fields and returns the fields of the filtered awards.",
    state = "AppState"
)]
pub async fn spending_by_award(
    State(state): State<AppState>,
    Json(args): Json<SpendingByAwardArgs>,
) -> Result<Json<Value>, UsaSpendingError> {
    let request = args.into_request()?;
    forward(&state.gateway, &request).await.map(Json)
}
