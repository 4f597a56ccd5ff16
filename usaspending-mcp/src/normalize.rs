//! Turns failed upstream responses into the uniform tool error.

use serde_json::Value;

use crate::error::UsaSpendingError;
use crate::gateway::UpstreamResponse;

/// Longest text body quoted in an error message, in characters.
pub const MAX_TEXT_DETAIL: usize = 500;

/// `Ok(())` for any non-failure status; otherwise the normalized error with
/// whatever detail the body yields.
pub fn raise_for_status(resp: &UpstreamResponse) -> Result<(), UsaSpendingError> {
    if !(resp.status.is_client_error() || resp.status.is_server_error()) {
        return Ok(());
    }
    tracing::warn!(
        status = resp.status.as_u16(),
        method = %resp.method,
        url = %resp.url,
        "USAspending API returned an error status"
    );
    Err(UsaSpendingError::Http {
        status: resp.status.as_u16(),
        method: resp.method.clone(),
        url: resp.url.clone(),
        detail: error_detail(&resp.body),
    })
}

/// Best-effort description of an error body.
///
/// A body that parses as JSON is used as-is when non-empty, and nothing
/// otherwise. A body that is not JSON falls back to its text, trimmed and cut
/// to [`MAX_TEXT_DETAIL`] characters. Bytes that are not UTF-8 give no
/// detail.
pub fn error_detail(body: &[u8]) -> Option<String> {
    match serde_json::from_slice::<Value>(body) {
        Ok(payload) => (!is_empty_payload(&payload)).then(|| payload.to_string()),
        Err(_) => text_detail(body),
    }
}

fn text_detail(body: &[u8]) -> Option<String> {
    let text = std::str::from_utf8(body).ok()?.trim();
    if text.is_empty() {
        return None;
    }
    Some(text.chars().take(MAX_TEXT_DETAIL).collect())
}

fn is_empty_payload(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}
