//! Helpers for the merchant API's JSON envelope:
//! `{"status": "SUCCESS", "data": {...}}`.

use serde_json::Value;

/// Value of `status` that marks a successful call.
pub const SUCCESS_STATUS: &str = "SUCCESS";

/// Form `module` for the login call.
pub const LOGIN_MODULE: &str = "/users/login";

/// Form `module` for the bonus/promotion sync call.
pub const SYNC_MODULE: &str = "/users/syncData";

/// Returns `Ok(())` when `status == "SUCCESS"`, otherwise the status as text
/// (`"<missing>"` when the field is absent) for error reporting.
pub(crate) fn check_status(body: &Value) -> Result<(), String> {
    match body.get("status") {
        Some(Value::String(s)) if s == SUCCESS_STATUS => Ok(()),
        Some(Value::String(s)) => Err(s.clone()),
        Some(other) => Err(other.to_string()),
        None => Err("<missing>".to_owned()),
    }
}

/// Reads `data.<key>` from an envelope.
pub(crate) fn data_field<'a>(body: &'a Value, key: &str) -> Option<&'a Value> {
    body.get("data").and_then(|data| data.get(key))
}

/// Renders an identifier-like JSON value as text. Strings pass through,
/// integers are formatted; anything else is `None`.
pub(crate) fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.is_i64() || n.is_u64() => Some(n.to_string()),
        _ => None,
    }
}
