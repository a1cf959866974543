//! Permissive field coercion and claim-configuration decoding.
//!
//! Nothing in here fails: malformed input degrades to `0.0`, empty strings,
//! or unset flags.

use promoscan_core::ClaimType;
use serde_json::Value;

/// Coerces a JSON value to `f64`.
///
/// Numbers pass through, numeric strings are parsed after trimming and
/// booleans count as `1.0`/`0.0`. Everything else, including `null` and a
/// missing field, becomes `0.0`.
#[must_use]
pub fn parse_float(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => parse_float_str(s),
        Some(Value::Bool(b)) => f64::from(u8::from(*b)),
        _ => 0.0,
    }
}

fn parse_float_str(raw: &str) -> f64 {
    raw.trim().parse::<f64>().unwrap_or(0.0)
}

/// Renders a JSON value as display text.
///
/// Strings pass through unquoted, `null` and a missing field become the empty
/// string, and anything else is rendered as compact JSON.
#[must_use]
pub fn value_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Flags decoded from a bonus's claim-configuration tags.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClaimFlags {
    pub is_auto_claim: bool,
    pub is_vip_only: bool,
    pub has_loss_requirement: bool,
    pub has_topup_requirement: bool,
    pub loss_req_percent: Option<f64>,
    pub loss_req_amount: Option<f64>,
    pub topup_req_amount: Option<f64>,
    pub claim_type: Option<ClaimType>,
}

/// Decodes a raw claim configuration.
///
/// Only a string that starts with `[` and parses as a JSON array is looked
/// at; any other shape yields default flags. Non-string tags are ignored and
/// tags are applied in array order, so later tags win for `claim_type`.
#[must_use]
pub fn decode_claim_config(raw: &Value, bonus_id: &str) -> ClaimFlags {
    let mut flags = ClaimFlags::default();

    let Value::String(text) = raw else {
        return flags;
    };
    if !text.starts_with('[') {
        return flags;
    }

    let tags = match serde_json::from_str::<Value>(text) {
        Ok(Value::Array(tags)) => tags,
        Ok(_) => return flags,
        Err(e) => {
            tracing::debug!(bonus_id, config = %text, error = %e, "claim config did not parse");
            return flags;
        }
    };

    for tag in tags.iter().filter_map(Value::as_str) {
        apply_claim_tag(&mut flags, tag);
    }
    flags
}

/// Applies one tag to `flags`.
///
/// Matching is a case-insensitive substring test, so one tag can set several
/// fields. Requirement values come from the text after the last `_`.
pub fn apply_claim_tag(flags: &mut ClaimFlags, tag: &str) {
    let upper = tag.to_uppercase();

    if upper.contains("AUTO_CLAIM") {
        flags.is_auto_claim = true;
    }
    if upper.contains("VIP") {
        flags.is_vip_only = true;
    }
    if upper.contains("DEPOSIT") {
        flags.claim_type = Some(ClaimType::Deposit);
    }
    if upper.contains("RESCUE") {
        flags.claim_type = Some(ClaimType::Rescue);
    }
    if upper.contains("REBATE") {
        flags.claim_type = Some(ClaimType::Rebate);
    }
    if upper.contains("LOSS") {
        flags.has_loss_requirement = true;
        if let Some(last) = last_segment(tag) {
            if last.contains('%') {
                flags.loss_req_percent = Some(parse_float_str(&last.replace('%', "")));
            } else {
                flags.loss_req_amount = Some(parse_float_str(last));
            }
        }
    }
    if upper.contains("TOPUP") {
        flags.has_topup_requirement = true;
        if let Some(last) = last_segment(tag) {
            flags.topup_req_amount = Some(parse_float_str(last));
        }
    }
}

/// Text after the last `_`, or `None` when the tag has no `_`.
fn last_segment(tag: &str) -> Option<&str> {
    tag.rsplit_once('_').map(|(_, last)| last)
}
