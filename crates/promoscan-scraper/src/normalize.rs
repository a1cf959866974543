//! Normalization of raw sync records into [`NormalizedBonus`] values.
//!
//! Pure and total: records that are not JSON objects are dropped, and every
//! field of an object record degrades to a default instead of failing.

use promoscan_core::NormalizedBonus;
use serde_json::{Map, Value};

use crate::parse::{decode_claim_config, parse_float, value_text};

/// Maps raw records to [`NormalizedBonus`] values, preserving input order.
///
/// `url` and `merchant_name` are stamped onto every output record.
#[must_use]
pub fn normalize_bonuses(
    records: Vec<Value>,
    url: &str,
    merchant_name: &str,
) -> Vec<NormalizedBonus> {
    records
        .into_iter()
        .filter_map(|record| match record {
            Value::Object(fields) => Some(normalize_record(&fields, url, merchant_name)),
            _ => None,
        })
        .collect()
}

/// Converts one object record.
#[must_use]
pub fn normalize_record(
    fields: &Map<String, Value>,
    url: &str,
    merchant_name: &str,
) -> NormalizedBonus {
    let num = |key: &str| parse_float(fields.get(key));
    let text = |key: &str| value_text(fields.get(key));

    let id = text("id");
    let bonus_fixed = num("bonusFixed");
    let min_withdraw = num("minWithdraw");
    let withdraw_to_bonus_ratio = (bonus_fixed != 0.0).then(|| min_withdraw / bonus_fixed);

    let raw_claim_config = fields.get("claimConfig").unwrap_or(&Value::Null);
    let flags = decode_claim_config(raw_claim_config, &id);

    NormalizedBonus {
        url: url.to_owned(),
        merchant_name: merchant_name.to_owned(),
        name: text("name"),
        amount: num("amount"),
        rollover: num("rollover"),
        bonus_fixed,
        min_withdraw,
        max_withdraw: num("maxWithdraw"),
        min_topup: num("minTopup"),
        max_topup: num("maxTopup"),
        withdraw_to_bonus_ratio,
        transaction_type: text("transactionType"),
        balance_mode: text("balance"),
        bonus_mode: text("bonus"),
        bonus_random_mode: text("bonusRandom"),
        reset_policy: text("reset"),
        refer_link: text("referLink"),
        is_auto_claim: flags.is_auto_claim,
        is_vip_only: flags.is_vip_only,
        has_loss_requirement: flags.has_loss_requirement,
        has_topup_requirement: flags.has_topup_requirement,
        loss_req_percent: flags.loss_req_percent,
        loss_req_amount: flags.loss_req_amount,
        topup_req_amount: flags.topup_req_amount,
        claim_type: flags.claim_type,
        raw_claim_config: value_text(Some(raw_claim_config)),
        raw_claim_condition: text("claimCondition"),
        id,
    }
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
