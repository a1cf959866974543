use serde::{Deserialize, Serialize};

/// Claim category decoded from a bonus's claim-configuration tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ClaimType {
    Deposit,
    Rescue,
    Rebate,
}

impl ClaimType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ClaimType::Deposit => "DEPOSIT",
            ClaimType::Rescue => "RESCUE",
            ClaimType::Rebate => "REBATE",
        }
    }
}

impl std::fmt::Display for ClaimType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One bonus or promotion offer from a merchant site, in canonical form.
///
/// Numeric fields default to `0.0` when the source value is missing or not
/// numeric. Optional numerics are `None` when the source never supplied
/// them, which is distinct from a supplied zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedBonus {
    /// Site root the record was fetched from.
    pub url: String,
    pub merchant_name: String,
    /// Remote identifier of the offer.
    pub id: String,
    pub name: String,

    pub amount: f64,
    pub rollover: f64,
    pub bonus_fixed: f64,
    pub min_withdraw: f64,
    pub max_withdraw: f64,
    pub min_topup: f64,
    pub max_topup: f64,
    /// `min_withdraw / bonus_fixed`; absent when `bonus_fixed` is zero.
    pub withdraw_to_bonus_ratio: Option<f64>,

    pub transaction_type: String,
    pub balance_mode: String,
    pub bonus_mode: String,
    pub bonus_random_mode: String,
    pub reset_policy: String,
    pub refer_link: String,

    pub is_auto_claim: bool,
    pub is_vip_only: bool,
    pub has_loss_requirement: bool,
    pub has_topup_requirement: bool,
    pub loss_req_percent: Option<f64>,
    pub loss_req_amount: Option<f64>,
    pub topup_req_amount: Option<f64>,
    pub claim_type: Option<ClaimType>,

    /// Claim configuration exactly as received.
    pub raw_claim_config: String,
    /// Claim condition exactly as received.
    pub raw_claim_condition: String,
}

impl NormalizedBonus {
    /// Column names for tabular output, in [`Self::csv_row`] order.
    pub const CSV_HEADER: [&'static str; 28] = [
        "url",
        "merchant_name",
        "id",
        "name",
        "amount",
        "rollover",
        "bonus_fixed",
        "min_withdraw",
        "max_withdraw",
        "withdraw_to_bonus_ratio",
        "min_topup",
        "max_topup",
        "transaction_type",
        "balance",
        "bonus",
        "bonus_random",
        "reset",
        "refer_link",
        "is_auto_claim",
        "is_vip_only",
        "has_loss_requirement",
        "has_topup_requirement",
        "loss_req_percent",
        "loss_req_amount",
        "topup_req_amount",
        "claim_type",
        "raw_claim_config",
        "raw_claim_condition",
    ];

    /// Renders the record as one row of cells matching [`Self::CSV_HEADER`].
    ///
    /// Absent optionals render as empty cells.
    #[must_use]
    pub fn csv_row(&self) -> Vec<String> {
        fn opt(value: Option<f64>) -> String {
            value.map(|v| v.to_string()).unwrap_or_default()
        }

        vec![
            self.url.clone(),
            self.merchant_name.clone(),
            self.id.clone(),
            self.name.clone(),
            self.amount.to_string(),
            self.rollover.to_string(),
            self.bonus_fixed.to_string(),
            self.min_withdraw.to_string(),
            self.max_withdraw.to_string(),
            opt(self.withdraw_to_bonus_ratio),
            self.min_topup.to_string(),
            self.max_topup.to_string(),
            self.transaction_type.clone(),
            self.balance_mode.clone(),
            self.bonus_mode.clone(),
            self.bonus_random_mode.clone(),
            self.reset_policy.clone(),
            self.refer_link.clone(),
            self.is_auto_claim.to_string(),
            self.is_vip_only.to_string(),
            self.has_loss_requirement.to_string(),
            self.has_topup_requirement.to_string(),
            opt(self.loss_req_percent),
            opt(self.loss_req_amount),
            opt(self.topup_req_amount),
            self.claim_type
                .map(|c| c.as_str().to_owned())
                .unwrap_or_default(),
            self.raw_claim_config.clone(),
            self.raw_claim_condition.clone(),
        ]
    }
}
