//! Database operations for `bonuses`.

use promoscan_core::NormalizedBonus;
use sqlx::PgPool;

use crate::DbError;

/// Inserts every bonus for one run inside a single transaction.
///
/// Either all rows land or none do. Returns the number of rows written.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the transaction cannot be started, any insert
/// fails, or the commit fails.
pub async fn insert_bonuses(
    pool: &PgPool,
    scrape_run_id: i64,
    bonuses: &[NormalizedBonus],
) -> Result<u64, DbError> {
    let mut tx = pool.begin().await?;
    let mut written: u64 = 0;

    for bonus in bonuses {
        let result = sqlx::query(
            "INSERT INTO bonuses \
                 (scrape_run_id, url, merchant_name, bonus_id, name, amount, rollover, \
                  bonus_fixed, min_withdraw, max_withdraw, withdraw_to_bonus_ratio, \
                  min_topup, max_topup, transaction_type, balance, bonus, bonus_random, \
                  reset, refer_link, is_auto_claim, is_vip_only, has_loss_requirement, \
                  has_topup_requirement, loss_req_percent, loss_req_amount, \
                  topup_req_amount, claim_type, raw_claim_config, raw_claim_condition) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, \
                     $16, $17, $18, $19, $20, $21, $22, $23, $24, $25, $26, $27, $28, $29)",
        )
        .bind(scrape_run_id)
        .bind(&bonus.url)
        .bind(&bonus.merchant_name)
        .bind(&bonus.id)
        .bind(&bonus.name)
        .bind(bonus.amount)
        .bind(bonus.rollover)
        .bind(bonus.bonus_fixed)
        .bind(bonus.min_withdraw)
        .bind(bonus.max_withdraw)
        .bind(bonus.withdraw_to_bonus_ratio)
        .bind(bonus.min_topup)
        .bind(bonus.max_topup)
        .bind(&bonus.transaction_type)
        .bind(&bonus.balance_mode)
        .bind(&bonus.bonus_mode)
        .bind(&bonus.bonus_random_mode)
        .bind(&bonus.reset_policy)
        .bind(&bonus.refer_link)
        .bind(bonus.is_auto_claim)
        .bind(bonus.is_vip_only)
        .bind(bonus.has_loss_requirement)
        .bind(bonus.has_topup_requirement)
        .bind(bonus.loss_req_percent)
        .bind(bonus.loss_req_amount)
        .bind(bonus.topup_req_amount)
        .bind(bonus.claim_type.map(|c| c.as_str()))
        .bind(&bonus.raw_claim_config)
        .bind(&bonus.raw_claim_condition)
        .execute(&mut *tx)
        .await?;

        written += result.rows_affected();
    }

    tx.commit().await?;
    Ok(written)
}
