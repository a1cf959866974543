//! Database operations for `scrape_runs`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `scrape_runs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ScrapeRunRow {
    pub id: i64,
    pub public_id: Uuid,
    pub sites_total: i32,
    pub sites_attempted: i32,
    pub sites_succeeded: i32,
    pub sites_failed: i32,
    pub sites_skipped: i32,
    pub bonuses_found: i32,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Summary of a finished run, as handed over by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewScrapeRun {
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub sites_total: usize,
    pub sites_attempted: usize,
    pub sites_succeeded: usize,
    pub sites_failed: usize,
    pub sites_skipped: usize,
    pub bonuses_found: usize,
}

impl NewScrapeRun {
    /// Counts in column order, narrowed to `INTEGER`.
    fn column_counts(&self) -> Result<[i32; 6], DbError> {
        let narrow = |field: &'static str, value: usize| {
            i32::try_from(value).map_err(|_| DbError::CountOverflow { field, value })
        };
        Ok([
            narrow("sites_total", self.sites_total)?,
            narrow("sites_attempted", self.sites_attempted)?,
            narrow("sites_succeeded", self.sites_succeeded)?,
            narrow("sites_failed", self.sites_failed)?,
            narrow("sites_skipped", self.sites_skipped)?,
            narrow("bonuses_found", self.bonuses_found)?,
        ])
    }
}

/// Inserts the run summary and returns the stored row.
///
/// Generates a UUID in Rust and binds it to `public_id`.
///
/// # Errors
///
/// Returns [`DbError::CountOverflow`] if a count exceeds `i32::MAX`, or
/// [`DbError::Sqlx`] if the insert fails.
pub async fn record_scrape_run(
    pool: &PgPool,
    run: &NewScrapeRun,
) -> Result<ScrapeRunRow, DbError> {
    let [total, attempted, succeeded, failed, skipped, bonuses] = run.column_counts()?;
    let public_id = Uuid::new_v4();

    let row = sqlx::query_as::<_, ScrapeRunRow>(
        "INSERT INTO scrape_runs \
             (public_id, sites_total, sites_attempted, sites_succeeded, sites_failed, \
              sites_skipped, bonuses_found, started_at, completed_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
         RETURNING id, public_id, sites_total, sites_attempted, sites_succeeded, \
                   sites_failed, sites_skipped, bonuses_found, started_at, completed_at, \
                   created_at",
    )
    .bind(public_id)
    .bind(total)
    .bind(attempted)
    .bind(succeeded)
    .bind(failed)
    .bind(skipped)
    .bind(bonuses)
    .bind(run.started_at)
    .bind(run.completed_at)
    .fetch_one(pool)
    .await?;

    Ok(row)
}
