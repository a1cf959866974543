//! Output sinks fed with a finished [`RunResult`].

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};
use promoscan_core::{AppConfig, NormalizedBonus};
use promoscan_scraper::RunResult;

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Writes one RFC 4180 row.
pub(crate) fn write_row<W: Write, S: AsRef<str>>(w: &mut W, row: &[S]) -> io::Result<()> {
    for (i, cell) in row.iter().enumerate() {
        if i > 0 {
            w.write_all(b",")?;
        }
        let cell = cell.as_ref();
        if needs_quotes(cell) {
            write!(w, "\"{}\"", cell.replace('"', "\"\""))?;
        } else {
            w.write_all(cell.as_bytes())?;
        }
    }
    w.write_all(b"\r\n")
}

/// Writes the header and one row per bonus.
pub(crate) fn write_bonuses_csv<W: Write>(
    w: &mut W,
    bonuses: &[NormalizedBonus],
) -> io::Result<()> {
    write_row(w, &NormalizedBonus::CSV_HEADER)?;
    for bonus in bonuses {
        write_row(w, &bonus.csv_row())?;
    }
    w.flush()
}

/// Creates (or truncates) `path` and writes every bonus to it, creating
/// parent directories first.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be created or written.
pub(crate) fn write_csv_file(path: &Path, bonuses: &[NormalizedBonus]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write_bonuses_csv(&mut writer, bonuses)
        .with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), count = bonuses.len(), "bonuses written to CSV");
    Ok(())
}

/// Connects, migrates, and stores the run summary plus every bonus.
///
/// # Errors
///
/// Returns an error if the connection, a migration, or any insert fails.
pub(crate) async fn persist_run(
    config: &AppConfig,
    result: &RunResult,
    sites_total: usize,
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
) -> anyhow::Result<()> {
    let pool = promoscan_db::connect_pool_from_config(config)
        .await
        .context("failed to connect to database")?;
    let applied = promoscan_db::run_migrations(&pool)
        .await
        .context("failed to run database migrations")?;
    if applied > 0 {
        tracing::info!(applied, "database migrations applied");
    }

    let run = promoscan_db::NewScrapeRun {
        started_at,
        completed_at,
        sites_total,
        sites_attempted: result.attempted(),
        sites_succeeded: result.succeeded(),
        sites_failed: result.failed_count,
        sites_skipped: result.skipped.len(),
        bonuses_found: result.total_bonuses(),
    };
    let row = promoscan_db::record_scrape_run(&pool, &run)
        .await
        .context("failed to record scrape run")?;
    let written = promoscan_db::insert_bonuses(&pool, row.id, &result.bonuses)
        .await
        .context("failed to insert bonuses")?;

    tracing::info!(run_id = %row.public_id, rows = written, "bonuses written to database");
    Ok(())
}
