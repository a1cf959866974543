//! `promoscan run`: load the site list, drive the pipeline, feed the sinks.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use promoscan_core::AppConfig;
use promoscan_scraper::{build_http_client, PacingBounds, Pipeline, PipelineConfig, RunResult};

use crate::progress::ConsoleProgress;
use crate::sinks;

/// Command-line values that take precedence over the environment.
#[derive(Debug, Default)]
pub(crate) struct RunOverrides {
    pub url_list_path: Option<PathBuf>,
    pub csv_output_path: Option<PathBuf>,
    pub no_db: bool,
    pub max_concurrent_sites: Option<usize>,
}

impl RunOverrides {
    pub(crate) fn apply(self, mut config: AppConfig) -> AppConfig {
        if let Some(path) = self.url_list_path {
            config.url_list_path = path;
        }
        if let Some(path) = self.csv_output_path {
            config.csv_output_path = Some(path);
        }
        if self.no_db {
            config.database_url = None;
        }
        if let Some(n) = self.max_concurrent_sites {
            config.max_concurrent_sites = n.max(1);
        }
        config
    }
}

pub(crate) fn pipeline_config(config: &AppConfig) -> PipelineConfig {
    PipelineConfig {
        pacing: PacingBounds::from_secs(
            config.min_request_delay_secs,
            config.max_request_delay_secs,
        ),
        max_concurrent_sites: config.max_concurrent_sites.max(1),
        run_timeout: config.run_timeout_secs.map(Duration::from_secs),
    }
}

/// Runs the full scrape and writes every enabled sink.
///
/// # Errors
///
/// Returns an error if the site list cannot be read, the HTTP client cannot
/// be built, a sink fails, or every attempted site failed. Individual site
/// failures are reported through the progress sink, not returned.
pub(crate) async fn run_scrape(config: AppConfig) -> anyhow::Result<()> {
    let urls = promoscan_core::load_site_urls(&config.url_list_path)?;
    if urls.is_empty() {
        tracing::warn!(path = %config.url_list_path.display(), "site list is empty");
        println!("No URLs to scrape in {}", config.url_list_path.display());
        return Ok(());
    }

    let client = build_http_client(config.request_timeout_secs, &config.user_agent)
        .context("failed to build HTTP client")?;
    let pipeline = Pipeline::from_client(client, pipeline_config(&config));

    let started_at = Utc::now();
    let result = pipeline
        .run(&urls, &config.credentials, &ConsoleProgress::default())
        .await;
    let completed_at = Utc::now();

    if let Some(path) = &config.csv_output_path {
        sinks::write_csv_file(path, &result.bonuses)?;
    }
    if config.database_url.is_some() {
        sinks::persist_run(&config, &result, urls.len(), started_at, completed_at).await?;
    }

    check_outcome(&result)
}

/// Fails the command only when sites were attempted and none succeeded.
fn check_outcome(result: &RunResult) -> anyhow::Result<()> {
    let attempted = result.attempted();
    if attempted > 0 && result.failed_count == attempted {
        anyhow::bail!("all {attempted} attempted sites failed");
    }
    Ok(())
}
