//! Per-site orchestration: pace, authenticate, pace, fetch, normalize.
//!
//! Each site runs to completion or to its first failure on its own; a failed
//! site contributes no bonuses and never stops the run. Sites are drained by
//! a bounded pool of `max_concurrent_sites` workers and every result passes
//! through a single aggregator loop, so appends to [`RunResult`] are
//! serialized. Append order follows completion, not input order.

use std::time::Duration;

use futures::stream::{self, StreamExt};
use promoscan_core::{Credentials, NormalizedBonus};
use reqwest::Client;
use tokio::time::Instant;

use crate::error::{FailureKind, ScraperError};
use crate::fetch::BonusFetcher;
use crate::http::SiteRoot;
use crate::normalize::normalize_bonuses;
use crate::pacer::{HostPacers, PacingBounds};
use crate::session::SessionAuthenticator;

/// Furthest point a site reached in its sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteStage {
    Start,
    /// Delay before discovery has elapsed.
    Paced,
    Authenticated,
    /// Delay before the bonus sync has elapsed.
    Paced2,
    Fetched,
    Normalized,
    Done,
}

impl SiteStage {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SiteStage::Start => "start",
            SiteStage::Paced => "paced",
            SiteStage::Authenticated => "authenticated",
            SiteStage::Paced2 => "paced2",
            SiteStage::Fetched => "fetched",
            SiteStage::Normalized => "normalized",
            SiteStage::Done => "done",
        }
    }
}

impl std::fmt::Display for SiteStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a site failed and how far it got first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteFailure {
    pub kind: FailureKind,
    pub stage: SiteStage,
    pub message: String,
}

/// Result of processing one configured URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteOutcome {
    pub url: String,
    pub succeeded: bool,
    pub bonuses_found: usize,
    pub failure: Option<SiteFailure>,
}

impl SiteOutcome {
    fn success(url: &str, bonuses_found: usize) -> Self {
        Self {
            url: url.to_owned(),
            succeeded: true,
            bonuses_found,
            failure: None,
        }
    }

    fn failed(url: &str, stage: SiteStage, err: &ScraperError) -> Self {
        Self {
            url: url.to_owned(),
            succeeded: false,
            bonuses_found: 0,
            failure: Some(SiteFailure {
                kind: err.kind(),
                stage,
                message: err.to_string(),
            }),
        }
    }
}

/// Aggregate of a whole run.
#[derive(Debug, Clone, Default)]
pub struct RunResult {
    /// One entry per attempted URL, in completion order.
    pub outcomes: Vec<SiteOutcome>,
    /// Every normalized bonus from every successful site.
    pub bonuses: Vec<NormalizedBonus>,
    /// Number of attempted URLs that failed.
    pub failed_count: usize,
    /// URLs never started because the run deadline had passed.
    pub skipped: Vec<String>,
}

impl RunResult {
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }

    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.succeeded).count()
    }

    #[must_use]
    pub fn total_bonuses(&self) -> usize {
        self.bonuses.len()
    }

    fn record(&mut self, outcome: SiteOutcome, bonuses: Vec<NormalizedBonus>) {
        if !outcome.succeeded {
            self.failed_count += 1;
        }
        self.outcomes.push(outcome);
        self.bonuses.extend(bonuses);
    }
}

/// Caller-owned progress reporting.
///
/// `on_site_processed` is called from the aggregator loop only, one site at
/// a time. `on_stage_reached` is called from the workers and may interleave
/// across sites.
pub trait ProgressSink: Send + Sync {
    fn on_run_started(&self, _total: usize) {}

    fn on_stage_reached(&self, _site: &str, _stage: SiteStage) {}

    fn on_site_processed(&self, outcome: &SiteOutcome);

    fn on_run_finished(&self, _result: &RunResult) {}
}

/// Sink that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn on_site_processed(&self, _outcome: &SiteOutcome) {}
}

/// Run-wide settings for [`Pipeline`].
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub pacing: PacingBounds,
    /// Worker pool size; `1` processes sites strictly one after another.
    pub max_concurrent_sites: usize,
    /// Once elapsed, no further sites are started. In-flight sites finish.
    pub run_timeout: Option<Duration>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            pacing: PacingBounds::from_secs(1.0, 3.0),
            max_concurrent_sites: 1,
            run_timeout: None,
        }
    }
}

enum SiteRun {
    Processed(SiteOutcome, Vec<NormalizedBonus>),
    Skipped(String),
}

/// Drives the per-site sequence over a list of URLs.
#[derive(Debug)]
pub struct Pipeline {
    authenticator: SessionAuthenticator,
    fetcher: BonusFetcher,
    config: PipelineConfig,
    pacers: HostPacers,
}

impl Pipeline {
    #[must_use]
    pub fn new(
        authenticator: SessionAuthenticator,
        fetcher: BonusFetcher,
        config: PipelineConfig,
    ) -> Self {
        let pacers = HostPacers::new(config.pacing);
        Self {
            authenticator,
            fetcher,
            config,
            pacers,
        }
    }

    /// Builds the authenticator and fetcher around one shared client.
    #[must_use]
    pub fn from_client(client: Client, config: PipelineConfig) -> Self {
        Self::new(
            SessionAuthenticator::new(client.clone()),
            BonusFetcher::new(client),
            config,
        )
    }

    /// Per-host pacing state, for telemetry.
    #[must_use]
    pub fn host_pacers(&self) -> &HostPacers {
        &self.pacers
    }

    /// Processes every URL and returns the aggregate. Never fails: site
    /// errors are recorded in the returned [`RunResult`].
    ///
    /// Outcomes and bonuses carry the derived site root, not the configured
    /// URL string; skipped entries keep the configured string.
    pub async fn run(
        &self,
        urls: &[String],
        credentials: &Credentials,
        progress: &dyn ProgressSink,
    ) -> RunResult {
        let workers = self.config.max_concurrent_sites.max(1);
        // A timeout too large to represent means no deadline.
        let deadline = self
            .config
            .run_timeout
            .and_then(|t| Instant::now().checked_add(t));

        tracing::info!(sites = urls.len(), workers, "scrape run started");
        progress.on_run_started(urls.len());

        let mut sites = stream::iter(urls.iter().cloned())
            .map(|url| async move {
                if deadline.is_some_and(|d| Instant::now() >= d) {
                    return SiteRun::Skipped(url);
                }
                let (outcome, bonuses) = self.process_site(&url, credentials, progress).await;
                SiteRun::Processed(outcome, bonuses)
            })
            .buffer_unordered(workers);

        let mut result = RunResult::default();
        while let Some(site) = sites.next().await {
            match site {
                SiteRun::Processed(outcome, bonuses) => {
                    progress.on_site_processed(&outcome);
                    result.record(outcome, bonuses);
                }
                SiteRun::Skipped(url) => {
                    tracing::warn!(url = %url, "run deadline passed; site not started");
                    result.skipped.push(url);
                }
            }
        }

        tracing::info!(
            attempted = result.attempted(),
            succeeded = result.succeeded(),
            failed = result.failed_count,
            skipped = result.skipped.len(),
            bonuses = result.total_bonuses(),
            "scrape run finished"
        );
        progress.on_run_finished(&result);
        result
    }

    async fn process_site(
        &self,
        url: &str,
        credentials: &Credentials,
        progress: &dyn ProgressSink,
    ) -> (SiteOutcome, Vec<NormalizedBonus>) {
        let root = match SiteRoot::parse(url) {
            Ok(root) => root,
            Err(e) => {
                tracing::warn!(url, kind = %e.kind(), error = %e, "site url rejected");
                return (SiteOutcome::failed(url, SiteStage::Start, &e), Vec::new());
            }
        };

        let mut tracker = StageTracker {
            site: root.as_str(),
            stage: SiteStage::Start,
            progress,
        };
        match self.run_site(&root, credentials, &mut tracker).await {
            Ok(bonuses) => {
                tracing::info!(url = root.as_str(), count = bonuses.len(), "site processed");
                (SiteOutcome::success(root.as_str(), bonuses.len()), bonuses)
            }
            Err(e) => {
                tracing::warn!(
                    url = root.as_str(),
                    stage = %tracker.stage,
                    kind = %e.kind(),
                    error = %e,
                    "site failed"
                );
                (
                    SiteOutcome::failed(root.as_str(), tracker.stage, &e),
                    Vec::new(),
                )
            }
        }
    }

    async fn run_site(
        &self,
        root: &SiteRoot,
        credentials: &Credentials,
        tracker: &mut StageTracker<'_>,
    ) -> Result<Vec<NormalizedBonus>, ScraperError> {
        let pacer = self.pacers.for_host(root.authority());

        pacer.pace().await;
        tracker.advance(SiteStage::Paced);

        let credential = self
            .authenticator
            .authenticate(root, credentials, &pacer)
            .await?;
        tracker.advance(SiteStage::Authenticated);

        pacer.pace().await;
        tracker.advance(SiteStage::Paced2);

        let merchant_name = credential.merchant_name().to_owned();
        let records = self.fetcher.fetch(credential).await?;
        tracker.advance(SiteStage::Fetched);

        let bonuses = normalize_bonuses(records, root.as_str(), &merchant_name);
        tracker.advance(SiteStage::Normalized);

        tracker.advance(SiteStage::Done);
        Ok(bonuses)
    }
}

/// Current stage of one site, reported to the progress sink on each change.
struct StageTracker<'a> {
    site: &'a str,
    stage: SiteStage,
    progress: &'a dyn ProgressSink,
}

impl StageTracker<'_> {
    fn advance(&mut self, next: SiteStage) {
        self.stage = next;
        tracing::debug!(url = self.site, stage = %next, "site stage reached");
        self.progress.on_stage_reached(self.site, next);
    }
}
