//! Console progress reporting for `promoscan run`.

use std::sync::atomic::{AtomicUsize, Ordering};

use promoscan_scraper::{ProgressSink, RunResult, SiteOutcome};

/// Prints one line per processed site and a closing summary to stdout.
#[derive(Debug, Default)]
pub(crate) struct ConsoleProgress {
    total: AtomicUsize,
    processed: AtomicUsize,
}

impl ProgressSink for ConsoleProgress {
    fn on_run_started(&self, total: usize) {
        self.total.store(total, Ordering::Relaxed);
        println!("Starting scrape of {total} URLs...");
    }

    fn on_site_processed(&self, outcome: &SiteOutcome) {
        let n = self.processed.fetch_add(1, Ordering::Relaxed) + 1;
        let total = self.total.load(Ordering::Relaxed);
        println!("{}", progress_line(n, total, outcome));
    }

    fn on_run_finished(&self, result: &RunResult) {
        println!("{}", summary(result));
    }
}

pub(crate) fn progress_line(n: usize, total: usize, outcome: &SiteOutcome) -> String {
    let status = if outcome.succeeded { "SUCCESS" } else { "FAIL" };
    format!(
        "[{n}/{total}] {status:<8} | Bonuses: {:<4} | URL: {}",
        outcome.bonuses_found, outcome.url
    )
}

pub(crate) fn summary(result: &RunResult) -> String {
    let rule = "=".repeat(40);
    let mut lines = vec![
        String::new(),
        rule.clone(),
        "Scraping Complete".to_owned(),
        format!("Total Bonuses Found: {}", result.total_bonuses()),
        format!("Successful Sites: {}", result.succeeded()),
        format!("Failed Sites: {}", result.failed_count),
    ];
    if !result.skipped.is_empty() {
        lines.push(format!("Skipped Sites: {}", result.skipped.len()));
    }
    lines.push(rule);
    lines.join("\n")
}
