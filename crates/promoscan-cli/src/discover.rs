//! `promoscan discover`: diagnostic for the merchant discovery step.

use anyhow::Context;
use promoscan_core::AppConfig;
use promoscan_scraper::{build_http_client, SessionAuthenticator, SiteRoot};

/// Fetches one site's landing page and prints the merchant id and name.
///
/// # Errors
///
/// Returns an error if the URL is invalid, the client cannot be built, or
/// discovery fails.
pub(crate) async fn run_discover(config: &AppConfig, url: &str) -> anyhow::Result<()> {
    let root = SiteRoot::parse(url)?;
    let client = build_http_client(config.request_timeout_secs, &config.user_agent)
        .context("failed to build HTTP client")?;

    let merchant = SessionAuthenticator::new(client)
        .discover(&root)
        .await
        .with_context(|| format!("discovery failed for {root}"))?;

    println!("site:          {root}");
    println!("merchant id:   {}", merchant.id);
    println!("merchant name: {}", merchant.name);
    println!("api endpoint:  {}", root.api_endpoint());
    Ok(())
}
