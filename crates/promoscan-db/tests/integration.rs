//! Offline unit tests for promoscan-db pool configuration and row types.
//! These tests do not require a live database connection.

use std::path::PathBuf;

use promoscan_core::{AppConfig, Credentials};
use promoscan_db::{embedded_migration_count, NewScrapeRun, PoolConfig, ScrapeRunRow};

fn app_config() -> AppConfig {
    AppConfig {
        credentials: Credentials::new("60123456789", "hunter2"),
        url_list_path: PathBuf::from("./config/urls.txt"),
        min_request_delay_secs: 1.0,
        max_request_delay_secs: 3.0,
        request_timeout_secs: 15,
        user_agent: "ua".to_string(),
        max_concurrent_sites: 1,
        run_timeout_secs: None,
        csv_output_path: None,
        database_url: Some("postgres://example".to_string()),
        db_max_connections: 42,
        db_acquire_timeout_secs: 9,
        log_level: "info".to_string(),
        log_file: None,
    }
}

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let pool_config = PoolConfig::from_app_config(&app_config());
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 1);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

#[test]
fn pool_config_never_has_zero_connections() {
    let mut config = app_config();
    config.db_max_connections = 0;
    let pool_config = PoolConfig::from_app_config(&config);
    assert_eq!(pool_config.max_connections, 1);
    assert!(pool_config.min_connections <= pool_config.max_connections);
}

#[test]
fn initial_schema_migration_is_embedded() {
    assert!(embedded_migration_count() >= 1);
}

/// Compile-time smoke test: confirm that [`ScrapeRunRow`] has all expected
/// fields with the correct types. No database required.
#[test]
fn scrape_run_row_has_expected_fields() {
    use chrono::Utc;
    use uuid::Uuid;

    let now = Utc::now();
    let row = ScrapeRunRow {
        id: 1_i64,
        public_id: Uuid::new_v4(),
        sites_total: 3_i32,
        sites_attempted: 3,
        sites_succeeded: 2,
        sites_failed: 1,
        sites_skipped: 0,
        bonuses_found: 12,
        started_at: now,
        completed_at: now,
        created_at: now,
    };

    assert_eq!(row.id, 1);
    assert_eq!(row.sites_attempted, row.sites_succeeded + row.sites_failed);
    assert_eq!(row.bonuses_found, 12);
}

#[test]
fn new_scrape_run_is_plain_data() {
    use chrono::Utc;

    let now = Utc::now();
    let run = NewScrapeRun {
        started_at: now,
        completed_at: now,
        sites_total: 3,
        sites_attempted: 3,
        sites_succeeded: 2,
        sites_failed: 1,
        sites_skipped: 0,
        bonuses_found: 4,
    };
    assert_eq!(run.clone(), run);
}
