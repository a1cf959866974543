use crate::app_config::{AppConfig, Credentials};
use crate::ConfigError;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var).ok().filter(|v| !v.trim().is_empty())
    };

    let or_default = |var: &str, default: &str| -> String {
        optional(var).unwrap_or_else(|| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .trim()
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .trim()
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .trim()
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_delay = |var: &str, default: &str| -> Result<f64, ConfigError> {
        let value = or_default(var, default)
            .trim()
            .parse::<f64>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if !value.is_finite() || value < 0.0 {
            return Err(invalid(
                var,
                format!("delay must be a finite, non-negative number of seconds (got {value})"),
            ));
        }
        Ok(value)
    };

    let username = require("PROMOSCAN_USERNAME")?;
    let password = require("PROMOSCAN_PASSWORD")?;

    let url_list_path = PathBuf::from(or_default("PROMOSCAN_URL_LIST_PATH", "./config/urls.txt"));

    let min_request_delay_secs = parse_delay("PROMOSCAN_MIN_REQUEST_DELAY_SECS", "1.0")?;
    let max_request_delay_secs = parse_delay("PROMOSCAN_MAX_REQUEST_DELAY_SECS", "3.0")?;
    if min_request_delay_secs > max_request_delay_secs {
        return Err(ConfigError::Validation(format!(
            "PROMOSCAN_MIN_REQUEST_DELAY_SECS ({min_request_delay_secs}) must not exceed \
             PROMOSCAN_MAX_REQUEST_DELAY_SECS ({max_request_delay_secs})"
        )));
    }

    let request_timeout_secs = parse_u64("PROMOSCAN_REQUEST_TIMEOUT_SECS", "15")?;
    let user_agent = or_default("PROMOSCAN_USER_AGENT", DEFAULT_USER_AGENT);
    let max_concurrent_sites = parse_usize("PROMOSCAN_MAX_CONCURRENT_SITES", "1")?;

    let run_timeout_secs = optional("PROMOSCAN_RUN_TIMEOUT_SECS")
        .map(|raw| {
            raw.trim()
                .parse::<u64>()
                .map_err(|e| invalid("PROMOSCAN_RUN_TIMEOUT_SECS", e.to_string()))
        })
        .transpose()?;

    let csv_output_path = optional("PROMOSCAN_CSV_OUTPUT_PATH").map(PathBuf::from);
    let database_url = optional("DATABASE_URL");
    let db_max_connections = parse_u32("PROMOSCAN_DB_MAX_CONNECTIONS", "5")?;
    let db_acquire_timeout_secs = parse_u64("PROMOSCAN_DB_ACQUIRE_TIMEOUT_SECS", "10")?;
    let log_level = or_default("PROMOSCAN_LOG_LEVEL", "info");
    let log_file = optional("PROMOSCAN_LOG_FILE").map(PathBuf::from);

    Ok(AppConfig {
        credentials: Credentials { username, password },
        url_list_path,
        min_request_delay_secs,
        max_request_delay_secs,
        request_timeout_secs,
        user_agent,
        max_concurrent_sites,
        run_timeout_secs,
        csv_output_path,
        database_url,
        db_max_connections,
        db_acquire_timeout_secs,
        log_level,
        log_file,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
