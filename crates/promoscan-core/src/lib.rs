mod app_config;
mod bonus;
mod config;
mod sites;

pub use app_config::{AppConfig, Credentials};
pub use bonus::{ClaimType, NormalizedBonus};
pub use config::{load_app_config, load_app_config_from_env};
pub use sites::{load_site_urls, parse_site_list};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read URL list {path}: {source}")]
    UrlListIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration validation failed: {0}")]
    Validation(String),
}
