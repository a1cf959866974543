use std::path::PathBuf;

/// Login credentials sent to every target site.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .finish()
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub credentials: Credentials,
    pub url_list_path: PathBuf,
    pub min_request_delay_secs: f64,
    pub max_request_delay_secs: f64,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub max_concurrent_sites: usize,
    pub run_timeout_secs: Option<u64>,
    pub csv_output_path: Option<PathBuf>,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub log_level: String,
    /// Extra log destination, appended to alongside the console.
    pub log_file: Option<PathBuf>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("credentials", &self.credentials)
            .field("url_list_path", &self.url_list_path)
            .field("min_request_delay_secs", &self.min_request_delay_secs)
            .field("max_request_delay_secs", &self.max_request_delay_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("max_concurrent_sites", &self.max_concurrent_sites)
            .field("run_timeout_secs", &self.run_timeout_secs)
            .field("csv_output_path", &self.csv_output_path)
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[redacted]"),
            )
            .field("db_max_connections", &self.db_max_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("log_level", &self.log_level)
            .field("log_file", &self.log_file)
            .finish()
    }
}
