use serde::Deserialize;

/// Top-level application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub site: SiteConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Location of the pre-built site on disk
///
/// The dist root defaults to the sibling build directory the original layout
/// assumes (`../ui/dist`, relative to the working directory), but is
/// configurable because the relative default breaks when the server is
/// launched from elsewhere.
#[derive(Debug, Deserialize, Clone)]
pub struct SiteConfig {
    pub dist_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    pub access_log_format: String,
    pub access_log_file: Option<String>,
    pub error_log_file: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    /// Per-request budget in seconds
    pub request_timeout: u64,
    pub max_connections: Option<u64>,
}
