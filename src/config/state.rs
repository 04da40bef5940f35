// Application state
// Immutable per-process state shared across all connections

use std::time::Duration;

use crate::config::Config;
use crate::routes::RouteTable;

/// Shared application state
///
/// Built once at startup and never mutated; requests only read from it, so
/// no locking is needed.
pub struct AppState {
    pub config: Config,
    pub routes: RouteTable,
}

impl AppState {
    /// Build state from loaded configuration
    ///
    /// Panics if the fixed asset route prefix is malformed (programmer
    /// error, fail fast before serving).
    pub fn new(config: &Config) -> Self {
        let routes = RouteTable::for_dist(std::path::Path::new(&config.site.dist_dir));
        Self {
            config: config.clone(),
            routes,
        }
    }

    /// Per-request budget from configuration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.config.performance.request_timeout)
    }
}
