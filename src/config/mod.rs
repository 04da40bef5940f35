// Configuration module entry point
// Loads application configuration and holds immutable per-process state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{Config, LoggingConfig, PerformanceConfig, ServerConfig, SiteConfig};

impl Config {
    /// Load configuration from the default `config.toml` (optional) plus
    /// `SITE_*` environment variables (`__` separates nesting, so
    /// `SITE_SERVER__PORT` maps to `server.port` and `SITE_SITE__DIST_DIR`
    /// to `site.dist_dir`).
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from specified file path (without extension)
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("SITE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .set_default("site.dist_dir", "../ui/dist")?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "common")?
            .set_default("performance.request_timeout", 60)?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Tests mutating process environment must not interleave with tests
    // reading the defaults
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_defaults() {
        let _guard = ENV_LOCK.lock().unwrap();
        let cfg = Config::load_from("no-such-config-file").expect("defaults should load");
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.server.port, 8000);
        assert_eq!(cfg.site.dist_dir, "../ui/dist");
        assert_eq!(cfg.performance.request_timeout, 60);
        assert!(cfg.logging.access_log);
        assert!(cfg.server.workers.is_none());
        assert!(cfg.performance.max_connections.is_none());
    }

    #[test]
    fn test_socket_addr() {
        let _guard = ENV_LOCK.lock().unwrap();
        let cfg = Config::load_from("no-such-config-file").expect("defaults should load");
        let addr = cfg.get_socket_addr().expect("valid address");
        assert_eq!(addr.port(), 8000);
    }

    #[test]
    fn test_env_overrides_reach_nested_keys() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var("SITE_SERVER__PORT", "9321");
        std::env::set_var("SITE_SITE__DIST_DIR", "/srv/site/dist");
        let cfg = Config::load_from("no-such-config-file").expect("defaults should load");
        std::env::remove_var("SITE_SERVER__PORT");
        std::env::remove_var("SITE_SITE__DIST_DIR");

        assert_eq!(cfg.server.port, 9321);
        // Underscores inside a key survive the `__` nesting separator
        assert_eq!(cfg.site.dist_dir, "/srv/site/dist");
    }
}
