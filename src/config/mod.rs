//! Configuration module for the SidingOps backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Maximum number of entries returned by the backup history list
    pub backup_history_limit: i64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let db_path = env::var("SIDINGOPS_DB_PATH")
            .unwrap_or_else(|_| "./data/sidingops.sqlite".to_string())
            .into();

        let bind_addr = env::var("SIDINGOPS_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .expect("Invalid SIDINGOPS_BIND_ADDR format");

        let log_level = env::var("SIDINGOPS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let backup_history_limit = env::var("SIDINGOPS_BACKUP_HISTORY_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|n| *n > 0)
            .unwrap_or(5);

        Self {
            db_path,
            bind_addr,
            log_level,
            backup_history_limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        // Clear any existing env vars
        env::remove_var("SIDINGOPS_DB_PATH");
        env::remove_var("SIDINGOPS_BIND_ADDR");
        env::remove_var("SIDINGOPS_LOG_LEVEL");
        env::remove_var("SIDINGOPS_BACKUP_HISTORY_LIMIT");

        let config = Config::from_env();

        assert_eq!(config.db_path, PathBuf::from("./data/sidingops.sqlite"));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.backup_history_limit, 5);
    }
}
