//! Configuration module for the back-office backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Pre-shared key for API authentication (required in production)
    pub api_psk: Option<String>,
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Application title served by /api/variables/title. Read once at
    /// startup and held for the process lifetime.
    pub app_title: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let api_psk = env::var("ADMIN_API_PSK").ok();

        let db_path = env::var("ADMIN_DB_PATH")
            .unwrap_or_else(|_| "./data/app.sqlite".to_string())
            .into();

        let bind_addr = env::var("ADMIN_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .expect("Invalid ADMIN_BIND_ADDR format");

        let log_level = env::var("ADMIN_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let app_title = env::var("ADMIN_APP_TITLE").unwrap_or_else(|_| "Back Office".to_string());

        Self {
            api_psk,
            db_path,
            bind_addr,
            log_level,
            app_title,
        }
    }
}
