//! Server configuration

use chrono::NaiveDate;

/// Server configuration loaded from environment variables
pub struct Config {
    pub bind_address: String,
    /// Allowed CORS origins; `*` allows any
    pub cors_origins: Vec<String>,
    pub rate_limit_rps: u32,
    /// Fixed date for age calculations; the current date when unset
    pub reference_date: Option<NaiveDate>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            bind_address: std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8000".into()),
            cors_origins: std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:3000".into())
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect(),
            rate_limit_rps: std::env::var("RATE_LIMIT_RPS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(100),
            reference_date: std::env::var("REFERENCE_DATE")
                .ok()
                .and_then(|v| v.parse().ok()),
        }
    }
}
