//! Application configuration loaded from environment variables.
//!
//! Loading is fail-fast: all missing required variables are collected and
//! reported together, so a fresh deployment surfaces every gap in one
//! error instead of one per restart.

use chrono::NaiveTime;
use std::env;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variables: {}", .0.join(", "))]
    MissingVars(Vec<String>),

    #[error("invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },

    #[error("failed to parse port: {0}")]
    InvalidPort(#[from] std::num::ParseIntError),
}

/// Application configuration.
#[derive(Clone)]
pub struct Config {
    /// PostgreSQL connection string
    pub database_url: String,

    /// Personal access token used for organization API calls
    pub github_token: String,

    /// Organization to invite purchasers into
    pub github_org: String,

    /// Override for the GitHub API base URL (testing)
    pub github_api_url: Option<String>,

    /// Feishu application id for tenant token exchange
    pub feishu_app_id: String,

    /// Feishu application secret for tenant token exchange
    pub feishu_app_secret: String,

    /// Spreadsheet token of the order sheet
    pub feishu_spreadsheet_token: String,

    /// Override for the Feishu API base URL (testing)
    pub feishu_base_url: Option<String>,

    /// Server bind address
    pub host: String,

    /// Server listen port
    pub port: u16,

    /// Tracing filter directive (e.g., "info,orgbot=debug")
    pub rust_log: String,

    /// Default range start cell for scheduled runs (e.g., "A2")
    pub sheet_range_start: String,

    /// Default range end cell for scheduled runs (e.g., "C1000")
    pub sheet_range_end: String,

    /// Daily UTC run times for the scheduled batch
    pub schedule_times: Vec<NaiveTime>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[redacted]")
            .field("github_token", &"[redacted]")
            .field("github_org", &self.github_org)
            .field("feishu_app_id", &self.feishu_app_id)
            .field("feishu_app_secret", &"[redacted]")
            .field("feishu_spreadsheet_token", &self.feishu_spreadsheet_token)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("sheet_range_start", &self.sheet_range_start)
            .field("sheet_range_end", &self.sheet_range_end)
            .field("schedule_times", &self.schedule_times)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingVars` listing every absent required
    /// variable, or an invalid-value error for a malformed optional one.
    ///
    /// # Required Variables
    ///
    /// - `DATABASE_URL` - PostgreSQL connection string
    /// - `GITHUB_TOKEN` - personal access token with org admin scope
    /// - `GITHUB_ORG` - organization login
    /// - `FEISHU_APP_ID` / `FEISHU_APP_SECRET` - tenant token credentials
    /// - `FEISHU_SPREADSHEET_TOKEN` - order spreadsheet token
    ///
    /// # Optional Variables
    ///
    /// - `HOST` - bind address (default: "0.0.0.0")
    /// - `PORT` - listen port (default: 8182)
    /// - `RUST_LOG` - log filter (default: "info")
    /// - `SHEET_RANGE_START` / `SHEET_RANGE_END` - scheduled-run range
    ///   (default: "A2" / "C1000")
    /// - `SCHEDULE_TIMES` - comma-separated HH:MM UTC times (default:
    ///   "03:00,15:00")
    /// - `GITHUB_API_URL` / `FEISHU_BASE_URL` - base URL overrides
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (development only)
        let _ = dotenvy::dotenv();

        let mut missing = Vec::new();
        let mut required = |name: &str| match env::var(name) {
            Ok(v) if !v.is_empty() => v,
            _ => {
                missing.push(name.to_string());
                String::new()
            }
        };

        let database_url = required("DATABASE_URL");
        let github_token = required("GITHUB_TOKEN");
        let github_org = required("GITHUB_ORG");
        let feishu_app_id = required("FEISHU_APP_ID");
        let feishu_app_secret = required("FEISHU_APP_SECRET");
        let feishu_spreadsheet_token = required("FEISHU_SPREADSHEET_TOKEN");

        if !missing.is_empty() {
            return Err(ConfigError::MissingVars(missing));
        }

        let github_api_url = env::var("GITHUB_API_URL").ok().filter(|s| !s.is_empty());
        let feishu_base_url = env::var("FEISHU_BASE_URL").ok().filter(|s| !s.is_empty());

        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port: u16 = env::var("PORT")
            .unwrap_or_else(|_| "8182".to_string())
            .parse()?;
        if port == 0 {
            return Err(ConfigError::InvalidValue {
                var: "PORT".to_string(),
                message: "port must be between 1 and 65535".to_string(),
            });
        }

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let sheet_range_start =
            env::var("SHEET_RANGE_START").unwrap_or_else(|_| "A2".to_string());
        let sheet_range_end = env::var("SHEET_RANGE_END").unwrap_or_else(|_| "C1000".to_string());

        let schedule_times = parse_schedule_times(
            &env::var("SCHEDULE_TIMES").unwrap_or_else(|_| "03:00,15:00".to_string()),
        )?;

        Ok(Config {
            database_url,
            github_token,
            github_org,
            github_api_url,
            feishu_app_id,
            feishu_app_secret,
            feishu_spreadsheet_token,
            feishu_base_url,
            host,
            port,
            rust_log,
            sheet_range_start,
            sheet_range_end,
            schedule_times,
        })
    }

    /// Get the server bind address as a socket address string.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Parse a comma-separated list of HH:MM times in UTC.
fn parse_schedule_times(value: &str) -> Result<Vec<NaiveTime>, ConfigError> {
    let mut times = Vec::new();
    for part in value.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let time =
            NaiveTime::parse_from_str(part, "%H:%M").map_err(|_| ConfigError::InvalidValue {
                var: "SCHEDULE_TIMES".to_string(),
                message: format!("'{part}' is not a valid HH:MM time"),
            })?;
        times.push(time);
    }
    if times.is_empty() {
        return Err(ConfigError::InvalidValue {
            var: "SCHEDULE_TIMES".to_string(),
            message: "at least one run time is required".to_string(),
        });
    }
    times.sort();
    times.dedup();
    Ok(times)
}
