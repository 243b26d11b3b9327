//! Application configuration loaded from environment variables.

use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use serde::Deserialize;
use url::Url;

/// Application configuration loaded from environment variables.
#[derive(Clone, Deserialize)]
pub struct Config {
    // === Database ===
    /// PostgreSQL host.
    #[serde(default = "default_db_host")]
    pub db_host: String,

    /// PostgreSQL port.
    #[serde(default = "default_db_port")]
    pub db_port: u16,

    /// Database name.
    #[serde(default = "default_db_name")]
    pub db_name: String,

    /// Database user.
    #[serde(default = "default_db_user")]
    pub db_user: String,

    /// Database password.
    #[serde(default = "default_db_password")]
    pub db_password: String,

    /// Upper bound for opening a connection and for each statement.
    #[serde(default = "default_db_timeout_ms")]
    pub db_timeout_ms: u64,

    // === Audit Service ===
    /// Base URL of the audit collector.
    #[serde(default = "default_audit_url")]
    pub audit_service_url: String,

    /// Audit request timeout.
    #[serde(default = "default_audit_timeout_ms")]
    pub audit_timeout_ms: u64,

    // === Server Configuration ===
    /// Listen address.
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,

    /// Emit log lines as JSON.
    #[serde(default)]
    pub log_json: bool,
}

fn default_db_host() -> String {
    "localhost".to_string()
}

fn default_db_port() -> u16 {
    5432
}

fn default_db_name() -> String {
    "itemsdb".to_string()
}

fn default_db_user() -> String {
    "postgres".to_string()
}

fn default_db_password() -> String {
    "password".to_string()
}

fn default_db_timeout_ms() -> u64 {
    5000
}

fn default_audit_url() -> String {
    "http://audit-service:8081".to_string()
}

fn default_audit_timeout_ms() -> u64 {
    2000
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_host: default_db_host(),
            db_port: default_db_port(),
            db_name: default_db_name(),
            db_user: default_db_user(),
            db_password: default_db_password(),
            db_timeout_ms: default_db_timeout_ms(),
            audit_service_url: default_audit_url(),
            audit_timeout_ms: default_audit_timeout_ms(),
            host: default_host(),
            port: default_port(),
            rust_log: default_log_level(),
            log_json: false,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("db_host", &self.db_host)
            .field("db_port", &self.db_port)
            .field("db_name", &self.db_name)
            .field("db_user", &self.db_user)
            .field("db_password", &"********")
            .field("db_timeout_ms", &self.db_timeout_ms)
            .field("audit_service_url", &self.audit_service_url)
            .field("audit_timeout_ms", &self.audit_timeout_ms)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("rust_log", &self.rust_log)
            .field("log_json", &self.log_json)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        if self.db_host.is_empty() {
            return Err("DB_HOST must not be empty".to_string());
        }

        if self.db_name.is_empty() {
            return Err("DB_NAME must not be empty".to_string());
        }

        if self.db_user.is_empty() {
            return Err("DB_USER must not be empty".to_string());
        }

        if self.db_port == 0 {
            return Err("DB_PORT must be non-zero".to_string());
        }

        if self.db_timeout_ms == 0 {
            return Err("DB_TIMEOUT_MS must be greater than 0".to_string());
        }

        if self.audit_timeout_ms == 0 {
            return Err("AUDIT_TIMEOUT_MS must be greater than 0".to_string());
        }

        match Url::parse(&self.audit_service_url) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
            Ok(url) => {
                return Err(format!(
                    "AUDIT_SERVICE_URL must use http or https, got {}",
                    url.scheme()
                ))
            }
            Err(e) => return Err(format!("AUDIT_SERVICE_URL is invalid: {}", e)),
        }

        self.listen_addr()?;

        Ok(())
    }

    /// Socket address the HTTP server binds to.
    pub fn listen_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| format!("HOST/PORT do not form a socket address: {}", e))
    }

    /// Full URL of the audit log endpoint.
    pub fn audit_log_url(&self) -> String {
        format!("{}/audit/log", self.audit_service_url.trim_end_matches('/'))
    }

    /// Database timeout as a [`Duration`].
    pub fn db_timeout(&self) -> Duration {
        Duration::from_millis(self.db_timeout_ms)
    }

    /// Audit request timeout as a [`Duration`].
    pub fn audit_timeout(&self) -> Duration {
        Duration::from_millis(self.audit_timeout_ms)
    }
}
