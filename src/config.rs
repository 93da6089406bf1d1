//! Startup configuration from the process environment (and `.env`).

use crate::error::ConfigError;
use crate::middleware::{HttpLimits, DEFAULT_BODY_LIMIT};
use std::str::FromStr;
use std::time::Duration;
use tracing::Level;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
    /// Maximum request body size in bytes.
    pub body_limit: usize,
}

impl ServerConfig {
    /// Upper bound for one request: reading it, then producing the response.
    pub fn request_timeout(&self) -> Duration {
        self.read_timeout + self.write_timeout
    }

    pub fn limits(&self) -> HttpLimits {
        HttpLimits {
            request_timeout: self.request_timeout(),
            body_limit: self.body_limit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Collector endpoint. Reporting is disabled when unset.
    pub dsn: Option<String>,
    pub environment: String,
    pub flush_timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub log_level: Level,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Load `.env` if present, then read the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let log_level = get("LOG_LEVEL")
            .and_then(|v| Level::from_str(&v).ok())
            .unwrap_or(Level::DEBUG);

        let server = ServerConfig {
            port: parse_or(&get, "SERVER_PORT", 8080)?,
            read_timeout: Duration::from_secs(parse_or(&get, "SERVER_READ_TIMEOUT", 30)?),
            write_timeout: Duration::from_secs(parse_or(&get, "SERVER_WRITE_TIMEOUT", 30)?),
            body_limit: parse_or(&get, "SERVER_BODY_LIMIT", DEFAULT_BODY_LIMIT)?,
        };

        let url = match get("DATABASE_URL") {
            Some(url) => url,
            None => database_url(&get)?,
        };
        let database = DatabaseConfig {
            url,
            max_connections: parse_or(&get, "DB_MAX_CONNECTIONS", 5)?,
        };

        let telemetry = TelemetryConfig {
            dsn: get("TELEMETRY_DSN"),
            environment: get("TELEMETRY_ENV").unwrap_or_else(|| "development".into()),
            flush_timeout: Duration::from_secs(parse_or(&get, "TELEMETRY_FLUSH_TIMEOUT", 5)?),
        };

        Ok(Self {
            log_level,
            server,
            database,
            telemetry,
        })
    }
}

/// `postgresql://{user}:{pass}@{host}:{port}/{name}?sslmode=disable` from the
/// `DB_*` settings, with the credentials percent-encoded.
fn database_url<G>(get: &G) -> Result<String, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    let user = require(get, "DB_USER")?;
    let pass = get("DB_PASS").unwrap_or_default();
    let host = require(get, "DB_HOST")?;
    let port: u16 = parse_or(get, "DB_PORT", 5432)?;
    let name = require(get, "DB_NAME")?;

    let invalid = |key: &'static str, value: &str| ConfigError::Invalid {
        key,
        value: value.to_string(),
    };
    let mut url = Url::parse(&format!("postgresql://{host}:{port}/{name}?sslmode=disable"))
        .map_err(|_| invalid("DB_HOST", &host))?;
    url.set_username(&user).map_err(|_| invalid("DB_USER", &user))?;
    if !pass.is_empty() {
        url.set_password(Some(&pass)).map_err(|_| invalid("DB_PASS", "***"))?;
    }
    Ok(url.into())
}

fn require<G>(get: &G, key: &'static str) -> Result<String, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    get(key).ok_or(ConfigError::Missing(key))
}

fn parse_or<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(default),
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid { key, value }),
    }
}
