use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors that stop a process from starting
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid {name}: {reason}")]
    Invalid { name: &'static str, reason: String },

    #[error("Unsupported database scheme '{0}' (only postgres is supported)")]
    UnsupportedDatabase(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Environment {
    fn from_name(name: Option<&str>) -> Self {
        match name {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        }
    }
}

/// Database flavour sniffed from the DATABASE_URL scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatabaseKind {
    Postgres,
    Mysql,
}

impl DatabaseKind {
    pub fn sniff(database_url: &str) -> Result<Self, ConfigError> {
        let url = Url::parse(database_url).map_err(|e| ConfigError::Invalid {
            name: "DATABASE_URL",
            reason: e.to_string(),
        })?;
        match url.scheme() {
            "postgres" | "postgresql" => Ok(DatabaseKind::Postgres),
            "mysql" | "mariadb" => Ok(DatabaseKind::Mysql),
            other => Err(ConfigError::Invalid {
                name: "DATABASE_URL",
                reason: format!("unrecognised scheme '{}'", other),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub kind: DatabaseKind,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub connect_retries: u32,
    pub retry_delay_ms: u64,
}

impl DatabaseConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub cors_origins: Vec<String>,
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
}

impl SecurityConfig {
    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|o| o == "*")
    }
}

const DEV_JWT_SECRET: &str = "portfolio-development-secret";

/// Longest session a token may be issued for (one year)
pub const MAX_JWT_EXPIRY_HOURS: u64 = 24 * 365;

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build the config from any key lookup; `from_env` passes the process environment.
    pub fn from_vars<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = Environment::from_name(var("APP_ENV").as_deref());

        let database_url = var("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let kind = DatabaseKind::sniff(&database_url)?;
        if kind != DatabaseKind::Postgres {
            return Err(ConfigError::UnsupportedDatabase(format!("{:?}", kind).to_lowercase()));
        }

        let mut config = match environment {
            Environment::Production => Self::production(database_url),
            Environment::Staging => Self::staging(database_url),
            Environment::Development => Self::development(database_url),
        };
        config.database.kind = kind;
        config.with_overrides(&var)?;

        if config.security.jwt_secret.is_empty() {
            return Err(ConfigError::Missing("JWT_SECRET"));
        }
        Ok(config)
    }

    fn with_overrides<F>(&mut self, var: &F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = var("PORT") {
            self.api.port = parse_var("PORT", &v)?;
        }
        if let Some(v) = var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }

        if let Some(v) = var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Some(v) = var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Some(v) = var("DATABASE_CONNECT_RETRIES") {
            self.database.connect_retries = v.parse().unwrap_or(self.database.connect_retries);
        }
        if let Some(v) = var("DATABASE_RETRY_DELAY_MS") {
            self.database.retry_delay_ms = v.parse().unwrap_or(self.database.retry_delay_ms);
        }

        if let Some(v) = var("CORS_ORIGIN") {
            self.security.cors_origins = split_origins(&v);
        }
        if let Some(v) = var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Some(v) = var("JWT_EXPIRY_HOURS") {
            let hours: u64 = parse_var("JWT_EXPIRY_HOURS", &v)?;
            if !(1..=MAX_JWT_EXPIRY_HOURS).contains(&hours) {
                return Err(ConfigError::Invalid {
                    name: "JWT_EXPIRY_HOURS",
                    reason: format!("must be between 1 and {}", MAX_JWT_EXPIRY_HOURS),
                });
            }
            self.security.jwt_expiry_hours = hours;
        }

        Ok(())
    }

    fn development(database_url: String) -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                url: database_url,
                kind: DatabaseKind::Postgres,
                max_connections: 10,
                connection_timeout: 30,
                connect_retries: 5,
                retry_delay_ms: 2000,
            },
            api: ApiConfig {
                port: 3005,
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
            },
            security: SecurityConfig {
                cors_origins: vec!["http://localhost:3000".to_string()],
                jwt_secret: DEV_JWT_SECRET.to_string(),
                jwt_expiry_hours: 24 * 7, // 1 week
            },
        }
    }

    fn staging(database_url: String) -> Self {
        let mut config = Self::development(database_url);
        config.environment = Environment::Staging;
        config.database.max_connections = 20;
        config.database.connection_timeout = 10;
        config.security.jwt_secret = String::new();
        config.security.jwt_expiry_hours = 24;
        config
    }

    fn production(database_url: String) -> Self {
        let mut config = Self::development(database_url);
        config.environment = Environment::Production;
        config.database.max_connections = 50;
        config.database.connection_timeout = 5;
        config.security.cors_origins = Vec::new();
        // Must come from JWT_SECRET
        config.security.jwt_secret = String::new();
        config.security.jwt_expiry_hours = 4;
        config
    }
}

/// Configuration for the browser-facing proxy
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub environment: Environment,
    pub api_url: Url,
    pub port: u16,
    pub timeout: Duration,
}

impl ProxyConfig {
    pub const DEFAULT_API_URL: &'static str = "http://localhost:3005";

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| env::var(key).ok())
    }

    pub fn from_vars<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = Environment::from_name(var("APP_ENV").as_deref());

        let raw_url = var("NEXT_PUBLIC_API_URL").unwrap_or_else(|| Self::DEFAULT_API_URL.to_string());
        let api_url = Url::parse(&raw_url).map_err(|e| ConfigError::Invalid {
            name: "NEXT_PUBLIC_API_URL",
            reason: e.to_string(),
        })?;

        let port = match var("PROXY_PORT") {
            Some(v) => parse_var("PROXY_PORT", &v)?,
            None => 3000,
        };
        let timeout_secs: u64 = match var("PROXY_TIMEOUT_SECS") {
            Some(v) => parse_var("PROXY_TIMEOUT_SECS", &v)?,
            None => 10,
        };

        Ok(Self {
            environment,
            api_url,
            port,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_var<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        name,
        reason: e.to_string(),
    })
}
