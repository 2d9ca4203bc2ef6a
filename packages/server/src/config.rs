use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use sqlx::mysql::MySqlConnectOptions;

/// Connection parameters for the student database
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Option<String>,
    pub name: Option<String>,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl DatabaseConfig {
    /// Build sqlx connect options from the configured parameters.
    pub fn connect_options(&self) -> MySqlConnectOptions {
        let mut options = MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user);

        if let Some(password) = &self.password {
            options = options.password(password);
        }
        if let Some(name) = &self.name {
            options = options.database(name);
        }

        options
    }
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub host: String,
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// Database credentials are optional: a service with bad or missing
    /// credentials still starts and reports the failure per request.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database = DatabaseConfig {
            host: lookup("DB_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse_or(&lookup, "DB_PORT", 3306)?,
            user: lookup("DB_USER").unwrap_or_default(),
            password: lookup("DB_PASSWORD"),
            name: lookup("DB_NAME").filter(|name| !name.is_empty()),
            max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 10)?,
            acquire_timeout: Duration::from_secs(parse_or(
                &lookup,
                "DB_ACQUIRE_TIMEOUT_SECS",
                5,
            )?),
        };

        Ok(Self {
            database,
            host: lookup("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&lookup, "PORT", 5000)?,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a valid number", key)),
        None => Ok(default),
    }
}
