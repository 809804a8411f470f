//! Configuration module
//!
//! Reads database, authentication and demo-storage settings from the environment.
//! Binaries load `.env` with `dotenvy` before calling [`Config::from_env`].

use std::env;
use std::path::PathBuf;

// Common constants
const MAX_CONNECTIONS: u32 = 5;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const DEMO_STORAGE_PATH: &str = ".vetpro-demo";

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub auth_url: Option<String>,
    pub auth_anon_key: Option<String>,
    pub auth_email: Option<String>,
    pub auth_password: Option<String>,
    pub demo_storage_path: PathBuf,
    pub environment: String,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let config = Config {
            database_url: non_empty("DATABASE_URL"),
            db_max_connections: lookup("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|| MAX_CONNECTIONS.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("DB_MAX_CONNECTIONS must be a valid number"))?,
            db_timeout_seconds: lookup("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            auth_url: non_empty("AUTH_URL").map(|url| url.trim_end_matches('/').to_string()),
            auth_anon_key: non_empty("AUTH_ANON_KEY"),
            auth_email: non_empty("AUTH_EMAIL"),
            auth_password: non_empty("AUTH_PASSWORD"),
            demo_storage_path: non_empty("DEMO_STORAGE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEMO_STORAGE_PATH)),
            environment: lookup("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.auth_url.is_some() && self.database_url.is_none() {
            return Err(anyhow::anyhow!(
                "AUTH_URL requires DATABASE_URL to be set so live tenants can be resolved"
            ));
        }

        if let Some(url) = &self.database_url {
            if !url.starts_with("postgres://") && !url.starts_with("postgresql://") {
                return Err(anyhow::anyhow!(
                    "DATABASE_URL must be a valid PostgreSQL connection string"
                ));
            }
        }

        if self.db_max_connections == 0 {
            return Err(anyhow::anyhow!("DB_MAX_CONNECTIONS must be greater than 0"));
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    /// Live mode needs both a hosted auth service and a database.
    pub fn live_mode_available(&self) -> bool {
        self.auth_url.is_some() && self.database_url.is_some()
    }

    pub fn sign_in_credentials(&self) -> Option<(&str, &str)> {
        match (&self.auth_email, &self.auth_password) {
            (Some(email), Some(password)) => Some((email.as_str(), password.as_str())),
            _ => None,
        }
    }
}
