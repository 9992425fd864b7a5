//! Configuration loading for the ONG backend.
//!
//! Loads layered `.env` files and environment variables prefixed with
//! `ONG_`, producing a typed [`AppConfig`].

use std::{collections::BTreeMap, env, net::SocketAddr, path::PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pagination::PaginationUriBuilder;

/// Longest accepted token lifetime (one year).
pub const MAX_JWT_EXPIRATION_HOURS: i64 = 24 * 366;

/// Application configuration derived from `ONG_*` environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct AppConfig {
    #[serde(default = "default_profile")]
    pub profile: String,
    #[serde(default = "default_api_bind_addr")]
    pub api_bind_addr: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_log_format")]
    pub log_format: String,
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,
    #[serde(default = "default_db_acquire_timeout_ms")]
    pub db_acquire_timeout_ms: u64,
    /// Public base URL used for absolute pagination links
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    #[serde(default = "default_jwt_expiration_hours")]
    pub jwt_expiration_hours: i64,
    /// Directory where uploaded images are written
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
    /// Public URL prefix of the upload directory (defaults to `<public_base_url>/uploads`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_base_url: Option<String>,
    /// Sender address of transactional mail
    #[serde(default = "default_mail_from")]
    pub mail_from: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sendgrid_api_key: Option<String>,
    #[serde(default = "default_sendgrid_api_base")]
    pub sendgrid_api_base: String,
    /// Copy raw infrastructure error messages into response envelopes
    #[serde(default = "default_expose_error_details")]
    pub expose_error_details: bool,
    /// Insert roles, users and the organization profile when the tables are empty
    #[serde(default = "default_seed_on_startup")]
    pub seed_on_startup: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            profile: default_profile(),
            api_bind_addr: default_api_bind_addr(),
            log_level: default_log_level(),
            log_format: default_log_format(),
            database_url: default_database_url(),
            db_max_connections: default_db_max_connections(),
            db_acquire_timeout_ms: default_db_acquire_timeout_ms(),
            public_base_url: default_public_base_url(),
            jwt_secret: default_jwt_secret(),
            jwt_expiration_hours: default_jwt_expiration_hours(),
            upload_dir: default_upload_dir(),
            asset_base_url: None,
            mail_from: default_mail_from(),
            sendgrid_api_key: None,
            sendgrid_api_base: default_sendgrid_api_base(),
            expose_error_details: default_expose_error_details(),
            seed_on_startup: default_seed_on_startup(),
        }
    }
}

impl AppConfig {
    /// Returns the configured bind address as a socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        self.api_bind_addr.parse()
    }

    /// Public URL prefix for uploaded assets.
    pub fn asset_base_url(&self) -> String {
        self.asset_base_url.clone().unwrap_or_else(|| {
            format!("{}/uploads", self.public_base_url.trim_end_matches('/'))
        })
    }

    /// Returns a redacted JSON representation (secrets are redacted).
    pub fn redacted_json(&self) -> serde_json::Result<String> {
        let mut config = self.clone();
        config.jwt_secret = "[REDACTED]".to_string();
        if config.sendgrid_api_key.is_some() {
            config.sendgrid_api_key = Some("[REDACTED]".to_string());
        }
        serde_json::to_string_pretty(&config)
    }

    /// Validates the configuration, returning an error on unusable settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database_url.trim().is_empty() {
            return Err(ConfigError::MissingDatabaseUrl);
        }

        if self.db_max_connections == 0 {
            return Err(ConfigError::InvalidDbMaxConnections {
                value: self.db_max_connections,
            });
        }

        if let Err(source) = PaginationUriBuilder::new(&self.public_base_url) {
            return Err(ConfigError::InvalidPublicBaseUrl {
                value: self.public_base_url.clone(),
                source,
            });
        }

        if !(1..=MAX_JWT_EXPIRATION_HOURS).contains(&self.jwt_expiration_hours) {
            return Err(ConfigError::InvalidJwtExpiration {
                value: self.jwt_expiration_hours,
            });
        }

        // Outside local/test the development secret is not acceptable
        if !matches!(self.profile.as_str(), "local" | "test")
            && (self.jwt_secret == default_jwt_secret() || self.jwt_secret.len() < 32)
        {
            return Err(ConfigError::WeakJwtSecret);
        }

        if self.mail_from.trim().is_empty() || !self.mail_from.contains('@') {
            return Err(ConfigError::InvalidMailFrom {
                value: self.mail_from.clone(),
            });
        }

        Ok(())
    }
}

fn default_profile() -> String {
    "local".to_string()
}

fn default_api_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_database_url() -> String {
    "sqlite://ong.db?mode=rwc".to_string()
}

fn default_db_max_connections() -> u32 {
    10
}

fn default_db_acquire_timeout_ms() -> u64 {
    5000
}

fn default_public_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_jwt_secret() -> String {
    "local-development-secret-change-me".to_string()
}

fn default_jwt_expiration_hours() -> i64 {
    24
}

fn default_upload_dir() -> String {
    "./uploads".to_string()
}

fn default_mail_from() -> String {
    "no-reply@ong.local".to_string()
}

fn default_sendgrid_api_base() -> String {
    "https://api.sendgrid.com".to_string()
}

fn default_expose_error_details() -> bool {
    true
}

fn default_seed_on_startup() -> bool {
    true
}

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load environment file {path}: {source}")]
    EnvFile {
        path: PathBuf,
        source: dotenvy::Error,
    },
    #[error("invalid api bind address '{value}': {source}")]
    InvalidBindAddr {
        value: String,
        source: std::net::AddrParseError,
    },
    #[error("database url is missing; set ONG_DATABASE_URL")]
    MissingDatabaseUrl,
    #[error("database pool size must be positive, got {value}")]
    InvalidDbMaxConnections { value: u32 },
    #[error("invalid public base url '{value}': {source}")]
    InvalidPublicBaseUrl {
        value: String,
        source: url::ParseError,
    },
    #[error("jwt expiration must be between 1 and 8784 hours, got {value}")]
    InvalidJwtExpiration { value: i64 },
    #[error("jwt secret must be set to at least 32 characters; set ONG_JWT_SECRET")]
    WeakJwtSecret,
    #[error("invalid mail sender address '{value}'")]
    InvalidMailFrom { value: String },
    #[error("invalid boolean value for {key}: '{value}'")]
    InvalidBool { key: String, value: String },
    #[error("invalid numeric value for {key}: '{value}'")]
    InvalidNumber { key: String, value: String },
}

/// Loads configuration using layered `.env` files and `ONG_*` env vars.
pub struct ConfigLoader {
    base_dir: PathBuf,
}

impl ConfigLoader {
    /// Creates a new loader rooted at the current working directory.
    pub fn new() -> Self {
        Self {
            base_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    /// Creates a loader rooted at the provided directory (useful for tests).
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Loads `.env` layers, overlays the process environment and validates.
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        let (mut layered, profile_hint) = self.collect_layered_env()?;

        // Overlay process environment last so it wins.
        for (key, value) in env::vars() {
            if let Some(stripped) = key.strip_prefix("ONG_") {
                layered.insert(stripped.to_string(), value);
            }
        }

        let profile = take_non_empty(&mut layered, "PROFILE").unwrap_or(profile_hint);
        let api_bind_addr =
            take_non_empty(&mut layered, "API_BIND_ADDR").unwrap_or_else(default_api_bind_addr);
        let log_level = take_non_empty(&mut layered, "LOG_LEVEL").unwrap_or_else(default_log_level);
        let log_format =
            take_non_empty(&mut layered, "LOG_FORMAT").unwrap_or_else(default_log_format);
        let database_url =
            take_non_empty(&mut layered, "DATABASE_URL").unwrap_or_else(default_database_url);
        let db_max_connections = layered
            .remove("DB_MAX_CONNECTIONS")
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_db_max_connections);
        let db_acquire_timeout_ms = layered
            .remove("DB_ACQUIRE_TIMEOUT_MS")
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_db_acquire_timeout_ms);
        let public_base_url = take_non_empty(&mut layered, "PUBLIC_BASE_URL")
            .unwrap_or_else(default_public_base_url);
        let jwt_secret =
            take_non_empty(&mut layered, "JWT_SECRET").unwrap_or_else(default_jwt_secret);
        let jwt_expiration_hours = take_i64(&mut layered, "JWT_EXPIRATION_HOURS")?
            .unwrap_or_else(default_jwt_expiration_hours);
        let upload_dir =
            take_non_empty(&mut layered, "UPLOAD_DIR").unwrap_or_else(default_upload_dir);
        let asset_base_url = take_non_empty(&mut layered, "ASSET_BASE_URL");
        let mail_from = take_non_empty(&mut layered, "MAIL_FROM").unwrap_or_else(default_mail_from);
        let sendgrid_api_key = take_non_empty(&mut layered, "SENDGRID_API_KEY");
        let sendgrid_api_base = take_non_empty(&mut layered, "SENDGRID_API_BASE")
            .unwrap_or_else(default_sendgrid_api_base);
        let expose_error_details = take_bool(&mut layered, "EXPOSE_ERROR_DETAILS")?
            .unwrap_or_else(default_expose_error_details);
        let seed_on_startup =
            take_bool(&mut layered, "SEED_ON_STARTUP")?.unwrap_or_else(default_seed_on_startup);

        let config = AppConfig {
            profile,
            api_bind_addr,
            log_level,
            log_format,
            database_url,
            db_max_connections,
            db_acquire_timeout_ms,
            public_base_url,
            jwt_secret,
            jwt_expiration_hours,
            upload_dir,
            asset_base_url,
            mail_from,
            sendgrid_api_key,
            sendgrid_api_base,
            expose_error_details,
            seed_on_startup,
        };

        config.validate()?;

        match config.bind_addr() {
            Ok(_) => Ok(config),
            Err(source) => Err(ConfigError::InvalidBindAddr {
                value: config.api_bind_addr.clone(),
                source,
            }),
        }
    }

    fn collect_layered_env(&self) -> Result<(BTreeMap<String, String>, String), ConfigError> {
        let mut values = BTreeMap::new();

        self.merge_dotenv(self.base_dir.join(".env"), &mut values)?;
        self.merge_dotenv(self.base_dir.join(".env.local"), &mut values)?;

        let profile = env::var("ONG_PROFILE")
            .ok()
            .or_else(|| values.get("PROFILE").cloned())
            .unwrap_or_else(default_profile);

        self.merge_dotenv(
            self.base_dir.join(format!(".env.{}", &profile)),
            &mut values,
        )?;
        self.merge_dotenv(
            self.base_dir.join(format!(".env.{}.local", &profile)),
            &mut values,
        )?;

        Ok((values, profile))
    }

    fn merge_dotenv(
        &self,
        path: PathBuf,
        values: &mut BTreeMap<String, String>,
    ) -> Result<(), ConfigError> {
        match dotenvy::from_path_iter(&path) {
            Ok(iter) => {
                for item in iter {
                    let (key, value) = item.map_err(|source| ConfigError::EnvFile {
                        path: path.clone(),
                        source,
                    })?;
                    if let Some(stripped) = key.strip_prefix("ONG_") {
                        values.insert(stripped.to_string(), value);
                    }
                }
                Ok(())
            }
            Err(dotenvy::Error::Io(ref io_err))
                if io_err.kind() == std::io::ErrorKind::NotFound =>
            {
                Ok(())
            }
            Err(err) => Err(ConfigError::EnvFile { path, source: err }),
        }
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn take_non_empty(values: &mut BTreeMap<String, String>, key: &str) -> Option<String> {
    values
        .remove(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn take_bool(values: &mut BTreeMap<String, String>, key: &str) -> Result<Option<bool>, ConfigError> {
    let Some(raw) = take_non_empty(values, key) else {
        return Ok(None);
    };

    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" => Ok(Some(false)),
        _ => Err(ConfigError::InvalidBool {
            key: format!("ONG_{key}"),
            value: raw,
        }),
    }
}

fn take_i64(values: &mut BTreeMap<String, String>, key: &str) -> Result<Option<i64>, ConfigError> {
    let Some(raw) = take_non_empty(values, key) else {
        return Ok(None);
    };

    raw.parse().map(Some).map_err(|_| ConfigError::InvalidNumber {
        key: format!("ONG_{key}"),
        value: raw,
    })
}
