//! Process-wide configuration.
//!
//! `ClinicConfig` is resolved once at process startup and then passed into the services
//! and the gateway as `Arc<ClinicConfig>`. Nothing reads environment variables during
//! request handling, which keeps behaviour consistent across threads and test harnesses.

use crate::constants::{
    DEFAULT_CORS_ORIGINS, DEFAULT_PATIENT_LIST_MAX_LIMIT, DEFAULT_SECRET_KEY,
};
use crate::password;
use jsonwebtoken::Algorithm;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} has an invalid value: {reason}")]
    InvalidValue { key: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key,
            reason: reason.into(),
        }
    }
}

/// A credential store entry: a username and its encoded password hash.
#[derive(Clone, PartialEq, Eq)]
pub struct UserEntry {
    pub username: String,
    pub password_hash: String,
}

impl std::fmt::Debug for UserEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserEntry")
            .field("username", &self.username)
            .field("password_hash", &"<redacted>")
            .finish()
    }
}

/// Clinic configuration resolved at startup.
#[derive(Clone)]
pub struct ClinicConfig {
    app_name: String,
    clinic_name: String,
    version: String,
    debug: bool,
    database_url: String,
    secret_key: String,
    algorithm: Algorithm,
    access_token_expire_minutes: i64,
    redis_url: String,
    rest_addr: String,
    cors_origins: Vec<String>,
    request_timeout: Duration,
    patient_list_max_limit: u32,
    users: Vec<UserEntry>,
}

impl ClinicConfig {
    /// Resolve configuration from the process environment.
    ///
    /// Callers are expected to have loaded `.env` (via `dotenvy`) beforehand.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve configuration from an arbitrary key lookup.
    ///
    /// Blank values are treated as unset so that `KEY=` in a `.env` file falls back to
    /// the default.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the offending variable if any value
    /// cannot be parsed or violates its constraints.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let debug = match get("DEBUG") {
            Some(v) => parse_bool(&v).ok_or_else(|| {
                ConfigError::invalid("DEBUG", format!("expected a boolean, got '{v}'"))
            })?,
            None => true,
        };

        let algorithm = match get("ALGORITHM") {
            Some(v) => parse_algorithm(&v)?,
            None => Algorithm::HS256,
        };

        let access_token_expire_minutes = match get("ACCESS_TOKEN_EXPIRE_MINUTES") {
            Some(v) => v.parse::<i64>().map_err(|e| {
                ConfigError::invalid("ACCESS_TOKEN_EXPIRE_MINUTES", e.to_string())
            })?,
            None => 30,
        };
        if access_token_expire_minutes <= 0 {
            return Err(ConfigError::invalid(
                "ACCESS_TOKEN_EXPIRE_MINUTES",
                "must be greater than zero",
            ));
        }

        let request_timeout_secs = match get("REQUEST_TIMEOUT_SECS") {
            Some(v) => v
                .parse::<u64>()
                .map_err(|e| ConfigError::invalid("REQUEST_TIMEOUT_SECS", e.to_string()))?,
            None => 30,
        };
        if request_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "REQUEST_TIMEOUT_SECS",
                "must be greater than zero",
            ));
        }

        let patient_list_max_limit = match get("PATIENT_LIST_MAX_LIMIT") {
            Some(v) => v
                .parse::<u32>()
                .map_err(|e| ConfigError::invalid("PATIENT_LIST_MAX_LIMIT", e.to_string()))?,
            None => DEFAULT_PATIENT_LIST_MAX_LIMIT,
        };
        if patient_list_max_limit == 0 {
            return Err(ConfigError::invalid(
                "PATIENT_LIST_MAX_LIMIT",
                "must be greater than zero",
            ));
        }

        let cors_origins = match get("CORS_ORIGINS") {
            Some(v) => split_list(&v),
            None => DEFAULT_CORS_ORIGINS.iter().map(|s| s.to_string()).collect(),
        };
        // Credentials are always allowed, which the CORS protocol forbids with a wildcard.
        if cors_origins.iter().any(|o| o == "*") {
            return Err(ConfigError::invalid(
                "CORS_ORIGINS",
                "'*' cannot be combined with credentialed requests; list origins explicitly",
            ));
        }

        let users = match get("CLINIC_USERS") {
            Some(v) => parse_users(&v)?,
            None => Vec::new(),
        };

        Ok(Self {
            app_name: get("APP_NAME").unwrap_or_else(|| "Clinic Management".into()),
            clinic_name: get("CLINIC_NAME").unwrap_or_else(|| "Demo Clinic".into()),
            version: get("APP_VERSION").unwrap_or_else(|| env!("CARGO_PKG_VERSION").into()),
            debug,
            database_url: get("DATABASE_URL").unwrap_or_else(|| "sqlite://clinic.db".into()),
            secret_key: get("SECRET_KEY").unwrap_or_else(|| DEFAULT_SECRET_KEY.into()),
            algorithm,
            access_token_expire_minutes,
            redis_url: get("REDIS_URL").unwrap_or_else(|| "redis://localhost:6379/0".into()),
            rest_addr: get("CLINIC_REST_ADDR").unwrap_or_else(|| "0.0.0.0:8000".into()),
            cors_origins,
            request_timeout: Duration::from_secs(request_timeout_secs),
            patient_list_max_limit,
            users,
        })
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn clinic_name(&self) -> &str {
        &self.clinic_name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn secret_key(&self) -> &str {
        &self.secret_key
    }

    pub fn uses_default_secret(&self) -> bool {
        self.secret_key == DEFAULT_SECRET_KEY
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn access_token_expire_minutes(&self) -> i64 {
        self.access_token_expire_minutes
    }

    pub fn redis_url(&self) -> &str {
        &self.redis_url
    }

    pub fn rest_addr(&self) -> &str {
        &self.rest_addr
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.cors_origins
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn patient_list_max_limit(&self) -> u32 {
        self.patient_list_max_limit
    }

    pub fn users(&self) -> &[UserEntry] {
        &self.users
    }
}

impl std::fmt::Debug for ClinicConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClinicConfig")
            .field("app_name", &self.app_name)
            .field("clinic_name", &self.clinic_name)
            .field("version", &self.version)
            .field("debug", &self.debug)
            .field("database_url", &self.database_url)
            .field("secret_key", &"<redacted>")
            .field("algorithm", &self.algorithm)
            .field(
                "access_token_expire_minutes",
                &self.access_token_expire_minutes,
            )
            .field("redis_url", &self.redis_url)
            .field("rest_addr", &self.rest_addr)
            .field("cors_origins", &self.cors_origins)
            .field("request_timeout", &self.request_timeout)
            .field("patient_list_max_limit", &self.patient_list_max_limit)
            .field("users", &self.users)
            .finish()
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Only HMAC algorithms are accepted since tokens are signed with `SECRET_KEY`.
fn parse_algorithm(value: &str) -> Result<Algorithm, ConfigError> {
    match value.to_ascii_uppercase().as_str() {
        "HS256" => Ok(Algorithm::HS256),
        "HS384" => Ok(Algorithm::HS384),
        "HS512" => Ok(Algorithm::HS512),
        other => Err(ConfigError::invalid(
            "ALGORITHM",
            format!("unsupported signing algorithm '{other}' (expected HS256, HS384 or HS512)"),
        )),
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse `username:hash` pairs separated by commas.
fn parse_users(value: &str) -> Result<Vec<UserEntry>, ConfigError> {
    let mut users: Vec<UserEntry> = Vec::new();
    for entry in split_list(value) {
        let (username, hash) = entry.split_once(':').ok_or_else(|| {
            ConfigError::invalid("CLINIC_USERS", "entries must look like username:hash")
        })?;
        let username = username.trim();
        let hash = hash.trim();

        if username.is_empty() {
            return Err(ConfigError::invalid("CLINIC_USERS", "username cannot be empty"));
        }
        if !password::is_well_formed(hash) {
            return Err(ConfigError::invalid(
                "CLINIC_USERS",
                format!("password hash for '{username}' is not a pbkdf2-sha256 hash"),
            ));
        }
        if users.iter().any(|u| u.username == username) {
            return Err(ConfigError::invalid(
                "CLINIC_USERS",
                format!("duplicate username '{username}'"),
            ));
        }

        users.push(UserEntry {
            username: username.to_string(),
            password_hash: hash.to_string(),
        });
    }
    Ok(users)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<ClinicConfig, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ClinicConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let cfg = config_from(&[]).expect("defaults should be valid");

        assert_eq!(cfg.app_name(), "Clinic Management");
        assert!(cfg.debug());
        assert_eq!(cfg.algorithm(), Algorithm::HS256);
        assert_eq!(cfg.access_token_expire_minutes(), 30);
        assert_eq!(cfg.request_timeout(), Duration::from_secs(30));
        assert_eq!(cfg.patient_list_max_limit(), 100);
        assert_eq!(cfg.cors_origins().len(), 3);
        assert_eq!(cfg.redis_url(), "redis://localhost:6379/0");
        assert!(cfg.uses_default_secret());
        assert!(cfg.users().is_empty());
    }

    #[test]
    fn values_are_read_from_lookup() {
        let cfg = config_from(&[
            ("DEBUG", "false"),
            ("ALGORITHM", "hs512"),
            ("ACCESS_TOKEN_EXPIRE_MINUTES", "5"),
            ("SECRET_KEY", "not-the-default"),
            ("DATABASE_URL", "sqlite::memory:"),
            ("CORS_ORIGINS", "https://portal.example.org, https://staff.example.org"),
        ])
        .expect("config should parse");

        assert!(!cfg.debug());
        assert_eq!(cfg.algorithm(), Algorithm::HS512);
        assert_eq!(cfg.access_token_expire_minutes(), 5);
        assert_eq!(cfg.database_url(), "sqlite::memory:");
        assert!(!cfg.uses_default_secret());
        assert_eq!(
            cfg.cors_origins(),
            &[
                "https://portal.example.org".to_string(),
                "https://staff.example.org".to_string()
            ]
        );
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let cfg = config_from(&[("APP_NAME", "   "), ("DEBUG", "")]).expect("should parse");
        assert_eq!(cfg.app_name(), "Clinic Management");
        assert!(cfg.debug());
    }

    #[test]
    fn rejects_non_hmac_algorithm() {
        let err = config_from(&[("ALGORITHM", "RS256")]).expect_err("RS256 is not supported");
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: "ALGORITHM",
                ..
            }
        ));
    }

    #[test]
    fn rejects_non_positive_token_lifetime() {
        for value in ["0", "-5", "soon"] {
            let err = config_from(&[("ACCESS_TOKEN_EXPIRE_MINUTES", value)])
                .expect_err("lifetime should be rejected");
            assert!(matches!(
                err,
                ConfigError::InvalidValue {
                    key: "ACCESS_TOKEN_EXPIRE_MINUTES",
                    ..
                }
            ));
        }
    }

    #[test]
    fn rejects_wildcard_origin() {
        let err = config_from(&[("CORS_ORIGINS", "*")]).expect_err("wildcard is rejected");
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: "CORS_ORIGINS",
                ..
            }
        ));
    }

    #[test]
    fn parses_users_and_rejects_malformed_entries() {
        let hash = password::hash_password_with_iterations("s3cret", 1_000);
        let users = format!("alice:{hash}, bob:{hash}");
        let cfg = config_from(&[("CLINIC_USERS", users.as_str())]).expect("users should parse");
        assert_eq!(cfg.users().len(), 2);
        assert_eq!(cfg.users()[1].username, "bob");

        assert!(config_from(&[("CLINIC_USERS", "alice")]).is_err());
        assert!(config_from(&[("CLINIC_USERS", "alice:plaintext")]).is_err());

        let duplicate = format!("alice:{hash},alice:{hash}");
        assert!(config_from(&[("CLINIC_USERS", duplicate.as_str())]).is_err());
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let cfg = config_from(&[("SECRET_KEY", "super-secret-value")]).expect("should parse");
        let rendered = format!("{cfg:?}");
        assert!(!rendered.contains("super-secret-value"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn users_survive_a_round_trip_through_a_dotenv_file() {
        let alice = password::hash_password_with_iterations("s3cret", 1_000);
        let bob = password::hash_password_with_iterations("hunter2", 1_000);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, format!("CLINIC_USERS=alice:{alice},bob:{bob}\n")).unwrap();

        let loaded: HashMap<String, String> = dotenvy::from_path_iter(&path)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(loaded["CLINIC_USERS"], format!("alice:{alice},bob:{bob}"));

        let cfg = ClinicConfig::from_lookup(|key| loaded.get(key).cloned())
            .expect("hashes loaded from .env should parse");
        assert_eq!(cfg.users()[0].password_hash, alice);
        assert_eq!(cfg.users()[1].password_hash, bob);
    }
}
