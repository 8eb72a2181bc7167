use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use thiserror::Error;
use tracing::{info, warn};

use crate::domain::RatingPolicy;

const DEV_JWT_SECRET: &str = "development-secret-change-me";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid {key} value '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
    #[error("{0} must be set in production")]
    Missing(&'static str),
}

/// Credentials for the admin account created at startup.
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Process configuration, loaded once at startup and handed to whatever
/// needs it.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub production: bool,
    pub jwt_secret: String,
    pub paypal_client_id: Option<String>,
    pub uploads_dir: PathBuf,
    pub rating_policy: RatingPolicy,
    pub actor_buffer: usize,
    pub hash_memory_kib: u32,
    pub hash_iterations: u32,
    pub admin: Option<AdminSeed>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 5000,
            production: false,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            paypal_client_id: None,
            uploads_dir: PathBuf::from("frontend/public/images"),
            rating_policy: RatingPolicy::Sum,
            actor_buffer: 32,
            hash_memory_kib: 19 * 1024,
            hash_iterations: 2,
            admin: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset keys fall back to
    /// [`Config::default`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Config::default();
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let production = var("APP_ENV").is_some_and(|v| v.eq_ignore_ascii_case("production"));

        let jwt_secret = match var("JWT_SECRET") {
            Some(secret) => secret,
            None if production => return Err(ConfigError::Missing("JWT_SECRET")),
            None => {
                warn!("JWT_SECRET not set, using development secret");
                defaults.jwt_secret
            }
        };

        let admin = match (var("ADMIN_EMAIL"), var("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(AdminSeed {
                name: var("ADMIN_NAME").unwrap_or_else(|| "Admin".to_string()),
                email,
                password,
            }),
            (None, None) => None,
            _ => {
                warn!("ADMIN_EMAIL and ADMIN_PASSWORD must both be set, skipping admin seed");
                None
            }
        };

        Ok(Self {
            port: try_load(&var, "PORT", defaults.port)?,
            production,
            jwt_secret,
            paypal_client_id: var("PAYPAL_CLIENT_ID"),
            uploads_dir: var("UPLOADS_DIR").map(PathBuf::from).unwrap_or(defaults.uploads_dir),
            rating_policy: try_load(&var, "RATING_POLICY", defaults.rating_policy)?,
            actor_buffer: try_load(&var, "ACTOR_BUFFER", defaults.actor_buffer)?,
            hash_memory_kib: try_load(&var, "HASH_MEMORY_KIB", defaults.hash_memory_kib)?,
            hash_iterations: try_load(&var, "HASH_ITERATIONS", defaults.hash_iterations)?,
            admin,
        })
    }
}

fn try_load<T>(var: &impl Fn(&str) -> Option<String>, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr + std::fmt::Debug,
    T::Err: Display,
{
    match var(key) {
        Some(value) => value.parse().map_err(|e: T::Err| {
            warn!("Invalid {key} value: {e}");
            ConfigError::Invalid {
                key,
                value,
                reason: e.to_string(),
            }
        }),
        None => {
            info!("{key} not set, using default: {default:?}");
            Ok(default)
        }
    }
}
