//! Process configuration, read once at startup from the environment.

use std::net::{Ipv4Addr, SocketAddr};

use axum::http::HeaderValue;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost:5432/ecommerce_db";
pub const DEFAULT_REDIS_URL: &str = "redis://localhost:6379";
pub const DEFAULT_ITEMS_TABLE: &str = "items";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name}={value:?} is invalid: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Runtime configuration for the API process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    /// `true` selects the Postgres + Redis stores, `false` the in-memory ones.
    pub use_persistent_stores: bool,
    pub database_url: String,
    pub items_table: String,
    /// Redis URL for the products store; credentials travel inside the URL.
    pub redis_url: String,
    pub products_key_prefix: String,
    /// Single allowed cross-origin caller. `None` allows any origin.
    pub cors_allowed_origin: Option<HeaderValue>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            use_persistent_stores: false,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            items_table: DEFAULT_ITEMS_TABLE.to_string(),
            redis_url: DEFAULT_REDIS_URL.to_string(),
            products_key_prefix: shopfront_infra::store::redis::DEFAULT_KEY_PREFIX.to_string(),
            cors_allowed_origin: None,
        }
    }
}

impl AppConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let port = match var("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| ConfigError::Invalid {
                name: "PORT",
                value: raw.clone(),
                reason: e.to_string(),
            })?,
            None => defaults.port,
        };

        let use_persistent_stores = match var("USE_PERSISTENT_STORES") {
            Some(raw) => raw.trim().parse::<bool>().map_err(|e| ConfigError::Invalid {
                name: "USE_PERSISTENT_STORES",
                value: raw.clone(),
                reason: e.to_string(),
            })?,
            None => defaults.use_persistent_stores,
        };

        let cors_allowed_origin = match var("CORS_ALLOWED_ORIGIN") {
            Some(raw) => Some(HeaderValue::from_str(raw.trim()).map_err(|e| {
                ConfigError::Invalid {
                    name: "CORS_ALLOWED_ORIGIN",
                    value: raw.clone(),
                    reason: e.to_string(),
                }
            })?),
            None => None,
        };

        Ok(Self {
            port,
            use_persistent_stores,
            database_url: var("DATABASE_URL").unwrap_or(defaults.database_url),
            items_table: var("ITEMS_TABLE").unwrap_or(defaults.items_table),
            redis_url: var("REDIS_URL").unwrap_or(defaults.redis_url),
            products_key_prefix: var("PRODUCTS_KEY_PREFIX").unwrap_or(defaults.products_key_prefix),
            cors_allowed_origin,
        })
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }
}
