//! Server configuration from environment variables.
//!
//!   PMO_STORE            `postgres` (default) or `memory`
//!   PMO_DATABASE_URL     Postgres connection string (falls back to DATABASE_URL)
//!   PMO_MAX_CONNECTIONS  pool size (default: 10)
//!   PMO_BIND_ADDR        listen address (default: 0.0.0.0:8001)
//!   PMO_CORS_ORIGINS     comma-separated origins, `*` for any (default: *)
//!   PMO_FETCH_LIMIT      list cap (default: 1000)

use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context;
use axum::http::HeaderValue;
use pmo_core::memory::MemoryDocumentStore;
use pmo_core::service::DEFAULT_FETCH_LIMIT;
use pmo_core::DocumentStore;
use pmo_postgres::PgDocumentStore;
use thiserror::Error;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8001";
const DEFAULT_MAX_CONNECTIONS: u32 = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} has invalid value {value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres {
        database_url: String,
        max_connections: u32,
    },
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsOrigins {
    Any,
    List(Vec<String>),
}

impl CorsOrigins {
    /// Parse a comma-separated origin list. `*` anywhere means any origin.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let origins: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect();
        if origins.is_empty() || origins.iter().any(|o| o == "*") {
            return Ok(Self::Any);
        }
        for origin in &origins {
            if HeaderValue::from_str(origin).is_err() {
                return Err(ConfigError::Invalid {
                    var: "PMO_CORS_ORIGINS",
                    value: origin.clone(),
                    reason: "not a valid header value".into(),
                });
            }
        }
        Ok(Self::List(origins))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub store: StoreBackend,
    pub bind_addr: String,
    pub cors_origins: CorsOrigins,
    pub fetch_limit: usize,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let store = match lookup("PMO_STORE").as_deref().map(str::trim) {
            None | Some("") | Some("postgres") => {
                let database_url = lookup("PMO_DATABASE_URL")
                    .or_else(|| lookup("DATABASE_URL"))
                    .ok_or(ConfigError::Missing("PMO_DATABASE_URL"))?;
                StoreBackend::Postgres {
                    database_url,
                    max_connections: parse_var(
                        &lookup,
                        "PMO_MAX_CONNECTIONS",
                        DEFAULT_MAX_CONNECTIONS,
                    )?,
                }
            }
            Some("memory") => StoreBackend::Memory,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: "PMO_STORE",
                    value: other.to_string(),
                    reason: "expected `postgres` or `memory`".into(),
                })
            }
        };

        let cors_origins = match lookup("PMO_CORS_ORIGINS") {
            Some(raw) => CorsOrigins::parse(&raw)?,
            None => CorsOrigins::Any,
        };

        Ok(Self {
            store,
            bind_addr: lookup("PMO_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.into()),
            cors_origins,
            fetch_limit: parse_var(&lookup, "PMO_FETCH_LIMIT", DEFAULT_FETCH_LIMIT)?,
        })
    }

    /// Open the configured document store.
    pub async fn open_store(&self) -> anyhow::Result<Arc<dyn DocumentStore>> {
        match &self.store {
            StoreBackend::Postgres {
                database_url,
                max_connections,
            } => {
                let store = PgDocumentStore::connect(database_url, *max_connections)
                    .await
                    .context("failed to connect to database")?;
                store
                    .ensure_schema()
                    .await
                    .context("failed to prepare document schema")?;
                tracing::info!(max_connections, "Connected to database");
                Ok(Arc::new(store))
            }
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory document store; data is lost on shutdown");
                Ok(Arc::new(MemoryDocumentStore::new()))
            }
        }
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}
