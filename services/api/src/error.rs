//! services/api/src/error.rs
//!
//! Failures that stop the server from starting. Once it is serving, request
//! errors are answered on the socket or as HTTP status codes instead.

use crate::config::ConfigError;
use climatech_core::PortError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("ALLOWED_ORIGIN '{0}' is not a valid header value")]
    InvalidOrigin(String),

    /// The Postgres pool could not connect or the migrations failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The session store failed its startup probe.
    #[error("Session store unavailable: {0}")]
    Store(#[from] PortError),

    /// Binding the listener or preparing the store directory failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
