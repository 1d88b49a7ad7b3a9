//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, a concrete implementation of the
//! `SessionStore` port from the `core` crate. It keeps each snapshot slot as a
//! single row in PostgreSQL using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use climatech_core::ports::{PortError, PortResult, SessionStore};
use sqlx::{FromRow, PgPool};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `SessionStore` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct SnapshotRecord {
    payload: String,
    updated_at: DateTime<Utc>,
}

//=========================================================================================
// `SessionStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl SessionStore for DbAdapter {
    async fn load(&self, key: &str) -> PortResult<Option<String>> {
        let record = sqlx::query_as::<_, SnapshotRecord>(
            "SELECT payload, updated_at FROM session_snapshots WHERE slot = $1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        Ok(record.map(|r| {
            tracing::debug!(slot = key, updated_at = %r.updated_at, "Loaded session snapshot");
            r.payload
        }))
    }

    async fn save(&self, key: &str, value: &str) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO session_snapshots (slot, payload, updated_at) VALUES ($1, $2, NOW()) \
             ON CONFLICT (slot) DO UPDATE SET payload = EXCLUDED.payload, updated_at = NOW()",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(())
    }
}
