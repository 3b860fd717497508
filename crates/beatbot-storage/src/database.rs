// SPDX-FileCopyrightText: 2026 Beatbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background thread.
//! Do NOT create additional Connection instances for writes.

use std::path::Path;

use beatbot_core::BeatbotError;

/// Handle to the SQLite database behind a tokio-rusqlite worker thread.
#[derive(Debug)]
pub struct Database {
    connection: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (or create) the database at `path`, apply PRAGMAs, and run
    /// pending migrations.
    pub async fn open(path: &str) -> Result<Self, BeatbotError> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| BeatbotError::Storage {
                    source: Box::new(e),
                })?;
            }
        }

        // open() surfaces rusqlite's error type directly, unlike call().
        let connection = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| BeatbotError::Storage {
                source: Box::new(e),
            })?;

        connection
            .call(|conn| {
                conn.execute_batch(
                    "PRAGMA journal_mode = WAL;
                     PRAGMA synchronous = NORMAL;
                     PRAGMA foreign_keys = ON;
                     PRAGMA busy_timeout = 5000;",
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;

        let db = Database { connection };
        db.migrate().await?;
        Ok(db)
    }

    /// The underlying tokio-rusqlite connection. Query modules funnel all
    /// access through this single handle.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.connection
    }

    async fn migrate(&self) -> Result<(), BeatbotError> {
        self.connection
            .call(|conn| Ok(crate::migrations::run_migrations(conn)))
            .await
            .map_err(map_tr_err)?
    }

    /// Checkpoint the WAL and close the connection.
    pub async fn close(self) -> Result<(), BeatbotError> {
        self.connection
            .call(|conn| {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        self.connection.close().await.map_err(map_tr_err)
    }
}

/// Map a tokio-rusqlite error into the crate-wide storage error.
pub fn map_tr_err(e: tokio_rusqlite::Error) -> BeatbotError {
    BeatbotError::Storage {
        source: Box::new(e),
    }
}

/// True when a statement failed on a UNIQUE (or other) constraint. Insert
/// paths treat this as "already present" rather than an error.
pub fn is_constraint_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(inner, _)
            if inner.code == rusqlite::ErrorCode::ConstraintViolation
    )
}
