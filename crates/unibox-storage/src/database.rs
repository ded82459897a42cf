// SPDX-FileCopyrightText: 2026 Unibox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All reads and writes are serialized through tokio-rusqlite's single
//! background thread. Do NOT create additional Connection instances for writes.

use std::path::Path;

use tracing::debug;
use unibox_core::UniboxError;

use crate::migrations;

/// Convert a tokio-rusqlite error into `UniboxError::Storage`.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> UniboxError {
    UniboxError::Storage {
        source: Box::new(e),
    }
}

/// Handle to the read-state database.
pub struct Database {
    conn: tokio_rusqlite::Connection,
    path: String,
}

impl Database {
    /// Open (creating if needed) the database at `path` and bring its schema up to date.
    ///
    /// Missing parent directories are created. Migrations run on a short-lived
    /// blocking connection before the long-lived async one is opened.
    pub async fn open(path: &str, wal_mode: bool) -> Result<Self, UniboxError> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(UniboxError::storage)?;
            }
        }

        let owned = path.to_string();
        tokio::task::spawn_blocking(move || prepare_schema(&owned, wal_mode))
            .await
            .map_err(|e| UniboxError::Internal(format!("schema setup task failed: {e}")))??;

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(UniboxError::storage)?;
        conn.call(|conn| -> Result<(), rusqlite::Error> {
            conn.execute_batch(
                "PRAGMA busy_timeout = 5000;
                 PRAGMA synchronous = NORMAL;",
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        debug!(path, wal_mode, "read-state database opened");
        Ok(Self {
            conn,
            path: path.to_string(),
        })
    }

    /// The underlying async connection.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Filesystem path the database was opened from.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Flush the WAL into the main database file.
    pub async fn checkpoint(&self) -> Result<(), UniboxError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    /// Checkpoint and close the connection.
    pub async fn close(self) -> Result<(), UniboxError> {
        self.checkpoint().await?;
        self.conn.close().await.map_err(UniboxError::storage)?;
        debug!(path = %self.path, "read-state database closed");
        Ok(())
    }
}

fn prepare_schema(path: &str, wal_mode: bool) -> Result<(), UniboxError> {
    let mut conn = rusqlite::Connection::open(path).map_err(UniboxError::storage)?;
    if wal_mode {
        let mode: String = conn
            .query_row("PRAGMA journal_mode = WAL;", [], |row| row.get(0))
            .map_err(UniboxError::storage)?;
        debug!(journal_mode = %mode, "journal mode set");
    }
    migrations::run_migrations(&mut conn)
}
