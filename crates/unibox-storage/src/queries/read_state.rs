// SPDX-FileCopyrightText: 2026 Unibox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-state baseline CRUD operations.

use rusqlite::{OptionalExtension, params};
use unibox_core::{Baseline, Channel, ReadStateKey, UniboxError};

use crate::database::{Database, map_tr_err};

// SQLite integers are signed; counters beyond i64::MAX saturate.
fn to_column(baseline: Baseline) -> i64 {
    i64::try_from(baseline.counter).unwrap_or(i64::MAX)
}

fn from_column(value: i64) -> Baseline {
    Baseline::new(u64::try_from(value).unwrap_or(0))
}

/// Fetch the stored baseline for a conversation.
pub async fn get_baseline(
    db: &Database,
    key: &ReadStateKey,
) -> Result<Option<Baseline>, UniboxError> {
    let channel = key.channel.to_string();
    let id = key.conversation_id.clone();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT counter FROM read_state WHERE channel = ?1 AND conversation_id = ?2",
                params![channel, id],
                |row| row.get::<_, i64>(0),
            )
            .optional()
        })
        .await
        .map(|counter| counter.map(from_column))
        .map_err(map_tr_err)
}

/// Insert or overwrite the baseline for a conversation.
pub async fn upsert_baseline(
    db: &Database,
    key: &ReadStateKey,
    baseline: Baseline,
) -> Result<(), UniboxError> {
    let channel = key.channel.to_string();
    let id = key.conversation_id.clone();
    let now = chrono::Utc::now()
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO read_state (channel, conversation_id, counter, updated_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT (channel, conversation_id)
                 DO UPDATE SET counter = excluded.counter, updated_at = excluded.updated_at",
                params![channel, id, to_column(baseline), now],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// List every baseline stored for a channel, ordered by conversation id.
pub async fn list_baselines(
    db: &Database,
    channel: Channel,
) -> Result<Vec<(String, Baseline)>, UniboxError> {
    let channel = channel.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT conversation_id, counter FROM read_state
                 WHERE channel = ?1 ORDER BY conversation_id",
            )?;
            let rows = stmt.query_map(params![channel], |row| {
                Ok((row.get::<_, String>(0)?, from_column(row.get(1)?)))
            })?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}
