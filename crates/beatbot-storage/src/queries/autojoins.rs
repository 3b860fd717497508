// SPDX-FileCopyrightText: 2026 Beatbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Auto-join intent CRUD operations.

use beatbot_core::BeatbotError;
use rusqlite::params;

use crate::database::{is_constraint_violation, Database};
use crate::models::{AutoJoin, NewAutoJoin};

fn row_to_autojoin(row: &rusqlite::Row<'_>) -> Result<AutoJoin, rusqlite::Error> {
    Ok(AutoJoin {
        id: row.get(0)?,
        user_id: row.get(1)?,
        telegram_user_id: row.get(2)?,
        ticket_id: row.get(3)?,
        event_id: row.get(4)?,
        created_at: row.get(5)?,
    })
}

const AUTOJOIN_COLUMNS: &str = "id, user_id, telegram_user_id, ticket_id, event_id, created_at";

/// Record an auto-join intent. Returns `Ok(false)` when the user is already
/// watching this event.
pub async fn create_autojoin(db: &Database, intent: &NewAutoJoin) -> Result<bool, BeatbotError> {
    let intent = intent.clone();
    db.connection()
        .call(move |conn| {
            let result = conn.execute(
                "INSERT INTO autojoins (user_id, telegram_user_id, ticket_id, event_id)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    intent.user_id,
                    intent.telegram_user_id,
                    intent.ticket_id,
                    intent.event_id,
                ],
            );
            match result {
                Ok(_) => Ok(true),
                Err(e) if is_constraint_violation(&e) => Ok(false),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// All pending intents, oldest first. Consumed by the sweep.
pub async fn list_autojoins(db: &Database) -> Result<Vec<AutoJoin>, BeatbotError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {AUTOJOIN_COLUMNS} FROM autojoins ORDER BY id"
            ))?;
            let rows = stmt.query_map([], row_to_autojoin)?;
            let mut intents = Vec::new();
            for row in rows {
                intents.push(row?);
            }
            Ok(intents)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Remove an intent once it completed or aged out. Returns `Ok(false)` when
/// no row matched.
pub async fn delete_autojoin(db: &Database, id: i64) -> Result<bool, BeatbotError> {
    db.connection()
        .call(move |conn| {
            let affected = conn.execute("DELETE FROM autojoins WHERE id = ?1", params![id])?;
            Ok(affected > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
