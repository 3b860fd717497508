// SPDX-FileCopyrightText: 2026 Beatbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subscription CRUD operations.
//!
//! City and weekday are stored as their snake_case strum codes and parsed
//! back into the closed enums when rows are read.

use beatbot_core::types::{City, Weekday};
use beatbot_core::BeatbotError;
use rusqlite::params;

use crate::database::{is_constraint_violation, Database};
use crate::models::{NewSubscription, Subscription};

fn parse_text_enum<T>(idx: usize, value: String) -> Result<T, rusqlite::Error>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value.parse::<T>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn row_to_subscription(row: &rusqlite::Row<'_>) -> Result<Subscription, rusqlite::Error> {
    let city: String = row.get(4)?;
    let day_of_week: String = row.get(5)?;
    Ok(Subscription {
        id: row.get(0)?,
        user_id: row.get(1)?,
        telegram_user_id: row.get(2)?,
        location_id: row.get(3)?,
        city: parse_text_enum::<City>(4, city)?,
        day_of_week: parse_text_enum::<Weekday>(5, day_of_week)?,
        time: row.get(6)?,
        created_at: row.get(7)?,
    })
}

const SUB_COLUMNS: &str =
    "id, user_id, telegram_user_id, location_id, city, day_of_week, time, created_at";

/// Insert a new subscription. Returns `Ok(false)` when the user already
/// subscribes to this slot.
pub async fn create_subscription(
    db: &Database,
    sub: &NewSubscription,
) -> Result<bool, BeatbotError> {
    let sub = sub.clone();
    db.connection()
        .call(move |conn| {
            let result = conn.execute(
                "INSERT INTO subscriptions
                     (user_id, telegram_user_id, location_id, city, day_of_week, time)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    sub.user_id,
                    sub.telegram_user_id,
                    sub.location_id,
                    sub.city.to_string(),
                    sub.day_of_week.to_string(),
                    sub.time,
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

/// All subscriptions across all users, in creation order. Used by the
/// daily registration cycle.
pub async fn list_subscriptions(db: &Database) -> Result<Vec<Subscription>, BeatbotError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SUB_COLUMNS} FROM subscriptions ORDER BY id"
            ))?;
            let rows = stmt.query_map([], row_to_subscription)?;
            let mut subs = Vec::new();
            for row in rows {
                subs.push(row?);
            }
            Ok(subs)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Subscriptions belonging to one Telegram user, for the chat listing.
pub async fn list_subscriptions_for_user(
    db: &Database,
    telegram_user_id: &str,
) -> Result<Vec<Subscription>, BeatbotError> {
    let telegram_user_id = telegram_user_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SUB_COLUMNS} FROM subscriptions
                 WHERE telegram_user_id = ?1 ORDER BY id"
            ))?;
            let rows = stmt.query_map(params![telegram_user_id], row_to_subscription)?;
            let mut subs = Vec::new();
            for row in rows {
                subs.push(row?);
            }
            Ok(subs)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Delete a subscription by id, scoped to its owner. Returns `Ok(false)`
/// when no row matched, including a row owned by someone else.
pub async fn delete_subscription(
    db: &Database,
    id: i64,
    telegram_user_id: &str,
) -> Result<bool, BeatbotError> {
    let telegram_user_id = telegram_user_id.to_string();
    db.connection()
        .call(move |conn| {
            let affected = conn.execute(
                "DELETE FROM subscriptions WHERE id = ?1 AND telegram_user_id = ?2",
                params![id, telegram_user_id],
            )?;
            Ok(affected > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
