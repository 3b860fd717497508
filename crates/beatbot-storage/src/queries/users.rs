// SPDX-FileCopyrightText: 2026 Beatbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User CRUD operations.

use beatbot_core::BeatbotError;
use rusqlite::params;

use crate::database::{is_constraint_violation, Database};
use crate::models::{NewUser, User};

fn row_to_user(row: &rusqlite::Row<'_>) -> Result<User, rusqlite::Error> {
    Ok(User {
        id: row.get(0)?,
        telegram_user_id: row.get(1)?,
        provider_user_id: row.get(2)?,
        email: row.get(3)?,
        token: row.get(4)?,
        first_name: row.get(5)?,
        last_name: row.get(6)?,
        created_at: row.get(7)?,
        last_login_at: row.get(8)?,
    })
}

const USER_COLUMNS: &str = "id, telegram_user_id, provider_user_id, email, token, \
                            first_name, last_name, created_at, last_login_at";

/// Insert a new user. Returns `Ok(false)` when a user with the same
/// Telegram id, provider id, or email already exists.
pub async fn create_user(db: &Database, user: &NewUser) -> Result<bool, BeatbotError> {
    let user = user.clone();
    db.connection()
        .call(move |conn| {
            let result = conn.execute(
                "INSERT INTO users (telegram_user_id, provider_user_id, email, token,
                                    first_name, last_name, last_login_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))",
                params![
                    user.telegram_user_id,
                    user.provider_user_id,
                    user.email,
                    user.token,
                    user.first_name,
                    user.last_name,
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

/// Look up a user by their Telegram id.
pub async fn get_user_by_telegram_id(
    db: &Database,
    telegram_user_id: &str,
) -> Result<Option<User>, BeatbotError> {
    let telegram_user_id = telegram_user_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {USER_COLUMNS} FROM users WHERE telegram_user_id = ?1"
            ))?;
            let result = stmt.query_row(params![telegram_user_id], row_to_user);
            match result {
                Ok(user) => Ok(Some(user)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Store a fresh access token after a (re-)login and bump `last_login_at`.
pub async fn update_token(
    db: &Database,
    telegram_user_id: &str,
    token: &str,
) -> Result<(), BeatbotError> {
    let telegram_user_id = telegram_user_id.to_string();
    let token = token.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE users
                 SET token = ?1, last_login_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE telegram_user_id = ?2",
                params![token, telegram_user_id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Drop a user's access token after the provider rejected it.
pub async fn clear_token(db: &Database, telegram_user_id: &str) -> Result<(), BeatbotError> {
    let telegram_user_id = telegram_user_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE users SET token = NULL WHERE telegram_user_id = ?1",
                params![telegram_user_id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    fn make_user(tg: &str, provider: &str, email: &str) -> NewUser {
        NewUser {
            telegram_user_id: tg.to_string(),
            provider_user_id: provider.to_string(),
            email: email.to_string(),
            token: "tok-1".to_string(),
            first_name: Some("Ada".to_string()),
            last_name: None,
        }
    }

    #[tokio::test]
    async fn create_and_get_user_roundtrips() {
        let (db, _dir) = setup_db().await;
        let created = create_user(&db, &make_user("tg-1", "p-1", "a@b.de"))
            .await
            .unwrap();
        assert!(created);

        let user = get_user_by_telegram_id(&db, "tg-1").await.unwrap().unwrap();
        assert_eq!(user.provider_user_id, "p-1");
        assert_eq!(user.email, "a@b.de");
        assert_eq!(user.token.as_deref(), Some("tok-1"));
        assert!(user.last_login_at.is_some());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn duplicate_user_returns_false() {
        let (db, _dir) = setup_db().await;
        assert!(create_user(&db, &make_user("tg-1", "p-1", "a@b.de"))
            .await
            .unwrap());
        // Same Telegram id.
        assert!(!create_user(&db, &make_user("tg-1", "p-2", "c@d.de"))
            .await
            .unwrap());
        // Same email, different Telegram id.
        assert!(!create_user(&db, &make_user("tg-2", "p-3", "a@b.de"))
            .await
            .unwrap());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn token_update_and_clear() {
        let (db, _dir) = setup_db().await;
        create_user(&db, &make_user("tg-1", "p-1", "a@b.de"))
            .await
            .unwrap();

        update_token(&db, "tg-1", "tok-2").await.unwrap();
        let user = get_user_by_telegram_id(&db, "tg-1").await.unwrap().unwrap();
        assert_eq!(user.token.as_deref(), Some("tok-2"));

        clear_token(&db, "tg-1").await.unwrap();
        let user = get_user_by_telegram_id(&db, "tg-1").await.unwrap().unwrap();
        assert!(user.token.is_none());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn unknown_user_returns_none() {
        let (db, _dir) = setup_db().await;
        assert!(get_user_by_telegram_id(&db, "nobody")
            .await
            .unwrap()
            .is_none());
        db.close().await.unwrap();
    }
}
