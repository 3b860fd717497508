// SPDX-FileCopyrightText: 2026 Beatbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types for storage entities.
//!
//! Timestamps are stored as RFC 3339 text, matching what SQLite's
//! `strftime('%Y-%m-%dT%H:%M:%fZ', 'now')` default produces.

use beatbot_core::types::{City, Weekday};
use beatbot_core::BeatbotError;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// A bot user linked to a provider account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub telegram_user_id: String,
    pub provider_user_id: String,
    pub email: String,
    /// Provider access token, `None` once invalidated.
    pub token: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub created_at: String,
    pub last_login_at: Option<String>,
}

impl User {
    /// Display name for chat messages, falling back to the email address.
    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(first), None) => first.clone(),
            _ => self.email.clone(),
        }
    }
}

/// Input for creating a user row.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub telegram_user_id: String,
    pub provider_user_id: String,
    pub email: String,
    pub token: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// A weekly recurring class slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub id: i64,
    pub user_id: i64,
    pub telegram_user_id: String,
    pub location_id: String,
    pub city: City,
    pub day_of_week: Weekday,
    /// Target time of day in local class time, as `HH:MM`.
    pub time: String,
    pub created_at: String,
}

impl Subscription {
    /// Parse the stored `HH:MM` slot time.
    pub fn target_time(&self) -> Result<NaiveTime, BeatbotError> {
        NaiveTime::parse_from_str(&self.time, "%H:%M").map_err(|e| BeatbotError::Parse {
            message: format!("invalid subscription time {:?}: {e}", self.time),
        })
    }
}

/// Input for creating a subscription row.
#[derive(Debug, Clone)]
pub struct NewSubscription {
    pub user_id: i64,
    pub telegram_user_id: String,
    pub location_id: String,
    pub city: City,
    pub day_of_week: Weekday,
    pub time: String,
}

/// A pending auto-join intent for a full class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoJoin {
    pub id: i64,
    pub user_id: i64,
    pub telegram_user_id: String,
    /// Ticket id from a prior booking attempt, kept for reference only.
    pub ticket_id: Option<String>,
    pub event_id: String,
    pub created_at: String,
}

/// Input for creating an auto-join row.
#[derive(Debug, Clone)]
pub struct NewAutoJoin {
    pub user_id: i64,
    pub telegram_user_id: String,
    pub ticket_id: Option<String>,
    pub event_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: 1,
            telegram_user_id: "tg-1".into(),
            provider_user_id: "p-1".into(),
            email: "a@b.de".into(),
            token: Some("tok".into()),
            first_name: Some("Ada".into()),
            last_name: Some("Lovelace".into()),
            created_at: "2026-01-01T00:00:00.000Z".into(),
            last_login_at: None,
        }
    }

    #[test]
    fn display_name_prefers_full_name() {
        assert_eq!(sample_user().display_name(), "Ada Lovelace");
    }

    #[test]
    fn display_name_falls_back_to_email() {
        let mut user = sample_user();
        user.first_name = None;
        user.last_name = None;
        assert_eq!(user.display_name(), "a@b.de");
    }

    #[test]
    fn target_time_parses_and_rejects() {
        let mut sub = Subscription {
            id: 1,
            user_id: 1,
            telegram_user_id: "tg-1".into(),
            location_id: "loc-1".into(),
            city: City::Munich,
            day_of_week: Weekday::Monday,
            time: "18:00".into(),
            created_at: "2026-01-01T00:00:00.000Z".into(),
        };
        let t = sub.target_time().unwrap();
        assert_eq!(t, NaiveTime::from_hms_opt(18, 0, 0).unwrap());

        sub.time = "six pm".into();
        assert!(sub.target_time().is_err());
    }
}
