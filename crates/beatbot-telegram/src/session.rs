// SPDX-FileCopyrightText: 2026 Beatbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user login flow state with a TTL.
//!
//! The login conversation (email, then password) lives here and nowhere
//! else. Entries expire after the configured TTL so an abandoned login
//! prompt cannot capture an unrelated message days later.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Where a user currently is in the login conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginFlow {
    AwaitEmail,
    AwaitPassword { email: String },
}

struct Entry {
    flow: LoginFlow,
    updated: Instant,
}

/// In-memory store of active login flows, keyed by Telegram user id.
pub struct SessionStore {
    ttl: Duration,
    inner: Mutex<HashMap<String, Entry>>,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            inner: Mutex::new(HashMap::new()),
        }
    }

    /// Begin (or restart) the login flow for a user.
    pub fn begin(&self, telegram_user_id: &str) {
        self.set(telegram_user_id, LoginFlow::AwaitEmail);
    }

    /// Replace the flow state for a user, refreshing its TTL.
    pub fn set(&self, telegram_user_id: &str, flow: LoginFlow) {
        let mut inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        inner.insert(
            telegram_user_id.to_string(),
            Entry {
                flow,
                updated: Instant::now(),
            },
        );
    }

    /// The user's current flow state, or `None` if absent or expired.
    /// Expired entries are removed on access.
    pub fn get(&self, telegram_user_id: &str) -> Option<LoginFlow> {
        let mut inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        match inner.get(telegram_user_id) {
            Some(entry) if entry.updated.elapsed() <= self.ttl => Some(entry.flow.clone()),
            Some(_) => {
                inner.remove(telegram_user_id);
                None
            }
            None => None,
        }
    }

    /// Drop the user's flow state, e.g. after a completed login attempt.
    pub fn clear(&self, telegram_user_id: &str) {
        let mut inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        inner.remove(telegram_user_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flow_advances_email_to_password() {
        let store = SessionStore::new(Duration::from_secs(600));
        store.begin("u1");
        assert_eq!(store.get("u1"), Some(LoginFlow::AwaitEmail));

        store.set(
            "u1",
            LoginFlow::AwaitPassword {
                email: "a@b.de".to_string(),
            },
        );
        assert_eq!(
            store.get("u1"),
            Some(LoginFlow::AwaitPassword {
                email: "a@b.de".to_string()
            })
        );

        store.clear("u1");
        assert_eq!(store.get("u1"), None);
    }

    #[test]
    fn users_are_isolated() {
        let store = SessionStore::new(Duration::from_secs(600));
        store.begin("u1");
        assert_eq!(store.get("u2"), None);
    }

    #[test]
    fn expired_entries_are_dropped() {
        let store = SessionStore::new(Duration::ZERO);
        store.begin("u1");
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(store.get("u1"), None);
    }

    #[test]
    fn restarting_resets_to_email() {
        let store = SessionStore::new(Duration::from_secs(600));
        store.set(
            "u1",
            LoginFlow::AwaitPassword {
                email: "a@b.de".to_string(),
            },
        );
        store.begin("u1");
        assert_eq!(store.get("u1"), Some(LoginFlow::AwaitEmail));
    }
}
