// SPDX-FileCopyrightText: 2026 Beatbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types shared across the beatbot workspace.

use thiserror::Error;

/// The primary error type used across all beatbot crates.
///
/// Batch operations (the subscription cycle, the auto-join sweep) catch
/// these per item and log them; they never abort the remaining items.
#[derive(Debug, Error)]
pub enum BeatbotError {
    /// Configuration errors (invalid TOML, missing required fields).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The provider rejected the credentials or the cached token expired.
    ///
    /// Surfaced distinctly from [`Transport`](Self::Transport) so the chat
    /// layer can invalidate the stored token and re-prompt login.
    #[error("unauthorized: credentials rejected or token expired")]
    Unauthorized,

    /// No matching entity (event, ticket, user) was found.
    #[error("not found: {what}")]
    NotFound { what: String },

    /// The entity already exists (unique constraint, duplicate booking).
    ///
    /// Benign in batch context: the desired state is already in place.
    #[error("already exists: {what}")]
    Duplicate { what: String },

    /// Network or HTTP failure talking to the booking provider.
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Malformed timestamp or payload from the provider.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Chat channel errors (Telegram API failure, malformed callback).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl BeatbotError {
    /// True for the benign "already exists" case.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, BeatbotError::Duplicate { .. })
    }

    /// True when the caller should invalidate cached credentials.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, BeatbotError::Unauthorized)
    }
}
