// SPDX-FileCopyrightText: 2026 Beatbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Contract for the booking provider's HTTP surface.
//!
//! Implemented by `beatbot-provider`; the recurrence engine and the chat
//! layer only ever see this trait, so tests can substitute a mock.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::BeatbotError;
use crate::types::{AuthSession, City, Event, Ticket};

/// Stateless request/response wrapper around the provider's
/// authentication, ticket, and event endpoints.
///
/// All calls are single round trips over authenticated HTTPS. A 401
/// response surfaces as [`BeatbotError::Unauthorized`] so callers can
/// invalidate the cached token; a duplicate booking surfaces as
/// [`BeatbotError::Duplicate`] and is benign.
#[async_trait]
pub trait BookingApi: Send + Sync {
    /// Log in with email/password and return the bearer token plus the
    /// identity fields decoded from its JWT payload.
    async fn authenticate(&self, email: &str, password: &str)
    -> Result<AuthSession, BeatbotError>;

    /// Upcoming, non-cancelled tickets for the user, soonest first.
    async fn list_tickets(
        &self,
        token: &str,
        provider_user_id: &str,
    ) -> Result<Vec<Ticket>, BeatbotError>;

    /// Cancel a ticket by id.
    async fn cancel_ticket(&self, token: &str, ticket_id: &str) -> Result<(), BeatbotError>;

    /// Fetch a single ticket with its embedded event.
    async fn get_ticket(&self, token: &str, ticket_id: &str) -> Result<Ticket, BeatbotError>;

    /// Fetch a single event. Unauthenticated on the provider side.
    async fn get_event(&self, event_id: &str) -> Result<Event, BeatbotError>;

    /// Published, non-cancelled events in a city within `[from, to]`,
    /// sorted by start time.
    async fn list_events(
        &self,
        city: City,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<Event>, BeatbotError>;

    /// Register the user for an event. A provider-side duplicate
    /// rejection maps to [`BeatbotError::Duplicate`].
    async fn create_ticket(
        &self,
        token: &str,
        event_id: &str,
        provider_user_id: &str,
    ) -> Result<Ticket, BeatbotError>;
}
