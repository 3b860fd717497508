// SPDX-FileCopyrightText: 2026 Beatbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the provider's JSON envelopes.
//!
//! Every response body wraps its payload in a `data` field; list endpoints
//! additionally carry pagination counters we do not use.

use beatbot_core::types::{Event, Ticket};
use serde::Deserialize;

/// Single-object response envelope.
#[derive(Debug, Deserialize)]
pub struct Enveloped<T> {
    pub data: T,
}

/// List response envelope with pagination counters.
#[derive(Debug, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub total: Option<u64>,
}

/// Body for `POST /api/authentication`.
#[derive(Debug, serde::Serialize)]
pub struct AuthRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub strategy: &'static str,
}

/// Payload of a successful authentication, inside the `data` envelope.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthPayload {
    pub access_token: String,
}

/// Body for `POST /api/tickets/{id}/status`.
#[derive(Debug, serde::Serialize)]
pub struct TicketStatusRequest {
    pub status_name: &'static str,
}

/// Body for `POST /api/tickets`.
#[derive(Debug, serde::Serialize)]
pub struct CreateTicketRequest<'a> {
    pub event_id: &'a str,
    pub user_id: &'a str,
}

pub type TicketList = Paginated<Ticket>;
pub type EventList = Paginated<Event>;
