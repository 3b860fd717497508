// SPDX-FileCopyrightText: 2026 Beatbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the beatbot workspace.
//!
//! Provides the shared error type, the domain types (cities, weekdays,
//! events, tickets), and the [`BookingApi`] trait that decouples the
//! recurrence engine and the chat layer from the provider HTTP client.

pub mod error;
pub mod traits;
pub mod types;

pub use error::BeatbotError;
pub use traits::BookingApi;
pub use types::{Address, AuthSession, City, Event, EventLocation, Ticket, Weekday};
