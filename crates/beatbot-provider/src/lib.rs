// SPDX-FileCopyrightText: 2026 Beatbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the class booking provider.
//!
//! Implements [`beatbot_core::traits::BookingApi`] over the provider's JSON
//! API: authentication, ticket listing/booking/cancellation, and event
//! discovery. The access token's JWT payload supplies the provider user id.

pub mod client;
pub mod jwt;
pub mod types;

pub use client::B81Client;
