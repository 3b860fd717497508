// SPDX-FileCopyrightText: 2026 Beatbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the core engine and its external collaborators.

pub mod booking;

pub use booking::BookingApi;
