// SPDX-FileCopyrightText: 2026 Beatbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed CRUD operations, one module per table.

pub mod autojoins;
pub mod subscriptions;
pub mod users;
