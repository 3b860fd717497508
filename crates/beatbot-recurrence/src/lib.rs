// SPDX-FileCopyrightText: 2026 Beatbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Weekly recurrence resolution and the registration engine.
//!
//! [`resolver`] holds the pure calendar math; [`engine`] drives the daily
//! subscription cycle and the auto-join sweep against the provider.

pub mod engine;
pub mod resolver;

pub use engine::{CycleStats, RecurrenceEngine, SweepStats};
