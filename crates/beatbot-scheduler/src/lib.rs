// SPDX-FileCopyrightText: 2026 Beatbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Background tasks driving the recurrence engine.
//!
//! Two long-running tasks, both cooperating with a shared
//! [`CancellationToken`]: a cron-timed daily subscription cycle and a
//! fast-interval auto-join sweep. Task failures are logged per run; the
//! tasks themselves only exit on cancellation.

pub mod shutdown;

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use beatbot_config::model::SchedulerConfig;
use beatbot_core::BeatbotError;
use beatbot_recurrence::RecurrenceEngine;
use chrono::{DateTime, Utc};
use croner::Cron;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Parse the configured cron pattern for the subscription cycle.
pub fn parse_cycle_cron(pattern: &str) -> Result<Cron, BeatbotError> {
    Cron::from_str(pattern)
        .map_err(|e| BeatbotError::Config(format!("invalid cron pattern {pattern:?}: {e}")))
}

/// Time until the next cron fire after `now`.
pub fn time_until_next_fire(cron: &Cron, now: DateTime<Utc>) -> Result<Duration, BeatbotError> {
    let next = cron
        .find_next_occurrence(&now, false)
        .map_err(|e| BeatbotError::Config(format!("cron pattern has no next fire: {e}")))?;
    Ok((next - now).to_std().unwrap_or(Duration::ZERO))
}

/// Spawn the daily subscription cycle task.
///
/// Sleeps until the next cron fire, runs one cycle, repeats. Exits when
/// `token` is cancelled.
pub fn spawn_cycle_task(
    engine: Arc<RecurrenceEngine>,
    cron: Cron,
    token: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let wait = match time_until_next_fire(&cron, Utc::now()) {
                Ok(wait) => wait,
                Err(e) => {
                    error!(error = %e, "cycle task stopping");
                    return;
                }
            };
            debug!(wait_secs = wait.as_secs(), "cycle task sleeping until next fire");

            tokio::select! {
                _ = token.cancelled() => {
                    info!("cycle task cancelled");
                    return;
                }
                _ = tokio::time::sleep(wait) => {
                    match engine.run_cycle().await {
                        Ok(stats) => info!(
                            booked = stats.booked,
                            duplicates = stats.duplicates,
                            stopped = stats.stopped,
                            "subscription cycle completed",
                        ),
                        Err(e) => warn!(error = %e, "subscription cycle failed"),
                    }
                }
            }
        }
    })
}

/// Spawn the auto-join sweep task on a fixed interval.
///
/// The first sweep runs immediately so restarts pick up pending intents
/// without delay. Exits when `token` is cancelled.
pub fn spawn_sweep_task(
    engine: Arc<RecurrenceEngine>,
    interval_secs: u64,
    token: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    info!("sweep task cancelled");
                    return;
                }
                _ = interval.tick() => {
                    match engine.run_sweep().await {
                        Ok(stats) if stats.pending > 0 => info!(
                            pending = stats.pending,
                            completed = stats.completed,
                            abandoned = stats.abandoned,
                            failed = stats.failed,
                            "auto-join sweep completed",
                        ),
                        Ok(_) => debug!("auto-join sweep found nothing pending"),
                        Err(e) => warn!(error = %e, "auto-join sweep failed"),
                    }
                }
            }
        }
    })
}

/// Spawn both background tasks from the scheduler configuration.
pub fn spawn_all(
    engine: Arc<RecurrenceEngine>,
    config: &SchedulerConfig,
    token: CancellationToken,
) -> Result<Vec<JoinHandle<()>>, BeatbotError> {
    let cron = parse_cycle_cron(&config.subscription_cron)?;
    Ok(vec![
        spawn_cycle_task(engine.clone(), cron, token.clone()),
        spawn_sweep_task(engine, config.sweep_interval_secs, token),
    ])
}
