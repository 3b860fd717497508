// SPDX-FileCopyrightText: 2026 Beatbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `beatbot serve` command implementation.
//!
//! Wires storage, the provider client, the recurrence engine, the
//! background scheduler tasks, and the Telegram dispatcher, then runs
//! until SIGINT/SIGTERM.

use std::sync::Arc;
use std::time::Duration;

use beatbot_config::model::BeatbotConfig;
use beatbot_core::traits::BookingApi;
use beatbot_core::BeatbotError;
use beatbot_provider::B81Client;
use beatbot_recurrence::RecurrenceEngine;
use beatbot_scheduler::shutdown;
use beatbot_storage::Database;
use beatbot_telegram::BotContext;
use tracing::info;

/// Runs the `beatbot serve` command.
pub async fn run_serve(config: BeatbotConfig) -> Result<(), BeatbotError> {
    init_tracing(&config.bot.log_level);

    info!(name = %config.bot.name, "starting beatbot serve");

    let db = Arc::new(Database::open(&config.storage.database_path).await?);
    info!(path = %config.storage.database_path, "database ready");

    let api: Arc<dyn BookingApi> = Arc::new(B81Client::new(
        config.provider.base_url.clone(),
        Duration::from_secs(config.provider.timeout_secs),
    )?);

    let engine = Arc::new(RecurrenceEngine::new(
        api.clone(),
        db.clone(),
        &config.scheduler,
    ));

    let bot = beatbot_telegram::build_bot(&config.telegram)?;
    let ctx = Arc::new(BotContext::new(
        api,
        db.clone(),
        engine.clone(),
        &config.display,
    )?);

    let cancel = shutdown::install_signal_handler();
    let tasks = beatbot_scheduler::spawn_all(engine, &config.scheduler, cancel.clone())?;
    info!(
        cron = %config.scheduler.subscription_cron,
        sweep_secs = config.scheduler.sweep_interval_secs,
        "background tasks started",
    );

    // Blocks until the cancellation token stops the dispatcher.
    beatbot_telegram::run(bot, ctx, cancel.clone()).await;

    info!("dispatcher stopped, waiting for background tasks");
    for task in tasks {
        if let Err(e) = task.await {
            tracing::warn!(error = %e, "background task join failed");
        }
    }

    match Arc::try_unwrap(db) {
        Ok(db) => db.close().await?,
        Err(_) => info!("database still referenced at shutdown, skipping checkpoint"),
    }

    info!("beatbot serve stopped");
    Ok(())
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("beatbot={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
