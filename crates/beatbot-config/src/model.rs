// SPDX-FileCopyrightText: 2026 Beatbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for beatbot.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup with actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level beatbot configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values; only `telegram.bot_token` has no usable default.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BeatbotConfig {
    /// Bot identity and logging.
    #[serde(default)]
    pub bot: BotConfig,

    /// Telegram bot integration settings.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Booking provider API settings.
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Recurring-registration scheduler settings.
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Display and session settings.
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Bot identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BotConfig {
    /// Display name of the bot.
    #[serde(default = "default_bot_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: default_bot_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_bot_name() -> String {
    "beatbot".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Telegram bot integration configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Telegram Bot API token. `None` means `serve` refuses to start.
    #[serde(default)]
    pub bot_token: Option<String>,
}

/// Booking provider API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    /// Base URL of the provider API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds for all provider calls.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.production.b81.io".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("beatbot").join("beatbot.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("beatbot.db"))
        .to_string_lossy()
        .into_owned()
}

/// Where a registration series starts relative to the clicked or
/// resolved occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesAnchor {
    /// Book starting one week beyond the immediately-next occurrence,
    /// so the nearest class is never grabbed out from under a user who
    /// booked it manually.
    NextWeek,
    /// Book starting at the immediately-next occurrence.
    Nearest,
}

/// Recurring-registration scheduler configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SchedulerConfig {
    /// Cron pattern for the daily subscription cycle.
    #[serde(default = "default_subscription_cron")]
    pub subscription_cron: String,

    /// Seconds between auto-join sweep runs.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    /// Forward pre-booking window in days.
    #[serde(default = "default_horizon_days")]
    pub horizon_days: i64,

    /// Auto-join intents older than this are abandoned and deleted.
    /// `0` disables the bound (retry forever).
    #[serde(default = "default_autojoin_max_age_days")]
    pub autojoin_max_age_days: i64,

    /// Anchor for the registration chain.
    #[serde(default = "default_series_anchor")]
    pub series_anchor: SeriesAnchor,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            subscription_cron: default_subscription_cron(),
            sweep_interval_secs: default_sweep_interval_secs(),
            horizon_days: default_horizon_days(),
            autojoin_max_age_days: default_autojoin_max_age_days(),
            series_anchor: default_series_anchor(),
        }
    }
}

fn default_subscription_cron() -> String {
    // 00:05 daily, matching the provider's overnight schedule publication.
    "5 0 * * *".to_string()
}

fn default_sweep_interval_secs() -> u64 {
    60
}

fn default_horizon_days() -> i64 {
    21
}

fn default_autojoin_max_age_days() -> i64 {
    14
}

fn default_series_anchor() -> SeriesAnchor {
    SeriesAnchor::NextWeek
}

/// Display timezone and chat session configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DisplayConfig {
    /// IANA timezone name used for all user-facing times.
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Seconds of inactivity before a login session in the chat layer expires.
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            session_ttl_secs: default_session_ttl_secs(),
        }
    }
}

fn default_timezone() -> String {
    "Europe/Berlin".to_string()
}

fn default_session_ttl_secs() -> u64 {
    600
}
