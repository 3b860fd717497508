// SPDX-FileCopyrightText: 2026 Beatbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as a resolvable timezone and positive intervals.

use std::str::FromStr;

use crate::diagnostic::ConfigError;
use crate::model::BeatbotConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects all violations instead of failing fast.
pub fn validate_config(config: &BeatbotConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.provider.base_url.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "provider.base_url must not be empty".to_string(),
        });
    }

    if config.provider.timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "provider.timeout_secs must be positive".to_string(),
        });
    }

    if config.scheduler.sweep_interval_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "scheduler.sweep_interval_secs must be positive".to_string(),
        });
    }

    if config.scheduler.horizon_days < 1 {
        errors.push(ConfigError::Validation {
            message: format!(
                "scheduler.horizon_days must be at least 1, got {}",
                config.scheduler.horizon_days
            ),
        });
    }

    if config.scheduler.autojoin_max_age_days < 0 {
        errors.push(ConfigError::Validation {
            message: format!(
                "scheduler.autojoin_max_age_days must be non-negative (0 = unbounded), got {}",
                config.scheduler.autojoin_max_age_days
            ),
        });
    }

    if let Err(e) = croner::Cron::from_str(&config.scheduler.subscription_cron) {
        errors.push(ConfigError::Validation {
            message: format!(
                "scheduler.subscription_cron `{}` is not a valid cron pattern: {e}",
                config.scheduler.subscription_cron
            ),
        });
    }

    if chrono_tz::Tz::from_str(&config.display.timezone).is_err() {
        errors.push(ConfigError::Validation {
            message: format!(
                "display.timezone `{}` is not a known IANA timezone",
                config.display.timezone
            ),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
