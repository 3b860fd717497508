// SPDX-FileCopyrightText: 2026 Beatbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./beatbot.toml` > `~/.config/beatbot/beatbot.toml`
//! > `/etc/beatbot/beatbot.toml` with environment variable overrides via
//! the `BEATBOT_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::BeatbotConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/beatbot/beatbot.toml` (system-wide)
/// 3. `~/.config/beatbot/beatbot.toml` (user XDG config)
/// 4. `./beatbot.toml` (local directory)
/// 5. `BEATBOT_*` environment variables
pub fn load_config() -> Result<BeatbotConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(BeatbotConfig::default()))
        .merge(Toml::file("/etc/beatbot/beatbot.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("beatbot/beatbot.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("beatbot.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<BeatbotConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(BeatbotConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<BeatbotConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(BeatbotConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` instead of `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `BEATBOT_TELEGRAM_BOT_TOKEN` must map
/// to `telegram.bot_token`, not `telegram.bot.token`.
fn env_provider() -> Env {
    Env::prefixed("BEATBOT_").map(|key| {
        // Figment hands the key through in its environment casing.
        let lower = key.as_str().to_ascii_lowercase();
        // "bot" goes last: it is a prefix of "bot_token" inside the
        // telegram and other sections.
        for section in [
            "telegram",
            "provider",
            "storage",
            "scheduler",
            "display",
            "bot",
        ] {
            if let Some(rest) = lower
                .strip_prefix(section)
                .and_then(|rest| rest.strip_prefix('_'))
            {
                return format!("{section}.{rest}").into();
            }
        }
        lower.into()
    })
}
