// SPDX-FileCopyrightText: 2026 Guichet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports the XDG hierarchy: `./guichet.toml` > `~/.config/guichet/guichet.toml`
//! > `/etc/guichet/guichet.toml`, with environment variable overrides via
//! the `GUICHET_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::GuichetConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/guichet/guichet.toml` (system-wide)
/// 3. `~/.config/guichet/guichet.toml` (user XDG config)
/// 4. `./guichet.toml` (local directory)
/// 5. `GUICHET_*` environment variables
pub fn load_config() -> Result<GuichetConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(GuichetConfig::default()))
        .merge(Toml::file("/etc/guichet/guichet.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("guichet/guichet.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("guichet.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<GuichetConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(GuichetConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<GuichetConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(GuichetConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider with explicit section mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` so key names containing
/// underscores stay unambiguous: `GUICHET_SERVER_PORT` maps to
/// `server.port` and `GUICHET_LOG_LEVEL` to `log.level`.
fn env_provider() -> Env {
    Env::prefixed("GUICHET_").map(|key| {
        let mapped = key
            .as_str()
            .to_ascii_lowercase()
            .replacen("server_", "server.", 1)
            .replacen("log_", "log.", 1);
        mapped.into()
    })
}
