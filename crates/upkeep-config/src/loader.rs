// SPDX-FileCopyrightText: 2026 Upkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports the XDG hierarchy: `./upkeep.toml` > `~/.config/upkeep/upkeep.toml`
//! > `/etc/upkeep/upkeep.toml`, with environment variable overrides via the
//! `UPKEEP_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::UpkeepConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/upkeep/upkeep.toml` (system-wide)
/// 3. `~/.config/upkeep/upkeep.toml` (user XDG config)
/// 4. `./upkeep.toml` (local directory)
/// 5. `UPKEEP_*` environment variables
pub fn load_config() -> Result<UpkeepConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(UpkeepConfig::default()))
        .merge(Toml::file("/etc/upkeep/upkeep.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("upkeep/upkeep.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("upkeep.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<UpkeepConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(UpkeepConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<UpkeepConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(UpkeepConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `UPKEEP_STORAGE_DATABASE_PATH` must map
/// to `storage.database_path`, not `storage.database.path`.
fn env_provider() -> Env {
    Env::prefixed("UPKEEP_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("server_", "server.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("admin_", "admin.", 1);
        mapped.into()
    })
}
