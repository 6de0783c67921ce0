//! Configuration management for slack-notify
//!
//! This module defines the `Config` struct that holds every runtime setting.
//! It uses the `figment` crate to layer built-in defaults, a
//! `slack-notify.toml` file, `SLACK_NOTIFY_*` environment variables and
//! command-line flags, in that order of precedence.

use crate::cli::Cli;
use crate::core::MessageOptions;
use anyhow::{bail, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// File read when no `--config` path is given. A missing file is not an error.
pub const DEFAULT_CONFIG_FILE: &str = "slack-notify.toml";

/// Prefix of environment overrides, e.g. `SLACK_NOTIFY_WEBHOOK_URL`.
pub const ENV_PREFIX: &str = "SLACK_NOTIFY_";

/// The main configuration struct for the application.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    /// The Slack incoming webhook URL. Unset or empty disables delivery.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
    /// The logging level for the application.
    pub log_level: String,
    /// Transport-level timeout for one HTTP exchange. Unset means no timeout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,
    /// Additional named presets. A name shared with a built-in replaces it.
    #[serde(default)]
    pub presets: BTreeMap<String, MessageOptions>,
}

impl Config {
    /// Loads the configuration, layering defaults, the TOML file, environment
    /// variables and command-line arguments.
    pub fn load(cli: &Cli) -> Result<Self> {
        let config_path = match &cli.config {
            Some(path) if !path.exists() => {
                bail!("Configuration file not found: {}", path.display())
            }
            Some(path) => path.clone(),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_path))
            // Nested keys use a double underscore, e.g. SLACK_NOTIFY_PRESETS__DEPLOY__CHANNEL
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .merge(cli.clone())
            .extract()?;
        Ok(config)
    }

    /// True when a non-blank webhook URL is set.
    pub fn is_delivery_enabled(&self) -> bool {
        self.webhook_url
            .as_deref()
            .is_some_and(|url| !url.trim().is_empty())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            webhook_url: None,
            log_level: "info".to_string(),
            timeout_seconds: None,
            presets: BTreeMap::new(),
        }
    }
}
