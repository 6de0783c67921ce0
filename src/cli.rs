//! Command-Line Interface (CLI) argument parsing.
//!
//! This module defines the command-line arguments using the `clap` crate.
//! Message-shaping flags build the `MessageOptions` handed to a sender, while
//! the settings flags are merged into the figment configuration on top of the
//! `slack-notify.toml` file and environment variables.

use crate::core::{ChannelTarget, MessageOptions, Toggle};
use crate::presets;
use clap::Parser;
use figment::{
    value::{Dict, Map, Value},
    Error, Metadata, Profile, Provider,
};
use std::path::PathBuf;

/// Send a notification to a Slack incoming webhook.
#[derive(Parser, Debug, Default, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Message text.
    #[arg(value_name = "TEXT")]
    pub text: Option<String>,

    /// Path to the TOML configuration file.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Slack incoming webhook URL.
    #[arg(long, value_name = "URL")]
    pub webhook_url: Option<String>,

    /// Preset to send with (send, bug, alert, note, success, or a configured one).
    #[arg(short, long, value_name = "NAME")]
    pub preset: Option<String>,

    /// Target channel. Repeat to send one message per channel.
    #[arg(long = "channel", value_name = "NAME")]
    pub channels: Vec<String>,

    /// Display name of the bot.
    #[arg(long)]
    pub username: Option<String>,

    /// Emoji icon, e.g. `:rocket:`.
    #[arg(long)]
    pub icon_emoji: Option<String>,

    /// Image URL icon. Takes precedence over any emoji icon.
    #[arg(long)]
    pub icon_url: Option<String>,

    /// Attachment field as TITLE=VALUE. Repeatable; order is kept.
    #[arg(long = "field", value_name = "TITLE=VALUE", value_parser = parse_field)]
    pub fields: Vec<(String, String)>,

    /// Ask Slack to unfurl links in the message.
    #[arg(long)]
    pub unfurl_links: bool,

    /// Logging level (error, warn, info, debug, trace).
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Timeout for the HTTP exchange in seconds.
    #[arg(long, value_name = "SECONDS")]
    pub timeout_seconds: Option<u64>,

    /// Print the available preset names and exit.
    #[arg(long)]
    pub list_presets: bool,
}

impl Cli {
    /// The preset to send with, `send` when none was given.
    pub fn preset_name(&self) -> &str {
        self.preset.as_deref().unwrap_or(presets::SEND)
    }

    /// Builds the caller options described by the message flags.
    pub fn message(&self) -> MessageOptions {
        let mut options = MessageOptions {
            text: self.text.clone(),
            username: self.username.clone(),
            icon_emoji: self.icon_emoji.clone(),
            icon_url: self.icon_url.clone(),
            ..Default::default()
        };

        match self.channels.as_slice() {
            [] => {}
            [single] => options.channel = Some(ChannelTarget::One(single.clone())),
            many => options.channels = Some(ChannelTarget::Many(many.to_vec())),
        }

        for (title, value) in &self.fields {
            options = options.with_field(title.clone(), value.clone());
        }

        if self.unfurl_links {
            options.unfurl_links = Some(Toggle::Bool(true));
        }
        options
    }
}

fn parse_field(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((title, value)) if !title.is_empty() => Ok((title.to_string(), value.to_string())),
        _ => Err(format!("expected TITLE=VALUE, got `{raw}`")),
    }
}

impl Provider for Cli {
    fn metadata(&self) -> Metadata {
        Metadata::named("Command-Line Arguments")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        let mut dict = Dict::new();

        if let Some(url) = &self.webhook_url {
            dict.insert("webhook_url".into(), Value::from(url.clone()));
        }

        if let Some(level) = &self.log_level {
            dict.insert("log_level".into(), Value::from(level.clone()));
        }

        if let Some(timeout) = self.timeout_seconds {
            dict.insert("timeout_seconds".into(), Value::from(timeout));
        }

        let mut map = Map::new();
        map.insert(Profile::Default, dict);
        Ok(map)
    }
}
