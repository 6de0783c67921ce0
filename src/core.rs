//! Core message types for slack-notify
//!
//! This module defines the caller-facing input shapes (`MessageInput`,
//! `MessageOptions`) and the normalized wire shapes (`Payload`, `Attachment`,
//! `Field`) that the composer produces and the dispatcher serializes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// What a caller hands to a sender: either a bare line of text or a full
/// options structure.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageInput {
    /// Shorthand for `MessageOptions { text: Some(..), .. }`.
    Text(String),
    /// A structure with any payload-like fields.
    Options(MessageOptions),
}

impl MessageInput {
    /// Converts the input into an options structure.
    pub fn into_options(self) -> MessageOptions {
        match self {
            MessageInput::Text(text) => MessageOptions {
                text: Some(text),
                ..Default::default()
            },
            MessageInput::Options(options) => options,
        }
    }
}

impl From<&str> for MessageInput {
    fn from(text: &str) -> Self {
        MessageInput::Text(text.to_string())
    }
}

impl From<String> for MessageInput {
    fn from(text: String) -> Self {
        MessageInput::Text(text)
    }
}

impl From<MessageOptions> for MessageInput {
    fn from(options: MessageOptions) -> Self {
        MessageInput::Options(options)
    }
}

/// One channel name or a list of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChannelTarget {
    One(String),
    Many(Vec<String>),
}

impl From<&str> for ChannelTarget {
    fn from(channel: &str) -> Self {
        ChannelTarget::One(channel.to_string())
    }
}

impl From<Vec<String>> for ChannelTarget {
    fn from(channels: Vec<String>) -> Self {
        ChannelTarget::Many(channels)
    }
}

/// A flag Slack accepts as either a boolean or `0`/`1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Toggle {
    Bool(bool),
    Int(i64),
}

/// Loosely-typed message options, as supplied by a caller or a preset.
///
/// Every field is optional so that caller options can be layered over preset
/// defaults key by key. Keys that are not modelled here are kept in `extra`
/// and passed through to the wire untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MessageOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<ChannelTarget>,
    /// Plural form of `channel`; wins over `channel` when both are set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channels: Option<ChannelTarget>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_emoji: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<Attachment>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unfurl_links: Option<Toggle>,
    /// Field title to value, in insertion order. Rendered as one attachment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MessageOptions {
    /// Starts an options structure carrying only `text`.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn with_channel(mut self, channel: impl Into<ChannelTarget>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    pub fn with_channels<I, S>(mut self, channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.channels = Some(ChannelTarget::Many(
            channels.into_iter().map(Into::into).collect(),
        ));
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_icon_emoji(mut self, emoji: impl Into<String>) -> Self {
        self.icon_emoji = Some(emoji.into());
        self
    }

    pub fn with_icon_url(mut self, url: impl Into<String>) -> Self {
        self.icon_url = Some(url.into());
        self
    }

    pub fn with_unfurl_links(mut self, unfurl: Toggle) -> Self {
        self.unfurl_links = Some(unfurl);
        self
    }

    /// Appends one `title -> value` entry to `fields`.
    pub fn with_field(mut self, title: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields
            .get_or_insert_with(Map::new)
            .insert(title.into(), value.into());
        self
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.get_or_insert_with(Vec::new).push(attachment);
        self
    }

    /// Sets an arbitrary pass-through key.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Layers `self` over `defaults` into a new structure.
    ///
    /// Keys set on `self` win; keys only present in `defaults` are copied.
    /// Neither input is modified.
    pub fn merged_over(&self, defaults: &MessageOptions) -> MessageOptions {
        let mut extra = defaults.extra.clone();
        for (key, value) in &self.extra {
            extra.insert(key.clone(), value.clone());
        }

        MessageOptions {
            channel: self.channel.clone().or_else(|| defaults.channel.clone()),
            channels: self.channels.clone().or_else(|| defaults.channels.clone()),
            username: self.username.clone().or_else(|| defaults.username.clone()),
            icon_emoji: self.icon_emoji.clone().or_else(|| defaults.icon_emoji.clone()),
            icon_url: self.icon_url.clone().or_else(|| defaults.icon_url.clone()),
            text: self.text.clone().or_else(|| defaults.text.clone()),
            attachments: self
                .attachments
                .clone()
                .or_else(|| defaults.attachments.clone()),
            unfurl_links: self.unfurl_links.or(defaults.unfurl_links),
            fields: self.fields.clone().or_else(|| defaults.fields.clone()),
            extra,
        }
    }
}

/// A single normalized message, ready to be serialized and posted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Payload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_emoji: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<Attachment>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unfurl_links: Option<Toggle>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A block of rich content attached to a message.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(default)]
    pub fallback: String,
    #[serde(default)]
    pub fields: Vec<Field>,
    /// Other attachment keys (`color`, `pretext`, ...) passed through as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One row of an attachment's field table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub title: String,
    pub value: String,
    /// Display hint: the value is short enough to sit side by side with others.
    pub short: bool,
}
