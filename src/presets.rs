//! Named message templates.

use crate::core::MessageOptions;
use serde::{Deserialize, Serialize};

pub const SEND: &str = "send";
pub const BUG: &str = "bug";
pub const ALERT: &str = "alert";
pub const NOTE: &str = "note";
pub const SUCCESS: &str = "success";

/// A named set of default message options.
///
/// Presets are read-only templates: every send merges caller options into a
/// fresh copy, so one call can never leak into the next.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    pub defaults: MessageOptions,
}

impl Preset {
    pub fn new(name: impl Into<String>, defaults: MessageOptions) -> Self {
        Self {
            name: name.into(),
            defaults,
        }
    }

    /// The generic sender: `Robot` with a bell and empty text.
    pub fn send() -> Self {
        Self::new(
            SEND,
            MessageOptions::text("")
                .with_username("Robot")
                .with_icon_emoji(":bell:"),
        )
    }

    pub fn bug() -> Self {
        Self::new(BUG, fixed("#bugs", ":bomb:", "Bug"))
    }

    pub fn alert() -> Self {
        Self::new(ALERT, fixed("#alerts", ":warning:", "Alert"))
    }

    pub fn note() -> Self {
        Self::new(NOTE, fixed("#alerts", ":bulb:", "Note"))
    }

    pub fn success() -> Self {
        Self::new(SUCCESS, fixed("#alerts", ":trophy:", "Hoorah"))
    }

    /// All built-in presets.
    pub fn builtin() -> Vec<Preset> {
        vec![
            Self::send(),
            Self::bug(),
            Self::alert(),
            Self::note(),
            Self::success(),
        ]
    }
}

fn fixed(channel: &str, icon_emoji: &str, username: &str) -> MessageOptions {
    MessageOptions::default()
        .with_channel(channel)
        .with_icon_emoji(icon_emoji)
        .with_username(username)
}
