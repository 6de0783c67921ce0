//! slack-notify - Send formatted notifications to a Slack incoming webhook
//!
//! This library shapes loosely-typed message options into Slack webhook
//! payloads and posts them, one HTTP exchange per target channel.

pub mod app;
pub mod cli;
pub mod config;
pub mod core;
pub mod formatting;
pub mod notification;
pub mod presets;

// Re-export the types most callers need
pub use crate::core::{Attachment, ChannelTarget, Field, MessageInput, MessageOptions, Payload, Toggle};
pub use notification::{Delivery, NotifyError, SendReport, Sender, SlackNotifier};
pub use presets::Preset;
