//! Delivery of composed messages to a Slack incoming webhook.
//!
//! `slack` holds the HTTP transport and the dispatcher that classifies a
//! single exchange. `notifier` binds presets to the dispatcher and exposes the
//! named senders callers use.
pub mod notifier;
pub mod slack;

use std::sync::Arc;
use thiserror::Error;

pub use notifier::{Delivery, SendReport, Sender, SlackNotifier};
pub use slack::{Dispatcher, HttpTransport, WebhookTransport};

/// The literal body Slack answers with when it accepts a message.
pub const ACK_BODY: &str = "ok";

#[derive(Error, Debug)]
pub enum NotifyError {
    /// The HTTP exchange itself failed (DNS, connect, transport timeout).
    #[error(transparent)]
    Transport(anyhow::Error),

    /// The webhook answered, but not with the acknowledgment body. The message
    /// is the body text exactly as received.
    #[error("{body}")]
    Rejected { body: String },

    #[error("failed to serialize payload: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Side-channel observer invoked once for every failed payload.
pub type ErrorHook = Arc<dyn Fn(&NotifyError) + Send + Sync>;
