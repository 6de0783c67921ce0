//! The caller-facing notifier: named senders bound to presets.

use crate::config::Config;
use crate::core::{MessageInput, Payload};
use crate::formatting::compose;
use crate::notification::slack::{Dispatcher, HttpTransport, WebhookTransport};
use crate::notification::{ErrorHook, NotifyError};
use crate::presets::{self, Preset};
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// The outcome of one dispatched payload.
#[derive(Debug)]
pub struct Delivery {
    /// The channel the payload was addressed to, if any.
    pub channel: Option<String>,
    pub result: Result<(), NotifyError>,
}

/// The outcome of one logical send.
///
/// A send that fans out over several channels produces one `Delivery` per
/// channel, listed in the order the channels were given.
#[derive(Debug)]
pub enum SendReport {
    /// No webhook URL is configured; nothing was sent.
    NotConfigured,
    Dispatched(Vec<Delivery>),
}

impl SendReport {
    pub fn deliveries(&self) -> &[Delivery] {
        match self {
            SendReport::NotConfigured => &[],
            SendReport::Dispatched(deliveries) => deliveries.as_slice(),
        }
    }

    /// True when something was dispatched and every delivery succeeded.
    pub fn is_success(&self) -> bool {
        match self {
            SendReport::NotConfigured => false,
            SendReport::Dispatched(deliveries) => deliveries.iter().all(|d| d.result.is_ok()),
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = &Delivery> {
        self.deliveries().iter().filter(|d| d.result.is_err())
    }
}

/// A preset bound to the delivery pipeline.
#[derive(Clone)]
pub struct Sender {
    preset: Arc<Preset>,
    dispatcher: Option<Arc<Dispatcher>>,
}

impl Sender {
    pub fn preset(&self) -> &Preset {
        &self.preset
    }

    /// Builds the payloads this sender would dispatch for `input`.
    pub fn compose(&self, input: impl Into<MessageInput>) -> Vec<Payload> {
        compose(input.into(), &self.preset.defaults)
    }

    /// Composes and delivers a message, resolving once every per-channel
    /// exchange has finished.
    pub async fn send(&self, input: impl Into<MessageInput>) -> SendReport {
        let Some(dispatcher) = &self.dispatcher else {
            warn!("No Slack URL configured.");
            return SendReport::NotConfigured;
        };

        let payloads = self.compose(input);
        info!(
            preset = %self.preset.name,
            count = payloads.len(),
            "Sending Slack notification"
        );

        let deliveries = join_all(payloads.into_iter().map(|payload| async move {
            let result = dispatcher.dispatch(&payload).await;
            Delivery {
                channel: payload.channel,
                result,
            }
        }))
        .await;

        SendReport::Dispatched(deliveries)
    }

    /// Starts a send in the background and returns immediately.
    pub fn spawn(&self, input: impl Into<MessageInput>) -> JoinHandle<SendReport> {
        let sender = self.clone();
        let input = input.into();
        tokio::spawn(async move { sender.send(input).await })
    }
}

/// Sends notifications to one Slack incoming webhook.
#[derive(Clone)]
pub struct SlackNotifier {
    dispatcher: Option<Arc<Dispatcher>>,
    presets: HashMap<String, Arc<Preset>>,
}

impl SlackNotifier {
    /// Creates a notifier posting over HTTP. A missing or empty URL yields a
    /// notifier whose sends are all no-ops.
    pub fn new(webhook_url: Option<String>) -> Self {
        Self::with_transport(webhook_url, Arc::new(HttpTransport::default()))
    }

    pub fn with_transport(
        webhook_url: Option<String>,
        transport: Arc<dyn WebhookTransport>,
    ) -> Self {
        let dispatcher = webhook_url
            .filter(|url| !url.trim().is_empty())
            .map(|url| Arc::new(Dispatcher::new(url, transport)));

        let presets = Preset::builtin()
            .into_iter()
            .map(|preset| (preset.name.clone(), Arc::new(preset)))
            .collect();

        Self {
            dispatcher,
            presets,
        }
    }

    /// Builds a notifier from loaded configuration, including any presets it
    /// defines.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let transport = HttpTransport::new(config.timeout_seconds.map(Duration::from_secs))?;
        Ok(Self::from_config_with_transport(config, Arc::new(transport)))
    }

    /// Like `from_config`, posting through the given transport.
    pub fn from_config_with_transport(
        config: &Config,
        transport: Arc<dyn WebhookTransport>,
    ) -> Self {
        config.presets.iter().fold(
            Self::with_transport(config.webhook_url.clone(), transport),
            |notifier, (name, defaults)| {
                notifier.with_preset(Preset::new(name.clone(), defaults.clone()))
            },
        )
    }

    /// Installs a side-channel observer called once for each failed payload,
    /// before that payload's `Delivery` is recorded.
    pub fn on_error<F>(mut self, hook: F) -> Self
    where
        F: Fn(&NotifyError) + Send + Sync + 'static,
    {
        let hook: ErrorHook = Arc::new(hook);
        self.dispatcher = self.dispatcher.map(|dispatcher| {
            Arc::new(Dispatcher::clone(&dispatcher).with_error_hook(hook))
        });
        self
    }

    /// Registers a named preset, replacing any preset of the same name.
    pub fn with_preset(mut self, preset: Preset) -> Self {
        self.presets.insert(preset.name.clone(), Arc::new(preset));
        self
    }

    pub fn is_configured(&self) -> bool {
        self.dispatcher.is_some()
    }

    pub fn preset_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.presets.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Binds an arbitrary preset to this notifier's endpoint.
    pub fn extend(&self, preset: Preset) -> Sender {
        self.bind(Arc::new(preset))
    }

    /// Looks up a registered preset by name.
    pub fn sender(&self, name: &str) -> Option<Sender> {
        self.presets.get(name).cloned().map(|preset| self.bind(preset))
    }

    pub async fn send(&self, input: impl Into<MessageInput>) -> SendReport {
        self.builtin(presets::SEND, Preset::send).send(input).await
    }

    pub async fn bug(&self, input: impl Into<MessageInput>) -> SendReport {
        self.builtin(presets::BUG, Preset::bug).send(input).await
    }

    pub async fn alert(&self, input: impl Into<MessageInput>) -> SendReport {
        self.builtin(presets::ALERT, Preset::alert).send(input).await
    }

    pub async fn note(&self, input: impl Into<MessageInput>) -> SendReport {
        self.builtin(presets::NOTE, Preset::note).send(input).await
    }

    pub async fn success(&self, input: impl Into<MessageInput>) -> SendReport {
        self.builtin(presets::SUCCESS, Preset::success).send(input).await
    }

    fn builtin(&self, name: &str, fallback: fn() -> Preset) -> Sender {
        self.sender(name)
            .unwrap_or_else(|| self.bind(Arc::new(fallback())))
    }

    fn bind(&self, preset: Arc<Preset>) -> Sender {
        Sender {
            preset,
            dispatcher: self.dispatcher.clone(),
        }
    }
}
