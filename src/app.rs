//! The application logic behind the binary, decoupled from the entry point.

use crate::{
    cli::Cli,
    config::Config,
    notification::{slack::WebhookTransport, SendReport, SlackNotifier},
};
use anyhow::{anyhow, Result};
use std::sync::Arc;
use tracing::{error, info, instrument};

/// How a run ended, mapped onto the process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every message was accepted.
    Delivered,
    /// At least one message failed; holds the number of failures.
    Failed(usize),
    /// No webhook URL was configured, so nothing was sent.
    NotConfigured,
    /// Only the preset list was printed.
    Listed,
}

impl RunOutcome {
    pub fn exit_code(self) -> u8 {
        match self {
            RunOutcome::Delivered | RunOutcome::Listed => 0,
            RunOutcome::Failed(_) => 1,
            RunOutcome::NotConfigured => 2,
        }
    }
}

/// The configured application.
pub struct App {
    notifier: SlackNotifier,
}

impl App {
    /// Creates a new `AppBuilder` to construct an `App`.
    pub fn builder(config: Config) -> AppBuilder {
        AppBuilder::new(config)
    }

    pub fn notifier(&self) -> &SlackNotifier {
        &self.notifier
    }

    /// Sends the message described by `cli` with the selected preset.
    #[instrument(skip_all, fields(preset = cli.preset_name()))]
    pub async fn run(&self, cli: &Cli) -> Result<RunOutcome> {
        if cli.list_presets {
            for name in self.notifier.preset_names() {
                println!("{name}");
            }
            return Ok(RunOutcome::Listed);
        }

        let sender = self.notifier.sender(cli.preset_name()).ok_or_else(|| {
            anyhow!(
                "Unknown preset `{}`. Available presets: {}",
                cli.preset_name(),
                self.notifier.preset_names().join(", ")
            )
        })?;

        let report = sender.send(cli.message()).await;
        let outcome = match &report {
            SendReport::NotConfigured => RunOutcome::NotConfigured,
            SendReport::Dispatched(deliveries) => {
                let failed = report.failures().count();
                if failed == 0 {
                    info!("Delivered {} message(s).", deliveries.len());
                    RunOutcome::Delivered
                } else {
                    for delivery in report.failures() {
                        if let Err(e) = &delivery.result {
                            error!(
                                channel = delivery.channel.as_deref().unwrap_or("-"),
                                error = %e,
                                "Delivery failed"
                            );
                        }
                    }
                    RunOutcome::Failed(failed)
                }
            }
        };
        Ok(outcome)
    }
}

/// Builder for the application.
///
/// Allows the HTTP transport to be replaced, which tests use to observe what
/// would have been posted.
pub struct AppBuilder {
    config: Config,
    transport_override: Option<Arc<dyn WebhookTransport>>,
}

impl AppBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            transport_override: None,
        }
    }

    pub fn transport_override(mut self, transport: Arc<dyn WebhookTransport>) -> Self {
        self.transport_override = Some(transport);
        self
    }

    pub fn build(self) -> Result<App> {
        let notifier = match self.transport_override {
            Some(transport) => SlackNotifier::from_config_with_transport(&self.config, transport),
            None => SlackNotifier::from_config(&self.config)?,
        };
        Ok(App { notifier })
    }
}
