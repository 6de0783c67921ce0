//! slack-notify - Send a notification to a Slack incoming webhook
//!
//! Loads configuration, composes a message from the command line and posts it
//! with the selected preset.

use clap::Parser;
use slack_notify::{app::App, cli::Cli, config::Config};
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load configuration by layering sources: defaults, file, environment, and CLI args.
    let config = match Config::load(&cli) {
        Ok(config) => config,
        Err(err) => {
            init_logging("info");
            error!("Failed to load configuration: {:#}", err);
            return ExitCode::from(2);
        }
    };

    init_logging(&config.log_level);

    let app = match App::builder(config).build() {
        Ok(app) => app,
        Err(err) => {
            error!("Failed to initialize: {:#}", err);
            return ExitCode::from(2);
        }
    };

    match app.run(&cli).await {
        Ok(outcome) => ExitCode::from(outcome.exit_code()),
        Err(err) => {
            error!("{:#}", err);
            ExitCode::from(2)
        }
    }
}

/// Logs to stderr so stdout stays free for command output. `RUST_LOG` wins
/// over the configured level.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
