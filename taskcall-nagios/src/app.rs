//! One notification run, from merged configuration to delivery report

use crate::cli::Cli;
use crate::config::{Config, ConfigIssue};
use crate::delivery::{DeliveryReport, TaskCallClient};
use crate::error::NotifyError;
use crate::payload::NotificationPayload;
use crate::retry::RetryPolicy;
use tracing::{error, info, warn};

/// Log what the configuration loader found, then the effective configuration
pub fn log_config(config: &Config, issues: &[ConfigIssue]) {
    for issue in issues {
        match issue {
            ConfigIssue::Unreadable { .. } => error!("{}", issue),
            _ => warn!("{}", issue),
        }
    }

    info!("Configurations...");
    for (key, value) in config.entries() {
        info!("{}={}", key, value);
    }
}

/// Build the payload from `cli`, deliver it using `config` and log the outcome
pub async fn run(cli: &Cli, config: &Config) -> Result<DeliveryReport, NotifyError> {
    let outcome = notify(cli, config).await;
    match &outcome {
        Ok(report) => info!(
            "Notification delivered in {} attempt(s), {:?}",
            report.attempts, report.elapsed
        ),
        Err(e) => error!("{}", e),
    }
    outcome
}

async fn notify(cli: &Cli, config: &Config) -> Result<DeliveryReport, NotifyError> {
    let payload = NotificationPayload::from_cli(cli, config);
    payload.validate()?;

    let client = TaskCallClient::new(config)?;
    let policy = RetryPolicy::new(config.timeout());

    client.deliver(&payload, &policy).await
}
