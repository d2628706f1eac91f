//! Error types for a single notification run

use crate::retry::TimedOut;
use reqwest::StatusCode;
use thiserror::Error;

/// Failure of one POST attempt; the retry policy decides whether to try again
#[derive(Debug, Error)]
pub enum AttemptError {
    #[error("Failed - Error code {status}: {body}")]
    Rejected { status: StatusCode, body: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error(transparent)]
    TimedOut(#[from] TimedOut),
}

/// Reasons a notification run ends without delivering the alert
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Nagios NOTIFICATIONTYPE parameter is missing. Aborting process.")]
    MissingNotificationType,

    #[error("TaskCall integration key is missing (-integKey or integration_key). Aborting process.")]
    MissingIntegrationKey,

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("failed to serialize notification payload: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("delivery to TaskCall failed after {attempts} attempts: {last_error}")]
    DeliveryFailed {
        attempts: u32,
        last_error: AttemptError,
    },
}

impl NotifyError {
    /// Process exit status reported back to Nagios
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::DeliveryFailed { .. } => 1,
            Self::MissingNotificationType => 3,
            Self::MissingIntegrationKey => 4,
            Self::Client(_) | Self::Serialize(_) => 5,
        }
    }
}
