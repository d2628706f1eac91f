//! TaskCall Nagios - forwards a single Nagios host/service notification to TaskCall
//!
//! Flow of one invocation:
//! - Parse the Nagios macros passed as flags
//! - Merge the key=value configuration file over the defaults
//! - Check that the notification type and integration key are present
//! - POST the JSON payload with bounded sequential retry

pub mod app;
pub mod cli;
pub mod config;
pub mod delivery;
pub mod error;
pub mod logging;
pub mod payload;
pub mod retry;

#[cfg(test)]
mod test_support;

pub use cli::Cli;
pub use config::{Config, ConfigIssue};
pub use delivery::{DeliveryReport, TaskCallClient};
pub use error::{AttemptError, NotifyError};
pub use payload::{EntityType, NotificationPayload};
pub use retry::RetryPolicy;
