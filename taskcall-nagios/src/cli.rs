//! Command line surface of `send-to-taskcall`
//!
//! Nagios command definitions pass every macro with a single dash
//! (`-hn $HOSTNAME$`). `normalize_args` rewrites those tokens into the
//! `--hn=value` form clap understands, which also keeps values starting with
//! a dash from being read as flags.

use crate::config::DEFAULT_CONFIG_PATH;
use crate::payload::{EntityType, HostFields, ServiceFields};
use clap::{ArgAction, CommandFactory, Parser};
use std::collections::HashSet;
use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "send-to-taskcall",
    about = "send events from Nagios to TaskCall",
    version,
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct Cli {
    /// Print help
    #[arg(long = "help", action = ArgAction::Help)]
    help: Option<bool>,

    /// Print version
    #[arg(long = "version", action = ArgAction::Version)]
    version: Option<bool>,

    /// Integration key issued by TaskCall
    #[arg(long = "integKey", value_name = "KEY")]
    pub integration_key: Option<String>,

    /// Nagios server name
    #[arg(long = "nagiosServer", value_name = "SERVER")]
    pub nagios_server: Option<String>,

    /// Log file
    #[arg(long = "logPath", value_name = "LOGPATH")]
    pub log_path: Option<PathBuf>,

    /// Kind of alert
    #[arg(long = "entityType", value_enum, ignore_case = true)]
    pub entity_type: Option<EntityType>,

    /// Notification type (PROBLEM, RECOVERY, ACKNOWLEDGEMENT, ...)
    #[arg(long = "ntt", value_name = "NOTIFICATIONTYPE")]
    pub notification_type: Option<String>,

    /// Date and time of the notification
    #[arg(long = "ldt", value_name = "LONGDATETIME")]
    pub long_date_time: Option<String>,

    /// key=value configuration file
    #[arg(
        long = "config",
        value_name = "PATH",
        env = "TASKCALL_NAGIOS_CONFIG",
        default_value = DEFAULT_CONFIG_PATH
    )]
    pub config: PathBuf,

    /// Log level, overrides nagios_to_taskcall.logger
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    #[command(flatten)]
    pub host: HostFields,

    #[command(flatten)]
    pub service: ServiceFields,
}

impl Cli {
    /// Parse the process arguments, accepting single-dash long flags
    pub fn parse_normalized() -> Self {
        Self::parse_from(normalize_args(std::env::args_os()))
    }
}

/// Rewrite `-flag value` / `--flag value` into `--flag=value` for every
/// value-taking flag of [`Cli`]. Anything else is passed through untouched.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let command = Cli::command();
    let known: HashSet<&str> = command
        .get_arguments()
        .filter(|arg| arg.get_action().takes_values())
        .filter_map(|arg| arg.get_long())
        .collect();

    let mut args = args.into_iter().map(Into::into);
    let mut normalized: Vec<OsString> = args.next().into_iter().collect();

    while let Some(arg) = args.next() {
        let text = match arg.to_str() {
            Some(text) => text.to_string(),
            None => {
                normalized.push(arg);
                continue;
            }
        };

        let name = text
            .strip_prefix("--")
            .or_else(|| text.strip_prefix('-'))
            .filter(|name| !name.is_empty());
        let Some(name) = name else {
            normalized.push(arg);
            continue;
        };

        match name.split_once('=') {
            Some((flag, _)) if known.contains(flag) => {
                normalized.push(OsString::from(format!("--{name}")));
            }
            None if known.contains(name) => match args.next() {
                Some(value) => {
                    let mut joined = OsString::from(format!("--{name}="));
                    joined.push(value);
                    normalized.push(joined);
                }
                None => normalized.push(OsString::from(format!("--{name}"))),
            },
            _ => normalized.push(arg),
        }
    }

    normalized
}
