//! Runtime configuration for the TaskCall notification command
//!
//! Handles:
//! - Hard-coded defaults (integration key, log path, API url, timeout, proxy)
//! - Line based `key=value` overrides read from the configuration file
//! - Issue collection instead of aborting (a bad line only loses that line)

use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Location used when neither `--config` nor `TASKCALL_NAGIOS_CONFIG` is given
pub const DEFAULT_CONFIG_PATH: &str = "/home/taskcall-nagios/nagios_to_taskcall.conf";

/// Keys recognized in the configuration file
pub mod keys {
    pub const INTEGRATION_KEY: &str = "integration_key";
    pub const LOG_PATH: &str = "log_path";
    pub const NAGIOS_SERVER: &str = "nagios_server";
    pub const LOGGER: &str = "nagios_to_taskcall.logger";
    pub const TIMEOUT: &str = "nagios_to_taskcall.timeout";
    pub const API_URL: &str = "taskcall.api.url";
    pub const PROXY_ENABLED: &str = "nagios_to_taskcall.http.proxy.enabled";
    pub const PROXY_PORT: &str = "nagios_to_taskcall.http.proxy.port";
    pub const PROXY_HOST: &str = "nagios_to_taskcall.http.proxy.host";
    pub const PROXY_PROTOCOL: &str = "nagios_to_taskcall.http.proxy.protocol";
    pub const PROXY_USERNAME: &str = "nagios_to_taskcall.http.proxy.username";
    pub const PROXY_PASSWORD: &str = "nagios_to_taskcall.http.proxy.password";
}

/// Merged configuration: defaults overridden by the configuration file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub integration_key: String,
    pub log_path: PathBuf,
    pub nagios_server: String,
    pub log_level: String,
    pub api_url: String,
    pub timeout_secs: u64,
    pub proxy: ProxyConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    pub enabled: bool,
    pub host: String,
    pub port: u16,
    pub protocol: String,
    pub username: String,
    pub password: String,
}

impl ProxyConfig {
    pub fn url(&self) -> String {
        format!("{}://{}:{}", self.protocol, self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            integration_key: String::new(),
            log_path: PathBuf::from("/var/log/taskcall-nagios/send_to_taskcall.log"),
            nagios_server: "default".to_string(),
            log_level: "warning".to_string(),
            api_url: "https://integrations.taskcallapp.com/nagios/".to_string(),
            timeout_secs: 60,
            proxy: ProxyConfig {
                enabled: false,
                host: "localhost".to_string(),
                port: 1111,
                protocol: "http".to_string(),
                username: String::new(),
                password: String::new(),
            },
        }
    }
}

/// Problem found while reading the configuration file; never fatal
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigIssue {
    #[error("cannot read configuration file {}: {reason}", path.display())]
    Unreadable { path: PathBuf, reason: String },

    #[error("line {line}: expected key=value, got '{content}'")]
    Malformed { line: usize, content: String },

    #[error("line {line}: unknown key '{key}' ignored")]
    UnknownKey { line: usize, key: String },

    #[error("line {line}: invalid value '{value}' for {key} ({reason}), keeping default")]
    InvalidValue {
        line: usize,
        key: String,
        value: String,
        reason: String,
    },
}

enum ApplyError {
    UnknownKey,
    Invalid(String),
}

impl Config {
    /// Read `path` and apply its overrides on top of the defaults.
    ///
    /// An unreadable file yields the defaults plus a single `Unreadable` issue.
    pub async fn load(path: &Path) -> (Self, Vec<ConfigIssue>) {
        let mut config = Self::default();
        match tokio::fs::read_to_string(path).await {
            Ok(content) => {
                let issues = config.apply_overrides(&content);
                (config, issues)
            }
            Err(e) => (
                config,
                vec![ConfigIssue::Unreadable {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                }],
            ),
        }
    }

    /// Apply every `key=value` line of `content`, later lines win.
    pub fn apply_overrides(&mut self, content: &str) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        for (index, raw) in content.lines().enumerate() {
            let line_no = index + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                issues.push(ConfigIssue::Malformed {
                    line: line_no,
                    content: line.to_string(),
                });
                continue;
            };
            let (key, value) = (key.trim(), value.trim());
            if key.is_empty() {
                issues.push(ConfigIssue::Malformed {
                    line: line_no,
                    content: line.to_string(),
                });
                continue;
            }

            match self.set(key, value) {
                Ok(()) => {}
                Err(ApplyError::UnknownKey) => issues.push(ConfigIssue::UnknownKey {
                    line: line_no,
                    key: key.to_string(),
                }),
                Err(ApplyError::Invalid(reason)) => issues.push(ConfigIssue::InvalidValue {
                    line: line_no,
                    key: key.to_string(),
                    value: value.to_string(),
                    reason,
                }),
            }
        }

        issues
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), ApplyError> {
        match key {
            keys::INTEGRATION_KEY => self.integration_key = value.to_string(),
            keys::LOG_PATH => self.log_path = PathBuf::from(value),
            keys::NAGIOS_SERVER => self.nagios_server = value.to_string(),
            keys::LOGGER => self.log_level = value.to_string(),
            keys::API_URL => self.api_url = value.to_string(),
            keys::TIMEOUT => {
                let secs: u64 = value
                    .parse()
                    .map_err(|e: std::num::ParseIntError| ApplyError::Invalid(e.to_string()))?;
                if secs == 0 {
                    return Err(ApplyError::Invalid(
                        "timeout must be at least 1 second".to_string(),
                    ));
                }
                self.timeout_secs = secs;
            }
            keys::PROXY_ENABLED => self.proxy.enabled = parse_bool(value)?,
            keys::PROXY_PORT => {
                self.proxy.port = value
                    .parse()
                    .map_err(|e: std::num::ParseIntError| ApplyError::Invalid(e.to_string()))?;
            }
            keys::PROXY_HOST => self.proxy.host = value.to_string(),
            keys::PROXY_PROTOCOL => self.proxy.protocol = value.to_string(),
            keys::PROXY_USERNAME => self.proxy.username = value.to_string(),
            keys::PROXY_PASSWORD => self.proxy.password = value.to_string(),
            _ => return Err(ApplyError::UnknownKey),
        }
        Ok(())
    }

    /// Per-attempt request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Every key with its effective value, password masked
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        let password = if self.proxy.password.is_empty() {
            String::new()
        } else {
            "********".to_string()
        };

        vec![
            (keys::INTEGRATION_KEY, self.integration_key.clone()),
            (keys::LOG_PATH, self.log_path.display().to_string()),
            (keys::NAGIOS_SERVER, self.nagios_server.clone()),
            (keys::LOGGER, self.log_level.clone()),
            (keys::TIMEOUT, self.timeout_secs.to_string()),
            (keys::API_URL, self.api_url.clone()),
            (keys::PROXY_ENABLED, self.proxy.enabled.to_string()),
            (keys::PROXY_PORT, self.proxy.port.to_string()),
            (keys::PROXY_HOST, self.proxy.host.clone()),
            (keys::PROXY_PROTOCOL, self.proxy.protocol.clone()),
            (keys::PROXY_USERNAME, self.proxy.username.clone()),
            (keys::PROXY_PASSWORD, password),
        ]
    }
}

fn parse_bool(value: &str) -> Result<bool, ApplyError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(ApplyError::Invalid("expected true or false".to_string())),
    }
}
