//! Logging bootstrap: stderr plus an ANSI-free copy in the configured log file

use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing::warn;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Directive used when the configured level name is not recognized
const FALLBACK_DIRECTIVE: &str = "warn";

/// Translate configured level names (`warning`, `critical`, ...) into a filter directive.
///
/// Returns `None` for anything that is not a level name.
pub fn level_directive(level: &str) -> Option<&'static str> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" | "notset" => Some("trace"),
        "debug" => Some("debug"),
        "info" => Some("info"),
        "warning" | "warn" => Some("warn"),
        "critical" | "fatal" | "error" => Some("error"),
        "off" => Some("off"),
        _ => None,
    }
}

/// Install the global subscriber. `RUST_LOG` wins over `level`.
pub fn init(level: &str, log_path: &Path) -> Result<()> {
    let directive = level_directive(level);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(directive.unwrap_or(FALLBACK_DIRECTIVE)));

    let (file, file_error) = match open_log_file(log_path) {
        Ok(file) => (Some(file), None),
        Err(e) => (None, Some(e)),
    };
    let file_layer = file.map(|file| {
        fmt::layer()
            .with_ansi(false)
            .with_writer(Mutex::new(file))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    if directive.is_none() {
        warn!("Unknown log level '{}', using warning", level);
    }
    if let Some(e) = file_error {
        warn!("Cannot write log file {}: {}, logging to stderr only", log_path.display(), e);
    }

    Ok(())
}

fn open_log_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}
