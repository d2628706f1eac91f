//! send-to-taskcall - Nagios notification command for TaskCall
//!
//! Exit status: 0 delivered, 1 retries exhausted, 2 bad usage,
//! 3 missing notification type, 4 missing integration key, 5 local setup failure.

use std::process::ExitCode;
use taskcall_nagios::{app, logging, Cli, Config};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse_normalized();

    let (config, issues) = Config::load(&cli.config).await;

    let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    let log_path = cli.log_path.as_deref().unwrap_or(&config.log_path);
    if let Err(e) = logging::init(level, log_path) {
        eprintln!("send-to-taskcall: {:#}", e);
    }

    app::log_config(&config, &issues);

    match app::run(&cli, &config).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => ExitCode::from(e.exit_code()),
    }
}
