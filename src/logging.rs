//! Tracing setup for the portal binary.

use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;

use tracing::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::{PortalError, Result};

/// Dependencies that are too chatty at the portal's own level.
const QUIET_TARGETS: [&str; 2] = ["sqlx=warn", "hyper=info"];

/// Map a configured level name to a tracing level. Unknown names mean info.
fn parse_level(level: &str) -> Level {
    match level.trim().to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// `RUST_LOG` wins over the configured level; noisy crates are capped.
fn env_filter(level: &str) -> EnvFilter {
    QUIET_TARGETS
        .iter()
        .filter_map(|d| d.parse::<Directive>().ok())
        .fold(
            EnvFilter::from_default_env().add_directive(parse_level(level).into()),
            EnvFilter::add_directive,
        )
}

/// Install the global subscriber.
///
/// Logs go to stdout and, when `config.file` is set, are mirrored into that
/// file without ANSI colours.
pub fn init(config: &LoggingConfig) -> Result<()> {
    if config.file.trim().is_empty() {
        init_console_only(&config.level);
        return Ok(());
    }

    let path = Path::new(&config.file);
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    let log_file = Arc::new(File::options().create(true).append(true).open(path)?);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout.and(log_file))
                .with_ansi(false)
                .with_target(true),
        )
        .with(env_filter(&config.level))
        .try_init()
        .map_err(|e| PortalError::Config(format!("logging already initialised: {e}")))
}

/// Install a stdout-only subscriber. Does nothing if one is already set.
pub fn init_console_only(level: &str) {
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .with(env_filter(level))
        .try_init();
}
