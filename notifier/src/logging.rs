//! Tracing subscriber setup.
//!
//! Interactive runs log to the console. Unattended runs (cron) append to a
//! log file instead. `RUST_LOG` overrides the level picked by `--verbose`.

use std::path::Path;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::Settings;
use crate::error::Error;

/// Install the global subscriber. Call once, before anything logs.
pub fn init(settings: &Settings) -> Result<(), Error> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(settings.verbose)));

    let registry = tracing_subscriber::registry().with(filter);

    if settings.unattended {
        let appender = file_appender(&settings.log_file)?;
        registry
            .with(fmt::layer().with_writer(appender).with_ansi(false))
            .init();
    } else {
        registry.with(fmt::layer()).init();
    }

    Ok(())
}

fn default_directive(verbose: bool) -> String {
    let level = if verbose { "debug" } else { "info" };
    format!("tock_notify={level}")
}

/// A never-rotating appender writing to exactly `path`.
fn file_appender(path: &Path) -> Result<RollingFileAppender, Error> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| crate::config::DEFAULT_LOG_FILE.to_string());

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(name)
        .build(dir)?;
    Ok(appender)
}
