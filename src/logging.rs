//! `tracing` subscriber setup for the command-line binary.

use crate::{Error, ErrorContext, Result};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const LOG_FILE_NAME: &str = "voiceforge.log";

/// Default filter directive for a verbosity flag.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "voiceforge=debug"
    } else {
        "voiceforge=warn"
    }
}

/// Install the global subscriber: stderr always, plus `<log_dir>/voiceforge.log` when a
/// directory is given. `RUST_LOG` takes precedence over `verbose`.
///
/// Calling this twice is harmless; the second call leaves the first subscriber in place.
pub fn init_logging(verbose: bool, log_dir: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let file_layer = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let path = dir.join(LOG_FILE_NAME);
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .map_err(|e| {
                    Error::configuration_with_context(
                        format!("cannot open log file: {}", e),
                        ErrorContext::new()
                            .with_field_path(path.display().to_string())
                            .with_source("logging"),
                    )
                })?;
            Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        }
        None => None,
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(file_layer)
        .try_init();
    Ok(())
}
