//! Logging setup for the director.
//!
//! Diagnostics are emitted through `tracing`. Levels in use:
//! - ERROR: a task failed during a phase run
//! - WARN: a unit failed to initialize, or a single-agent run failed
//! - INFO: phase banners and summaries, bring-up, cycle start and end
//! - DEBUG: registration, status updates, config loading
//!
//! Debug mode can be enabled with `--debug`, `DIRECTOR_DEBUG=1`, or
//! `log.debug` in the config file. `RUST_LOG` overrides all of them.

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use tracing::warn;

use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::error::Result;

pub const DEBUG_ENV: &str = "DIRECTOR_DEBUG";

/// Whether `DIRECTOR_DEBUG` asks for debug output.
pub fn debug_from_env() -> bool {
    std::env::var(DEBUG_ENV)
        .map(|v| v == "1" || v.to_lowercase() == "true")
        .unwrap_or(false)
}

/// Filter directive for the given debug setting.
pub fn default_directive(debug: bool) -> &'static str {
    if debug {
        "director=debug,info"
    } else {
        "info"
    }
}

/// Initialize logging to stderr.
pub fn init() {
    init_with_debug(false, false);
}

/// Initialize logging with explicit debug and file settings.
///
/// With `to_file`, output is also written to `~/.director/director.log`,
/// truncated on startup. Calling this more than once is harmless; only
/// the first call installs a subscriber.
pub fn init_with_debug(debug: bool, to_file: bool) {
    let debug = debug || debug_from_env();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(debug)));

    let (file, file_error) = match to_file.then(open_log_file) {
        Some(Ok(file)) => (Some(file), None),
        Some(Err(e)) => (None, Some(e)),
        None => (None, None),
    };
    let file_layer = file.map(|file| {
        fmt::layer()
            .with_ansi(false)
            .with_writer(Mutex::new(file))
    });

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(file_layer)
        .try_init();

    if let Some(e) = file_error {
        warn!(error = %e, "Log file unavailable, logging to stderr only");
    }
}

fn open_log_file() -> Result<File> {
    Config::ensure_dirs()?;
    create_log_file(&Config::log_path()?)
}

/// Create (or truncate) the log file at `path`.
fn create_log_file(path: &Path) -> Result<File> {
    Ok(File::create(path)?)
}
