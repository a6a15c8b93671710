//! Log setup for the binary.
//!
//! Two outputs: a compact stderr layer and a per-run file
//! `tally_YYYYmmdd_HHMMSS.log` in the log directory. `RUST_LOG` overrides
//! the default filter.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::Result;

pub fn log_file_name(started: chrono::NaiveDateTime) -> String {
    format!("tally_{}.log", started.format("%Y%m%d_%H%M%S"))
}

/// Filter used when `RUST_LOG` is unset.
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "tally=debug"
    } else {
        "tally=info"
    }
}

/// Installs the global subscriber. Returns the log file path.
pub fn init(log_dir: &Path, verbose: bool) -> Result<PathBuf> {
    let path = log_dir.join(log_file_name(crate::snapshot::now()));
    let file = File::create(&path)?;

    let default_level = default_filter(verbose);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let stderr = fmt::layer().with_writer(std::io::stderr).with_target(false).compact();
    let file = fmt::layer().with_writer(Mutex::new(file)).with_ansi(false);

    // a second init (tests, embedding) keeps the existing subscriber
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(stderr)
        .with(file)
        .try_init();

    Ok(path)
}

/// Stderr-only logging for commands that do not scrape.
pub fn init_stderr(verbose: bool) {
    let default_level = default_filter(verbose);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
