//! Tracing subscriber setup
//!
//! The dashboard owns the terminal, so it logs to a file in the cache dir.
//! The other subcommands log to stderr.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Log file name inside the cache dir
pub const LOG_FILE: &str = "fplwatch.log";

const DEFAULT_FILTER: &str = "fplwatch=info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into())
}

/// Logs to stderr, filtered by `RUST_LOG`
pub fn init_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(io::stderr)
        .with_target(true)
        .try_init();
}

/// Opens (appending) the log file under `dir`, creating the dir if needed
pub fn open_log_file(dir: &Path) -> io::Result<(File, PathBuf)> {
    fs::create_dir_all(dir)?;
    let path = dir.join(LOG_FILE);
    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    Ok((file, path))
}

/// Logs to `dir/fplwatch.log` without ANSI colours; returns the log path
pub fn init_file(dir: &Path) -> io::Result<PathBuf> {
    let (file, path) = open_log_file(dir)?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
    Ok(path)
}
