//! Logging init: file under XDG state dir, or graceful fallback to stderr.
//!
//! Filter directives come from `TRANSDOC_LOG`, then `RUST_LOG`, then
//! [`DEFAULT_FILTER`].

use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Directives used when neither environment variable is set.
pub const DEFAULT_FILTER: &str = "info,transdoc=debug,transdoc_core=debug";

const FILTER_ENV: &str = "TRANSDOC_LOG";

fn filter_from(own: Option<&str>, rust_log: Option<&str>) -> EnvFilter {
    [own, rust_log]
        .into_iter()
        .flatten()
        .find_map(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

fn env_filter() -> EnvFilter {
    let own = std::env::var(FILTER_ENV).ok();
    let rust_log = std::env::var("RUST_LOG").ok();
    filter_from(own.as_deref(), rust_log.as_deref())
}

/// `~/.local/state/transdoc/transdoc.log`; the directory is created if missing.
pub fn log_file_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("transdoc")?;
    Ok(xdg_dirs.place_state_file("transdoc.log")?)
}

/// Initialize structured logging to the state-dir log file.
/// On failure (e.g. log dir unwritable), returns Err so the caller can fall back to stderr.
pub fn init_logging() -> Result<()> {
    let path = log_file_path()?;
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("install log subscriber: {}", e))?;

    tracing::info!("transdoc logging initialized at {}", path.display());
    Ok(())
}

/// Initialize logging to stderr only (no file). Use when init_logging() fails so a batch can still run.
pub fn init_logging_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(io::stderr)
        .with_ansi(false)
        .try_init();
}
