//! Tracing setup. Stdout belongs to the terminal UI, so logs go to a file.

use crate::config::project_dirs;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

pub fn log_path() -> Option<PathBuf> {
    project_dirs().map(|p| p.data_local_dir().join("panel-iptv.log"))
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
/// Returns the log file path when file logging is active.
pub fn init(level: &str) -> Option<PathBuf> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("panel_iptv_lib={0},panel_iptv={0}", level)))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let path = log_path()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).ok()?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path).ok()?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(true)
        .with_writer(Mutex::new(file))
        .try_init()
        .ok()?;
    Some(path)
}

/// Plain stderr logging for the one-shot CLI modes
pub fn init_stderr(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("panel_iptv_lib={0},panel_iptv={0}", level)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
