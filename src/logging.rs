//! File logging
//!
//! The terminal belongs to the UI, so log output goes to a file under the
//! platform data directory instead of stderr.

use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

pub const LOG_FILE: &str = "contract-chat.log";

pub fn log_dir() -> Result<PathBuf> {
    let base = dirs::data_local_dir()
        .or_else(dirs::home_dir)
        .ok_or_else(|| anyhow!("Could not determine a directory for logs"))?;
    Ok(base.join("contract-chat"))
}

/// Level from `-v` count, falling back to the configured level
pub fn level_for(verbose: u8, configured: Option<&str>) -> String {
    match verbose {
        0 => configured.unwrap_or("warn").to_string(),
        1 => "info".to_string(),
        2 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

/// `RUST_LOG` wins over everything else
pub fn filter_for(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Install the global subscriber. Keep the guard alive until exit or
/// buffered lines are lost.
pub fn init(dir: &Path, filter: EnvFilter) -> Result<WorkerGuard> {
    std::fs::create_dir_all(dir)?;

    let appender = tracing_appender::rolling::never(dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("Could not install logger: {}", e))?;

    Ok(guard)
}

/// Like [`init`], but a log directory that can't be determined or written
/// only costs the log file, not the session
pub fn init_or_warn(dir: Result<PathBuf>, filter: EnvFilter) -> Option<WorkerGuard> {
    match dir.and_then(|dir| init(&dir, filter)) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("warning: running without a log file: {:#}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_overrides_config() {
        assert_eq!(level_for(0, None), "warn");
        assert_eq!(level_for(0, Some("debug")), "debug");
        assert_eq!(level_for(1, Some("error")), "info");
        assert_eq!(level_for(2, None), "debug");
        assert_eq!(level_for(5, None), "trace");
    }

    #[test]
    fn test_unwritable_log_dir_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"").unwrap();

        let guard = init_or_warn(Ok(blocker.join("logs")), EnvFilter::new("warn"));
        assert!(guard.is_none());
    }

    #[test]
    fn test_unknown_log_dir_is_not_fatal() {
        let guard = init_or_warn(Err(anyhow!("no home")), EnvFilter::new("warn"));
        assert!(guard.is_none());
    }
}
