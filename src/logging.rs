//! Tracing setup.
//!
//! Events go to a daily-rolled JSON file under the log directory. Headless runs also get
//! human-readable lines on stderr. A log directory that cannot be opened disables the file
//! sink instead of keeping the client from starting.

use anyhow::Context;
use std::io;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

pub(crate) const LOG_FILE: &str = "climate-risk.log";

fn open_log_file(log_dir: &Path) -> anyhow::Result<RollingFileAppender> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("create log directory {}", log_dir.display()))?;
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE)
        .build(log_dir)
        .with_context(|| format!("open {LOG_FILE} in {}", log_dir.display()))
}

/// Install the global subscriber. `RUST_LOG` overrides the default `info` filter.
///
/// The returned guard flushes the file sink on drop; it is `None` when file logging is off.
pub(crate) fn init_tracing(log_dir: &Path, log_to_stderr: bool) -> Option<WorkerGuard> {
    let (file_layer, guard, file_error) = match open_log_file(log_dir) {
        Ok(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_target(false)
                .json();
            (Some(layer), Some(guard), None)
        }
        Err(e) => (None, None, Some(e)),
    };

    let stderr_layer = log_to_stderr.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(io::stderr)
            .with_target(false)
    });

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .is_ok();

    // Printed before the TUI takes over the terminal, so it stays visible in every mode.
    if let Some(e) = file_error {
        eprintln!("warning: file logging disabled: {e:#}");
    }
    if installed {
        guard
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("climate-risk-logging-{name}-{}", std::process::id()))
    }

    #[test]
    fn creates_missing_log_directory() {
        let dir = scratch("nested").join("logs");
        let _ = std::fs::remove_dir_all(&dir);
        assert!(open_log_file(&dir).is_ok());
        assert!(dir.is_dir());
        std::fs::remove_dir_all(dir.parent().unwrap()).ok();
    }

    #[test]
    fn unusable_log_directory_is_an_error_not_a_panic() {
        let file = scratch("blocker");
        std::fs::write(&file, b"not a directory").unwrap();
        let err = open_log_file(&file.join("logs")).unwrap_err();
        assert!(format!("{err:#}").contains("create log directory"), "{err:#}");
        std::fs::remove_file(file).ok();
    }

    #[test]
    fn init_survives_an_unusable_log_directory() {
        let file = scratch("init-blocker");
        std::fs::write(&file, b"not a directory").unwrap();
        assert!(init_tracing(&file.join("logs"), false).is_none());
        std::fs::remove_file(file).ok();
    }
}
