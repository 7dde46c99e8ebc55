//! Tracing subscriber initialization.
//!
//! The demo owns the terminal, so logs go to a file instead of stderr.
//! Follow them with `tail -f` in another terminal.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "info";

/// Error type for logging initialization failures.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// Failed to create log directory
    #[error("Failed to create log directory at {path:?}: {source}")]
    DirectoryCreation {
        /// The directory path that failed to be created
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Invalid log file path (no UTF-8 filename component)
    #[error("Invalid log file path: {0:?}")]
    InvalidPath(PathBuf),

    /// Log path has no parent directory
    #[error("Log path has no parent directory: {0:?}")]
    NoParentDirectory(PathBuf),

    /// Tracing subscriber already initialized
    #[error("Tracing subscriber already initialized")]
    SubscriberAlreadySet,
}

/// Split a log file path into the directory and file name the appender needs.
///
/// A bare file name resolves to the current directory.
pub fn split_log_path(log_path: &Path) -> Result<(&Path, &str), LoggingError> {
    let file_name = log_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| LoggingError::InvalidPath(log_path.to_path_buf()))?;

    let directory = match log_path.parent() {
        Some(parent) if parent.as_os_str().is_empty() => Path::new("."),
        Some(parent) => parent,
        None => return Err(LoggingError::NoParentDirectory(log_path.to_path_buf())),
    };

    Ok((directory, file_name))
}

/// Initialize the tracing subscriber with file-based logging.
///
/// Respects `RUST_LOG`, falling back to [`DEFAULT_FILTER`]. Creates the log
/// directory if it does not exist.
///
/// # Errors
///
/// Returns an error if the path is unusable, the directory cannot be created,
/// or a global subscriber was already installed.
pub fn init(log_path: &Path) -> Result<(), LoggingError> {
    use tracing_subscriber::EnvFilter;

    let (directory, file_name) = split_log_path(log_path)?;

    std::fs::create_dir_all(directory).map_err(|source| LoggingError::DirectoryCreation {
        path: directory.to_path_buf(),
        source,
    })?;

    let file_appender = tracing_appender::rolling::never(directory, file_name);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(file_appender)
        .with_ansi(false)
        .try_init()
        .map_err(|_| LoggingError::SubscriberAlreadySet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    mod paths {
        use super::*;

        #[test]
        fn nested_path_splits_into_directory_and_name() {
            let path = Path::new("/var/log/lazygrid/lazygrid.log");
            let (dir, name) = split_log_path(path).unwrap();
            assert_eq!(dir, Path::new("/var/log/lazygrid"));
            assert_eq!(name, "lazygrid.log");
        }

        #[test]
        fn bare_file_name_uses_current_directory() {
            let (dir, name) = split_log_path(Path::new("lazygrid.log")).unwrap();
            assert_eq!(dir, Path::new("."));
            assert_eq!(name, "lazygrid.log");
        }

        #[test]
        fn root_has_no_file_name() {
            assert!(matches!(
                split_log_path(Path::new("/")),
                Err(LoggingError::InvalidPath(_))
            ));
        }

        #[test]
        fn trailing_dot_dot_is_invalid() {
            assert!(matches!(
                split_log_path(Path::new("/tmp/..")),
                Err(LoggingError::InvalidPath(_))
            ));
        }
    }

    mod init {
        use super::*;

        #[test]
        #[serial(tracing_init)]
        fn creates_log_directory_if_missing() {
            let test_dir = std::env::temp_dir().join("lazygrid_test_logs_create");
            let log_file = test_dir.join("test.log");
            let _ = fs::remove_dir_all(&test_dir);

            // May fail if a subscriber is already set; the directory comes first
            let _ = super::super::init(&log_file);

            assert!(
                test_dir.exists(),
                "Log directory should be created: {:?}",
                test_dir
            );
            let _ = fs::remove_dir_all(&test_dir);
        }

        #[test]
        #[serial(tracing_init)]
        fn second_init_reports_subscriber_already_set() {
            let test_dir = std::env::temp_dir().join("lazygrid_test_logs_twice");
            let log_file = test_dir.join("twice.log");

            let _ = super::super::init(&log_file);
            let second = super::super::init(&log_file);

            assert!(
                matches!(second, Err(LoggingError::SubscriberAlreadySet)),
                "Expected SubscriberAlreadySet, got {:?}",
                second
            );
            let _ = fs::remove_dir_all(&test_dir);
        }
    }
}
