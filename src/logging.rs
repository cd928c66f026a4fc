use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::EnvFilter;

pub const LOG_ENV_VAR: &str = "SQUARE_DRILL_LOG";

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("cannot open log file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("a tracing subscriber is already installed: {0}")]
    AlreadyInstalled(#[from] TryInitError),
}

/// Installs a file-backed `tracing` subscriber. The terminal belongs to the
/// TUI, so without a log file nothing is installed and events are discarded.
/// The level comes from `SQUARE_DRILL_LOG` and defaults to `info`.
pub fn init_logging(log_file: Option<&Path>) -> Result<(), LoggingError> {
    let Some(path) = log_file else {
        return Ok(());
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LoggingError::Open {
            path: path.to_path_buf(),
            source,
        })?;
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .finish()
        .try_init()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    #[test]
    fn test_no_file_is_a_no_op() {
        assert!(init_logging(None).is_ok());
    }

    #[test]
    fn test_unopenable_path_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("drill.log");
        assert_matches!(init_logging(Some(&path)), Err(LoggingError::Open { .. }));
    }

    // the only test that installs the global subscriber
    #[test]
    fn test_second_install_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("drill.log");
        init_logging(Some(&path)).unwrap();
        assert!(path.exists());

        let again = dir.path().join("again.log");
        assert_matches!(
            init_logging(Some(&again)),
            Err(LoggingError::AlreadyInstalled(_))
        );
    }
}
