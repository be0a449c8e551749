use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::Dispatch;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, Layer};

use crate::domain::{timestamp_now, DomainError};

/// Plain-text diagnostic log owned by one client: `<root>/<module>/<timestamp>.log`.
///
/// The returned [`Dispatch`] is independent of the global subscriber, so each
/// client instance logs to its own file.
pub struct DiagnosticLog {
    path: PathBuf,
    dispatch: Dispatch,
}

impl DiagnosticLog {
    /// Create the run's log file. With `echo` set, lines are also written to
    /// stderr.
    pub fn create(root: impl AsRef<Path>, module: &str, echo: bool) -> Result<Self, DomainError> {
        let dir = root.as_ref().join(module);
        fs::create_dir_all(&dir)?;

        let path = dir.join(format!("{}.log", timestamp_now()));
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        let file_layer = fmt::layer()
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .with_filter(LevelFilter::INFO);
        let stderr_layer = echo.then(|| {
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_filter(LevelFilter::INFO)
        });

        let subscriber = tracing_subscriber::registry()
            .with(file_layer)
            .with(stderr_layer);

        Ok(Self {
            path,
            dispatch: Dispatch::new(subscriber),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dispatch(&self) -> Dispatch {
        self.dispatch.clone()
    }
}
