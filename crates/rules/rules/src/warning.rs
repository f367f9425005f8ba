//! Destinations for compile warnings.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::warn;

use gatekeep_core::WarningConfig;

/// Receives the warnings produced by one compile, joined one per line.
pub trait WarningSink: Send + Sync {
    /// Record a (possibly multi-line) warning message.
    fn record(&self, message: &str);
}

/// Emits warnings as a single `tracing` event on the `gatekeep::warnings` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl WarningSink for TracingSink {
    fn record(&self, message: &str) {
        warn!(target: "gatekeep::warnings", "{message}");
    }
}

/// Appends warnings to a log file.
///
/// Write failures are logged and otherwise ignored; a warning log must never
/// make rule compilation fail.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    /// Create a sink appending to `path`. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The file warnings are appended to.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl WarningSink for FileSink {
    fn record(&self, message: &str) {
        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| writeln!(file, "{message}"));
        if let Err(e) = result {
            warn!(path = %self.path.display(), error = %e, "failed to write warning log");
        }
    }
}

/// Build the sink described by configuration, if any.
pub fn sink_from_config(config: &WarningConfig) -> Option<Arc<dyn WarningSink>> {
    config
        .log_file
        .as_ref()
        .map(|path| Arc::new(FileSink::new(path)) as Arc<dyn WarningSink>)
}
