//! # Errors
//!
//! ```text
//! AppError
//! ├── Terminal(TerminalError)   // attribute get/set, size query: startup only
//! ├── Io { op, source }         // read/write on the device during the loop
//! └── Config(ConfigError)       // bad config file or flag value
//! ```
//!
//! A read that times out with no data is not an error anywhere in this
//! crate; `KeyReader` retries it.

use std::io;
use thiserror::Error;

pub use crate::core::config::ConfigError;

/// Failures of the terminal control interface.
#[derive(Debug, Error)]
pub enum TerminalError {
    /// `tcgetattr` failed: stdin is not a tty, permission denied, ...
    #[error("failed to read terminal attributes: {0}")]
    QueryFailed(#[source] io::Error),
    /// `tcsetattr` failed, either entering raw mode or restoring.
    #[error("failed to apply terminal attributes: {0}")]
    ApplyFailed(#[source] io::Error),
    #[error("terminal size unavailable: {reason}")]
    SizeUnavailable { reason: String },
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Terminal(#[from] TerminalError),
    #[error("{op}: {source}")]
    Io {
        op: &'static str,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl AppError {
    /// Adapter for `map_err` that tags an I/O failure with the operation name.
    pub fn io(op: &'static str) -> impl FnOnce(io::Error) -> Self {
        move |source| AppError::Io { op, source }
    }
}
