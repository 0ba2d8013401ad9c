use log::info;
use std::io;

use crate::core::state::ViewportSize;
use crate::error::TerminalError;

/// Answers "how big is the terminal?" as `(rows, cols)`.
pub trait SizeSource {
    fn window_size(&mut self) -> io::Result<(u16, u16)>;
}

pub struct Viewport<S: SizeSource> {
    source: S,
}

impl<S: SizeSource> Viewport<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// There is no fallback geometry: a failed query or a zero dimension
    /// is `SizeUnavailable`.
    pub fn query(&mut self) -> Result<ViewportSize, TerminalError> {
        let (rows, cols) = self
            .source
            .window_size()
            .map_err(|e| TerminalError::SizeUnavailable {
                reason: format!("size query failed: {e}"),
            })?;
        let size = ViewportSize::new(rows, cols).ok_or_else(|| TerminalError::SizeUnavailable {
            reason: format!("terminal reported {rows} rows x {cols} columns"),
        })?;
        info!("Viewport is {}x{}", size.cols, size.rows);
        Ok(size)
    }
}
