//! # Editor State
//!
//! ```text
//! EditorState
//! ├── size: ViewportSize     // captured once at startup
//! ├── row_marker: String     // drawn at the start of every row
//! ├── raw_mode: bool         // guard is live and raw attributes applied
//! └── phase: LoopState       // Running | Terminated
//! ```
//!
//! Owned by the event loop; the renderer only borrows it.

/// Visible area in character cells. Both dimensions are non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportSize {
    pub rows: u16,
    pub cols: u16,
}

impl ViewportSize {
    /// Returns `None` if either dimension is zero.
    pub fn new(rows: u16, cols: u16) -> Option<Self> {
        (rows > 0 && cols > 0).then_some(Self { rows, cols })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Terminated,
}

pub struct EditorState {
    pub size: ViewportSize,
    pub row_marker: String,
    pub raw_mode: bool,
    pub phase: LoopState,
}

impl EditorState {
    /// Starts in `Running`: only built once the guard and the viewport
    /// query have both succeeded.
    pub fn new(size: ViewportSize, row_marker: impl Into<String>) -> Self {
        Self {
            size,
            row_marker: row_marker.into(),
            raw_mode: true,
            phase: LoopState::Running,
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase == LoopState::Running
    }
}
