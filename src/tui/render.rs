//! # Renderer
//!
//! The only writer of the output stream. Every frame is composed into one
//! buffer and handed to the device in a single `write`; a short write is
//! an error, never retried, so a half-drawn frame is reported rather than
//! patched up.
//!
//! Frame layout for `rows = 3`:
//!
//! ```text
//! ESC[2J ESC[1;1H  ~ \r\n ~ \r\n ~  ESC[1;1H
//! ```
//!
//! The last row has no trailing `\r\n` so the terminal never scrolls.

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::terminal::{Clear, ClearType};
use std::io::{self, Write};

use crate::core::key::KeyEvent;
use crate::core::state::EditorState;

pub struct Renderer<W: Write> {
    out: W,
}

impl<W: Write> Renderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Clear, home, one marker per row, home again.
    pub fn refresh(&mut self, state: &EditorState) -> io::Result<()> {
        let frame = compose_frame(state)?;
        self.emit(&frame)
    }

    /// Clear and home; used on quit and on the fatal path.
    pub fn clear(&mut self) -> io::Result<()> {
        let mut buf = Vec::new();
        queue!(buf, Clear(ClearType::All), MoveTo(0, 0))?;
        self.emit(&buf)
    }

    /// One inspector line describing `event`.
    pub fn echo_key(&mut self, event: &KeyEvent) -> io::Result<()> {
        let line = format!("{event}\r\n");
        self.emit(line.as_bytes())
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, buf: &[u8]) -> io::Result<()> {
        let written = self.out.write(buf)?;
        if written != buf.len() {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                format!("incomplete write: {written} of {} bytes", buf.len()),
            ));
        }
        self.out.flush()
    }
}

pub fn compose_frame(state: &EditorState) -> io::Result<Vec<u8>> {
    let rows = usize::from(state.size.rows);
    let mut buf = Vec::with_capacity(16 + rows * (state.row_marker.len() + 2));
    queue!(buf, Clear(ClearType::All), MoveTo(0, 0))?;
    for row in 0..rows {
        buf.extend_from_slice(state.row_marker.as_bytes());
        if row + 1 < rows {
            buf.extend_from_slice(b"\r\n");
        }
    }
    queue!(buf, MoveTo(0, 0))?;
    Ok(buf)
}
