//! The real controlling terminal, reached through stdin/stdout.
//!
//! Attributes and reads go through stdin, size queries and writes through
//! stdout. Both are expected to be the same tty; if either is redirected
//! the corresponding query fails.

use log::{info, warn};
use rustix::io::Errno;
use rustix::termios::{self, OptionalActions, Termios};
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
use std::io::{self, Write};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use crate::tui::event::ByteSource;
use crate::tui::guard::{AttributeDevice, ModeBits, ReadPolicy};
use crate::tui::viewport::SizeSource;

/// `tcgetattr`/`tcsetattr` on stdin.
pub struct TtyAttributes;

impl AttributeDevice for TtyAttributes {
    type Attributes = Termios;

    fn get_attributes(&mut self) -> io::Result<Termios> {
        Ok(termios::tcgetattr(io::stdin())?)
    }

    /// `TCSAFLUSH`: pending input typed before the switch is dropped.
    fn set_attributes(&mut self, attributes: &Termios) -> io::Result<()> {
        Ok(termios::tcsetattr(io::stdin(), OptionalActions::Flush, attributes)?)
    }

    fn raw_attributes(original: &Termios, policy: ReadPolicy) -> Termios {
        let mut raw = original.clone();
        ModeBits::from_termios(original).raw(policy).write_into(&mut raw);
        raw
    }
}

/// One-byte `read(2)` on stdin.
pub struct TtyInput;

impl ByteSource for TtyInput {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut byte = [0u8; 1];
        match rustix::io::read(io::stdin(), &mut byte[..]) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(byte[0])),
            // Cygwin returns EAGAIN on timeout; a signal can land mid-read.
            Err(e) if e == Errno::AGAIN || e == Errno::INTR => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Unbuffered `write(2)` on stdout, so one frame is one syscall.
pub struct TtyOutput;

impl Write for TtyOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(rustix::io::write(io::stdout(), buf)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// `TIOCGWINSZ` on stdout.
pub struct TtySize;

impl SizeSource for TtySize {
    fn window_size(&mut self) -> io::Result<(u16, u16)> {
        let size = termios::tcgetwinsize(io::stdout())?;
        Ok((size.ws_row, size.ws_col))
    }
}

/// Raised by SIGTERM, SIGHUP or SIGINT. Ctrl-C does not send SIGINT in raw
/// mode; this covers `kill` and a closing terminal.
pub fn termination_flag() -> io::Result<Arc<AtomicBool>> {
    let flag = Arc::new(AtomicBool::new(false));
    for signal in [SIGTERM, SIGHUP, SIGINT] {
        if let Err(e) = signal_hook::flag::register(signal, Arc::clone(&flag)) {
            warn!("Failed to register handler for signal {}: {}", signal, e);
            return Err(e);
        }
    }
    info!("Termination signal handlers registered");
    Ok(flag)
}
