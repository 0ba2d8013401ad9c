//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use rustix::termios::{ControlModes, InputModes, LocalModes, OutputModes};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, Write};
use std::rc::Rc;

use crate::tui::event::ByteSource;
use crate::tui::guard::{AttributeDevice, ModeBits, ReadPolicy};
use crate::tui::viewport::SizeSource;

/// Attributes of a freshly opened, line-buffered terminal.
pub fn cooked_bits() -> ModeBits {
    ModeBits {
        input: InputModes::BRKINT | InputModes::ICRNL | InputModes::IXON,
        output: OutputModes::OPOST,
        control: ControlModes::CREAD | ControlModes::CS8,
        local: LocalModes::ECHO
            | LocalModes::ECHOE
            | LocalModes::ICANON
            | LocalModes::IEXTEN
            | LocalModes::ISIG,
        min_bytes: 1,
        timeout_ds: 0,
    }
}

pub struct DeviceLog {
    pub current: ModeBits,
    pub history: Vec<ModeBits>,
    pub sets: usize,
    pub fail_get: bool,
    pub fail_set: bool,
    original: ModeBits,
}

impl DeviceLog {
    /// Number of successful sets that put the original attributes back.
    pub fn restores(&self) -> usize {
        self.history.iter().filter(|b| **b == self.original).count()
    }
}

/// In-memory device; the log stays reachable after the guard takes it.
pub struct RecordingDevice {
    log: Rc<RefCell<DeviceLog>>,
}

impl RecordingDevice {
    pub fn new(initial: ModeBits) -> Self {
        Self {
            log: Rc::new(RefCell::new(DeviceLog {
                current: initial,
                history: Vec::new(),
                sets: 0,
                fail_get: false,
                fail_set: false,
                original: initial,
            })),
        }
    }

    pub fn log(&self) -> Rc<RefCell<DeviceLog>> {
        Rc::clone(&self.log)
    }
}

impl AttributeDevice for RecordingDevice {
    type Attributes = ModeBits;

    fn get_attributes(&mut self) -> io::Result<ModeBits> {
        let log = self.log.borrow();
        if log.fail_get {
            return Err(io::Error::from_raw_os_error(25)); // ENOTTY
        }
        Ok(log.current)
    }

    fn set_attributes(&mut self, attributes: &ModeBits) -> io::Result<()> {
        let mut log = self.log.borrow_mut();
        if log.fail_set {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "tcsetattr denied"));
        }
        log.current = *attributes;
        log.history.push(*attributes);
        log.sets += 1;
        Ok(())
    }

    fn raw_attributes(original: &ModeBits, policy: ReadPolicy) -> ModeBits {
        original.raw(policy)
    }
}

/// One scripted read: a byte, a timeout (`None`), or an error.
pub enum Read {
    Byte(u8),
    Timeout,
    Fail(io::ErrorKind),
}

/// Replays a script; fails with `UnexpectedEof` once it runs dry so a
/// missing quit key ends the test instead of hanging it.
pub struct ScriptedInput {
    script: VecDeque<Read>,
    pub reads: usize,
}

impl ScriptedInput {
    pub fn new(script: impl IntoIterator<Item = Read>) -> Self {
        Self {
            script: script.into_iter().collect(),
            reads: 0,
        }
    }

    pub fn bytes(bytes: &[u8]) -> Self {
        Self::new(bytes.iter().copied().map(Read::Byte))
    }
}

impl ByteSource for ScriptedInput {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        self.reads += 1;
        match self.script.pop_front() {
            Some(Read::Byte(b)) => Ok(Some(b)),
            Some(Read::Timeout) => Ok(None),
            Some(Read::Fail(kind)) => Err(io::Error::new(kind, "scripted read failure")),
            None => Err(io::Error::new(io::ErrorKind::UnexpectedEof, "script exhausted")),
        }
    }
}

/// Reports a fixed `(rows, cols)`, or fails like a redirected stdout.
pub struct FixedSize {
    pub rows: u16,
    pub cols: u16,
    pub fail: bool,
}

impl FixedSize {
    pub fn new(rows: u16, cols: u16) -> Self {
        Self {
            rows,
            cols,
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            rows: 0,
            cols: 0,
            fail: true,
        }
    }
}

impl SizeSource for FixedSize {
    fn window_size(&mut self) -> io::Result<(u16, u16)> {
        if self.fail {
            return Err(io::Error::from_raw_os_error(25)); // ENOTTY
        }
        Ok((self.rows, self.cols))
    }
}

/// Records each `write` call separately.
#[derive(Default)]
pub struct WriteLog {
    pub writes: Vec<Vec<u8>>,
}

impl WriteLog {
    pub fn bytes(&self) -> Vec<u8> {
        self.writes.concat()
    }
}

impl Write for WriteLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writes.push(buf.to_vec());
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Accepts at most `limit` bytes per write.
pub struct ShortWriter {
    pub limit: usize,
}

impl Write for ShortWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(buf.len().min(self.limit))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
