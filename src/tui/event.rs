use log::{debug, trace, warn};
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::core::key::{ESC, EscapeKey, KeyEvent};

/// One bounded read from the input device.
pub trait ByteSource {
    /// `Ok(None)` means the device's read timeout expired with no data.
    fn read_byte(&mut self) -> io::Result<Option<u8>>;
}

/// Outcome of feeding one byte to the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Pending,
    Done(KeyEvent),
    /// The byte could not continue the sequence; it starts the next key.
    DoneWithPending(KeyEvent, u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EscState {
    Idle,
    /// `ESC`
    SawEsc,
    /// `ESC [`
    SawCsi,
    /// `ESC [ <digit>`
    SawCsiDigit(u8),
    /// `ESC O`
    SawSs3,
}

/// Finite automaton for the escape sequences we recognize:
///
/// ```text
/// ESC [ A|B|C|D        arrows
/// ESC [ H|F            home / end
/// ESC O H|F            home / end
/// ESC [ 1|7 ~          home
/// ESC [ 4|8 ~          end
/// ESC [ 3 ~            delete
/// ESC [ 5|6 ~          page up / page down
/// ```
///
/// Every non-`Idle` state is at most three bytes from a terminal one. An
/// unexpected byte or `expire()` drops what was consumed and yields a bare
/// ESC. Right after ESC the unexpected byte was never part of a sequence
/// (Alt+letter, ESC ESC, ESC then Ctrl-Q), so it is handed back instead.
#[derive(Debug, Clone)]
pub struct EscapeDecoder {
    state: EscState,
}

impl EscapeDecoder {
    pub fn new() -> Self {
        Self {
            state: EscState::Idle,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.state == EscState::Idle
    }

    pub fn advance(&mut self, byte: u8) -> Step {
        let (next, step) = match (self.state, byte) {
            (EscState::Idle, ESC) => (EscState::SawEsc, Step::Pending),
            (EscState::Idle, b) => (EscState::Idle, Step::Done(KeyEvent::from_byte(b))),

            (EscState::SawEsc, b'[') => (EscState::SawCsi, Step::Pending),
            (EscState::SawEsc, b'O') => (EscState::SawSs3, Step::Pending),
            (EscState::SawEsc, b) => (EscState::Idle, Step::DoneWithPending(KeyEvent::bare_escape(), b)),

            (EscState::SawCsi, b'0'..=b'9') => (EscState::SawCsiDigit(byte), Step::Pending),
            (EscState::SawCsi, b) => match csi_final(b) {
                Some(key) => (EscState::Idle, Step::Done(KeyEvent::Escape(key))),
                None => (EscState::Idle, Step::Done(KeyEvent::bare_escape())),
            },

            (EscState::SawCsiDigit(digit), b'~') => match tilde_key(digit) {
                Some(key) => (EscState::Idle, Step::Done(KeyEvent::Escape(key))),
                None => (EscState::Idle, Step::Done(KeyEvent::bare_escape())),
            },

            (EscState::SawSs3, b'H') => (EscState::Idle, Step::Done(KeyEvent::Escape(EscapeKey::Home))),
            (EscState::SawSs3, b'F') => (EscState::Idle, Step::Done(KeyEvent::Escape(EscapeKey::End))),

            _ => (EscState::Idle, Step::Done(KeyEvent::bare_escape())),
        };
        if self.state != EscState::Idle
            && self.state != EscState::SawEsc
            && step == Step::Done(KeyEvent::bare_escape())
        {
            trace!("Discarded partial escape sequence at {:?} + {:#04x}", self.state, byte);
        }
        self.state = next;
        step
    }

    /// Read timeout while pending: abandon the sequence. `None` when idle.
    pub fn expire(&mut self) -> Option<KeyEvent> {
        if self.is_idle() {
            return None;
        }
        trace!("Escape sequence timed out in {:?}", self.state);
        self.state = EscState::Idle;
        Some(KeyEvent::bare_escape())
    }
}

impl Default for EscapeDecoder {
    fn default() -> Self {
        Self::new()
    }
}

fn csi_final(byte: u8) -> Option<EscapeKey> {
    match byte {
        b'A' => Some(EscapeKey::ArrowUp),
        b'B' => Some(EscapeKey::ArrowDown),
        b'C' => Some(EscapeKey::ArrowRight),
        b'D' => Some(EscapeKey::ArrowLeft),
        b'H' => Some(EscapeKey::Home),
        b'F' => Some(EscapeKey::End),
        _ => None,
    }
}

fn tilde_key(digit: u8) -> Option<EscapeKey> {
    match digit {
        b'1' | b'7' => Some(EscapeKey::Home),
        b'4' | b'8' => Some(EscapeKey::End),
        b'3' => Some(EscapeKey::Delete),
        b'5' => Some(EscapeKey::PageUp),
        b'6' => Some(EscapeKey::PageDown),
        _ => None,
    }
}

/// Turns bytes from a `ByteSource` into `KeyEvent`s.
///
/// Waiting is the device's job (VMIN = 0, VTIME > 0): an empty read is
/// retried, never returned. The optional interrupt flag is checked before
/// every read of a new key so a termination signal ends the wait even while
/// bytes keep arriving.
pub struct KeyReader<S: ByteSource> {
    source: S,
    interrupt: Option<Arc<AtomicBool>>,
    /// Byte that ended an escape sequence early; the lead of the next key.
    pending: Option<u8>,
}

impl<S: ByteSource> KeyReader<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            interrupt: None,
            pending: None,
        }
    }

    pub fn with_interrupt(mut self, flag: Arc<AtomicBool>) -> Self {
        self.interrupt = Some(flag);
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Blocks until one whole key is decoded.
    pub fn read_key(&mut self) -> io::Result<KeyEvent> {
        let mut decoder = EscapeDecoder::new();
        let mut step = match self.pending.take() {
            Some(byte) => decoder.advance(byte),
            None => {
                let lead = self.next_byte()?;
                decoder.advance(lead)
            }
        };

        // Mid-sequence: a single timeout ends the wait.
        while step == Step::Pending {
            step = match self.source.read_byte()? {
                Some(byte) => decoder.advance(byte),
                None => Step::Done(decoder.expire().unwrap_or(KeyEvent::bare_escape())),
            };
        }

        let event = match step {
            Step::Done(event) => event,
            Step::DoneWithPending(event, byte) => {
                self.pending = Some(byte);
                event
            }
            Step::Pending => unreachable!("loop exits only on a finished step"),
        };
        debug!("Key event: {:?}", event);
        Ok(event)
    }

    fn next_byte(&mut self) -> io::Result<u8> {
        loop {
            self.check_interrupt()?;
            if let Some(byte) = self.source.read_byte()? {
                return Ok(byte);
            }
        }
    }

    fn check_interrupt(&self) -> io::Result<()> {
        if let Some(flag) = &self.interrupt
            && flag.load(Ordering::Relaxed)
        {
            warn!("Termination requested while waiting for input");
            return Err(io::Error::new(
                io::ErrorKind::Interrupted,
                "termination signal received",
            ));
        }
        Ok(())
    }
}
