//! # Commands
//!
//! Key events are bound to a `Command` by the `Keymap`, and `update()`
//! applies the command to the state and reports the `Effect` the event
//! loop must carry out. No I/O happens here.
//!
//! ```text
//! KeyEvent → Keymap::bind → Command → update(state) → Effect
//! ```
//!
//! Only one command exists for now: quit, bound to a control chord.

use log::debug;

use crate::core::key::KeyEvent;
use crate::core::state::{EditorState, LoopState};

/// Clears bits 5 and 6: `b'q' & CTRL_MASK == 0x11`, what Ctrl-Q sends.
pub const CTRL_MASK: u8 = 0x1f;

pub const fn ctrl_key(key: u8) -> u8 {
    key & CTRL_MASK
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
}

/// What the event loop must do after `update()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    /// Final clear, then release the terminal.
    Quit,
}

#[derive(Debug, Clone, Copy)]
pub struct Keymap {
    quit: u8,
}

impl Keymap {
    /// `quit_letter` is the letter held with Ctrl, e.g. `b'q'`.
    pub fn new(quit_letter: u8) -> Self {
        Self {
            quit: ctrl_key(quit_letter),
        }
    }

    pub fn bind(&self, event: &KeyEvent) -> Option<Command> {
        match *event {
            KeyEvent::Control(byte) if byte == self.quit => Some(Command::Quit),
            _ => None,
        }
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Self::new(b'q')
    }
}

pub fn update(state: &mut EditorState, command: Command) -> Effect {
    debug!("Dispatching {:?} in {:?}", command, state.phase);
    match command {
        Command::Quit => {
            if state.phase == LoopState::Terminated {
                return Effect::None;
            }
            state.phase = LoopState::Terminated;
            Effect::Quit
        }
    }
}
