//! # Raw Mode Guard
//!
//! `TerminalModeGuard::enter` snapshots the device's attributes, applies
//! the raw variant, and owns the snapshot until it is put back. Restoring
//! happens through `restore()` or on drop, whichever comes first; the
//! second attempt is a no-op.
//!
//! ```text
//! enter ──► tcgetattr ──► raw(original) ──► tcsetattr(Flush)
//!                                                │
//!               restore() / Drop ◄───────────────┘
//!                     │
//!                     └──► tcsetattr(original)   (once)
//! ```

use log::{debug, info, warn};
use rustix::termios::{ControlModes, InputModes, LocalModes, OutputModes, SpecialCodeIndex, Termios};
use std::io;

use crate::error::TerminalError;

/// Non-canonical read policy: `VMIN` bytes, `VTIME` deciseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadPolicy {
    pub min_bytes: u8,
    pub timeout_ds: u8,
}

impl ReadPolicy {
    pub fn with_timeout(timeout_ds: u8) -> Self {
        Self {
            min_bytes: 0,
            timeout_ds,
        }
    }
}

impl Default for ReadPolicy {
    fn default() -> Self {
        Self::with_timeout(1)
    }
}

/// The slice of a termios record that raw mode touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeBits {
    pub input: InputModes,
    pub output: OutputModes,
    pub control: ControlModes,
    pub local: LocalModes,
    pub min_bytes: u8,
    pub timeout_ds: u8,
}

impl ModeBits {
    pub fn from_termios(termios: &Termios) -> Self {
        Self {
            input: termios.input_modes,
            output: termios.output_modes,
            control: termios.control_modes,
            local: termios.local_modes,
            min_bytes: termios.special_codes[SpecialCodeIndex::VMIN],
            timeout_ds: termios.special_codes[SpecialCodeIndex::VTIME],
        }
    }

    pub fn write_into(&self, termios: &mut Termios) {
        termios.input_modes = self.input;
        termios.output_modes = self.output;
        termios.control_modes = self.control;
        termios.local_modes = self.local;
        termios.special_codes[SpecialCodeIndex::VMIN] = self.min_bytes;
        termios.special_codes[SpecialCodeIndex::VTIME] = self.timeout_ds;
    }

    /// Raw-mode deltas on top of `self`. Depends on nothing but its inputs.
    pub fn raw(&self, policy: ReadPolicy) -> Self {
        let mut raw = *self;
        // break → SIGINT, CR → NL, parity, 8th-bit strip, Ctrl-S/Ctrl-Q
        raw.input.remove(
            InputModes::BRKINT
                | InputModes::ICRNL
                | InputModes::INPCK
                | InputModes::ISTRIP
                | InputModes::IXON,
        );
        raw.output.remove(OutputModes::OPOST);
        raw.control.insert(ControlModes::CS8);
        // echo, line buffering, Ctrl-V, Ctrl-C/Ctrl-Z
        raw.local.remove(
            LocalModes::ECHO | LocalModes::ICANON | LocalModes::IEXTEN | LocalModes::ISIG,
        );
        raw.min_bytes = policy.min_bytes;
        raw.timeout_ds = policy.timeout_ds;
        raw
    }
}

/// Attribute get/set on a terminal device.
pub trait AttributeDevice {
    type Attributes: Clone;

    fn get_attributes(&mut self) -> io::Result<Self::Attributes>;

    fn set_attributes(&mut self, attributes: &Self::Attributes) -> io::Result<()>;

    /// Raw-mode variant of `original`; must be a pure function.
    fn raw_attributes(original: &Self::Attributes, policy: ReadPolicy) -> Self::Attributes;
}

pub struct TerminalModeGuard<D: AttributeDevice> {
    device: D,
    original: D::Attributes,
    released: bool,
}

impl<D: AttributeDevice> TerminalModeGuard<D> {
    pub fn enter(mut device: D, policy: ReadPolicy) -> Result<Self, TerminalError> {
        let original = device
            .get_attributes()
            .map_err(TerminalError::QueryFailed)?;
        let raw = D::raw_attributes(&original, policy);
        if let Err(e) = device.set_attributes(&raw) {
            // tcsetattr reports success if any change stuck, so a failure
            // may still have left some bits applied.
            let _ = device.set_attributes(&original);
            return Err(TerminalError::ApplyFailed(e));
        }
        info!(
            "Raw mode enabled (VMIN={}, VTIME={})",
            policy.min_bytes, policy.timeout_ds
        );
        Ok(Self {
            device,
            original,
            released: false,
        })
    }

    /// Puts the original attributes back. Only the first call touches the
    /// device, even if that call fails.
    pub fn restore(&mut self) -> Result<(), TerminalError> {
        if self.released {
            debug!("Terminal already restored");
            return Ok(());
        }
        self.released = true;
        self.device
            .set_attributes(&self.original)
            .map_err(TerminalError::ApplyFailed)?;
        info!("Terminal attributes restored");
        Ok(())
    }

    pub fn is_raw(&self) -> bool {
        !self.released
    }
}

impl<D: AttributeDevice> Drop for TerminalModeGuard<D> {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            warn!("Failed to restore terminal on drop: {}", e);
        }
    }
}
