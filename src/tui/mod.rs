//! # TUI Adapter
//!
//! Owns the terminal for the life of the process and runs the
//! read-render-dispatch cycle:
//!
//! ```text
//! enter raw mode ─► query viewport ─┬─► refresh ─► read key ─► dispatch ─┐
//!                                   │                                    │
//!                                   └──────────── Running ◄──────────────┘
//!                                                    │ quit
//!                                                    ▼
//!                                   final clear ─► restore ─► Ok
//! ```
//!
//! Any failure after raw mode is entered takes the fatal path instead:
//! best-effort clear, restore, and the error goes back to `main`, which
//! prints it (the terminal is cooked again by then) and exits non-zero.
//!
//! Every device is behind a trait (`AttributeDevice`, `SizeSource`,
//! `ByteSource`, `Write`) so `run_with` can be driven without a tty.

pub mod event;
pub mod guard;
pub mod render;
pub mod tty;
pub mod viewport;

use log::{error, info, warn};
use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use crate::core::action::{Effect, Keymap, update};
use crate::core::config::{Mode, ResolvedConfig};
use crate::core::state::EditorState;
use crate::error::AppError;
use crate::tui::event::{ByteSource, KeyReader};
use crate::tui::guard::{AttributeDevice, ReadPolicy, TerminalModeGuard};
use crate::tui::render::Renderer;
use crate::tui::tty::{TtyAttributes, TtyInput, TtyOutput, TtySize};
use crate::tui::viewport::{SizeSource, Viewport};

/// The four faces of a terminal the loop needs.
pub struct Terminal<D, S, I, W> {
    pub device: D,
    pub size: S,
    pub input: I,
    pub output: W,
}

/// Runs against the process's controlling terminal.
pub fn run(config: &ResolvedConfig) -> Result<(), AppError> {
    let interrupt = tty::termination_flag().map_err(AppError::io("install signal handlers"))?;
    let terminal = Terminal {
        device: TtyAttributes,
        size: TtySize,
        input: TtyInput,
        output: TtyOutput,
    };
    run_with(terminal, config, Some(interrupt))
}

pub fn run_with<D, S, I, W>(
    terminal: Terminal<D, S, I, W>,
    config: &ResolvedConfig,
    interrupt: Option<Arc<AtomicBool>>,
) -> Result<(), AppError>
where
    D: AttributeDevice,
    S: SizeSource,
    I: ByteSource,
    W: Write,
{
    let Terminal {
        device,
        size,
        input,
        output,
    } = terminal;
    let mut renderer = Renderer::new(output);

    let policy = ReadPolicy::with_timeout(config.read_timeout_ds);
    let mut guard = match TerminalModeGuard::enter(device, policy) {
        Ok(guard) => guard,
        Err(e) => {
            error!("Could not enter raw mode: {}", e);
            if let Err(clear_err) = renderer.clear() {
                warn!("Final clear failed: {}", clear_err);
            }
            return Err(e.into());
        }
    };

    let size = match Viewport::new(size).query() {
        Ok(size) => size,
        Err(e) => return Err(fail(&mut renderer, &mut guard, e.into())),
    };

    let mut state = EditorState::new(size, config.row_marker.clone());
    state.raw_mode = guard.is_raw();

    let mut reader = KeyReader::new(input);
    if let Some(flag) = interrupt {
        reader = reader.with_interrupt(flag);
    }

    info!("Event loop started in {:?} mode", config.mode);
    if let Err(e) = drive(&mut state, &mut renderer, &mut reader, config) {
        return Err(fail(&mut renderer, &mut guard, e));
    }

    guard.restore()?;
    state.raw_mode = false;
    info!("Terminated cleanly");
    Ok(())
}

fn drive<W: Write, I: ByteSource>(
    state: &mut EditorState,
    renderer: &mut Renderer<W>,
    reader: &mut KeyReader<I>,
    config: &ResolvedConfig,
) -> Result<(), AppError> {
    let keymap = Keymap::new(config.quit_key);
    while state.is_running() {
        if config.mode == Mode::Viewport {
            renderer.refresh(state).map_err(AppError::io("render"))?;
        }

        let key = reader.read_key().map_err(AppError::io("read key"))?;

        if config.mode == Mode::Keys {
            renderer.echo_key(&key).map_err(AppError::io("echo key"))?;
        }

        if let Some(command) = keymap.bind(&key) {
            match update(state, command) {
                Effect::Quit => renderer.clear().map_err(AppError::io("clear"))?,
                Effect::None => {}
            }
        }
    }
    Ok(())
}

/// Fatal path: clear, restore, hand the original error back.
fn fail<W: Write, D: AttributeDevice>(
    renderer: &mut Renderer<W>,
    guard: &mut TerminalModeGuard<D>,
    err: AppError,
) -> AppError {
    error!("Fatal: {}", err);
    if let Err(e) = renderer.clear() {
        warn!("Final clear failed: {}", e);
    }
    if let Err(e) = guard.restore() {
        warn!("{}", e);
    }
    err
}
