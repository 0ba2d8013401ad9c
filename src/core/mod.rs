//! # Core Logic
//!
//! Everything here is pure: no file descriptors, no escape sequences.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • KeyEvent (input)     │
//!                    │  • EditorState          │
//!                    │  • Command + update()   │
//!                    │  • Config               │
//!                    │                         │
//!                    │  No I/O. No UI. Pure.   │
//!                    └───────────┬─────────────┘
//!                                │
//!                                ▼
//!                         ┌────────────┐
//!                         │    TUI     │
//!                         │  Adapter   │
//!                         │ (termios)  │
//!                         └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`key`]: The `KeyEvent` value produced for every keypress
//! - [`state`]: `EditorState` and the `Running`/`Terminated` machine
//! - [`action`]: The command table, `update()` applies a `Command`
//! - [`config`]: Defaults, optional TOML file, CLI overrides

pub mod action;
pub mod config;
pub mod key;
pub mod state;
