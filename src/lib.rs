//! Tilde library exports for testing

#[cfg(not(unix))]
compile_error!("tilde drives a POSIX terminal and only builds on unix targets");

pub mod core;
pub mod error;
pub mod tui;

#[cfg(test)]
pub mod test_support;
