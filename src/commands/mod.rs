//! User-facing command handlers
//!
//! The binary reads commands from stdin; each line is one user action.

pub mod console;

pub use console::{handle_command, ConsoleCommand, Flow};
