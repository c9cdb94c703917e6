//! Command interpreter engine for the squall shell.
//!
//! The shell is a registry-based dispatch system. Commands implement the
//! `Command` trait and are registered by canonical name plus optional
//! aliases. The interpreter parses input lines, resolves the command name,
//! and dispatches `execute()`. Completion and arithmetic evaluation are
//! pure engines with no I/O, so the line editor can call them on every
//! keystroke.

pub mod commands;
pub mod complete;
pub mod console;
pub mod eval;
pub mod http;
pub mod interpreter;
pub mod progress;
pub mod search;
#[cfg(feature = "tls")]
pub mod tls;

/// Shell version reported by `version`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Register all built-in commands into a registry.
pub use commands::register_builtins;
/// One completion suggestion with its replacement span.
pub use complete::{Candidate, complete};
/// Styled terminal output helper.
pub use console::Console;
/// Sandboxed arithmetic evaluation.
pub use eval::{EvalError, Number, evaluate};
/// Registry, dispatch, and the command trait.
pub use interpreter::{Command, Control, Registry, Session};
