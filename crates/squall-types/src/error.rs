//! Error types for squall.

use std::io;

/// Errors produced by the squall shell.
///
/// Everything except [`SquallError::Startup`] is recoverable: the loop
/// reports the message and keeps accepting input.
#[derive(Debug, thiserror::Error)]
pub enum SquallError {
    /// The first token of a line matched no command name or alias.
    #[error("unknown command: {0}. Use 'commands' to get a list of all available commands")]
    UnknownCommand(String),

    /// A handler rejected its arguments or failed mid-action.
    #[error("command error: {0}")]
    Command(String),

    /// The arithmetic evaluator rejected an expression.
    #[error("evaluation error: {0}")]
    Eval(String),

    /// Registry construction failed; aborts before the loop starts.
    #[error("startup error: {0}")]
    Startup(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("network error: {0}")]
    Net(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, SquallError>;
