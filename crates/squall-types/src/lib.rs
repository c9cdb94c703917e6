//! Shared types for the squall shell.
//!
//! This crate contains the error type and the user configuration shared by
//! the engine library (`squall-shell`) and the binary (`squall-app`).

pub mod config;
pub mod error;

pub use config::ShellConfig;
pub use error::{Result, SquallError};
