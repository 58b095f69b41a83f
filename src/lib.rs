//! Terminal front-end for a remote flow-execution server.

pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
pub mod output;

pub use cli::{Args, Command, ConfigAction, ConfigValues};
pub use commands::{run, AppError};
