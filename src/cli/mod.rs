//! CLI module for tablerouter
//!
//! Provides command-line interface for:
//! - init: Open the database and run table lifecycle hooks
//! - exec: One-shot request execution
//! - start: Line-delimited request loop on stdin/stdout
//! - serve: HTTP server

mod args;
mod commands;
mod errors;
mod io;
mod request;

pub use args::{Cli, Command};
pub use commands::{exec, init, run, run_command, serve, serve_lines, start};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use request::Request;
