//! tablerouter CLI entry point
//!
//! Parses arguments and dispatches via `cli::run`, printing fatal errors to
//! stderr and exiting non-zero.

use tablerouter::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
