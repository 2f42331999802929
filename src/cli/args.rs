//! CLI argument definitions using clap
//!
//! Commands:
//! - tablerouter init --config <path>
//! - tablerouter exec --config <path>
//! - tablerouter start --config <path>
//! - tablerouter serve --config <path> [--port <port>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::DEFAULT_CONFIG_PATH;

/// tablerouter - URI-addressed access to relational tables
#[derive(Parser, Debug)]
#[command(name = "tablerouter")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Open the database, creating or upgrading every declared table
    Init {
        /// Path to configuration file
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
    },

    /// Execute a single request read from stdin and exit
    Exec {
        /// Path to configuration file
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
    },

    /// Serve line-delimited requests from stdin until EOF
    Start {
        /// Path to configuration file
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
    },

    /// Serve requests over HTTP
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,

        /// Port to listen on (overrides http.port)
        #[arg(long)]
        port: Option<u16>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_path() {
        let cli = Cli::try_parse_from(["tablerouter", "exec"]).unwrap();
        match cli.command {
            Command::Exec { config } => assert_eq!(config, PathBuf::from(DEFAULT_CONFIG_PATH)),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_serve_port_override() {
        let cli =
            Cli::try_parse_from(["tablerouter", "serve", "--config", "x.json", "--port", "8080"])
                .unwrap();
        match cli.command {
            Command::Serve { config, port } => {
                assert_eq!(config, PathBuf::from("x.json"));
                assert_eq!(port, Some(8080));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
