//! # tagdb CLI Module
//!
//! This module implements the CLI interface for tagdb.
//!
//! ## Available Commands
//!
//! - `serve` - Start the TCP line server
//! - `http` - Start the HTTP API server
//! - `client` - Send queries to a running line server
//! - `exec` - Run queries against a fresh in-memory store
//! - `config` - Print the effective configuration

mod commands;

use crate::config::Config;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tagdb_core::TagDbError;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// tagdb - tag-indexed key-value store
///
/// Queries are single lines: -t <TYPE> [-k key] [-v value] [-o operation] [-p parameter] [-u user]
#[derive(Parser, Debug)]
#[command(name = "tagdb")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to a TOML configuration file (also TAGDB_CONFIG)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the TCP line server
    Serve {
        /// Host to bind to
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Start the HTTP API server
    Http {
        /// Host to bind to
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Send queries to a running line server (stdin lines if no -e is given)
    Client {
        /// Server host
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Server port
        #[arg(short, long)]
        port: Option<u16>,

        /// Query to send; repeatable
        #[arg(short = 'e', long = "query", allow_hyphen_values = true)]
        queries: Vec<String>,
    },

    /// Run queries against a fresh in-memory store and print the responses
    Exec {
        /// File with one query per line (stdin if omitted)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Print the effective configuration as JSON
    Config,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments and resolved configuration.
pub async fn execute(cli: Cli, config: Config) -> Result<(), TagDbError> {
    match cli.command {
        Some(Commands::Serve { host, port }) => cmd_serve(config, host, port).await,
        Some(Commands::Http { host, port }) => cmd_http(config, host, port).await,
        Some(Commands::Client {
            host,
            port,
            queries,
        }) => cmd_client(&config, host, port, queries).await,
        Some(Commands::Exec { file }) => cmd_exec(&config, file.as_deref()),
        Some(Commands::Config) => cmd_config(&config),
        None => {
            // No subcommand - serve the line protocol by default
            cmd_serve(config, None, None).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_query_may_start_with_hyphen() {
        let cli = Cli::try_parse_from(["tagdb", "client", "-e", "-t SHOW -k a"]).expect("parses");
        assert!(matches!(
            cli.command,
            Some(Commands::Client { ref queries, .. }) if *queries == ["-t SHOW -k a"]
        ));
    }

    #[test]
    fn client_query_flag_repeats() {
        let cli = Cli::try_parse_from([
            "tagdb",
            "-q",
            "client",
            "--query",
            "-t INSERT -k a -v 1",
            "-e",
            "-t SHOW",
        ])
        .expect("parses");
        assert!(cli.quiet);
        assert!(matches!(
            cli.command,
            Some(Commands::Client { ref queries, .. })
                if *queries == ["-t INSERT -k a -v 1", "-t SHOW"]
        ));
    }

    #[test]
    fn exec_takes_optional_file() {
        let cli = Cli::try_parse_from(["tagdb", "exec", "-f", "queries.txt"]).expect("parses");
        assert!(matches!(
            cli.command,
            Some(Commands::Exec { file: Some(ref path) }) if path == &PathBuf::from("queries.txt")
        ));

        let cli = Cli::try_parse_from(["tagdb", "exec"]).expect("parses");
        assert!(matches!(cli.command, Some(Commands::Exec { file: None })));
    }
}
