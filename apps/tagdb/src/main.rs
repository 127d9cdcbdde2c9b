//! # tagdb
//!
//! Binary entry point.
//!
//! ## Usage
//!
//! ```bash
//! # Serve the line protocol on 127.0.0.1:8081
//! tagdb serve
//!
//! # Send a query
//! tagdb client -e "-t INSERT -k key0 -v Anakin"
//!
//! # Run a batch of queries locally
//! tagdb exec -f queries.txt
//!
//! # Serve the HTTP API
//! tagdb http --port 8080
//! ```

use clap::Parser;
use tagdb::cli::{self, Cli};
use tagdb::config::Config;
use tagdb::telemetry::init_tracing;

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Configuration decides the log format, so it is loaded before tracing.
    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    init_tracing(&config.log, cli.verbose);

    // Display startup banner
    if !cli.quiet {
        print_banner();
    }

    // Execute command
    if let Err(e) = cli::execute(cli, config).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the tagdb startup banner.
fn print_banner() {
    println!(
        r#"
  ████████╗ █████╗  ██████╗ ██████╗ ██████╗
  ╚══██╔══╝██╔══██╗██╔════╝ ██╔══██╗██╔══██╗
     ██║   ███████║██║  ███╗██║  ██║██████╔╝
     ██║   ██╔══██║██║   ██║██║  ██║██╔══██╗
     ██║   ██║  ██║╚██████╔╝██████╔╝██████╔╝
     ╚═╝   ╚═╝  ╚═╝ ╚═════╝ ╚═════╝ ╚═════╝

  Tag-indexed key-value store v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
