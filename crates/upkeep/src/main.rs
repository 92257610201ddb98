// SPDX-FileCopyrightText: 2026 Upkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Upkeep - maintenance scheduling and acknowledgment service.
//!
//! This is the binary entry point for the Upkeep server.

use clap::{Parser, Subcommand};
use sha2::{Digest, Sha256};

mod serve;

/// Upkeep - maintenance scheduling and acknowledgment service.
#[derive(Parser, Debug)]
#[command(name = "upkeep", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the Upkeep API server.
    Serve,
    /// Print the effective configuration.
    Config,
    /// Hash a deletion credential for `admin.credential_sha256`.
    HashCredential {
        /// The credential to hash. Prefer piping via stdin in scripts; the
        /// digest, not the credential, is what goes into the config file.
        credential: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup.
    let config = match upkeep_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            upkeep_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Serve) => {
            if let Err(e) = serve::run(config).await {
                eprintln!("upkeep serve: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::Config) => {
            println!(
                "server  = {}:{} (log_level={})",
                config.server.host, config.server.port, config.server.log_level
            );
            println!(
                "storage = {} (wal_mode={})",
                config.storage.database_path, config.storage.wal_mode
            );
            println!(
                "admin   = credential digest {}",
                if config.admin.credential_sha256.is_some() {
                    "configured"
                } else {
                    "NOT configured (deletion disabled)"
                }
            );
        }
        Some(Commands::HashCredential { credential }) => {
            println!("{}", hex::encode(Sha256::digest(credential.as_bytes())));
        }
        None => {
            println!("upkeep: use --help for available commands");
        }
    }
}
