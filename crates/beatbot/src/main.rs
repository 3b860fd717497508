// SPDX-FileCopyrightText: 2026 Beatbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Beatbot - a Telegram bot for recurring fitness class bookings.
//!
//! This is the binary entry point.

mod serve;

use clap::{Parser, Subcommand};

/// Beatbot - a Telegram bot for recurring fitness class bookings.
#[derive(Parser, Debug)]
#[command(name = "beatbot", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the bot and its background scheduler.
    Serve,
    /// Print the effective configuration and exit.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup.
    let config = match beatbot_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            beatbot_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Serve) => {
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("beatbot serve failed: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::Config) => {
            match toml::to_string_pretty(&config) {
                Ok(rendered) => println!("{rendered}"),
                Err(e) => {
                    eprintln!("failed to render config: {e}");
                    std::process::exit(1);
                }
            }
        }
        None => {
            println!("beatbot: use --help for available commands");
        }
    }
}
