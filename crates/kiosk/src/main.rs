// SPDX-FileCopyrightText: 2026 Kiosk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Kiosk - a conversational shop bot for Telegram.
//!
//! This is the binary entry point for the Kiosk bot.

use clap::{Parser, Subcommand};

mod serve;
mod shutdown;

/// Kiosk - a conversational shop bot for Telegram.
#[derive(Parser, Debug)]
#[command(name = "kiosk", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the Kiosk bot.
    Serve,
    /// Load the configuration and report problems without starting the bot.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match kiosk_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            kiosk_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Serve) => {
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("kiosk serve failed: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::Config) => {
            println!("kiosk: config OK");
            println!("  database_path = {}", config.storage.database_path);
            println!("  order_prefix  = {}", config.bot.order_prefix);
            println!("  admin_ids     = {:?}", config.bot.admin_ids);
            println!(
                "  bot_token     = {}",
                if config.telegram.bot_token.is_some() { "set" } else { "missing" }
            );
        }
        None => {
            println!("kiosk: use --help for available commands");
        }
    }
}
