// SPDX-FileCopyrightText: 2026 Funil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Funil - multi-tenant WhatsApp CRM ingestion service.
//!
//! Binary entry point: loads configuration and dispatches subcommands.

mod send;
mod serve;

use clap::{Parser, Subcommand};

/// Funil - multi-tenant WhatsApp CRM ingestion service.
#[derive(Parser, Debug)]
#[command(name = "funil", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the webhook server.
    Serve,
    /// Print the effective configuration as TOML.
    Config,
    /// Send an outbound text on behalf of an organization.
    Send {
        /// Organization id to send as.
        #[arg(long)]
        org: String,
        /// Destination phone number.
        #[arg(long)]
        to: String,
        /// Message text.
        #[arg(long)]
        text: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match funil_config::load_config() {
        Ok(config) => config,
        Err(error) => {
            eprintln!("funil: configuration error: {error}");
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Config) => match toml::to_string_pretty(&config) {
            Ok(rendered) => {
                print!("{rendered}");
                Ok(())
            }
            Err(error) => Err(funil_core::FunilError::Internal(format!(
                "failed to render configuration: {error}"
            ))),
        },
        Some(Commands::Send { org, to, text }) => send::run(config, &org, &to, &text).await,
        Some(Commands::Serve) | None => serve::run(config).await,
    };

    if let Err(error) = result {
        eprintln!("funil: {error}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        super::Cli::command().debug_assert();
    }

    #[test]
    fn binary_loads_config_defaults() {
        let config = funil_config::load_config().expect("default config should be valid");
        assert_eq!(config.service.name, "funil");
    }
}
