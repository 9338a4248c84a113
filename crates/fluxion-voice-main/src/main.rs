// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of FluxION.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

mod commands;
mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::FmtSubscriber;

#[derive(Debug, Parser)]
#[command(name = "fluxion-voice")]
#[command(author, version, about = "FluxION Voice - Alexa skill for Deye Cloud inverters")]
#[command(
    long_about = "Voice assistant backend reporting home battery and power readings from Deye Cloud.\n\
    \nConfiguration is read from --config (TOML or JSON), then ./config.toml, and\n\
    DEYE_* / SKILL_* environment variables override file values.\n\
    \nExamples:\n  \
    fluxion-voice serve --bind 0.0.0.0:8099   # Host the skill endpoint\n  \
    fluxion-voice status                      # One-shot telemetry read\n  \
    fluxion-voice hash-password               # Digest for DEYE_PASSWORD_HASH"
)]
struct Cli {
    /// Configuration file (TOML, or JSON with a .json extension)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Host the skill endpoint (POST /alexa, GET /health)
    Serve {
        /// Listen address, overrides skill.bind_address
        #[arg(long)]
        bind: Option<String>,
    },

    /// Fetch the latest telemetry once and print it
    Status,

    /// List the stations visible to the configured account
    Stations,

    /// Print the SHA-256 digest of the account password
    HashPassword {
        /// Plain password; falls back to DEYE_PASSWORD
        #[arg(long)]
        password: Option<String>,
    },

    /// Answer a saved Alexa request JSON file and print the response
    Invoke {
        /// Path to the request JSON
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respects RUST_LOG
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install tracing subscriber")?;

    let config_path = cli.config.as_deref();
    let load = || config::AppConfig::load(config_path);

    match cli.command {
        Commands::Serve { bind } => commands::serve(&load()?, bind).await,
        Commands::Status => commands::status(&load()?).await,
        Commands::Stations => commands::stations(&load()?).await,
        Commands::HashPassword { password } => commands::hash(password),
        Commands::Invoke { file } => commands::invoke(&load()?, &file).await,
    }
}
