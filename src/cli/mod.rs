//! Command-line interface wiring for the `qrdeck` binary.
//!
//! This module owns the clap definitions and delegates execution to
//! specialized submodules that encapsulate each command family.

use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod card;
pub mod common;
pub mod deck;
pub mod logging;
pub mod render;
pub mod utils;

/// Parsed CLI entrypoint for the `qrdeck` binary.
#[derive(Parser, Debug)]
#[command(name = "qrdeck", version, about = "Printable QR music card sheets")]
pub struct Cli {
    /// Log debug output.
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,
    /// Emit logs as JSON lines.
    #[arg(long = "log-json", global = true)]
    pub log_json: bool,
    /// Top-level command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// High-level command families made available to end users.
#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(subcommand)]
    Deck(deck::DeckCommand),
    #[command(subcommand)]
    Card(card::CardCommand),
    #[command(subcommand)]
    Render(render::RenderCommand),
}

/// Execute the requested command.
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Deck(cmd) => deck::handle(cmd),
        Command::Card(cmd) => card::handle(cmd),
        Command::Render(cmd) => render::handle(cmd).await,
    }
}
