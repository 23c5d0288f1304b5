//! Deck lifecycle commands (`qrdeck deck ...`).

use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::{Args, Subcommand};
use qrdeck::{Deck, DeckHeader, GridConfig, group_count};

use crate::cli::common::LayoutArgs;
use crate::cli::utils::{load_config, load_deck};

/// Supported `qrdeck deck` subcommands.
#[derive(Subcommand, Debug)]
pub enum DeckCommand {
    /// Create an empty deck file.
    Init(DeckInitArgs),
    /// Import a JSON track list into a deck file.
    Import(DeckImportArgs),
    /// Show deck metadata summary.
    Info(DeckInfoArgs),
}

/// Arguments for `qrdeck deck init`.
#[derive(Args, Debug)]
pub struct DeckInitArgs {
    /// Output deck path (JSONL).
    pub path: PathBuf,
    /// Deck title, e.g. the playlist name.
    #[arg(short = 't', long)]
    pub title: Option<String>,
    /// Overwrite an existing file.
    #[arg(long)]
    pub force: bool,
}

/// Arguments for `qrdeck deck import`.
#[derive(Args, Debug)]
pub struct DeckImportArgs {
    /// JSON array of tracks with artist, songName, releaseYear and url.
    pub source: PathBuf,
    /// Output deck file.
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,
    /// Deck title.
    #[arg(short = 't', long)]
    pub title: Option<String>,
}

/// Arguments for `qrdeck deck info`.
#[derive(Args, Debug)]
pub struct DeckInfoArgs {
    /// Deck file to inspect.
    pub deck: PathBuf,
    #[command(flatten)]
    pub layout: LayoutArgs,
}

/// Execute a deck command.
pub fn handle(command: DeckCommand) -> Result<()> {
    match command {
        DeckCommand::Init(args) => init(args),
        DeckCommand::Import(args) => import(args),
        DeckCommand::Info(args) => info(args),
    }
}

fn init(args: DeckInitArgs) -> Result<()> {
    if args.path.exists() && !args.force {
        return Err(anyhow!(
            "{} already exists; pass --force to overwrite",
            args.path.display()
        ));
    }
    let mut deck = Deck::new(DeckHeader::new(args.title));
    deck.save(&args.path)?;
    println!("Initialized deck {}", args.path.display());
    Ok(())
}

fn import(args: DeckImportArgs) -> Result<()> {
    let mut deck = Deck::import_json(&args.source, args.title)?;
    let invalid = deck.invalid_cards();
    for (idx, reason) in &invalid {
        tracing::warn!(card = idx + 1, %reason, "imported card cannot be printed yet");
    }
    deck.save(&args.output)?;
    println!(
        "Imported {} track(s) from {} into {}",
        deck.cards.len(),
        args.source.display(),
        args.output.display()
    );
    Ok(())
}

fn info(args: DeckInfoArgs) -> Result<()> {
    let deck = load_deck(&args.deck)?;
    let config = load_config(&args.layout)?;
    let sheets = sheet_count(deck.cards.len(), &config.grid);
    println!("Deck: {}", args.deck.display());
    println!(
        "Title: {}",
        deck.header.title.as_deref().unwrap_or("(untitled)")
    );
    println!("Created: {}", deck.header.created_at.to_rfc3339());
    println!("Cards: {}", deck.cards.len());
    println!(
        "Sheets: {} ({} pages, {} cards per sheet)",
        sheets,
        sheets * 2,
        config.grid.cards_per_page()
    );
    println!("Hash: {}", deck.hash()?);
    let invalid = deck.invalid_cards();
    if !invalid.is_empty() {
        println!("Unprintable cards:");
        for (idx, reason) in invalid {
            println!("  {:>4}: {}", idx + 1, reason);
        }
    }
    Ok(())
}

fn sheet_count(cards: usize, grid: &GridConfig) -> usize {
    group_count(cards, grid.cards_per_page())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn sheets_follow_the_configured_grid() {
        let default = GridConfig::default();
        assert_eq!(sheet_count(13, &default), 2);
        let small = GridConfig {
            columns: 2,
            rows: 2,
            ..GridConfig::default()
        };
        assert_eq!(sheet_count(13, &small), 4);
        assert_eq!(sheet_count(0, &small), 0);
    }
}
