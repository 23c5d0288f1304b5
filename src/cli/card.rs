//! Card-level operations (`qrdeck card ...`).

use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgGroup, Args, Subcommand};
use qrdeck::{CardRecord, release_year_from_date};

use crate::cli::utils::{card_index, insert_index, load_deck};

/// Supported `qrdeck card` subcommands.
#[derive(Subcommand, Debug)]
pub enum CardCommand {
    /// Append or insert a track.
    Add(CardAddArgs),
    /// Remove a track by number.
    Remove(CardRemoveArgs),
    /// List tracks in deck order.
    List(CardListArgs),
}

/// Arguments for `qrdeck card add`.
#[derive(Args, Debug)]
#[command(group(ArgGroup::new("year_source").args(["year", "release_date"])))]
pub struct CardAddArgs {
    /// Deck file to modify.
    pub deck: PathBuf,
    #[arg(long)]
    pub artist: String,
    /// Song title.
    #[arg(long)]
    pub song: String,
    /// Release year as printed on the card.
    #[arg(long)]
    pub year: Option<String>,
    /// Release date (`YYYY-MM-DD`); only the year is kept.
    #[arg(long = "release-date")]
    pub release_date: Option<String>,
    /// Link encoded on the back of the card.
    #[arg(long)]
    pub url: String,
    /// Insert at 1-based position (defaults to append).
    #[arg(long)]
    pub position: Option<usize>,
}

/// Arguments for `qrdeck card remove`.
#[derive(Args, Debug)]
pub struct CardRemoveArgs {
    /// Deck file to modify.
    pub deck: PathBuf,
    /// 1-based card number.
    #[arg(short = 'i', long = "index")]
    pub index: usize,
}

/// Arguments for `qrdeck card list`.
#[derive(Args, Debug)]
pub struct CardListArgs {
    /// Deck file to read.
    pub deck: PathBuf,
}

/// Execute a card command.
pub fn handle(command: CardCommand) -> Result<()> {
    match command {
        CardCommand::Add(args) => add(args),
        CardCommand::Remove(args) => remove(args),
        CardCommand::List(args) => list(args),
    }
}

fn add(args: CardAddArgs) -> Result<()> {
    let mut deck = load_deck(&args.deck)?;
    let year = match (args.year, args.release_date) {
        (Some(year), _) => year,
        (None, Some(date)) => release_year_from_date(&date),
        (None, None) => String::new(),
    };
    let card = CardRecord::new(args.url, args.song, args.artist, year);
    let position = match args.position {
        Some(number) => {
            let index = insert_index(number, deck.cards.len())?;
            deck.insert_card(index, card)?;
            number
        }
        None => {
            deck.append_card(card);
            deck.cards.len()
        }
    };
    if let Err(reason) = deck.cards[position - 1].validate() {
        tracing::warn!(%reason, "card cannot be printed until its url is fixed");
    }
    deck.save(&args.deck)?;
    println!("Added card {} to {}", position, args.deck.display());
    Ok(())
}

fn remove(args: CardRemoveArgs) -> Result<()> {
    let mut deck = load_deck(&args.deck)?;
    let index = card_index(args.index, deck.cards.len())?;
    let removed = deck.remove_card(index)?;
    deck.save(&args.deck)?;
    println!(
        "Removed card {} ({} - {}) from {}",
        args.index,
        removed.artist,
        removed.song_name,
        args.deck.display()
    );
    Ok(())
}

fn list(args: CardListArgs) -> Result<()> {
    let deck = load_deck(&args.deck)?;
    for (idx, card) in deck.cards.iter().enumerate() {
        println!(
            "{:>4} | {} | {} | {} | {}",
            idx + 1,
            card.release_year,
            card.artist,
            card.song_name,
            card.url
        );
    }
    Ok(())
}
