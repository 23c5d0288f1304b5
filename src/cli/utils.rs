//! Convenience helpers shared across command handlers.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use qrdeck::{Deck, SheetConfig};

use crate::cli::common::LayoutArgs;

/// Persist a string either to a file or stdout when `-` is provided.
pub fn write_output(path: &Path, content: &str) -> Result<()> {
    if path.as_os_str() == "-" {
        io::stdout().write_all(content.as_bytes())?;
        return Ok(());
    }
    fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
}

/// Load a deck file, attaching path context to any error.
pub fn load_deck(path: &Path) -> Result<Deck> {
    Deck::load(path).with_context(|| format!("failed to read deck {}", path.display()))
}

/// Resolve the sheet configuration from an optional file plus flag overrides.
pub fn load_config(args: &LayoutArgs) -> Result<SheetConfig> {
    let mut config = match &args.config {
        Some(path) => SheetConfig::load(path)?,
        None => SheetConfig::default(),
    };
    if let Some(padding) = args.padding_mm {
        config.grid.padding_mm = padding;
    }
    if let Some(tolerance) = args.tolerance {
        config.code.error_tolerance = tolerance.into();
    }
    config.validate()?;
    Ok(config)
}

/// Convert a 1-based card number into a deck index.
pub fn card_index(number: usize, deck_len: usize) -> Result<usize> {
    if number == 0 {
        return Err(anyhow!("card numbers are 1-based"));
    }
    if number > deck_len {
        return Err(anyhow!("card {} out of range 1..{}", number, deck_len));
    }
    Ok(number - 1)
}

/// Convert a 1-based insert position into a deck index; one past the last
/// card appends.
pub fn insert_index(number: usize, deck_len: usize) -> Result<usize> {
    if number == 0 {
        return Err(anyhow!("card positions are 1-based"));
    }
    if number > deck_len + 1 {
        return Err(anyhow!("position {} out of range 1..={}", number, deck_len + 1));
    }
    Ok(number - 1)
}
