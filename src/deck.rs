use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use url::Url;

use anyhow::{Context, Result, anyhow};

const DECK_VERSION: u8 = 1;

/// Year shown when a track carries no release date.
pub const UNKNOWN_YEAR: &str = "Unknown";

/// One track printed as one physical card.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CardRecord {
    pub url: String,
    pub song_name: String,
    pub artist: String,
    pub release_year: String,
}

impl CardRecord {
    pub fn new<U, S, A, Y>(url: U, song_name: S, artist: A, release_year: Y) -> Self
    where
        U: Into<String>,
        S: Into<String>,
        A: Into<String>,
        Y: Into<String>,
    {
        Self {
            url: url.into(),
            song_name: song_name.into(),
            artist: artist.into(),
            release_year: release_year.into(),
        }
    }

    /// Check that the record can be printed: the URL must be an absolute link
    /// with no surrounding whitespace, since it is encoded byte for byte.
    pub fn validate(&self) -> std::result::Result<(), String> {
        let raw = self.url.as_str();
        if raw.trim().is_empty() {
            return Err("url is missing".to_string());
        }
        if raw.trim() != raw {
            return Err(format!("url '{raw}' has surrounding whitespace"));
        }
        let parsed = Url::parse(raw).map_err(|err| format!("url '{raw}' is invalid: {err}"))?;
        if !parsed.has_host() {
            return Err(format!("url '{raw}' is not an absolute link"));
        }
        Ok(())
    }

    /// Trim the URL and replace a blank year with [`UNKNOWN_YEAR`].
    fn normalize(mut self) -> Self {
        self.url = self.url.trim().to_string();
        if self.release_year.trim().is_empty() {
            self.release_year = UNKNOWN_YEAR.to_string();
        }
        self
    }
}

/// Year part of a `YYYY[-MM[-DD]]` release date.
pub fn release_year_from_date(release_date: &str) -> String {
    let year = release_date.trim().split('-').next().unwrap_or_default();
    if year.is_empty() {
        UNKNOWN_YEAR.to_string()
    } else {
        year.to_string()
    }
}

/// Per-deck metadata stored as a header record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeckHeader {
    pub version: u8,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub title: Option<String>,
}

impl DeckHeader {
    pub fn new(title: Option<String>) -> Self {
        Self {
            version: DECK_VERSION,
            created_at: Utc::now(),
            title,
        }
    }
}

/// In-memory representation of a deck file.
#[derive(Debug, Clone)]
pub struct Deck {
    pub header: DeckHeader,
    pub cards: Vec<CardRecord>,
    pub path: Option<PathBuf>,
}

impl Deck {
    /// Create an empty deck using the provided header metadata.
    pub fn new(header: DeckHeader) -> Self {
        Self {
            header,
            cards: Vec::new(),
            path: None,
        }
    }

    pub fn from_cards(title: Option<String>, cards: Vec<CardRecord>) -> Self {
        Self {
            header: DeckHeader::new(title),
            cards,
            path: None,
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .open(path)
            .with_context(|| format!("failed to open deck file {}", path.display()))?;
        let reader = BufReader::new(file);
        let mut lines = reader.lines();
        let header_line = lines
            .next()
            .ok_or_else(|| anyhow!("deck file {} is empty", path.display()))??;
        let deck_line: DeckLine = serde_json::from_str(&header_line)
            .with_context(|| format!("failed to parse deck header in {}", path.display()))?;
        let header = match deck_line {
            DeckLine::Header(header) => header,
            DeckLine::Card(_) => return Err(anyhow!("expected deck header as first line")),
        };

        let mut cards = Vec::new();
        for (idx, raw) in lines.enumerate() {
            let raw = raw?;
            if raw.trim().is_empty() {
                continue;
            }
            let line: DeckLine = serde_json::from_str(&raw).with_context(|| {
                format!(
                    "failed to parse card record at line {} in {}",
                    idx + 2,
                    path.display()
                )
            })?;
            match line {
                DeckLine::Header(_) => {
                    return Err(anyhow!(
                        "multiple deck headers found in {} at line {}",
                        path.display(),
                        idx + 2
                    ));
                }
                DeckLine::Card(card) => cards.push(card),
            }
        }

        Ok(Self {
            header,
            cards,
            path: Some(path.to_path_buf()),
        })
    }

    pub fn save(&mut self, path: &Path) -> Result<()> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .with_context(|| format!("failed to write deck file {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, &DeckLine::Header(self.header.clone()))
            .context("failed to serialize deck header")?;
        writer.write_all(b"\n")?;
        for card in &self.cards {
            serde_json::to_writer(&mut writer, &DeckLine::Card(card.clone()))
                .context("failed to serialize deck card")?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        self.path = Some(path.to_path_buf());
        Ok(())
    }

    /// Parse a JSON array of tracks as exported from a playlist.
    ///
    /// Every element needs string `artist`, `songName`, `releaseYear` and `url`
    /// fields; other fields such as `number` are ignored.
    pub fn from_json_str(title: Option<String>, input: &str) -> Result<Self> {
        let values: Vec<serde_json::Value> =
            serde_json::from_str(input).context("track list must be a JSON array")?;
        let mut cards = Vec::with_capacity(values.len());
        for (idx, value) in values.into_iter().enumerate() {
            let card: CardRecord = serde_json::from_value(value).with_context(|| {
                format!("track {idx} needs string artist, songName, releaseYear and url fields")
            })?;
            cards.push(card.normalize());
        }
        Ok(Self::from_cards(title, cards))
    }

    pub fn import_json(path: &Path, title: Option<String>) -> Result<Self> {
        let input = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_json_str(title, &input)
            .with_context(|| format!("failed to import tracks from {}", path.display()))
    }

    pub fn append_card(&mut self, card: CardRecord) {
        self.cards.push(card.normalize());
    }

    pub fn insert_card(&mut self, index: usize, card: CardRecord) -> Result<()> {
        if index > self.cards.len() {
            return Err(anyhow!(
                "card index {} out of range 0..={}",
                index,
                self.cards.len()
            ));
        }
        self.cards.insert(index, card.normalize());
        Ok(())
    }

    /// Remove the card at the specified zero-based index.
    pub fn remove_card(&mut self, index: usize) -> Result<CardRecord> {
        if index >= self.cards.len() {
            return Err(anyhow!(
                "card index {} out of range 0..{}",
                index,
                self.cards.len()
            ));
        }
        Ok(self.cards.remove(index))
    }

    /// Compute a SHA-256 hash representing deck contents.
    pub fn hash(&self) -> Result<String> {
        let mut hasher = Sha256::new();
        let mut buffer = Vec::new();
        serde_json::to_writer(&mut buffer, &DeckLine::Header(self.header.clone()))
            .context("failed to hash deck header")?;
        hasher.update(&buffer);
        buffer.clear();
        for card in &self.cards {
            serde_json::to_writer(&mut buffer, &DeckLine::Card(card.clone()))?;
            hasher.update(&buffer);
            buffer.clear();
        }
        let digest = hasher.finalize();
        Ok(format!("{digest:02x}"))
    }

    /// Indices and reasons for every card that cannot be printed.
    pub fn invalid_cards(&self) -> Vec<(usize, String)> {
        self.cards
            .iter()
            .enumerate()
            .filter_map(|(idx, card)| card.validate().err().map(|reason| (idx, reason)))
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum DeckLine {
    Header(DeckHeader),
    Card(CardRecord),
}
