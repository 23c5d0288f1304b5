//! Card face renderers.
//!
//! The front face shows artist, release year and song title stacked around
//! the cell center. The back face carries the encoded track URL centered in
//! a square inset.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::deck::CardRecord;
use crate::encoder::{CodeEncoder, EncodeOptions};
use crate::error::{GenerateError, SinkError};
use crate::layout::{Point, Rect};
use crate::sink::DocumentSink;
use crate::text::{TextStyle, fit_size, wrap_text};

/// Typography of the front face.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontStyle {
    /// Horizontal space taken off the cell width before wrapping.
    pub text_inset_mm: f32,
    pub title_size_pt: f32,
    pub year_size_pt: f32,
    /// Artist baseline distance above the cell center.
    pub artist_offset_mm: f32,
    /// Year baseline distance below the cell center.
    pub year_offset_mm: f32,
    /// Song title baseline distance below the cell center.
    pub song_offset_mm: f32,
}

impl Default for FrontStyle {
    fn default() -> Self {
        Self {
            text_inset_mm: 10.0,
            title_size_pt: 14.0,
            year_size_pt: 42.0,
            artist_offset_mm: 15.0,
            year_offset_mm: 5.0,
            song_offset_mm: 20.0,
        }
    }
}

/// Layout of the back face.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackStyle {
    /// Side of the square the code is scaled into.
    pub code_size_mm: f32,
}

impl Default for BackStyle {
    fn default() -> Self {
        Self { code_size_mm: 40.0 }
    }
}

/// A positioned line of text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub anchor: Point,
    pub style: TextStyle,
}

/// Lays out and draws the text side of a card.
#[derive(Debug, Clone, Copy)]
pub struct FrontFaceRenderer<'a> {
    style: &'a FrontStyle,
}

impl<'a> FrontFaceRenderer<'a> {
    pub fn new(style: &'a FrontStyle) -> Self {
        Self { style }
    }

    /// Text runs for `card` placed in `cell`, artist first.
    pub fn layout(&self, card: &CardRecord, cell: Rect) -> Vec<TextRun> {
        let style = self.style;
        let center = cell.center();
        let wrap_width = cell.width - style.text_inset_mm;
        let title = TextStyle::regular(style.title_size_pt);
        let line_height = title.line_height_mm();
        let mut runs = Vec::new();

        // Artist lines grow upward so the block never reaches the year.
        let artist = wrap_text(&card.artist, wrap_width, title);
        let last = artist.len().saturating_sub(1);
        for (i, line) in artist.into_iter().enumerate() {
            let y = center.y - style.artist_offset_mm - (last - i) as f32 * line_height;
            runs.push(TextRun {
                text: line,
                anchor: Point::new(center.x, y),
                style: title,
            });
        }

        let year = TextStyle::bold(style.year_size_pt);
        let year = TextStyle::bold(fit_size(&card.release_year, wrap_width, year));
        runs.push(TextRun {
            text: card.release_year.clone(),
            anchor: Point::new(center.x, center.y + style.year_offset_mm),
            style: year,
        });

        for (i, line) in wrap_text(&card.song_name, wrap_width, title).into_iter().enumerate() {
            runs.push(TextRun {
                text: line,
                anchor: Point::new(center.x, center.y + style.song_offset_mm + i as f32 * line_height),
                style: title,
            });
        }
        runs
    }

    pub fn render<S: DocumentSink>(
        &self,
        sink: &mut S,
        card: &CardRecord,
        cell: Rect,
    ) -> Result<(), SinkError> {
        for run in self.layout(card, cell) {
            sink.draw_text(&run.text, run.anchor, run.style)?;
        }
        Ok(())
    }
}

/// Encodes a card URL and draws it on the back face.
pub struct BackFaceRenderer<'a, E: ?Sized> {
    encoder: &'a E,
    options: &'a EncodeOptions,
    style: &'a BackStyle,
}

impl<'a, E: CodeEncoder + ?Sized> BackFaceRenderer<'a, E> {
    pub fn new(encoder: &'a E, options: &'a EncodeOptions, style: &'a BackStyle) -> Self {
        Self {
            encoder,
            options,
            style,
        }
    }

    /// Square the code occupies inside `cell`.
    pub fn code_rect(&self, cell: Rect) -> Rect {
        cell.centered_square(self.style.code_size_mm)
    }

    /// Encode `card.url` and draw it into its inset; `index` is the deck index
    /// reported on failure.
    pub async fn render<S: DocumentSink>(
        &self,
        sink: &mut S,
        card: &CardRecord,
        index: usize,
        cell: Rect,
    ) -> Result<(), GenerateError> {
        let image = self
            .encoder
            .encode(&card.url, self.options)
            .await
            .map_err(|source| GenerateError::Encode { index, source })?;
        debug!(index, url = %card.url, px = image.width(), "encoded card code");
        sink.draw_image(&image, self.code_rect(cell))?;
        Ok(())
    }
}
