//! Core library for laying out music track decks as printable QR card sheets.
//!
//! Each sheet holds one page group of the deck: a front page with artist,
//! year and title per card, followed by a back page with each card's code
//! placed so that both faces line up after long-edge duplex printing.

mod config;
mod deck;
mod encoder;
mod error;
mod faces;
mod generate;
mod layout;
mod marks;
mod sink;
mod text;

pub use config::{DEFAULT_FILE_NAME, OutputConfig, SheetConfig};
pub use deck::{CardRecord, Deck, DeckHeader, UNKNOWN_YEAR, release_year_from_date};
pub use encoder::{CodeEncoder, EncodeOptions, ErrorTolerance, QrEncoder, encode_qr};
pub use error::{EncodeError, GenerateError, SinkError};
pub use faces::{BackFaceRenderer, BackStyle, FrontFaceRenderer, FrontStyle, TextRun};
pub use generate::{PageSequencer, generate};
pub use layout::{
    CARDS_PER_COLUMN, CARDS_PER_PAGE, CARDS_PER_ROW, Face, GridConfig, GridPosition, LayoutPlan,
    PagePlan, PlannedCell, Point, Rect, back_position, chunk, front_position, group_count, mirror,
};
pub use marks::{MarkStyle, draw_registration_marks, mark_centers, mark_segments};
pub use sink::{DocumentSink, PdfSink, RasterDocument, RasterSink, RenderedDocument};
pub use text::{FontWeight, TextStyle, text_width_mm, wrap_text};

/// Render `deck` to a PDF with the built-in QR encoder.
pub async fn generate_pdf(
    deck: &[CardRecord],
    config: &SheetConfig,
) -> Result<RenderedDocument, GenerateError> {
    let sink = PdfSink::new(
        config.output.title.clone(),
        config.grid.page_width_mm,
        config.grid.page_height_mm,
    );
    generate(deck, config, &QrEncoder::new(), sink).await
}

/// Render `deck` to one preview image per page with the built-in QR encoder.
pub async fn generate_png(
    deck: &[CardRecord],
    config: &SheetConfig,
    dpi: u32,
) -> Result<RasterDocument, GenerateError> {
    let sink = RasterSink::new(config.grid.page_width_mm, config.grid.page_height_mm, dpi);
    generate(deck, config, &QrEncoder::new(), sink).await
}
