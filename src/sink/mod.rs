//! Page-based drawing surfaces the sheet renderer drives.
//!
//! A sink receives pages and primitives strictly in order. Coordinates are
//! millimetres from the top-left page corner; text is horizontally centered
//! on its anchor with the baseline at the anchor's `y`.

mod pdf;
mod raster;

pub use pdf::{PdfSink, RenderedDocument};
pub use raster::{RasterDocument, RasterSink};

use image::GrayImage;

use crate::error::SinkError;
use crate::layout::{Point, Rect};
use crate::text::TextStyle;

/// Drawing surface for a multi-page document.
pub trait DocumentSink {
    /// Finished document handed back to the caller.
    type Output;

    /// Open a new page; all following draws land on it.
    fn start_page(&mut self) -> Result<(), SinkError>;

    fn draw_line(&mut self, from: Point, to: Point, width_pt: f32) -> Result<(), SinkError>;

    fn draw_text(&mut self, text: &str, anchor: Point, style: TextStyle) -> Result<(), SinkError>;

    /// Scale `image` into `rect`.
    fn draw_image(&mut self, image: &GrayImage, rect: Rect) -> Result<(), SinkError>;

    fn finish(self) -> Result<Self::Output, SinkError>;
}
