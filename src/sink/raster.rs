//! Raster preview of sheets, one RGBA image per page.

use std::fs;
use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, ImageBuffer, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect as PixelRect;
use tracing::debug;

use crate::error::SinkError;
use crate::layout::{Point, Rect};
use crate::sink::DocumentSink;
use crate::text::{FontWeight, TextStyle, fold_accent, text_width_mm};

const GLYPH_WIDTH: usize = 5;
const GLYPH_HEIGHT: usize = 7;
const MM_PER_INCH: f32 = 25.4;
// Cap height as a fraction of the font size.
const CAP_HEIGHT: f32 = 0.7;

/// Pages rendered by a [`RasterSink`].
#[derive(Debug, Clone)]
pub struct RasterDocument {
    pub dpi: u32,
    pub pages: Vec<RgbaImage>,
}

impl RasterDocument {
    /// Write `page_0001.png`, `page_0002.png`, ... into `dir`.
    pub fn save_pngs(&self, dir: &Path) -> Result<Vec<PathBuf>, SinkError> {
        fs::create_dir_all(dir)?;
        let mut written = Vec::with_capacity(self.pages.len());
        for (idx, page) in self.pages.iter().enumerate() {
            let path = dir.join(format!("page_{:04}.png", idx + 1));
            DynamicImage::ImageRgba8(page.clone()).save(&path)?;
            written.push(path);
        }
        Ok(written)
    }

    /// Pixel region covering `rect` on a page at this document's DPI.
    pub fn pixel_rect(&self, rect: Rect) -> (u32, u32, u32, u32) {
        (
            mm_to_px(rect.x, self.dpi),
            mm_to_px(rect.y, self.dpi),
            mm_to_px(rect.width, self.dpi),
            mm_to_px(rect.height, self.dpi),
        )
    }
}

/// Renders sheets to bitmaps with a built-in 5x7 font.
///
/// Glyphs are scaled to the font's cap height, then shrunk if needed so a
/// line never runs wider than its measured Helvetica width. Accented letters
/// draw as their base letter; characters without a glyph draw as a box.
pub struct RasterSink {
    dpi: u32,
    width_px: u32,
    height_px: u32,
    paper: Rgba<u8>,
    ink: Rgba<u8>,
    pages: Vec<RgbaImage>,
}

impl RasterSink {
    pub fn new(page_width_mm: f32, page_height_mm: f32, dpi: u32) -> Self {
        let dpi = dpi.clamp(72, 1200);
        Self {
            dpi,
            width_px: mm_to_px(page_width_mm, dpi),
            height_px: mm_to_px(page_height_mm, dpi),
            paper: rgba(0xff, 0xff, 0xff, 0xff),
            ink: rgba(0x00, 0x00, 0x00, 0xff),
            pages: Vec::new(),
        }
    }

    fn page(&mut self) -> Result<&mut RgbaImage, SinkError> {
        self.pages.last_mut().ok_or(SinkError::NoOpenPage)
    }

    fn px(&self, mm: f32) -> f32 {
        mm / MM_PER_INCH * self.dpi as f32
    }
}

fn mm_to_px(mm: f32, dpi: u32) -> u32 {
    (mm / MM_PER_INCH * dpi as f32).round().max(0.0) as u32
}

fn rgba(r: u8, g: u8, b: u8, a: u8) -> Rgba<u8> {
    Rgba([r, g, b, a])
}

impl DocumentSink for RasterSink {
    type Output = RasterDocument;

    fn start_page(&mut self) -> Result<(), SinkError> {
        self.pages
            .push(ImageBuffer::from_pixel(self.width_px, self.height_px, self.paper));
        debug!(page = self.pages.len(), dpi = self.dpi, "started raster page");
        Ok(())
    }

    fn draw_line(&mut self, from: Point, to: Point, width_pt: f32) -> Result<(), SinkError> {
        let thickness = (width_pt / 72.0 * self.dpi as f32).round().max(1.0) as i32;
        let (x0, y0, x1, y1) = (self.px(from.x), self.px(from.y), self.px(to.x), self.px(to.y));
        let horizontal = (x1 - x0).abs() >= (y1 - y0).abs();
        let ink = self.ink;
        let page = self.page()?;
        // Thick strokes are parallel one-pixel lines offset across the stroke.
        for step in 0..thickness {
            let offset = (step - thickness / 2) as f32;
            let (dx, dy) = if horizontal { (0.0, offset) } else { (offset, 0.0) };
            draw_line_segment_mut(page, (x0 + dx, y0 + dy), (x1 + dx, y1 + dy), ink);
        }
        Ok(())
    }

    fn draw_text(&mut self, text: &str, anchor: Point, style: TextStyle) -> Result<(), SinkError> {
        let count = text.chars().count() as u32;
        if count == 0 {
            return Ok(());
        }
        let size_px = style.size_pt / 72.0 * self.dpi as f32;
        let cap_scale = ((size_px * CAP_HEIGHT) / GLYPH_HEIGHT as f32).round();
        let cells = (count * (GLYPH_WIDTH as u32 + 1) - 1) as f32;
        let fit_scale = (self.px(text_width_mm(text, style)) / cells).floor();
        let scale = cap_scale.min(fit_scale).max(1.0) as u32;
        let advance = (GLYPH_WIDTH as u32 + 1) * scale;
        let total = (count * advance).saturating_sub(scale) as f32;
        let mut x = (self.px(anchor.x) - total / 2.0).round() as i32;
        let top = self.px(anchor.y).round() as i32 - (GLYPH_HEIGHT as u32 * scale) as i32;
        let ink = self.ink;
        let page = self.page()?;
        for ch in text.chars() {
            draw_glyph(page, x, top, ch, ink, scale);
            // Bold is faked by overprinting one pixel to the right.
            if style.weight == FontWeight::Bold {
                draw_glyph(page, x + 1, top, ch, ink, scale);
            }
            x += advance as i32;
        }
        Ok(())
    }

    fn draw_image(&mut self, image: &GrayImage, rect: Rect) -> Result<(), SinkError> {
        let dpi = self.dpi;
        let width = mm_to_px(rect.width, dpi).max(1);
        let height = mm_to_px(rect.height, dpi).max(1);
        let scaled = imageops::resize(image, width, height, FilterType::Nearest);
        let scaled = DynamicImage::ImageLuma8(scaled).to_rgba8();
        let (x, y) = (mm_to_px(rect.x, dpi), mm_to_px(rect.y, dpi));
        let page = self.page()?;
        imageops::overlay(page, &scaled, x as i64, y as i64);
        Ok(())
    }

    fn finish(self) -> Result<RasterDocument, SinkError> {
        Ok(RasterDocument {
            dpi: self.dpi,
            pages: self.pages,
        })
    }
}

fn draw_glyph(
    image: &mut RgbaImage,
    x: i32,
    y: i32,
    ch: char,
    color: Rgba<u8>,
    scale: u32,
) {
    let pattern = glyph_pattern(ch);
    for (row, bits) in pattern.iter().enumerate() {
        for col in 0..GLYPH_WIDTH {
            if bits & (1 << (GLYPH_WIDTH - 1 - col)) != 0 {
                let px = x + (col as i32 * scale as i32);
                let py = y + (row as i32 * scale as i32);
                draw_filled_rect_mut(image, PixelRect::at(px, py).of_size(scale, scale), color);
            }
        }
    }
}

const MISSING_GLYPH: [u8; GLYPH_HEIGHT] = [0b11111, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11111];

#[rustfmt::skip]
fn glyph_pattern(ch: char) -> [u8; GLYPH_HEIGHT] {
    match fold_accent(ch) {
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00110, 0b01000, 0b10000, 0b11111],
        '3' => [0b11110, 0b00001, 0b00001, 0b01110, 0b00001, 0b00001, 0b11110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'B' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110],
        'C' => [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
        'D' => [0b11110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11110],
        'E' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
        'F' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000],
        'G' => [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01110],
        'H' => [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'I' => [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        'J' => [0b00111, 0b00010, 0b00010, 0b00010, 0b10010, 0b10010, 0b01100],
        'K' => [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
        'L' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'M' => [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
        'N' => [0b10001, 0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001],
        'O' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'P' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
        'Q' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101],
        'R' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        'S' => [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110],
        'T' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        'U' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'V' => [0b10001, 0b10001, 0b10001, 0b01010, 0b01010, 0b00100, 0b00100],
        'W' => [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b10101, 0b01010],
        'X' => [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001],
        'Y' => [0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100],
        'Z' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111],
        'a' => [0b00000, 0b00000, 0b01110, 0b00001, 0b01111, 0b10001, 0b01111],
        'b' => [0b10000, 0b10000, 0b10110, 0b11001, 0b10001, 0b10001, 0b11110],
        'c' => [0b00000, 0b00000, 0b01110, 0b10000, 0b10000, 0b10001, 0b01110],
        'd' => [0b00001, 0b00001, 0b01101, 0b10011, 0b10001, 0b10001, 0b01111],
        'e' => [0b00000, 0b00000, 0b01110, 0b10001, 0b11111, 0b10000, 0b01110],
        'f' => [0b00110, 0b01001, 0b01000, 0b11100, 0b01000, 0b01000, 0b01000],
        'g' => [0b00000, 0b01111, 0b10001, 0b10001, 0b01111, 0b00001, 0b01110],
        'h' => [0b10000, 0b10000, 0b10110, 0b11001, 0b10001, 0b10001, 0b10001],
        'i' => [0b00100, 0b00000, 0b01100, 0b00100, 0b00100, 0b00100, 0b01110],
        'j' => [0b00010, 0b00000, 0b00110, 0b00010, 0b00010, 0b10010, 0b01100],
        'k' => [0b10000, 0b10000, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010],
        'l' => [0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        'm' => [0b00000, 0b00000, 0b11010, 0b10101, 0b10101, 0b10001, 0b10001],
        'n' => [0b00000, 0b00000, 0b10110, 0b11001, 0b10001, 0b10001, 0b10001],
        'o' => [0b00000, 0b00000, 0b01110, 0b10001, 0b10001, 0b10001, 0b01110],
        'p' => [0b00000, 0b00000, 0b11110, 0b10001, 0b11110, 0b10000, 0b10000],
        'q' => [0b00000, 0b00000, 0b01101, 0b10011, 0b01111, 0b00001, 0b00001],
        'r' => [0b00000, 0b00000, 0b10110, 0b11001, 0b10000, 0b10000, 0b10000],
        's' => [0b00000, 0b00000, 0b01110, 0b10000, 0b01110, 0b00001, 0b11110],
        't' => [0b01000, 0b01000, 0b11100, 0b01000, 0b01000, 0b01001, 0b00110],
        'u' => [0b00000, 0b00000, 0b10001, 0b10001, 0b10001, 0b10011, 0b01101],
        'v' => [0b00000, 0b00000, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100],
        'w' => [0b00000, 0b00000, 0b10001, 0b10001, 0b10101, 0b10101, 0b01010],
        'x' => [0b00000, 0b00000, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001],
        'y' => [0b00000, 0b00000, 0b10001, 0b10001, 0b01111, 0b00001, 0b01110],
        'z' => [0b00000, 0b00000, 0b11111, 0b00010, 0b00100, 0b01000, 0b11111],
        '-' => [0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000],
        '&' => [0b01100, 0b10010, 0b10100, 0b01000, 0b10101, 0b10010, 0b01101],
        '/' => [0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b10000, 0b00000],
        ':' => [0b00000, 0b00100, 0b00000, 0b00000, 0b00100, 0b00000, 0b00000],
        '#' => [0b01010, 0b11111, 0b01010, 0b01010, 0b11111, 0b01010, 0b01010],
        '@' => [0b01110, 0b10001, 0b10111, 0b10101, 0b10111, 0b10000, 0b01110],
        '\'' | '‘' | '’' => [0b00100, 0b00100, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000],
        '=' => [0b00000, 0b11111, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000],
        '"' | '“' | '”' => [0b01010, 0b01010, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000],
        '.' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00110, 0b00110],
        ',' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00110, 0b00100, 0b01000],
        '<' => [0b00010, 0b00100, 0b01000, 0b10000, 0b01000, 0b00100, 0b00010],
        '>' => [0b01000, 0b00100, 0b00010, 0b00001, 0b00010, 0b00100, 0b01000],
        '(' | '[' => [0b00010, 0b00100, 0b01000, 0b01000, 0b01000, 0b00100, 0b00010],
        ')' | ']' => [0b01000, 0b00100, 0b00010, 0b00010, 0b00010, 0b00100, 0b01000],
        '+' => [0b00100, 0b00100, 0b11111, 0b00100, 0b00100, 0b00000, 0b00000],
        '!' => [0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00000, 0b00100],
        '$' => [0b00100, 0b01111, 0b10100, 0b01110, 0b00101, 0b11110, 0b00100],
        '%' => [0b11001, 0b11010, 0b00100, 0b01000, 0b10110, 0b00110, 0b00000],
        '_' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b11111, 0b00000],
        '|' => [0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        ';' => [0b00000, 0b00100, 0b00000, 0b00000, 0b00110, 0b00100, 0b01000],
        '*' => [0b00100, 0b10101, 0b01110, 0b10101, 0b00100, 0b00000, 0b00000],
        '?' => [0b01110, 0b10001, 0b00010, 0b00100, 0b00100, 0b00000, 0b00100],
        '–' | '—' => [0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000],
        ch if ch.is_whitespace() => [0; GLYPH_HEIGHT],
        _ => MISSING_GLYPH,
    }
}
