use std::io::BufWriter;
use std::path::Path;

use image::GrayImage;
use printpdf::{
    BuiltinFont, Color, ColorBits, ColorSpace, Image, ImageTransform, ImageXObject,
    IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
    Point as PdfPoint, Px, Rgb,
};
use tracing::debug;

use crate::error::SinkError;
use crate::layout::{Point, Rect};
use crate::sink::DocumentSink;
use crate::text::{FontWeight, TextStyle, text_width_mm};

const LAYER_NAME: &str = "Cards";

/// Finished PDF returned by [`PdfSink::finish`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub page_count: usize,
    /// Empty when no page was ever started.
    pub bytes: Vec<u8>,
}

impl RenderedDocument {
    pub fn is_empty(&self) -> bool {
        self.page_count == 0
    }

    pub fn save(&self, path: &Path) -> Result<(), SinkError> {
        std::fs::write(path, &self.bytes)?;
        Ok(())
    }
}

struct OpenDocument {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

/// Writes sheets into a PDF using the built-in Helvetica faces.
///
/// The document is created lazily by the first [`start_page`](DocumentSink::start_page),
/// so a sink that never starts a page produces no document at all.
pub struct PdfSink {
    title: String,
    page_width_mm: f32,
    page_height_mm: f32,
    open: Option<OpenDocument>,
    page_count: usize,
}

impl PdfSink {
    pub fn new<S: Into<String>>(title: S, page_width_mm: f32, page_height_mm: f32) -> Self {
        Self {
            title: title.into(),
            page_width_mm,
            page_height_mm,
            open: None,
            page_count: 0,
        }
    }

    fn current(&self) -> Result<&OpenDocument, SinkError> {
        self.open.as_ref().ok_or(SinkError::NoOpenPage)
    }

    // PDF space grows upward from the bottom-left corner.
    fn pdf_point(&self, p: Point) -> PdfPoint {
        PdfPoint::new(Mm(p.x), Mm(self.page_height_mm - p.y))
    }
}

fn pdf_error(err: impl std::fmt::Display) -> SinkError {
    SinkError::Pdf(err.to_string())
}

impl DocumentSink for PdfSink {
    type Output = RenderedDocument;

    fn start_page(&mut self) -> Result<(), SinkError> {
        let (width, height) = (Mm(self.page_width_mm), Mm(self.page_height_mm));
        match self.open.as_mut() {
            Some(open) => {
                let (page, layer) = open.doc.add_page(width, height, LAYER_NAME);
                open.layer = open.doc.get_page(page).get_layer(layer);
            }
            None => {
                let (doc, page, layer) = PdfDocument::new(&self.title, width, height, LAYER_NAME);
                let regular = doc
                    .add_builtin_font(BuiltinFont::Helvetica)
                    .map_err(pdf_error)?;
                let bold = doc
                    .add_builtin_font(BuiltinFont::HelveticaBold)
                    .map_err(pdf_error)?;
                let layer = doc.get_page(page).get_layer(layer);
                self.open = Some(OpenDocument {
                    doc,
                    layer,
                    regular,
                    bold,
                });
            }
        }
        self.page_count += 1;
        debug!(page = self.page_count, "started PDF page");
        Ok(())
    }

    fn draw_line(&mut self, from: Point, to: Point, width_pt: f32) -> Result<(), SinkError> {
        let points = vec![(self.pdf_point(from), false), (self.pdf_point(to), false)];
        let layer = &self.current()?.layer;
        layer.set_outline_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
        layer.set_outline_thickness(width_pt);
        layer.add_line(Line {
            points,
            is_closed: false,
        });
        Ok(())
    }

    fn draw_text(&mut self, text: &str, anchor: Point, style: TextStyle) -> Result<(), SinkError> {
        let left = anchor.x - text_width_mm(text, style) / 2.0;
        let baseline = self.page_height_mm - anchor.y;
        let open = self.current()?;
        let font = match style.weight {
            FontWeight::Regular => &open.regular,
            FontWeight::Bold => &open.bold,
        };
        open.layer
            .use_text(text, style.size_pt, Mm(left), Mm(baseline), font);
        Ok(())
    }

    fn draw_image(&mut self, image: &GrayImage, rect: Rect) -> Result<(), SinkError> {
        let bottom = self.page_height_mm - rect.bottom();
        let layer = self.current()?.layer.clone();
        let (width, height) = image.dimensions();
        let xobject = Image::from(ImageXObject {
            width: Px(width as usize),
            height: Px(height as usize),
            color_space: ColorSpace::Greyscale,
            bits_per_component: ColorBits::Bit8,
            interpolate: false,
            image_data: image.as_raw().clone(),
            image_filter: None,
            clipping_bbox: None,
            smask: None,
        });
        // At this DPI the image spans exactly rect.width millimetres.
        let dpi = width as f32 / (rect.width / 25.4);
        xobject.add_to_layer(
            layer,
            ImageTransform {
                translate_x: Some(Mm(rect.x)),
                translate_y: Some(Mm(bottom)),
                dpi: Some(dpi),
                ..Default::default()
            },
        );
        Ok(())
    }

    fn finish(self) -> Result<RenderedDocument, SinkError> {
        let Some(open) = self.open else {
            return Ok(RenderedDocument {
                page_count: 0,
                bytes: Vec::new(),
            });
        };
        let mut writer = BufWriter::new(Vec::new());
        open.doc.save(&mut writer).map_err(pdf_error)?;
        let bytes = writer
            .into_inner()
            .map_err(|err| SinkError::Io(err.into_error()))?;
        Ok(RenderedDocument {
            page_count: self.page_count,
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_pages_means_no_bytes() {
        let sink = PdfSink::new("empty", 210.0, 297.0);
        let doc = sink.finish().unwrap();
        assert!(doc.is_empty());
        assert!(doc.bytes.is_empty());
    }

    #[test]
    fn drawing_before_a_page_fails() {
        let mut sink = PdfSink::new("t", 210.0, 297.0);
        let err = sink
            .draw_line(Point::new(0.0, 0.0), Point::new(1.0, 1.0), 0.3)
            .unwrap_err();
        assert!(matches!(err, SinkError::NoOpenPage));
    }

    #[test]
    fn pages_are_counted_and_serialised() {
        let mut sink = PdfSink::new("t", 210.0, 297.0);
        sink.start_page().unwrap();
        sink.draw_text("1965", Point::new(105.0, 100.0), TextStyle::bold(42.0))
            .unwrap();
        sink.start_page().unwrap();
        let image = GrayImage::from_pixel(8, 8, image::Luma([0]));
        sink.draw_image(&image, Rect::new(10.0, 10.0, 40.0, 40.0))
            .unwrap();
        let doc = sink.finish().unwrap();
        assert_eq!(doc.page_count, 2);
        assert!(doc.bytes.starts_with(b"%PDF"));
    }
}
