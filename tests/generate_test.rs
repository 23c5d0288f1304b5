use std::sync::Mutex;

use async_trait::async_trait;
use image::{GrayImage, Luma};
use pretty_assertions::assert_eq;
use qrdeck::{
    CardRecord, CodeEncoder, DocumentSink, EncodeError, EncodeOptions, Face, GenerateError,
    GridPosition, LayoutPlan, Point, QrEncoder, Rect, SheetConfig, SinkError, TextStyle, generate,
    generate_pdf, mark_segments,
};

#[derive(Debug, Clone, PartialEq)]
enum Draw {
    Page,
    Line(Point, Point),
    Text(String, Point),
    Image(Rect),
}

#[derive(Default)]
struct RecordingSink {
    draws: Vec<Draw>,
    fail_images: bool,
}

impl DocumentSink for RecordingSink {
    type Output = Vec<Draw>;

    fn start_page(&mut self) -> Result<(), SinkError> {
        self.draws.push(Draw::Page);
        Ok(())
    }

    fn draw_line(&mut self, from: Point, to: Point, _width_pt: f32) -> Result<(), SinkError> {
        self.draws.push(Draw::Line(from, to));
        Ok(())
    }

    fn draw_text(&mut self, text: &str, anchor: Point, _style: TextStyle) -> Result<(), SinkError> {
        self.draws.push(Draw::Text(text.to_string(), anchor));
        Ok(())
    }

    fn draw_image(&mut self, _image: &GrayImage, rect: Rect) -> Result<(), SinkError> {
        if self.fail_images {
            return Err(SinkError::Io(std::io::Error::other("disk full")));
        }
        self.draws.push(Draw::Image(rect));
        Ok(())
    }

    fn finish(self) -> Result<Vec<Draw>, SinkError> {
        Ok(self.draws)
    }
}

/// Returns a blank tile and remembers the order of requests.
#[derive(Default)]
struct StubEncoder {
    seen: Mutex<Vec<String>>,
    fail_on: Option<String>,
}

#[async_trait]
impl CodeEncoder for StubEncoder {
    async fn encode(&self, url: &str, _options: &EncodeOptions) -> Result<GrayImage, EncodeError> {
        self.seen.lock().unwrap().push(url.to_string());
        if self.fail_on.as_deref() == Some(url) {
            return Err(EncodeError::Qr("payload rejected".to_string()));
        }
        Ok(GrayImage::from_pixel(8, 8, Luma([0])))
    }
}

fn track(n: usize) -> CardRecord {
    CardRecord::new(
        format!("https://open.spotify.com/track/t{n:03}"),
        format!("Song {n}"),
        format!("Artist {n}"),
        "1999",
    )
}

fn beatles() -> CardRecord {
    CardRecord::new(
        "https://open.spotify.com/track/abc123",
        "Yesterday",
        "The Beatles",
        "1965",
    )
}

fn pages(draws: &[Draw]) -> Vec<&[Draw]> {
    let mut out = Vec::new();
    let mut start = None;
    for (i, draw) in draws.iter().enumerate() {
        if *draw == Draw::Page {
            if let Some(s) = start {
                out.push(&draws[s..i]);
            }
            start = Some(i);
        }
    }
    if let Some(s) = start {
        out.push(&draws[s..]);
    }
    out
}

#[tokio::test]
async fn thirteen_cards_make_four_pages() {
    let deck: Vec<CardRecord> = (0..13).map(track).collect();
    let config = SheetConfig::default();
    let encoder = StubEncoder::default();
    let draws = generate(&deck, &config, &encoder, RecordingSink::default())
        .await
        .unwrap();

    let pages = pages(&draws);
    assert_eq!(pages.len(), 4);
    let images: Vec<usize> = pages
        .iter()
        .map(|p| p.iter().filter(|d| matches!(d, Draw::Image(_))).count())
        .collect();
    assert_eq!(images, vec![0, 12, 0, 1]);

    let seen = encoder.seen.lock().unwrap().clone();
    let expected: Vec<String> = deck.iter().map(|c| c.url.clone()).collect();
    assert_eq!(seen, expected);
}

#[tokio::test]
async fn registration_marks_match_on_both_faces() {
    let deck: Vec<CardRecord> = (0..5).map(track).collect();
    let config = SheetConfig::default();
    let draws = generate(&deck, &config, &StubEncoder::default(), RecordingSink::default())
        .await
        .unwrap();

    let lines = |page: &[Draw]| -> Vec<Draw> {
        page.iter()
            .filter(|d| matches!(d, Draw::Line(..)))
            .cloned()
            .collect()
    };
    let pages = pages(&draws);
    let front = lines(pages[0]);
    assert_eq!(front, lines(pages[1]));
    let expected: Vec<Draw> = mark_segments(&config.grid, Face::Front, &config.marks)
        .into_iter()
        .map(|(a, b)| Draw::Line(a, b))
        .collect();
    assert_eq!(front, expected);
}

type SegmentKey = (i64, i64, i64, i64);

/// Endpoint-order independent key for a segment, in micrometres.
fn segment_key(a: Point, b: Point) -> SegmentKey {
    let um = |v: f32| (v * 1000.0).round() as i64;
    let (a, b) = ((um(a.x), um(a.y)), (um(b.x), um(b.y)));
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    (lo.0, lo.1, hi.0, hi.1)
}

fn marks_on(page: &[Draw], flip_width: Option<f32>) -> Vec<SegmentKey> {
    let mut keys: Vec<SegmentKey> = page
        .iter()
        .filter_map(|d| match (d, flip_width) {
            (Draw::Line(a, b), None) => Some(segment_key(*a, *b)),
            (Draw::Line(a, b), Some(w)) => Some(segment_key(a.flipped(w), b.flipped(w))),
            _ => None,
        })
        .collect();
    keys.sort();
    keys
}

#[tokio::test]
async fn off_centre_grid_lines_up_after_duplex_flip() {
    let deck: Vec<CardRecord> = (0..12).map(track).collect();
    for (padding_mm, card_mm, code_mm) in [(5.0, 62.0, 40.0), (20.0, 56.0, 36.0), (0.0, 50.0, 30.0)] {
        let mut config = SheetConfig::default();
        config.grid.padding_mm = padding_mm;
        config.grid.card_width_mm = card_mm;
        config.grid.card_height_mm = card_mm;
        config.back.code_size_mm = code_mm;
        let page_width = config.grid.page_width_mm;

        let draws = generate(&deck, &config, &StubEncoder::default(), RecordingSink::default())
            .await
            .unwrap();
        let pages = pages(&draws);
        assert_eq!(pages.len(), 2);

        assert_eq!(
            marks_on(pages[1], Some(page_width)),
            marks_on(pages[0], None),
            "marks, padding {padding_mm}"
        );

        let plan = LayoutPlan::build(deck.len(), &config.grid);
        let images: Vec<Rect> = pages[1]
            .iter()
            .filter_map(|d| match d {
                Draw::Image(rect) => Some(*rect),
                _ => None,
            })
            .collect();
        for (index, image) in images.iter().enumerate() {
            let front = plan.find(Face::Front, index).unwrap().rect;
            let landed = image.flipped(page_width).center();
            let target = front.center();
            assert!(
                (landed.x - target.x).abs() < 1e-3 && (landed.y - target.y).abs() < 1e-3,
                "padding {padding_mm}, card {index}: code lands at {landed:?}, front centre {target:?}"
            );
        }
    }
}

#[tokio::test]
async fn single_card_scenario() {
    let config = SheetConfig::default();
    let draws = generate(&[beatles()], &config, &StubEncoder::default(), RecordingSink::default())
        .await
        .unwrap();
    let pages = pages(&draws);
    assert_eq!(pages.len(), 2);

    let texts: Vec<(String, Point)> = pages[0]
        .iter()
        .filter_map(|d| match d {
            Draw::Text(t, p) => Some((t.clone(), *p)),
            _ => None,
        })
        .collect();
    assert_eq!(
        texts,
        vec![
            ("The Beatles".to_string(), Point::new(43.0, 28.0)),
            ("1965".to_string(), Point::new(43.0, 48.0)),
            ("Yesterday".to_string(), Point::new(43.0, 63.0)),
        ]
    );

    let plan = LayoutPlan::build(1, &config.grid);
    let back = plan.find(Face::Back, 0).unwrap();
    assert_eq!(back.position, GridPosition { row: 0, col: 2 });
    let images: Vec<&Draw> = pages[1]
        .iter()
        .filter(|d| matches!(d, Draw::Image(_)))
        .collect();
    assert_eq!(images, vec![&Draw::Image(Rect::new(147.0, 23.0, 40.0, 40.0))]);
}

#[tokio::test]
async fn empty_deck_draws_nothing() {
    let draws = generate(&[], &SheetConfig::default(), &StubEncoder::default(), RecordingSink::default())
        .await
        .unwrap();
    assert!(draws.is_empty());

    let pdf = generate_pdf(&[], &SheetConfig::default()).await.unwrap();
    assert_eq!(pdf.page_count, 0);
    assert!(pdf.bytes.is_empty());
}

#[tokio::test]
async fn malformed_record_names_its_index() {
    let mut deck: Vec<CardRecord> = (0..4).map(track).collect();
    deck[2].url = String::new();
    let encoder = StubEncoder::default();
    let err = generate(&deck, &SheetConfig::default(), &encoder, RecordingSink::default())
        .await
        .unwrap_err();
    match err {
        GenerateError::MalformedRecord { index, .. } => assert_eq!(index, 2),
        other => panic!("unexpected error: {other}"),
    }
    // Checked before any card is encoded.
    assert!(encoder.seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn encoder_failure_aborts_generation() {
    let deck: Vec<CardRecord> = (0..14).map(track).collect();
    let encoder = StubEncoder {
        fail_on: Some(deck[12].url.clone()),
        ..StubEncoder::default()
    };
    let err = generate(&deck, &SheetConfig::default(), &encoder, RecordingSink::default())
        .await
        .unwrap_err();
    match err {
        GenerateError::Encode { index, .. } => assert_eq!(index, 12),
        other => panic!("unexpected error: {other}"),
    }
    // Fail fast: card 13 is never requested.
    assert_eq!(encoder.seen.lock().unwrap().len(), 13);
}

#[tokio::test]
async fn sink_failure_is_propagated() {
    let sink = RecordingSink {
        fail_images: true,
        ..RecordingSink::default()
    };
    let err = generate(&[beatles()], &SheetConfig::default(), &StubEncoder::default(), sink)
        .await
        .unwrap_err();
    assert!(matches!(err, GenerateError::Sink(SinkError::Io(_))));
}

#[tokio::test]
async fn invalid_layout_is_rejected_up_front() {
    let mut config = SheetConfig::default();
    config.grid.columns = 4;
    let err = generate(&[beatles()], &config, &StubEncoder::default(), RecordingSink::default())
        .await
        .unwrap_err();
    assert!(matches!(err, GenerateError::InvalidLayout(_)));
}

#[tokio::test]
async fn generation_is_deterministic() {
    let deck: Vec<CardRecord> = (0..20).map(track).collect();
    let config = SheetConfig::default();
    let first = generate(&deck, &config, &StubEncoder::default(), RecordingSink::default())
        .await
        .unwrap();
    let second = generate(&deck, &config, &StubEncoder::default(), RecordingSink::default())
        .await
        .unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn pdf_has_two_pages_per_sheet() {
    let deck: Vec<CardRecord> = (0..13).map(track).collect();
    let doc = generate_pdf(&deck, &SheetConfig::default()).await.unwrap();
    assert_eq!(doc.page_count, 4);
    assert!(doc.bytes.starts_with(b"%PDF"));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(qrdeck::DEFAULT_FILE_NAME);
    doc.save(&path).unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), doc.bytes);
}

#[tokio::test]
async fn qr_encoder_works_as_trait_object() {
    let encoder: Box<dyn CodeEncoder> = Box::new(QrEncoder::new());
    let draws = generate(&[beatles()], &SheetConfig::default(), encoder.as_ref(), RecordingSink::default())
        .await
        .unwrap();
    assert_eq!(draws.iter().filter(|d| matches!(d, Draw::Image(_))).count(), 1);
}
