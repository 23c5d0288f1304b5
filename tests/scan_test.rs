use image::{GrayImage, RgbaImage};
use pretty_assertions::assert_eq;
use qrdeck::{
    CardRecord, EncodeOptions, Face, LayoutPlan, Rect, SheetConfig, encode_qr, generate_png,
};

fn decode(width: u32, height: u32, luma: impl Fn(u32, u32) -> u8) -> Vec<String> {
    let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
        width as usize,
        height as usize,
        |x, y| luma(x as u32, y as u32),
    );
    prepared
        .detect_grids()
        .into_iter()
        .map(|grid| grid.decode().expect("grid decodes").1)
        .collect()
}

fn decode_gray(image: &GrayImage) -> Vec<String> {
    decode(image.width(), image.height(), |x, y| image.get_pixel(x, y).0[0])
}

fn decode_region(page: &RgbaImage, (x0, y0, w, h): (u32, u32, u32, u32)) -> Vec<String> {
    decode(w, h, |x, y| page.get_pixel(x0 + x, y0 + y).0[0])
}

#[test]
fn encoded_image_scans_back_to_url() {
    let url = "https://open.spotify.com/track/abc123";
    let image = encode_qr(url, &EncodeOptions::default()).unwrap();
    assert_eq!(decode_gray(&image), vec![url.to_string()]);
}

#[tokio::test]
async fn back_page_scans_to_each_card_url() {
    let deck = vec![
        CardRecord::new(
            "https://open.spotify.com/track/abc123",
            "Yesterday",
            "The Beatles",
            "1965",
        ),
        CardRecord::new(
            "https://open.spotify.com/track/def456",
            "Feeling Good",
            "Nina Simone",
            "1965",
        ),
    ];
    let config = SheetConfig::default();
    let doc = generate_png(&deck, &config, 200).await.unwrap();
    assert_eq!(doc.pages.len(), 2);

    let plan = LayoutPlan::build(deck.len(), &config.grid);
    for (index, card) in deck.iter().enumerate() {
        let cell = plan.find(Face::Back, index).unwrap();
        let code = cell.rect.centered_square(config.back.code_size_mm);
        // Leave a few millimetres of white around the code, clear of the cut marks.
        let window = Rect::new(code.x - 4.0, code.y - 4.0, code.width + 8.0, code.height + 8.0);
        let found = decode_region(&doc.pages[1], doc.pixel_rect(window));
        assert_eq!(found, vec![card.url.clone()], "card {index}");
    }
}
