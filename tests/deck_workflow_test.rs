use pretty_assertions::assert_eq;
use qrdeck::{Deck, Face, LayoutPlan, SheetConfig, UNKNOWN_YEAR, generate_pdf};
use tempfile::TempDir;

#[tokio::test]
async fn import_save_load_and_render() {
    let temp_dir = TempDir::new().unwrap();
    let json_path = temp_dir.path().join("tracks.json");
    let deck_path = temp_dir.path().join("mix.deck");
    let tracks: Vec<serde_json::Value> = (1..=15)
        .map(|n| {
            let year = if n == 3 { String::new() } else { (1960 + n).to_string() };
            serde_json::json!({
                "number": n.to_string(),
                "artist": format!("Artist {n}"),
                "songName": format!("Song {n}"),
                "releaseYear": year,
                "url": format!("https://open.spotify.com/track/{n:04}"),
            })
        })
        .collect();
    std::fs::write(&json_path, serde_json::to_string(&tracks).unwrap()).unwrap();

    let mut deck = Deck::import_json(&json_path, Some("Road trip".into())).unwrap();
    assert_eq!(deck.cards[2].release_year, UNKNOWN_YEAR);
    deck.save(&deck_path).unwrap();

    let loaded = Deck::load(&deck_path).unwrap();
    assert_eq!(loaded.cards.len(), 15);
    assert_eq!(loaded.cards[14].url, "https://open.spotify.com/track/0015");

    let config = SheetConfig::from_toml_str(
        r#"
        [grid]
        padding_mm = 20.0
        card_width_mm = 56.0
        card_height_mm = 56.0
        "#,
    )
    .unwrap();
    let doc = generate_pdf(&loaded.cards, &config).await.unwrap();
    assert_eq!(doc.page_count, 4);

    // 20mm + 3 x 56mm leaves 22mm on the right; backs still land behind fronts.
    let plan = LayoutPlan::build(loaded.cards.len(), &config.grid);
    for index in 0..loaded.cards.len() {
        let front = plan.find(Face::Front, index).unwrap().rect;
        let back = plan.find(Face::Back, index).unwrap().rect;
        let flipped = back.flipped(config.grid.page_width_mm);
        assert!((flipped.x - front.x).abs() < 1e-3, "card {index}");
        assert_eq!(flipped.y, front.y);
    }
}

#[test]
fn config_file_round_trips_through_disk() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("sheet.toml");
    std::fs::write(&path, "[back]\ncode_size_mm = 36.0\n").unwrap();
    let config = SheetConfig::load(&path).unwrap();
    assert_eq!(config.back.code_size_mm, 36.0);

    std::fs::write(&path, "[back]\ncode_size_mm = 90.0\n").unwrap();
    assert!(SheetConfig::load(&path).is_err());
}
