use super::*;
use crate::model::ModelId;
use crate::render::HeadlessDisplay;
use crate::render::content::Tone;

fn history(count: i64) -> HistorySnapshot {
    let entries = (0..count)
        .rev()
        .map(|ts| HistoryEntry {
            country: format!("C{ts}"),
            year: 2030,
            models: vec![ModelId::Ridge],
            predicted: 10.0,
            change: 1.5,
            ts,
        })
        .collect::<Vec<_>>();
    HistorySnapshot::from(entries)
}

#[test]
fn shows_at_most_six_newest() {
    let display = Arc::new(HeadlessDisplay::new());
    let mut renderer = CarouselRenderer::new(display.clone());
    renderer.render(&history(9));

    let Some(SurfaceContent::Cards(cards)) = display.content(SurfaceId::Carousel) else {
        panic!("carousel should show cards");
    };
    assert_eq!(cards.len(), CAROUSEL_LIMIT);
    assert_eq!(cards[0].title, "C8 2030");
    assert_eq!(cards[0].detail.as_deref(), Some("+1.5%"));
    assert_eq!(cards[0].tone, Tone::Up);
    assert_eq!(renderer.key_at(0), Some(EntryKey(8)));
    assert_eq!(renderer.key_at(CAROUSEL_LIMIT), None);
}

#[test]
fn empty_history_shows_placeholder() {
    let display = Arc::new(HeadlessDisplay::new());
    let mut renderer = CarouselRenderer::new(display.clone());
    renderer.render(&history(2));
    renderer.render(&HistorySnapshot::empty());
    assert!(!renderer.is_live());
    assert_eq!(display.total_live(), 0);
}
