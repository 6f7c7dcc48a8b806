//! Recent-predictions carousel: the newest entries as cards.

#[cfg(test)]
#[path = "carousel_test.rs"]
mod carousel_test;

use std::sync::Arc;

use super::content::StatCard;
use super::format::{general, signed_percent};
use super::summary::tone_of;
use super::{RenderHost, SurfaceContent, SurfaceId, SurfaceSlot, ViewRenderer};
use crate::model::{EntryKey, HistoryEntry, HistorySnapshot};

/// Most cards the carousel shows.
pub const CAROUSEL_LIMIT: usize = 6;

pub struct CarouselRenderer {
    slot: SurfaceSlot,
    rendered: Vec<EntryKey>,
}

impl CarouselRenderer {
    pub fn new(host: Arc<dyn RenderHost>) -> Self {
        Self { slot: SurfaceSlot::new(host, SurfaceId::Carousel), rendered: Vec::new() }
    }

    /// Key of the card drawn at `position`, if any.
    #[must_use]
    pub fn key_at(&self, position: usize) -> Option<EntryKey> {
        self.rendered.get(position).copied()
    }
}

fn card(entry: &HistoryEntry) -> StatCard {
    StatCard::new(format!("{} {}", entry.country, entry.year), general(entry.predicted))
        .with_detail(signed_percent(entry.change))
        .with_tone(tone_of(entry.change))
        .with_key(entry.key())
}

impl ViewRenderer for CarouselRenderer {
    type Payload = HistorySnapshot;

    fn render(&mut self, snapshot: &HistorySnapshot) {
        let recent = snapshot.head(CAROUSEL_LIMIT);
        if recent.is_empty() {
            self.clear();
            return;
        }
        self.rendered = recent.iter().map(HistoryEntry::key).collect();
        self.slot.replace(SurfaceContent::Cards(recent.iter().map(card).collect()));
    }

    fn clear(&mut self) {
        self.rendered.clear();
        self.slot.clear("No recent predictions");
    }

    fn surface(&self) -> SurfaceId {
        self.slot.surface()
    }

    fn is_live(&self) -> bool {
        self.slot.is_live()
    }
}
