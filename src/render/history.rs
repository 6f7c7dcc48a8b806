//! History table: every stored prediction, most recent first.
//!
//! Rows carry the entry's [`EntryKey`], and the renderer remembers the keys
//! it last drew so a row position clicked in the UI resolves to the entry
//! that was actually on screen.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

use std::sync::Arc;

use super::content::{TableRow, TableView};
use super::format::{general, signed_percent, timestamp};
use super::{RenderHost, SurfaceContent, SurfaceId, SurfaceSlot, ViewRenderer};
use crate::model::{EntryKey, HistoryEntry, HistorySnapshot};

pub const EMPTY_HISTORY: &str = "No predictions yet";

const COLUMNS: [&str; 7] = ["#", "Country", "Year", "Models", "Predicted", "Change", "Time"];

pub struct HistoryTableRenderer {
    slot: SurfaceSlot,
    rendered: Vec<EntryKey>,
}

impl HistoryTableRenderer {
    pub fn new(host: Arc<dyn RenderHost>) -> Self {
        Self { slot: SurfaceSlot::new(host, SurfaceId::HistoryTable), rendered: Vec::new() }
    }

    /// Key of the row drawn at `position`, if any.
    #[must_use]
    pub fn key_at(&self, position: usize) -> Option<EntryKey> {
        self.rendered.get(position).copied()
    }
}

/// Cells of one history row; `position` is zero-based.
#[must_use]
pub fn history_row(position: usize, entry: &HistoryEntry) -> TableRow {
    let models = entry.models.iter().map(|m| m.label()).collect::<Vec<_>>().join(", ");
    TableRow {
        key: Some(entry.key()),
        cells: vec![
            (position + 1).to_string(),
            entry.country.clone(),
            entry.year.to_string(),
            models,
            general(entry.predicted),
            signed_percent(entry.change),
            timestamp(entry.ts),
        ],
    }
}

impl ViewRenderer for HistoryTableRenderer {
    type Payload = HistorySnapshot;

    fn render(&mut self, snapshot: &HistorySnapshot) {
        if snapshot.is_empty() {
            self.clear();
            return;
        }
        let rows: Vec<TableRow> = snapshot.iter().enumerate().map(|(i, entry)| history_row(i, entry)).collect();
        self.rendered = snapshot.iter().map(HistoryEntry::key).collect();
        self.slot.replace(SurfaceContent::Table(TableView {
            columns: COLUMNS.iter().map(|c| (*c).to_owned()).collect(),
            rows,
        }));
    }

    fn clear(&mut self) {
        self.rendered.clear();
        self.slot.clear(EMPTY_HISTORY);
    }

    fn surface(&self) -> SurfaceId {
        self.slot.surface()
    }

    fn is_live(&self) -> bool {
        self.slot.is_live()
    }
}
