//! Persistent history store: a durable, most-recent-first log of predictions.
//!
//! DESIGN
//! ======
//! The store keeps the session snapshot in memory and rewrites the whole
//! slot synchronously after every mutation. Reads never touch the slot after
//! `open`, so a failed write leaves the session consistent: the in-memory
//! mutation stands, only durability is lost. That loss is logged and exposed
//! through [`PersistentHistoryStore::durability`] rather than returned to the
//! caller.
//!
//! Absent or corrupt slot contents open as an empty history; a parse failure
//! never escapes `open`.
//!
//! Entry keys are the `ts` field. Data written elsewhere may repeat or
//! overflow it, so `open` clamps every `ts` into [`MAX_TS_MS`] range and
//! lowers repeats until keys strictly decrease from head to tail.

pub mod slot;

#[cfg(test)]
#[path = "mod_test.rs"]
mod mod_test;

use tracing::{debug, warn};

use crate::model::{EntryKey, HistoryEntry, HistorySnapshot};
pub use slot::{FileSlot, MemorySlot, PersistenceError, StorageSlot};

#[cfg(feature = "browser")]
pub use slot::LocalStorageSlot;

/// Name of the durable slot holding the serialized history.
pub const HISTORY_SLOT: &str = "hydrocast_history";

/// Largest accepted `ts`: 9999-12-31T23:59:59.999Z in epoch milliseconds.
pub const MAX_TS_MS: i64 = 253_402_300_799_999;

/// Whether the last persistence attempt reached durable storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Durability {
    Durable,
    /// The session holds changes the slot does not.
    Degraded(String),
}

pub struct PersistentHistoryStore {
    slot: Box<dyn StorageSlot>,
    snapshot: HistorySnapshot,
    durability: Durability,
}

impl PersistentHistoryStore {
    /// Open the store over `slot`, reading whatever it currently holds.
    pub fn open(slot: impl StorageSlot + 'static) -> Self {
        let snapshot = read_snapshot(&slot);
        debug!(entries = snapshot.len(), "history store opened");
        Self { slot: Box::new(slot), snapshot, durability: Durability::Durable }
    }

    /// The current snapshot. Cheap to clone; readers cannot mutate it.
    #[must_use]
    pub fn load(&self) -> HistorySnapshot {
        self.snapshot.clone()
    }

    /// Insert `entry` at the head and persist the full snapshot.
    pub fn add(&mut self, entry: HistoryEntry) {
        let mut entries = Vec::with_capacity(self.snapshot.len() + 1);
        entries.push(entry);
        entries.extend(self.snapshot.iter().cloned());
        self.replace(entries);
    }

    /// Erase every entry and persist the empty state.
    pub fn clear(&mut self) {
        self.replace(Vec::new());
    }

    /// Remove the entry identified by `key`. Returns it, or `None` if absent.
    pub fn delete(&mut self, key: EntryKey) -> Option<HistoryEntry> {
        let position = self.snapshot.position_of(key)?;
        let mut entries = self.snapshot.entries().to_vec();
        let removed = entries.remove(position);
        self.replace(entries);
        Some(removed)
    }

    /// Pretty-printed snapshot for download. Does not mutate state.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be encoded.
    pub fn export_snapshot(&self) -> Result<Vec<u8>, PersistenceError> {
        Ok(serde_json::to_vec_pretty(&self.snapshot)?)
    }

    /// A creation timestamp for a new entry: `now_ms`, bumped past every
    /// existing key so entry keys stay unique and increasing.
    #[must_use]
    pub fn stamp(&self, now_ms: i64) -> i64 {
        let now_ms = now_ms.clamp(-MAX_TS_MS, MAX_TS_MS);
        match self.snapshot.iter().map(|e| e.ts).max() {
            Some(latest) if latest >= now_ms => latest.saturating_add(1),
            _ => now_ms,
        }
    }

    #[must_use]
    pub fn durability(&self) -> &Durability {
        &self.durability
    }

    fn replace(&mut self, entries: Vec<HistoryEntry>) {
        self.snapshot = HistorySnapshot::from(entries);
        self.persist();
    }

    fn persist(&mut self) {
        let result = serde_json::to_string(&self.snapshot)
            .map_err(PersistenceError::from)
            .and_then(|encoded| self.slot.write(&encoded));
        match result {
            Ok(()) => self.durability = Durability::Durable,
            Err(e) => {
                warn!(error = %e, entries = self.snapshot.len(), "history persistence failed; keeping session copy");
                self.durability = Durability::Degraded(e.to_string());
            }
        }
    }
}

fn read_snapshot(slot: &dyn StorageSlot) -> HistorySnapshot {
    let raw = match slot.read() {
        Ok(Some(raw)) => raw,
        Ok(None) => return HistorySnapshot::empty(),
        Err(e) => {
            warn!(error = %e, "history slot unreadable; starting empty");
            return HistorySnapshot::empty();
        }
    };
    match serde_json::from_str::<Vec<HistoryEntry>>(&raw) {
        Ok(entries) => HistorySnapshot::from(unique_keys(entries)),
        Err(e) => {
            warn!(error = %e, "history slot corrupt; starting empty");
            HistorySnapshot::empty()
        }
    }
}

/// Clamp each `ts` into range and make keys strictly decrease from head to tail.
fn unique_keys(mut entries: Vec<HistoryEntry>) -> Vec<HistoryEntry> {
    let mut adjusted = 0usize;
    let mut newer: Option<i64> = None;
    for entry in &mut entries {
        let mut ts = entry.ts.clamp(-MAX_TS_MS, MAX_TS_MS);
        if let Some(newer) = newer {
            ts = ts.min(newer.saturating_sub(1));
        }
        if ts != entry.ts {
            entry.ts = ts;
            adjusted += 1;
        }
        newer = Some(ts);
    }
    if adjusted > 0 {
        warn!(adjusted, "history keys repeated or out of range; re-stamped");
    }
    entries
}
