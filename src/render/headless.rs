//! In-memory render host.
//!
//! Records what each surface shows and counts live resources, so tests can
//! assert "exactly one live resource per surface" and the CLI can print the
//! surfaces as text.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use tracing::warn;

use super::{MountId, RenderHost, SurfaceContent, SurfaceId};

#[derive(Default)]
struct HeadlessInner {
    next_id: MountId,
    live: BTreeMap<SurfaceId, Vec<(MountId, SurfaceContent)>>,
    placeholders: HashMap<SurfaceId, String>,
    mounts_created: HashMap<SurfaceId, usize>,
}

#[derive(Default)]
pub struct HeadlessDisplay {
    inner: Mutex<HeadlessInner>,
}

impl HeadlessDisplay {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Live resources on `surface`.
    #[must_use]
    pub fn live_count(&self, surface: SurfaceId) -> usize {
        self.lock().live.get(&surface).map_or(0, Vec::len)
    }

    /// Live resources across every surface.
    #[must_use]
    pub fn total_live(&self) -> usize {
        self.lock().live.values().map(Vec::len).sum()
    }

    /// How many resources were ever created on `surface`.
    #[must_use]
    pub fn mounts_created(&self, surface: SurfaceId) -> usize {
        self.lock().mounts_created.get(&surface).copied().unwrap_or(0)
    }

    /// Content of the most recent live resource on `surface`.
    #[must_use]
    pub fn content(&self, surface: SurfaceId) -> Option<SurfaceContent> {
        self.lock()
            .live
            .get(&surface)
            .and_then(|mounts| mounts.last())
            .map(|(_, content)| content.clone())
    }

    /// Placeholder message shown on `surface`, if it is in its empty state.
    #[must_use]
    pub fn placeholder(&self, surface: SurfaceId) -> Option<String> {
        self.lock().placeholders.get(&surface).cloned()
    }

    /// Plain-text view of `surface`: its content, its placeholder, or nothing.
    #[must_use]
    pub fn render_text(&self, surface: SurfaceId) -> Option<String> {
        if let Some(content) = self.content(surface) {
            return Some(content.to_string());
        }
        self.placeholder(surface).map(|msg| format!("{msg}\n"))
    }

    fn lock(&self) -> MutexGuard<'_, HeadlessInner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl RenderHost for HeadlessDisplay {
    fn mount(&self, surface: SurfaceId, content: SurfaceContent) -> MountId {
        let mut inner = self.lock();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.placeholders.remove(&surface);
        inner.live.entry(surface).or_default().push((id, content));
        *inner.mounts_created.entry(surface).or_default() += 1;
        id
    }

    fn unmount(&self, surface: SurfaceId, mount: MountId) {
        let mut inner = self.lock();
        let mounts = inner.live.entry(surface).or_default();
        let before = mounts.len();
        mounts.retain(|(id, _)| *id != mount);
        if mounts.len() == before {
            warn!(%surface, mount, "unmount of unknown resource");
        }
    }

    fn show_placeholder(&self, surface: SurfaceId, message: &str) {
        self.lock().placeholders.insert(surface, message.to_owned());
    }
}
