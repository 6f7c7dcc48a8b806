//! View renderers: pure functions from payload to one visible surface.
//!
//! DESIGN
//! ======
//! A [`RenderHost`] owns the actual drawing resources (chart instances, table
//! bodies). Each renderer holds one [`SurfaceSlot`], and the slot holds at
//! most one [`Mount`]: an RAII guard whose `Drop` releases the resource.
//! Replacing the slot's content drops the previous mount before the host is
//! asked for a new one, so a surface never has two live resources, on any
//! path, including an empty payload that only shows a placeholder.
//!
//! Renderers never fetch data. They take borrowed payloads and never mutate
//! them; the controller decides when to call them.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`content`] | Host-neutral content: charts, tables, cards |
//! | [`format`] | Number formatting shared by renderers |
//! | [`headless`] | In-memory host used by tests and the CLI |
//! | [`summary`] | Prediction stat cards |
//! | [`forecast`] | Prediction series with uncertainty band |
//! | [`compare`] | Per-model fitted series |
//! | [`metrics`] | Per-model error metrics table |
//! | [`analysis`] | Observed historical series |
//! | [`history`] | Full history table |
//! | [`carousel`] | Recent-predictions cards |

pub mod analysis;
pub mod carousel;
pub mod compare;
pub mod content;
pub mod forecast;
pub mod format;
pub mod headless;
pub mod history;
pub mod metrics;
pub mod summary;


use std::fmt;
use std::sync::Arc;

pub use analysis::AnalysisChartRenderer;
pub use carousel::CarouselRenderer;
pub use compare::CompareChartRenderer;
pub use content::SurfaceContent;
pub use forecast::ForecastChartRenderer;
pub use headless::HeadlessDisplay;
pub use history::HistoryTableRenderer;
pub use metrics::MetricsTableRenderer;
pub use summary::SummaryRenderer;

// =============================================================================
// SURFACES
// =============================================================================

/// One independently renderable visual area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SurfaceId {
    Summary,
    ForecastChart,
    CompareChart,
    MetricsTable,
    AnalysisChart,
    HistoryTable,
    Carousel,
}

impl SurfaceId {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Summary => "summary",
            Self::ForecastChart => "forecast_chart",
            Self::CompareChart => "compare_chart",
            Self::MetricsTable => "metrics_table",
            Self::AnalysisChart => "analysis_chart",
            Self::HistoryTable => "history_table",
            Self::Carousel => "carousel",
        }
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Host-assigned handle of one live rendering resource.
pub type MountId = u64;

// =============================================================================
// HOST
// =============================================================================

/// The drawing backend that owns rendering resources.
pub trait RenderHost: Send + Sync {
    /// Create a resource showing `content` on `surface`.
    fn mount(&self, surface: SurfaceId, content: SurfaceContent) -> MountId;

    /// Dispose the resource `mount` on `surface`.
    fn unmount(&self, surface: SurfaceId, mount: MountId);

    /// Show an empty-state message. Holds no resource.
    fn show_placeholder(&self, surface: SurfaceId, message: &str);
}

/// A live rendering resource. Dropping it disposes the resource.
pub struct Mount {
    host: Arc<dyn RenderHost>,
    surface: SurfaceId,
    id: MountId,
}

impl Mount {
    #[must_use]
    pub fn id(&self) -> MountId {
        self.id
    }
}

impl Drop for Mount {
    fn drop(&mut self) {
        self.host.unmount(self.surface, self.id);
    }
}

// =============================================================================
// SURFACE SLOT
// =============================================================================

/// Holds at most one live [`Mount`] for one surface.
pub struct SurfaceSlot {
    host: Arc<dyn RenderHost>,
    surface: SurfaceId,
    current: Option<Mount>,
}

impl SurfaceSlot {
    pub fn new(host: Arc<dyn RenderHost>, surface: SurfaceId) -> Self {
        Self { host, surface, current: None }
    }

    #[must_use]
    pub fn surface(&self) -> SurfaceId {
        self.surface
    }

    /// Whether a resource is currently mounted.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.current.is_some()
    }

    /// Dispose the current resource, then mount `content`.
    pub fn replace(&mut self, content: SurfaceContent) {
        self.dispose();
        let id = self.host.mount(self.surface, content);
        self.current = Some(Mount { host: Arc::clone(&self.host), surface: self.surface, id });
    }

    /// Dispose the current resource and show `message` instead.
    pub fn clear(&mut self, message: &str) {
        self.dispose();
        self.host.show_placeholder(self.surface, message);
    }

    fn dispose(&mut self) {
        drop(self.current.take());
    }
}

// =============================================================================
// RENDERER
// =============================================================================

/// Uniform contract of every view renderer.
pub trait ViewRenderer {
    type Payload: ?Sized;

    /// Replace whatever the surface shows with `payload`.
    fn render(&mut self, payload: &Self::Payload);

    /// Dispose the surface's resource and show its empty state.
    fn clear(&mut self);

    fn surface(&self) -> SurfaceId;

    fn is_live(&self) -> bool;
}
