//! Metrics table: one row per model, one cell per metric.

#[cfg(test)]
#[path = "metrics_test.rs"]
mod metrics_test;

use std::sync::Arc;

use super::content::{TableRow, TableView};
use super::format::metric_cell;
use super::{RenderHost, SurfaceContent, SurfaceId, SurfaceSlot, ViewRenderer};
use crate::model::{Metric, MetricsSnapshot, ModelId};

pub struct MetricsTableRenderer {
    slot: SurfaceSlot,
}

impl MetricsTableRenderer {
    pub fn new(host: Arc<dyn RenderHost>) -> Self {
        Self { slot: SurfaceSlot::new(host, SurfaceId::MetricsTable) }
    }

    /// Render every cell as the placeholder, for when metrics are unavailable.
    pub fn render_unavailable(&mut self) {
        self.render(&MetricsSnapshot::default());
    }
}

/// Table for `metrics`. Models missing from the snapshot get placeholder cells.
#[must_use]
pub fn metrics_table(metrics: &MetricsSnapshot) -> TableView {
    let mut columns = vec!["Model".to_owned()];
    columns.extend(Metric::ALL.iter().map(|m| m.label().to_owned()));

    let rows = ModelId::ALL
        .into_iter()
        .map(|model| {
            let record = metrics.get(model);
            let mut cells = vec![model.label().to_owned()];
            cells.extend(
                Metric::ALL
                    .into_iter()
                    .map(|metric| metric_cell(metric, record.and_then(|r| r.value(metric)))),
            );
            TableRow { key: None, cells }
        })
        .collect();

    TableView { columns, rows }
}

impl ViewRenderer for MetricsTableRenderer {
    type Payload = MetricsSnapshot;

    fn render(&mut self, metrics: &MetricsSnapshot) {
        self.slot.replace(SurfaceContent::Table(metrics_table(metrics)));
    }

    fn clear(&mut self) {
        self.slot.clear("Select a country to see metrics");
    }

    fn surface(&self) -> SurfaceId {
        self.slot.surface()
    }

    fn is_live(&self) -> bool {
        self.slot.is_live()
    }
}
