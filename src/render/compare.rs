//! Compare chart: each model's fitted series, one fixed color per model.

#[cfg(test)]
#[path = "compare_test.rs"]
mod compare_test;

use std::sync::Arc;

use super::content::{ChartSpec, Dataset};
use super::{RenderHost, SurfaceContent, SurfaceId, SurfaceSlot, ViewRenderer};
use crate::model::{CompareSeries, ModelId};

pub struct CompareChartRenderer {
    slot: SurfaceSlot,
}

impl CompareChartRenderer {
    pub fn new(host: Arc<dyn RenderHost>) -> Self {
        Self { slot: SurfaceSlot::new(host, SurfaceId::CompareChart) }
    }
}

/// Chart with one dataset per model that produced values. Models keep their
/// color whether or not the others are present.
#[must_use]
pub fn compare_chart(series: &CompareSeries) -> ChartSpec {
    let datasets = ModelId::ALL
        .into_iter()
        .filter(|model| !series.series(*model).is_empty())
        .map(|model| Dataset::line(model.label(), model.color(), series.series(model).to_vec()))
        .collect();
    ChartSpec {
        title: "Model comparison".to_owned(),
        labels: series.years.iter().map(ToString::to_string).collect(),
        datasets,
    }
}

impl ViewRenderer for CompareChartRenderer {
    type Payload = CompareSeries;

    fn render(&mut self, series: &CompareSeries) {
        let chart = compare_chart(series);
        if chart.labels.is_empty() || chart.datasets.is_empty() {
            self.clear();
            return;
        }
        self.slot.replace(SurfaceContent::Chart(chart));
    }

    fn clear(&mut self) {
        self.slot.clear("No comparison data");
    }

    fn surface(&self) -> SurfaceId {
        self.slot.surface()
    }

    fn is_live(&self) -> bool {
        self.slot.is_live()
    }
}
