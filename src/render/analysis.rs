//! Analysis chart: a country's observed historical values.

use std::sync::Arc;

use super::content::{ChartSpec, Dataset};
use super::{RenderHost, SurfaceContent, SurfaceId, SurfaceSlot, ViewRenderer};
use crate::model::AnalysisSeries;

const ACTUAL_COLOR: &str = "#7C3AED";

pub struct AnalysisChartRenderer {
    slot: SurfaceSlot,
}

impl AnalysisChartRenderer {
    pub fn new(host: Arc<dyn RenderHost>) -> Self {
        Self { slot: SurfaceSlot::new(host, SurfaceId::AnalysisChart) }
    }
}

impl ViewRenderer for AnalysisChartRenderer {
    type Payload = AnalysisSeries;

    fn render(&mut self, series: &AnalysisSeries) {
        if series.years.is_empty() {
            self.clear();
            return;
        }
        self.slot.replace(SurfaceContent::Chart(ChartSpec {
            title: "Historical consumption".to_owned(),
            labels: series.years.iter().map(ToString::to_string).collect(),
            datasets: vec![Dataset::line("Actual", ACTUAL_COLOR, series.true_values.clone())],
        }));
    }

    fn clear(&mut self) {
        self.slot.clear("No historical data");
    }

    fn surface(&self) -> SurfaceId {
        self.slot.surface()
    }

    fn is_live(&self) -> bool {
        self.slot.is_live()
    }
}
