//! Forecast chart: the prediction series shaded by its uncertainty band.

#[cfg(test)]
#[path = "forecast_test.rs"]
mod forecast_test;

use std::sync::Arc;

use super::content::{ChartSpec, Dataset, Fill};
use super::{RenderHost, SurfaceContent, SurfaceId, SurfaceSlot, ViewRenderer};
use crate::model::PredictResponse;

const PREDICTION_COLOR: &str = "#0EA5E9";
const BAND_COLOR: &str = "#93C5FD";

/// Dataset index of the upper bound; the lower bound fills up to it.
const UPPER_INDEX: usize = 1;

pub struct ForecastChartRenderer {
    slot: SurfaceSlot,
}

impl ForecastChartRenderer {
    pub fn new(host: Arc<dyn RenderHost>) -> Self {
        Self { slot: SurfaceSlot::new(host, SurfaceId::ForecastChart) }
    }
}

/// Build the three-series chart for `response`.
#[must_use]
pub fn forecast_chart(response: &PredictResponse) -> ChartSpec {
    let lower = response.band.iter().map(|[low, _]| *low).collect();
    let upper = response.band.iter().map(|[_, high]| *high).collect();

    let mut upper = Dataset::line("Upper bound", BAND_COLOR, upper);
    upper.dashed = true;
    let mut lower = Dataset::line("Lower bound", BAND_COLOR, lower);
    lower.dashed = true;
    lower.fill = Fill::ToDataset(UPPER_INDEX);

    ChartSpec {
        title: "Forecast".to_owned(),
        labels: response.years.iter().map(ToString::to_string).collect(),
        datasets: vec![Dataset::line("Prediction", PREDICTION_COLOR, response.values.clone()), upper, lower],
    }
}

impl ViewRenderer for ForecastChartRenderer {
    type Payload = PredictResponse;

    fn render(&mut self, response: &PredictResponse) {
        if response.years.is_empty() {
            self.clear();
            return;
        }
        self.slot.replace(SurfaceContent::Chart(forecast_chart(response)));
    }

    fn clear(&mut self) {
        self.slot.clear("No forecast yet");
    }

    fn surface(&self) -> SurfaceId {
        self.slot.surface()
    }

    fn is_live(&self) -> bool {
        self.slot.is_live()
    }
}
