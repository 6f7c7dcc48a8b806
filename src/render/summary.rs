//! Stat cards summarizing the latest prediction.

use std::sync::Arc;

use super::content::{StatCard, Tone};
use super::format::{general, signed_percent};
use super::{RenderHost, SurfaceContent, SurfaceId, SurfaceSlot, ViewRenderer};
use crate::model::{ModelId, PredictRequest, PredictResponse};

/// What the summary cards show for one prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastSummary {
    pub country: String,
    pub year: i32,
    pub current: f64,
    pub predicted: f64,
    pub change: f64,
    pub model_used: Option<ModelId>,
}

impl ForecastSummary {
    #[must_use]
    pub fn new(request: &PredictRequest, response: &PredictResponse) -> Self {
        Self {
            country: request.country.clone(),
            year: request.year,
            current: response.current,
            predicted: response.predicted,
            change: response.change,
            model_used: response.model_used,
        }
    }
}

/// Direction of a percentage change.
#[must_use]
pub fn tone_of(change: f64) -> Tone {
    if change > 0.0 {
        Tone::Up
    } else if change < 0.0 {
        Tone::Down
    } else {
        Tone::Neutral
    }
}

pub struct SummaryRenderer {
    slot: SurfaceSlot,
}

impl SummaryRenderer {
    pub fn new(host: Arc<dyn RenderHost>) -> Self {
        Self { slot: SurfaceSlot::new(host, SurfaceId::Summary) }
    }
}

impl ViewRenderer for SummaryRenderer {
    type Payload = ForecastSummary;

    fn render(&mut self, summary: &ForecastSummary) {
        let mut cards = vec![
            StatCard::new("Current", general(summary.current)).with_detail(summary.country.clone()),
            StatCard::new(format!("Predicted {}", summary.year), general(summary.predicted)),
            StatCard::new("Change", signed_percent(summary.change)).with_tone(tone_of(summary.change)),
        ];
        if let Some(model) = summary.model_used {
            cards.push(StatCard::new("Model", model.label()));
        }
        self.slot.replace(SurfaceContent::Cards(cards));
    }

    fn clear(&mut self) {
        self.slot.clear("Submit a prediction to see results");
    }

    fn surface(&self) -> SurfaceId {
        self.slot.surface()
    }

    fn is_live(&self) -> bool {
        self.slot.is_live()
    }
}
