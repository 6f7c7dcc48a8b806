use super::*;
use crate::render::HeadlessDisplay;

fn response() -> PredictResponse {
    PredictResponse {
        current: 100.0,
        predicted: 104.0,
        change: 4.0,
        years: vec![2025, 2026, 2027],
        values: vec![100.0, 102.0, 104.0],
        band: vec![[98.0, 102.0], [99.0, 105.0], [100.0, 108.0]],
        model_used: None,
    }
}

#[test]
fn chart_has_prediction_and_both_bounds() {
    let chart = forecast_chart(&response());
    let labels: Vec<&str> = chart.datasets.iter().map(|d| d.label.as_str()).collect();
    assert_eq!(labels, vec!["Prediction", "Upper bound", "Lower bound"]);
    assert_eq!(chart.labels, vec!["2025", "2026", "2027"]);
    assert_eq!(chart.datasets[1].points, vec![102.0, 105.0, 108.0]);
    assert_eq!(chart.datasets[2].points, vec![98.0, 99.0, 100.0]);
}

#[test]
fn lower_bound_fills_to_upper() {
    let chart = forecast_chart(&response());
    assert_eq!(chart.datasets[2].fill, Fill::ToDataset(1));
    assert_eq!(chart.datasets[0].fill, Fill::None);
}

#[test]
fn empty_forecast_shows_placeholder() {
    let display = Arc::new(HeadlessDisplay::new());
    let mut renderer = ForecastChartRenderer::new(display.clone());
    renderer.render(&response());
    let empty = PredictResponse { years: Vec::new(), values: Vec::new(), band: Vec::new(), ..response() };
    renderer.render(&empty);
    assert_eq!(display.live_count(SurfaceId::ForecastChart), 0);
    assert_eq!(display.placeholder(SurfaceId::ForecastChart).as_deref(), Some("No forecast yet"));
}
