use std::collections::HashMap;

use axum::extract::Query;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

use super::*;
use crate::model::{Metric, ModelId};

const TIMEOUTS: GatewayTimeouts = GatewayTimeouts { request_secs: 5, connect_secs: 2 };

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Fake prediction service answering like the real one.
fn forecast_service() -> Router {
    Router::new()
        .route("/health", get(|| async { Json(json!({"status": "ok"})) }))
        .route("/countries", get(|| async { Json(json!(["Brazil", "India", "United States"])) }))
        .route(
            "/predict",
            post(|Json(body): Json<Value>| async move {
                let year = body["year"].as_i64().unwrap_or(0);
                Json(json!({
                    "model_used": body["models"][0],
                    "years": [2023, 2024, year],
                    "values": [900.0, 910.0, 950.0],
                    "current": 900.0,
                    "predicted": 950.0,
                    "change": 5.56,
                    "band": [[890.0, 910.0], [900.0, 920.0], [940.0, 960.0]],
                    "metrics": {}
                }))
            }),
        )
        .route(
            "/compare",
            get(|Query(q): Query<HashMap<String, String>>| async move {
                let country = q.get("country").cloned().unwrap_or_default();
                if country == "Broken" {
                    return Json(json!({"years": [2020, 2021], "lasso": [1.0], "ridge": [], "knn": []}));
                }
                Json(json!({
                    "years": [2020, 2021],
                    "lasso": [1.0, 2.0],
                    "ridge": [1.5, 2.5],
                    "knn": [],
                    "country": country
                }))
            }),
        )
        .route(
            "/metrics",
            get(|| async {
                Json(json!({
                    "lasso": {"MAE": 12.3, "RMSE": null, "R2": 0.81, "MAPE": 5.0},
                    "ridge": {"MAE": 1.0, "RMSE": 2.0, "R2": 0.5, "MAPE": 3.0},
                    "knn": {"MAE": null, "RMSE": null, "R2": null, "MAPE": null}
                }))
            }),
        )
        .route(
            "/analysis",
            get(|Query(q): Query<HashMap<String, String>>| async move {
                if q.get("country").map(String::as_str) == Some("Nowhere") {
                    return (StatusCode::NOT_FOUND, Json(json!({"detail": "No data for this country"}))).into_response();
                }
                Json(json!({"years": [2020, 2021, 2022], "true_values": [1.0, 2.0, 3.0]})).into_response()
            }),
        )
}

async fn gateway() -> HttpGateway {
    let base = serve(forecast_service()).await;
    HttpGateway::new(&base, TIMEOUTS).unwrap()
}

// =============================================================
// construction
// =============================================================

#[test]
fn base_url_trailing_slash_trimmed() {
    let gw = HttpGateway::new("http://127.0.0.1:8000/", TIMEOUTS).unwrap();
    assert_eq!(gw.base_url(), "http://127.0.0.1:8000");
    assert_eq!(gw.url("compare"), "http://127.0.0.1:8000/compare");
}

// =============================================================
// successful operations
// =============================================================

#[tokio::test]
async fn health_ok() {
    gateway().await.health().await.unwrap();
}

#[tokio::test]
async fn list_countries_in_service_order() {
    let countries = gateway().await.list_countries().await.unwrap();
    assert_eq!(countries, vec!["Brazil", "India", "United States"]);
}

#[tokio::test]
async fn predict_posts_request_and_decodes() {
    let gw = gateway().await;
    let request = PredictRequest::new("India", 2030, [ModelId::Ridge, ModelId::Lasso]);
    let response = gw.predict(&request).await.unwrap();
    assert_eq!(response.years, vec![2023, 2024, 2030]);
    assert!((response.predicted - 950.0).abs() < f64::EPSILON);
    assert_eq!(response.model_used, Some(ModelId::Ridge));
    assert_eq!(response.band.len(), 3);
}

#[tokio::test]
async fn compare_encodes_country_query() {
    let series = gateway().await.compare("United States").await.unwrap();
    assert_eq!(series.years, vec![2020, 2021]);
    assert_eq!(series.series(ModelId::Ridge), &[1.5, 2.5]);
    assert!(series.series(ModelId::Knn).is_empty());
}

#[tokio::test]
async fn metrics_keep_absent_values_absent() {
    let metrics = gateway().await.metrics("India").await.unwrap();
    let lasso = metrics.get(ModelId::Lasso).unwrap();
    assert_eq!(lasso.value(Metric::Rmse), None);
    assert_eq!(metrics.get(ModelId::Knn).unwrap().value(Metric::Mae), None);
}

#[tokio::test]
async fn analysis_decodes_true_values() {
    let series = gateway().await.analysis("India").await.unwrap();
    assert_eq!(series.true_values, vec![1.0, 2.0, 3.0]);
}

// =============================================================
// failures
// =============================================================

#[tokio::test]
async fn misaligned_series_is_payload_error() {
    let err = gateway().await.compare("Broken").await.unwrap_err();
    assert_eq!(err.kind(), "payload");
    assert!(err.to_string().contains("lasso"));
}

#[tokio::test]
async fn not_found_is_response_error() {
    let err = gateway().await.analysis("Nowhere").await.unwrap_err();
    match err {
        GatewayError::Response { status, body } => {
            assert_eq!(status, 404);
            assert!(body.contains("No data"));
        }
        other => panic!("expected response error, got {other:?}"),
    }
}

#[tokio::test]
async fn non_success_with_valid_body_is_still_failure() {
    let app = Router::new().route(
        "/countries",
        get(|| async { (StatusCode::SERVICE_UNAVAILABLE, Json(json!(["India"]))) }),
    );
    let gw = HttpGateway::new(&serve(app).await, TIMEOUTS).unwrap();
    let err = gw.list_countries().await.unwrap_err();
    assert!(matches!(err, GatewayError::Response { status: 503, .. }));
}

#[tokio::test]
async fn wrong_shape_is_payload_error() {
    let app = Router::new().route("/countries", get(|| async { Json(json!({"countries": []})) }));
    let gw = HttpGateway::new(&serve(app).await, TIMEOUTS).unwrap();
    let err = gw.list_countries().await.unwrap_err();
    assert_eq!(err.kind(), "payload");
}

#[tokio::test]
async fn unhealthy_status_is_payload_error() {
    let app = Router::new().route("/health", get(|| async { Json(json!({"status": "degraded"})) }));
    let gw = HttpGateway::new(&serve(app).await, TIMEOUTS).unwrap();
    assert_eq!(gw.health().await.unwrap_err().kind(), "payload");
}

#[tokio::test]
async fn unreachable_service_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let gw = HttpGateway::new(&format!("http://{addr}"), TIMEOUTS).unwrap();
    let err = gw.list_countries().await.unwrap_err();
    assert_eq!(err.kind(), "transport");
}

#[tokio::test]
async fn slow_service_is_timeout_error() {
    let app = Router::new().route(
        "/countries",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!([]))
        }),
    );
    let timeouts = GatewayTimeouts { request_secs: 1, connect_secs: 1 };
    let gw = HttpGateway::new(&serve(app).await, timeouts).unwrap();
    let err = gw.list_countries().await.unwrap_err();
    assert!(matches!(err, GatewayError::Timeout(d) if d == Duration::from_secs(1)));
}
