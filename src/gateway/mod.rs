//! Remote forecast gateway: the typed boundary to the prediction service.
//!
//! DESIGN
//! ======
//! `ForecastGateway` is the seam the controller depends on. The HTTP
//! implementation lives in [`http`]; tests substitute scripted fakes. Every
//! operation either resolves with a payload that passed [`Validate`] or fails
//! with a [`GatewayError`]. Nothing here retries.
//!
//! [`Validate`]: crate::model::Validate

pub mod http;

use std::time::Duration;

use crate::model::{AnalysisSeries, CompareSeries, MetricsSnapshot, PredictRequest, PredictResponse, ShapeError};

pub use http::HttpGateway;

// =============================================================================
// ERROR
// =============================================================================

/// Failures of a single gateway operation.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The service could not be reached.
    #[error("transport failed: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("service responded with status {status}")]
    Response { status: u16, body: String },

    /// The body could not be decoded or failed shape validation.
    #[error("malformed payload: {0}")]
    Payload(String),

    /// No answer within the configured window.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),
}

impl GatewayError {
    /// Short machine-readable category.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Response { .. } => "response",
            Self::Payload(_) => "payload",
            Self::Timeout(_) => "timeout",
            Self::ClientBuild(_) => "client_build",
        }
    }
}

impl From<ShapeError> for GatewayError {
    fn from(e: ShapeError) -> Self {
        Self::Payload(e.to_string())
    }
}

// =============================================================================
// TRAIT
// =============================================================================

/// Request/response contract of the prediction service.
#[async_trait::async_trait]
pub trait ForecastGateway: Send + Sync {
    /// Liveness check.
    async fn health(&self) -> Result<(), GatewayError>;

    /// Country catalog, in service order.
    async fn list_countries(&self) -> Result<Vec<String>, GatewayError>;

    /// Forecast `request.country` for `request.year`.
    async fn predict(&self, request: &PredictRequest) -> Result<PredictResponse, GatewayError>;

    /// Fitted series of every model for `country`.
    async fn compare(&self, country: &str) -> Result<CompareSeries, GatewayError>;

    /// Error metrics of every model for `country`.
    async fn metrics(&self, country: &str) -> Result<MetricsSnapshot, GatewayError>;

    /// Observed historical values for `country`.
    async fn analysis(&self, country: &str) -> Result<AnalysisSeries, GatewayError>;
}
