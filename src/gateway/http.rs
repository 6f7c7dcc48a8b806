//! HTTP gateway to the prediction service over `reqwest`.
//!
//! One endpoint per operation: `GET /countries`, `POST /predict`,
//! `GET /compare?country=`, `GET /metrics?country=`, `GET /analysis?country=`,
//! and `GET /health`. Any non-success status is a failure regardless of body.

#[cfg(test)]
#[path = "http_test.rs"]
mod http_test;

use std::time::Duration;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::{ForecastGateway, GatewayError};
use crate::config::GatewayTimeouts;
use crate::model::{
    AnalysisSeries, CompareSeries, MetricsSnapshot, PredictRequest, PredictResponse, Validate,
};

pub struct HttpGateway {
    http: reqwest::Client,
    base_url: String,
    timeouts: GatewayTimeouts,
}

#[derive(Deserialize)]
struct HealthBody {
    status: String,
}

impl HttpGateway {
    /// Build a gateway rooted at `base_url` (trailing `/` ignored).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeouts: GatewayTimeouts) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| GatewayError::ClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_owned(), timeouts })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    fn transport(&self, e: reqwest::Error) -> GatewayError {
        if e.is_timeout() {
            GatewayError::Timeout(Duration::from_secs(self.timeouts.request_secs))
        } else {
            GatewayError::Transport(e.to_string())
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, country: Option<&str>) -> Result<T, GatewayError> {
        let mut request = self.http.get(self.url(path));
        if let Some(country) = country {
            request = request.query(&[("country", country)]);
        }
        debug!(path, country = country.unwrap_or(""), "gateway GET");
        let response = request.send().await.map_err(|e| self.transport(e))?;
        self.decode(path, response).await
    }

    async fn decode<T: DeserializeOwned>(&self, path: &str, response: reqwest::Response) -> Result<T, GatewayError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(path, status = status.as_u16(), "gateway non-success status");
            return Err(GatewayError::Response { status: status.as_u16(), body });
        }
        let bytes = response.bytes().await.map_err(|e| self.transport(e))?;
        serde_json::from_slice(&bytes).map_err(|e| GatewayError::Payload(format!("{path}: {e}")))
    }
}

fn checked<T: Validate>(payload: T) -> Result<T, GatewayError> {
    payload.validate()?;
    Ok(payload)
}

#[async_trait::async_trait]
impl ForecastGateway for HttpGateway {
    async fn health(&self) -> Result<(), GatewayError> {
        let body: HealthBody = self.get("health", None).await?;
        if body.status == "ok" {
            Ok(())
        } else {
            Err(GatewayError::Payload(format!("health: unexpected status `{}`", body.status)))
        }
    }

    async fn list_countries(&self) -> Result<Vec<String>, GatewayError> {
        self.get("countries", None).await
    }

    async fn predict(&self, request: &PredictRequest) -> Result<PredictResponse, GatewayError> {
        debug!(country = %request.country, year = request.year, "gateway POST predict");
        let response = self
            .http
            .post(self.url("predict"))
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport(e))?;
        checked(self.decode("predict", response).await?)
    }

    async fn compare(&self, country: &str) -> Result<CompareSeries, GatewayError> {
        checked(self.get("compare", Some(country)).await?)
    }

    async fn metrics(&self, country: &str) -> Result<MetricsSnapshot, GatewayError> {
        checked(self.get("metrics", Some(country)).await?)
    }

    async fn analysis(&self, country: &str) -> Result<AnalysisSeries, GatewayError> {
        checked(self.get("analysis", Some(country)).await?)
    }
}
