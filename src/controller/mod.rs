//! Workspace controller: keeps every surface consistent with the store and
//! the gateway.
//!
//! DESIGN
//! ======
//! The controller owns the history store, one renderer per surface, and a
//! [`RequestTracker`]. Each gateway-backed action comes in three steps:
//!
//! - `issue_*` validates input locally and records a [`RequestToken`].
//! - `fetch_*` performs the bounded gateway call. It only borrows the
//!   controller, so several requests can be in flight at once.
//! - `apply_*` decides, from the token, whether the resolution may render
//!   and whether it settles the interaction.
//!
//! `submit_prediction`, `select_compare_country` and `select_analysis_country`
//! chain the three for the common case. Store mutation always precedes the
//! re-renders that depend on it, and each failure is reported only on the
//! interaction that triggered it.

pub mod tracker;


use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use time::OffsetDateTime;
use tracing::{debug, info, warn};

use crate::config::{WorkspaceConfig, YearRange};
use crate::error::WorkspaceError;
use crate::gateway::{ForecastGateway, GatewayError};
use crate::history::{Durability, PersistentHistoryStore};
use crate::model::{
    AnalysisSeries, CompareSeries, EntryKey, HistoryEntry, HistorySnapshot, MetricsSnapshot, PredictRequest,
    PredictResponse,
};
use crate::render::summary::ForecastSummary;
use crate::render::{
    AnalysisChartRenderer, CarouselRenderer, CompareChartRenderer, ForecastChartRenderer, HistoryTableRenderer,
    MetricsTableRenderer, RenderHost, SummaryRenderer, ViewRenderer,
};

pub use tracker::{Interaction, RequestStatus, RequestToken, RequestTracker};

const CATALOG_TAG: &str = "catalog";

// =============================================================================
// SETTINGS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerSettings {
    /// Upper bound on each gateway call.
    pub request_timeout: Duration,
    /// Forecast years accepted by the prediction form.
    pub years: YearRange,
}

impl ControllerSettings {
    #[must_use]
    pub fn from_config(config: &WorkspaceConfig) -> Self {
        Self { request_timeout: Duration::from_secs(config.timeouts.request_secs), years: config.years }
    }
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self::from_config(&WorkspaceConfig::default())
    }
}

// =============================================================================
// TYPES
// =============================================================================

/// A tab whose surfaces became visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Predict,
    Compare,
    Analysis,
    History,
}

/// Proof that the user was asked before clearing history. Consumed on use.
#[derive(Debug, PartialEq, Eq)]
pub struct ClearConfirmation {
    nonce: u64,
}

/// Both halves of a compare refresh.
#[derive(Debug)]
pub struct CompareOutcome {
    pub series: Result<CompareSeries, GatewayError>,
    pub metrics: Result<MetricsSnapshot, GatewayError>,
}

struct ComparePanel {
    series: CompareSeries,
    metrics: Option<MetricsSnapshot>,
}

struct Renderers {
    summary: SummaryRenderer,
    forecast: ForecastChartRenderer,
    compare: CompareChartRenderer,
    metrics: MetricsTableRenderer,
    analysis: AnalysisChartRenderer,
    history: HistoryTableRenderer,
    carousel: CarouselRenderer,
}

impl Renderers {
    fn new(host: &Arc<dyn RenderHost>) -> Self {
        Self {
            summary: SummaryRenderer::new(Arc::clone(host)),
            forecast: ForecastChartRenderer::new(Arc::clone(host)),
            compare: CompareChartRenderer::new(Arc::clone(host)),
            metrics: MetricsTableRenderer::new(Arc::clone(host)),
            analysis: AnalysisChartRenderer::new(Arc::clone(host)),
            history: HistoryTableRenderer::new(Arc::clone(host)),
            carousel: CarouselRenderer::new(Arc::clone(host)),
        }
    }
}

// =============================================================================
// CONTROLLER
// =============================================================================

pub struct WorkspaceController {
    gateway: Arc<dyn ForecastGateway>,
    store: PersistentHistoryStore,
    settings: ControllerSettings,
    tracker: RequestTracker,
    views: Renderers,
    countries: Option<Vec<String>>,
    last_prediction: Option<(ForecastSummary, PredictResponse)>,
    last_compare: Option<ComparePanel>,
    last_analysis: Option<AnalysisSeries>,
    pending_clear: Option<u64>,
    clear_nonce: u64,
}

impl WorkspaceController {
    pub fn new(
        gateway: Arc<dyn ForecastGateway>,
        store: PersistentHistoryStore,
        host: Arc<dyn RenderHost>,
        settings: ControllerSettings,
    ) -> Self {
        Self {
            gateway,
            store,
            settings,
            tracker: RequestTracker::new(),
            views: Renderers::new(&host),
            countries: None,
            last_prediction: None,
            last_compare: None,
            last_analysis: None,
            pending_clear: None,
            clear_nonce: 0,
        }
    }

    /// Startup render: history surfaces from the store, placeholders elsewhere.
    pub fn restore(&mut self) {
        let snapshot = self.store.load();
        info!(entries = snapshot.len(), "workspace restored");
        self.views.summary.clear();
        self.views.forecast.clear();
        self.views.compare.clear();
        self.views.metrics.clear();
        self.views.analysis.clear();
        self.render_history(&snapshot);
    }

    // -------------------------------------------------------------------------
    // Catalog
    // -------------------------------------------------------------------------

    /// Fetch the country catalog. Once loaded, requests for countries outside
    /// it are rejected locally.
    ///
    /// # Errors
    ///
    /// Returns `WorkspaceError::Gateway` if the catalog call fails.
    pub async fn load_countries(&mut self) -> Result<&[String], WorkspaceError> {
        let token = self.tracker.issue(Interaction::Catalog, CATALOG_TAG);
        let gateway = Arc::clone(&self.gateway);
        let result = bounded(self.settings.request_timeout, gateway.list_countries()).await;
        match result {
            Ok(countries) => {
                self.tracker.settle_success(&token);
                info!(count = countries.len(), "country catalog loaded");
                Ok(self.countries.insert(countries).as_slice())
            }
            Err(e) => Err(self.fail(&token, e)),
        }
    }

    #[must_use]
    pub fn countries(&self) -> Option<&[String]> {
        self.countries.as_deref()
    }

    // -------------------------------------------------------------------------
    // Prediction
    // -------------------------------------------------------------------------

    /// Request a forecast, record it, and refresh every dependent surface,
    /// including the compare tab for the submitted country.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` for rejected input, or `Gateway` if the
    /// predict call fails. A failed compare refresh is reported on the
    /// compare interaction only.
    pub async fn submit_prediction(&mut self, request: PredictRequest) -> Result<(), WorkspaceError> {
        let token = self.issue_prediction(&request)?;
        let result = self.fetch_prediction(&request).await;
        self.apply_prediction(&token, &request, result)?;

        if let Err(e) = self.select_compare_country(&request.country).await {
            warn!(country = %request.country, error = %e, "compare refresh after prediction failed");
        }
        Ok(())
    }

    /// Validate `request` and record it as the newest prediction.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` if the country, year, or model set is rejected.
    pub fn issue_prediction(&mut self, request: &PredictRequest) -> Result<RequestToken, WorkspaceError> {
        self.check_country(&request.country)?;
        if !self.settings.years.contains(request.year) {
            return Err(WorkspaceError::InvalidRequest(format!(
                "year {} outside {}..={}",
                request.year, self.settings.years.min, self.settings.years.max
            )));
        }
        if request.models.is_empty() {
            return Err(WorkspaceError::InvalidRequest("at least one model is required".to_owned()));
        }
        let token = self.tracker.issue(Interaction::Prediction, request.tag());
        debug!(tag = token.tag(), seq = token.seq(), "prediction issued");
        Ok(token)
    }

    pub async fn fetch_prediction(&self, request: &PredictRequest) -> Result<PredictResponse, GatewayError> {
        bounded(self.settings.request_timeout, self.gateway.predict(request)).await
    }

    /// Apply a prediction resolution. Every success is recorded in history;
    /// only the newest request redraws the summary and forecast.
    ///
    /// # Errors
    ///
    /// Returns `WorkspaceError::Gateway` if `result` is a failure.
    pub fn apply_prediction(
        &mut self,
        token: &RequestToken,
        request: &PredictRequest,
        result: Result<PredictResponse, GatewayError>,
    ) -> Result<(), WorkspaceError> {
        let response = match result {
            Ok(response) => response,
            Err(e) => return Err(self.fail(token, e)),
        };

        let entry = HistoryEntry {
            country: request.country.clone(),
            year: request.year,
            models: request.models.clone(),
            predicted: response.predicted,
            change: response.change,
            ts: self.store.stamp(now_ms()),
        };
        info!(country = %entry.country, year = entry.year, predicted = entry.predicted, "prediction recorded");
        self.store.add(entry);
        let snapshot = self.store.load();
        self.render_history(&snapshot);

        if self.tracker.settle_success(token) {
            let summary = ForecastSummary::new(request, &response);
            self.views.summary.render(&summary);
            self.views.forecast.render(&response);
            self.last_prediction = Some((summary, response));
        } else {
            debug!(tag = token.tag(), "superseded prediction; history only");
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Compare
    // -------------------------------------------------------------------------

    /// Select `country` on the compare tab and refresh its chart and metrics.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` for an unknown country, or `Gateway` if the
    /// compare series cannot be fetched.
    pub async fn select_compare_country(&mut self, country: &str) -> Result<(), WorkspaceError> {
        let token = self.issue_compare(country)?;
        let outcome = self.fetch_compare(&token).await;
        self.apply_compare(&token, outcome)
    }

    /// # Errors
    ///
    /// Returns `InvalidRequest` for an unknown country.
    pub fn issue_compare(&mut self, country: &str) -> Result<RequestToken, WorkspaceError> {
        self.check_country(country)?;
        Ok(self.tracker.issue(Interaction::CompareSelector, country))
    }

    /// Fetch series and metrics concurrently for the token's country.
    pub async fn fetch_compare(&self, token: &RequestToken) -> CompareOutcome {
        let window = self.settings.request_timeout;
        let (series, metrics) = tokio::join!(
            bounded(window, self.gateway.compare(token.tag())),
            bounded(window, self.gateway.metrics(token.tag())),
        );
        CompareOutcome { series, metrics }
    }

    /// Apply a compare resolution. Responses for a country that is no
    /// longer selected are discarded. A metrics failure degrades the table
    /// to placeholders without blocking the chart.
    ///
    /// # Errors
    ///
    /// Returns `WorkspaceError::Gateway` if the series call failed for the
    /// selected country.
    pub fn apply_compare(&mut self, token: &RequestToken, outcome: CompareOutcome) -> Result<(), WorkspaceError> {
        if !self.tracker.matches_current(token) {
            debug!(country = token.tag(), seq = token.seq(), "stale compare response discarded");
            return Ok(());
        }
        let series = match outcome.series {
            Ok(series) => series,
            Err(e) => {
                if self.tracker.is_latest(token) {
                    self.views.compare.clear();
                    self.views.metrics.clear();
                    self.last_compare = None;
                }
                return Err(self.fail(token, e));
            }
        };

        self.views.compare.render(&series);
        let metrics = match outcome.metrics {
            Ok(metrics) => {
                self.views.metrics.render(&metrics);
                Some(metrics)
            }
            Err(e) => {
                warn!(country = token.tag(), error = %e, "metrics unavailable; showing placeholders");
                self.views.metrics.render_unavailable();
                None
            }
        };
        self.last_compare = Some(ComparePanel { series, metrics });
        self.tracker.settle_success(token);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Analysis
    // -------------------------------------------------------------------------

    /// Select `country` on the analysis tab and refresh its chart.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` for an unknown country, or `Gateway` if the
    /// analysis call fails.
    pub async fn select_analysis_country(&mut self, country: &str) -> Result<(), WorkspaceError> {
        let token = self.issue_analysis(country)?;
        let result = self.fetch_analysis(&token).await;
        self.apply_analysis(&token, result)
    }

    /// # Errors
    ///
    /// Returns `InvalidRequest` for an unknown country.
    pub fn issue_analysis(&mut self, country: &str) -> Result<RequestToken, WorkspaceError> {
        self.check_country(country)?;
        Ok(self.tracker.issue(Interaction::AnalysisSelector, country))
    }

    pub async fn fetch_analysis(&self, token: &RequestToken) -> Result<AnalysisSeries, GatewayError> {
        bounded(self.settings.request_timeout, self.gateway.analysis(token.tag())).await
    }

    /// # Errors
    ///
    /// Returns `WorkspaceError::Gateway` if the call failed for the selected
    /// country.
    pub fn apply_analysis(
        &mut self,
        token: &RequestToken,
        result: Result<AnalysisSeries, GatewayError>,
    ) -> Result<(), WorkspaceError> {
        if !self.tracker.matches_current(token) {
            debug!(country = token.tag(), seq = token.seq(), "stale analysis response discarded");
            return Ok(());
        }
        match result {
            Ok(series) => {
                self.views.analysis.render(&series);
                self.last_analysis = Some(series);
                self.tracker.settle_success(token);
                Ok(())
            }
            Err(e) => {
                if self.tracker.is_latest(token) {
                    self.views.analysis.clear();
                    self.last_analysis = None;
                }
                Err(self.fail(token, e))
            }
        }
    }

    // -------------------------------------------------------------------------
    // Tabs
    // -------------------------------------------------------------------------

    /// Redraw `tab`'s surfaces from state already held. Never fetches.
    pub fn tab_shown(&mut self, tab: Tab) {
        debug!(?tab, "tab shown");
        match tab {
            Tab::Predict => match &self.last_prediction {
                Some((summary, response)) => {
                    self.views.summary.render(summary);
                    self.views.forecast.render(response);
                }
                None => {
                    self.views.summary.clear();
                    self.views.forecast.clear();
                }
            },
            Tab::Compare => match &self.last_compare {
                Some(panel) => {
                    self.views.compare.render(&panel.series);
                    match &panel.metrics {
                        Some(metrics) => self.views.metrics.render(metrics),
                        None => self.views.metrics.render_unavailable(),
                    }
                }
                None => {
                    self.views.compare.clear();
                    self.views.metrics.clear();
                }
            },
            Tab::Analysis => match &self.last_analysis {
                Some(series) => self.views.analysis.render(series),
                None => self.views.analysis.clear(),
            },
            Tab::History => {
                let snapshot = self.store.load();
                self.render_history(&snapshot);
            }
        }
    }

    // -------------------------------------------------------------------------
    // History
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn history(&self) -> HistorySnapshot {
        self.store.load()
    }

    /// Remove the entry identified by `key` and redraw the history surfaces.
    ///
    /// # Errors
    ///
    /// Returns `UnknownEntry` if no entry has `key`.
    pub fn delete_history_entry(&mut self, key: EntryKey) -> Result<HistoryEntry, WorkspaceError> {
        let removed = self.store.delete(key).ok_or(WorkspaceError::UnknownEntry(key))?;
        info!(%key, country = %removed.country, "history entry deleted");
        let snapshot = self.store.load();
        self.render_history(&snapshot);
        Ok(removed)
    }

    /// Remove the entry drawn at `position` of the history table.
    ///
    /// # Errors
    ///
    /// Returns `UnknownRow` if the table has no such row, or `UnknownEntry`
    /// if the row's entry is already gone.
    pub fn delete_history_row(&mut self, position: usize) -> Result<HistoryEntry, WorkspaceError> {
        let key = self.views.history.key_at(position).ok_or(WorkspaceError::UnknownRow(position))?;
        self.delete_history_entry(key)
    }

    /// Remove the entry drawn at `position` of the recent-predictions carousel.
    ///
    /// # Errors
    ///
    /// Returns `UnknownRow` if the carousel has no such card, or
    /// `UnknownEntry` if the card's entry is already gone.
    pub fn delete_carousel_item(&mut self, position: usize) -> Result<HistoryEntry, WorkspaceError> {
        let key = self.views.carousel.key_at(position).ok_or(WorkspaceError::UnknownRow(position))?;
        self.delete_history_entry(key)
    }

    /// Pretty-printed history for download. Never contacts the gateway.
    ///
    /// # Errors
    ///
    /// Returns `Export` if the snapshot cannot be encoded.
    pub fn export_history(&self) -> Result<Vec<u8>, WorkspaceError> {
        Ok(self.store.export_snapshot()?)
    }

    /// First step of clearing history. Any earlier confirmation is revoked.
    pub fn request_clear_history(&mut self) -> ClearConfirmation {
        self.clear_nonce += 1;
        self.pending_clear = Some(self.clear_nonce);
        ClearConfirmation { nonce: self.clear_nonce }
    }

    /// Clear history and redraw the history surfaces.
    ///
    /// # Errors
    ///
    /// Returns `ClearNotConfirmed` if `confirmation` is not the outstanding one.
    pub fn confirm_clear_history(&mut self, confirmation: ClearConfirmation) -> Result<(), WorkspaceError> {
        if self.pending_clear != Some(confirmation.nonce) {
            return Err(WorkspaceError::ClearNotConfirmed);
        }
        self.pending_clear = None;
        self.store.clear();
        info!("history cleared");
        let snapshot = self.store.load();
        self.render_history(&snapshot);
        Ok(())
    }

    pub fn cancel_clear_history(&mut self) {
        self.pending_clear = None;
    }

    #[must_use]
    pub fn durability(&self) -> &Durability {
        self.store.durability()
    }

    // -------------------------------------------------------------------------
    // Status
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn status(&self, interaction: Interaction) -> RequestStatus {
        self.tracker.status(interaction)
    }

    #[must_use]
    pub fn last_error(&self, interaction: Interaction) -> Option<&str> {
        self.tracker.last_error(interaction)
    }

    pub fn acknowledge(&mut self, interaction: Interaction) {
        self.tracker.acknowledge(interaction);
    }

    /// Country currently selected on the compare tab.
    #[must_use]
    pub fn compare_country(&self) -> Option<&str> {
        self.tracker.current(Interaction::CompareSelector)
    }

    #[must_use]
    pub fn analysis_country(&self) -> Option<&str> {
        self.tracker.current(Interaction::AnalysisSelector)
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn render_history(&mut self, snapshot: &HistorySnapshot) {
        self.views.history.render(snapshot);
        self.views.carousel.render(snapshot);
    }

    fn check_country(&self, country: &str) -> Result<(), WorkspaceError> {
        if country.trim().is_empty() {
            return Err(WorkspaceError::InvalidRequest("country is required".to_owned()));
        }
        if let Some(catalog) = &self.countries {
            if !catalog.iter().any(|known| known == country) {
                return Err(WorkspaceError::InvalidRequest(format!("unknown country {country}")));
            }
        }
        Ok(())
    }

    /// Record `error` against the token's interaction, if still newest, and
    /// wrap it for the caller.
    fn fail(&mut self, token: &RequestToken, error: GatewayError) -> WorkspaceError {
        if self.tracker.settle_failure(token, error.to_string()) {
            warn!(interaction = %token.interaction(), tag = token.tag(), kind = error.kind(), error = %error, "request failed");
        } else {
            debug!(interaction = %token.interaction(), tag = token.tag(), error = %error, "superseded request failed");
        }
        WorkspaceError::Gateway { interaction: token.interaction(), source: error }
    }
}

/// Run `call`, turning expiry of `window` into `GatewayError::Timeout`.
async fn bounded<T>(window: Duration, call: impl Future<Output = Result<T, GatewayError>>) -> Result<T, GatewayError> {
    tokio::time::timeout(window, call).await.unwrap_or(Err(GatewayError::Timeout(window)))
}

fn now_ms() -> i64 {
    i64::try_from(OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000).unwrap_or(i64::MAX)
}
