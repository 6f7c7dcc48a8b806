//! Domain model: history entries, snapshots, and prediction service payloads.
//!
//! DESIGN
//! ======
//! `HistoryEntry` mirrors the persisted slot layout exactly (`country`,
//! `year`, `models`, `predicted`, `change`, `ts`) so the store can serialize
//! snapshots without a mapping layer. `HistorySnapshot` wraps an
//! `Arc<[HistoryEntry]>`: cloning hands out a cheap immutable view and no
//! reader can mutate what the store owns.
//!
//! Service payloads carry parallel numeric sequences indexed by `years`.
//! Every payload implements [`Validate`]; the gateway rejects a payload whose
//! sequences are misaligned before it reaches a renderer.

#[cfg(test)]
#[path = "model_test.rs"]
mod model_test;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

// =============================================================================
// MODEL IDENTIFIERS
// =============================================================================

/// Regression models offered by the prediction service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelId {
    Lasso,
    Ridge,
    Knn,
}

impl ModelId {
    /// All models in display order.
    pub const ALL: [ModelId; 3] = [ModelId::Lasso, ModelId::Ridge, ModelId::Knn];

    /// Wire identifier (`"lasso"`, `"ridge"`, `"knn"`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lasso => "lasso",
            Self::Ridge => "ridge",
            Self::Knn => "knn",
        }
    }

    /// Human-facing label used in legends and table headers.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Lasso => "Lasso",
            Self::Ridge => "Ridge",
            Self::Knn => "KNN",
        }
    }

    /// Series color. Fixed per model so charts stay comparable across countries.
    #[must_use]
    pub fn color(self) -> &'static str {
        match self {
            Self::Lasso => "#2563EB",
            Self::Ridge => "#16A34A",
            Self::Knn => "#DC2626",
        }
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown model `{0}` (expected lasso, ridge, or knn)")]
pub struct UnknownModel(pub String);

impl FromStr for ModelId {
    type Err = UnknownModel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lasso" => Ok(Self::Lasso),
            "ridge" => Ok(Self::Ridge),
            "knn" => Ok(Self::Knn),
            _ => Err(UnknownModel(s.to_owned())),
        }
    }
}

// =============================================================================
// HISTORY
// =============================================================================

/// Stable identity of a history entry: its creation instant in epoch millis.
///
/// The store stamps entries so keys are strictly increasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntryKey(pub i64);

impl fmt::Display for EntryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One completed prediction. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub country: String,
    pub year: i32,
    pub models: Vec<ModelId>,
    pub predicted: f64,
    pub change: f64,
    /// Creation instant, epoch milliseconds.
    pub ts: i64,
}

impl HistoryEntry {
    #[must_use]
    pub fn key(&self) -> EntryKey {
        EntryKey(self.ts)
    }
}

/// Immutable, most-recent-first read of the history store.
#[derive(Debug, Clone, PartialEq)]
pub struct HistorySnapshot {
    entries: Arc<[HistoryEntry]>,
}

impl HistorySnapshot {
    #[must_use]
    pub fn empty() -> Self {
        Self { entries: Arc::from(Vec::new()) }
    }

    #[must_use]
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, position: usize) -> Option<&HistoryEntry> {
        self.entries.get(position)
    }

    /// The first `limit` entries (or all of them, if fewer).
    #[must_use]
    pub fn head(&self, limit: usize) -> &[HistoryEntry] {
        &self.entries[..limit.min(self.entries.len())]
    }

    /// Position of the entry with `key`, if present.
    #[must_use]
    pub fn position_of(&self, key: EntryKey) -> Option<usize> {
        self.entries.iter().position(|e| e.key() == key)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HistoryEntry> {
        self.entries.iter()
    }
}

impl Default for HistorySnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Vec<HistoryEntry>> for HistorySnapshot {
    fn from(entries: Vec<HistoryEntry>) -> Self {
        Self { entries: Arc::from(entries) }
    }
}

impl<'a> IntoIterator for &'a HistorySnapshot {
    type Item = &'a HistoryEntry;
    type IntoIter = std::slice::Iter<'a, HistoryEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl Serialize for HistorySnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.entries.iter())
    }
}

impl<'de> Deserialize<'de> for HistorySnapshot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<HistoryEntry>::deserialize(deserializer).map(Self::from)
    }
}

// =============================================================================
// GATEWAY PAYLOADS
// =============================================================================

/// Body of `POST /predict`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PredictRequest {
    pub country: String,
    pub year: i32,
    pub models: Vec<ModelId>,
}

impl PredictRequest {
    /// Build a request, dropping repeated models while keeping first-seen order.
    pub fn new(country: impl Into<String>, year: i32, models: impl IntoIterator<Item = ModelId>) -> Self {
        let mut unique = Vec::new();
        for model in models {
            if !unique.contains(&model) {
                unique.push(model);
            }
        }
        Self { country: country.into(), year, models: unique }
    }

    /// Tag identifying what this request was issued for.
    #[must_use]
    pub fn tag(&self) -> String {
        let models = self.models.iter().map(|m| m.as_str()).collect::<Vec<_>>().join("+");
        format!("{}/{}/{}", self.country, self.year, models)
    }
}

/// Response of `POST /predict`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    pub current: f64,
    pub predicted: f64,
    pub change: f64,
    pub years: Vec<i32>,
    pub values: Vec<f64>,
    /// `[low, high]` uncertainty interval per year.
    pub band: Vec<[f64; 2]>,
    /// Model the service actually ran, when it reports one.
    #[serde(default)]
    pub model_used: Option<ModelId>,
}

/// Response of `GET /compare`: one fitted series per model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompareSeries {
    pub years: Vec<i32>,
    #[serde(default)]
    pub lasso: Vec<f64>,
    #[serde(default)]
    pub ridge: Vec<f64>,
    #[serde(default)]
    pub knn: Vec<f64>,
}

impl CompareSeries {
    /// The fitted values for `model`; empty when the model produced nothing.
    #[must_use]
    pub fn series(&self, model: ModelId) -> &[f64] {
        match model {
            ModelId::Lasso => &self.lasso,
            ModelId::Ridge => &self.ridge,
            ModelId::Knn => &self.knn,
        }
    }
}

/// Error metrics reported for one model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Mae,
    Rmse,
    R2,
    Mape,
}

impl Metric {
    pub const ALL: [Metric; 4] = [Metric::Mae, Metric::Rmse, Metric::R2, Metric::Mape];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Mae => "MAE",
            Self::Rmse => "RMSE",
            Self::R2 => "R2",
            Self::Mape => "MAPE",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One model's metrics. `None` means not computed, never zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    #[serde(rename = "MAE", default)]
    pub mae: Option<f64>,
    #[serde(rename = "RMSE", default)]
    pub rmse: Option<f64>,
    #[serde(rename = "R2", default)]
    pub r2: Option<f64>,
    #[serde(rename = "MAPE", default)]
    pub mape: Option<f64>,
}

impl MetricRecord {
    #[must_use]
    pub fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Mae => self.mae,
            Metric::Rmse => self.rmse,
            Metric::R2 => self.r2,
            Metric::Mape => self.mape,
        }
    }
}

/// Response of `GET /metrics`, keyed by model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricsSnapshot {
    pub models: BTreeMap<ModelId, MetricRecord>,
}

impl MetricsSnapshot {
    #[must_use]
    pub fn get(&self, model: ModelId) -> Option<&MetricRecord> {
        self.models.get(&model)
    }
}

/// Response of `GET /analysis`: observed historical values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSeries {
    pub years: Vec<i32>,
    pub true_values: Vec<f64>,
}

// =============================================================================
// VALIDATION
// =============================================================================

/// Shape violations detected in a service payload.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ShapeError {
    #[error("series `{name}` has {actual} points but `years` has {expected}")]
    Misaligned { name: &'static str, expected: usize, actual: usize },
    #[error("field `{0}` is not a finite number")]
    NonFinite(String),
}

/// Structural checks applied to every decoded payload.
pub trait Validate {
    /// # Errors
    ///
    /// Returns the first shape violation found.
    fn validate(&self) -> Result<(), ShapeError>;
}

fn aligned(name: &'static str, expected: usize, actual: usize) -> Result<(), ShapeError> {
    if expected == actual {
        Ok(())
    } else {
        Err(ShapeError::Misaligned { name, expected, actual })
    }
}

fn finite(name: &str, value: f64) -> Result<(), ShapeError> {
    if value.is_finite() { Ok(()) } else { Err(ShapeError::NonFinite(name.to_owned())) }
}

impl Validate for PredictResponse {
    fn validate(&self) -> Result<(), ShapeError> {
        finite("current", self.current)?;
        finite("predicted", self.predicted)?;
        finite("change", self.change)?;
        aligned("values", self.years.len(), self.values.len())?;
        aligned("band", self.years.len(), self.band.len())
    }
}

impl Validate for CompareSeries {
    fn validate(&self) -> Result<(), ShapeError> {
        for model in ModelId::ALL {
            let series = self.series(model);
            // An absent model is an empty series, never a short one.
            if !series.is_empty() {
                aligned(model.as_str(), self.years.len(), series.len())?;
            }
        }
        Ok(())
    }
}

impl Validate for MetricsSnapshot {
    fn validate(&self) -> Result<(), ShapeError> {
        for (model, record) in &self.models {
            for metric in Metric::ALL {
                if let Some(v) = record.value(metric) {
                    finite(&format!("{model}.{metric}"), v)?;
                }
            }
        }
        Ok(())
    }
}

impl Validate for AnalysisSeries {
    fn validate(&self) -> Result<(), ShapeError> {
        aligned("true_values", self.years.len(), self.true_values.len())
    }
}
