//! Number and time formatting for rendered cells and cards.

#[cfg(test)]
#[path = "format_test.rs"]
mod format_test;

use time::OffsetDateTime;
use time::macros::format_description;

use crate::model::Metric;

/// Shown in place of an absent value. Never `0`.
pub const PLACEHOLDER: &str = "\u{2014}";

/// General numeric format: at most two fraction digits, trailing zeros dropped.
#[must_use]
pub fn general(value: f64) -> String {
    let fixed = format!("{value:.2}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" { "0".to_owned() } else { trimmed.to_owned() }
}

/// Exactly two fraction digits.
#[must_use]
pub fn fixed2(value: f64) -> String {
    let fixed = format!("{value:.2}");
    if fixed == "-0.00" { "0.00".to_owned() } else { fixed }
}

/// Percentage with an explicit sign for non-zero values, e.g. `+5.56%`.
#[must_use]
pub fn signed_percent(value: f64) -> String {
    let magnitude = general(value.abs());
    if magnitude == "0" {
        "0%".to_owned()
    } else if value > 0.0 {
        format!("+{magnitude}%")
    } else {
        format!("-{magnitude}%")
    }
}

/// A metrics table cell. R2 is fixed at two decimals; the rest use [`general`].
#[must_use]
pub fn metric_cell(metric: Metric, value: Option<f64>) -> String {
    match (metric, value) {
        (_, None) => PLACEHOLDER.to_owned(),
        (Metric::R2, Some(v)) => fixed2(v),
        (_, Some(v)) => general(v),
    }
}

/// Epoch milliseconds as `YYYY-MM-DD HH:MM` (UTC).
#[must_use]
pub fn timestamp(ts_ms: i64) -> String {
    let nanos = i128::from(ts_ms) * 1_000_000;
    let minutes = format_description!("[year]-[month]-[day] [hour]:[minute]");
    match OffsetDateTime::from_unix_timestamp_nanos(nanos).map(|dt| dt.format(minutes)) {
        Ok(Ok(text)) => text,
        _ => PLACEHOLDER.to_owned(),
    }
}
