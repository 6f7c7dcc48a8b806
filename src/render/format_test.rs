use super::*;

// =============================================================
// general / fixed2
// =============================================================

#[test]
fn general_drops_trailing_zeros() {
    assert_eq!(general(12.3), "12.3");
    assert_eq!(general(5.0), "5");
    assert_eq!(general(0.81), "0.81");
    assert_eq!(general(1234.5678), "1234.57");
}

#[test]
fn general_normalizes_negative_zero() {
    assert_eq!(general(-0.001), "0");
    assert_eq!(general(-2.5), "-2.5");
}

#[test]
fn fixed2_always_two_digits() {
    assert_eq!(fixed2(0.81), "0.81");
    assert_eq!(fixed2(1.0), "1.00");
    assert_eq!(fixed2(-0.0001), "0.00");
}

// =============================================================
// signed_percent
// =============================================================

#[test]
fn signed_percent_marks_direction() {
    assert_eq!(signed_percent(5.56), "+5.56%");
    assert_eq!(signed_percent(-3.2), "-3.2%");
    assert_eq!(signed_percent(0.0), "0%");
    assert_eq!(signed_percent(0.001), "0%");
}

// =============================================================
// metric_cell
// =============================================================

#[test]
fn metric_cells_format_per_metric() {
    assert_eq!(metric_cell(Metric::Mae, Some(12.3)), "12.3");
    assert_eq!(metric_cell(Metric::Rmse, None), PLACEHOLDER);
    assert_eq!(metric_cell(Metric::R2, Some(0.81)), "0.81");
    assert_eq!(metric_cell(Metric::R2, Some(0.8)), "0.80");
    assert_eq!(metric_cell(Metric::Mape, Some(5.0)), "5");
}

#[test]
fn absent_metric_is_never_zero() {
    for metric in Metric::ALL {
        assert_ne!(metric_cell(metric, None), "0");
    }
}

// =============================================================
// timestamp
// =============================================================

#[test]
fn timestamp_formats_utc_minutes() {
    assert_eq!(timestamp(0), "1970-01-01 00:00");
    assert_eq!(timestamp(1_700_000_000_000), "2023-11-14 22:13");
}

#[test]
fn timestamp_out_of_range_is_placeholder() {
    assert_eq!(timestamp(i64::MAX), PLACEHOLDER);
    assert_eq!(timestamp(crate::history::MAX_TS_MS), "9999-12-31 23:59");
}
