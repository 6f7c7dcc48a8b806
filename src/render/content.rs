//! Host-neutral surface content.
//!
//! A host turns these into whatever it draws with (chart instances, DOM
//! tables, terminal text). `Display` gives the plain-text rendering the
//! headless host and CLI use.

use std::fmt;

use crate::model::EntryKey;

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceContent {
    Cards(Vec<StatCard>),
    Chart(ChartSpec),
    Table(TableView),
}

// =============================================================================
// CARDS
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tone {
    #[default]
    Neutral,
    Up,
    Down,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatCard {
    pub title: String,
    pub value: String,
    pub detail: Option<String>,
    pub tone: Tone,
    /// History entry this card stands for, when it stands for one.
    pub key: Option<EntryKey>,
}

impl StatCard {
    pub fn new(title: impl Into<String>, value: impl Into<String>) -> Self {
        Self { title: title.into(), value: value.into(), detail: None, tone: Tone::Neutral, key: None }
    }

    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    #[must_use]
    pub fn with_tone(mut self, tone: Tone) -> Self {
        self.tone = tone;
        self
    }

    #[must_use]
    pub fn with_key(mut self, key: EntryKey) -> Self {
        self.key = Some(key);
        self
    }
}

// =============================================================================
// CHARTS
// =============================================================================

/// How a dataset's area is filled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Fill {
    #[default]
    None,
    /// Shade the area between this dataset and the dataset at the index.
    ToDataset(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub label: String,
    pub color: &'static str,
    pub points: Vec<f64>,
    pub fill: Fill,
    pub dashed: bool,
}

impl Dataset {
    pub fn line(label: impl Into<String>, color: &'static str, points: Vec<f64>) -> Self {
        Self { label: label.into(), color, points, fill: Fill::None, dashed: false }
    }
}

/// A line chart: x-axis labels plus datasets indexed positionally to them.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub title: String,
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

// =============================================================================
// TABLES
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub key: Option<EntryKey>,
    pub cells: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableView {
    pub columns: Vec<String>,
    pub rows: Vec<TableRow>,
}

// =============================================================================
// TEXT RENDERING
// =============================================================================

impl fmt::Display for SurfaceContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cards(cards) => {
                for card in cards {
                    write!(f, "[{}] {}", card.title, card.value)?;
                    if let Some(detail) = &card.detail {
                        write!(f, " ({detail})")?;
                    }
                    writeln!(f)?;
                }
                Ok(())
            }
            Self::Chart(chart) => {
                writeln!(f, "{}", chart.title)?;
                writeln!(f, "  x: {}", chart.labels.join(" "))?;
                for ds in &chart.datasets {
                    let points = ds.points.iter().map(|p| format!("{p:.2}")).collect::<Vec<_>>().join(" ");
                    writeln!(f, "  {} {}: {points}", ds.label, ds.color)?;
                }
                Ok(())
            }
            Self::Table(table) => {
                let mut widths: Vec<usize> = table.columns.iter().map(|c| c.chars().count()).collect();
                for row in &table.rows {
                    for (i, cell) in row.cells.iter().enumerate() {
                        if let Some(w) = widths.get_mut(i) {
                            *w = (*w).max(cell.chars().count());
                        }
                    }
                }
                write_row(f, &table.columns, &widths)?;
                for row in &table.rows {
                    write_row(f, &row.cells, &widths)?;
                }
                Ok(())
            }
        }
    }
}

fn write_row(f: &mut fmt::Formatter<'_>, cells: &[String], widths: &[usize]) -> fmt::Result {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    writeln!(f, "{}", line.trim_end())
}
