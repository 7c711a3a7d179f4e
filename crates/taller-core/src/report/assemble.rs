//! # Report Assembler
//!
//! Packages rankings and period metadata into a [`Report`], and derives the
//! two downstream views from it.
//!
//! ```text
//!                         ┌───────────────────┐
//!                         │      Report       │
//!                         │  kind, period,    │
//!                         │  count, rankings  │
//!                         └─────────┬─────────┘
//!                  ┌────────────────┴────────────────┐
//!                  ▼                                 ▼
//!        to_chart_series()                   to_export_rows()
//!        { labels, values }                  [ { label, value } ]
//!        bar / doughnut adapter              spreadsheet adapter
//! ```
//!
//! Both views read the same ranking vectors, so the chart and the workbook
//! always list the same entities in the same order.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{AggregateRow, PeriodWindow, ReportKind};

// =============================================================================
// Report
// =============================================================================

/// The result of one report generation. Never mutated after assembly.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub kind: ReportKind,
    #[ts(as = "String")]
    pub generated_at: DateTime<Utc>,
    pub period: PeriodWindow,
    pub transaction_count: usize,
    /// Supplies/products by summed quantity.
    pub item_ranking: Vec<AggregateRow<i64>>,
    /// Providers/clients by summed total.
    pub header_ranking: Vec<AggregateRow<Money>>,
}

/// Builds a [`Report`]. Pure construction, no I/O.
pub fn assemble(
    kind: ReportKind,
    period: PeriodWindow,
    transaction_count: usize,
    item_ranking: Vec<AggregateRow<i64>>,
    header_ranking: Vec<AggregateRow<Money>>,
    generated_at: DateTime<Utc>,
) -> Report {
    Report {
        kind,
        generated_at,
        period,
        transaction_count,
        item_ranking,
        header_ranking,
    }
}

impl Report {
    /// True when no transaction fell inside the period.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.transaction_count == 0
    }

    /// Sum of the item ranking metrics.
    pub fn total_quantity(&self) -> i64 {
        self.item_ranking.iter().map(|row| row.metric).sum()
    }

    /// Sum of the header ranking metrics.
    pub fn total_amount(&self) -> Money {
        self.header_ranking.iter().map(|row| row.metric).sum()
    }

    /// Chart series for the item ranking (bar chart).
    pub fn item_chart(&self, limit: Option<usize>) -> ChartSeries {
        to_chart_series(&self.item_ranking, self.kind.item_dataset_label(), limit)
    }

    /// Chart series for the header ranking (doughnut chart).
    pub fn header_chart(&self, limit: Option<usize>) -> ChartSeries {
        to_chart_series(&self.header_ranking, self.kind.header_dataset_label(), limit)
    }

    /// Flat rows for the spreadsheet adapter. See [`to_export_rows`].
    pub fn export_rows(&self, currency_symbol: &str) -> Vec<ExportRow> {
        to_export_rows(self, currency_symbol)
    }

    /// Workbook name derived from the kind and the generation date.
    pub fn workbook_file_name(&self) -> String {
        self.kind.workbook_file_name(self.generated_at)
    }
}

// =============================================================================
// Chart Series
// =============================================================================

/// A metric that can be plotted.
pub trait ChartValue {
    fn chart_value(&self) -> f64;
}

impl ChartValue for i64 {
    fn chart_value(&self) -> f64 {
        *self as f64
    }
}

impl ChartValue for Money {
    fn chart_value(&self) -> f64 {
        self.as_major_f64()
    }
}

/// Labels and values for one chart dataset, index-aligned.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ChartSeries {
    pub dataset_label: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl ChartSeries {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Projects a ranking onto chart labels and values.
///
/// With `limit`, only the first `limit` ranked rows are kept. The rest are
/// dropped, not merged into an "other" slice.
///
/// ## Example
/// ```rust
/// use taller_core::report::to_chart_series;
/// use taller_core::{AggregateRow, Money};
///
/// let ranking = vec![
///     AggregateRow { entity_id: "1".into(), display_name: "Ana".into(), metric: Money::from_cents(15000) },
///     AggregateRow { entity_id: "2".into(), display_name: "Luis".into(), metric: Money::from_cents(2550) },
/// ];
/// let series = to_chart_series(&ranking, "Total Comprado", Some(1));
/// assert_eq!(series.labels, ["Ana"]);
/// assert_eq!(series.values, [150.0]);
/// ```
pub fn to_chart_series<M: ChartValue>(
    ranking: &[AggregateRow<M>],
    dataset_label: &str,
    limit: Option<usize>,
) -> ChartSeries {
    let shown = limit.map_or(ranking.len(), |limit| limit.min(ranking.len()));
    let rows = &ranking[..shown];

    ChartSeries {
        dataset_label: dataset_label.to_string(),
        labels: rows.iter().map(|row| row.display_name.clone()).collect(),
        values: rows.iter().map(|row| row.metric.chart_value()).collect(),
    }
}

// =============================================================================
// Export Rows
// =============================================================================

/// Cell value of an export row.
///
/// Serializes as a bare JSON string or number; `Empty` becomes `""`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportValue {
    Text(String),
    Number(i64),
    Empty,
}

impl Serialize for ExportValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ExportValue::Text(text) => serializer.serialize_str(text),
            ExportValue::Number(number) => serializer.serialize_i64(*number),
            ExportValue::Empty => serializer.serialize_str(""),
        }
    }
}

/// One `label | value` row of the exported sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct ExportRow {
    pub label: String,
    #[ts(type = "string | number")]
    pub value: ExportValue,
}

impl ExportRow {
    fn text(label: impl Into<String>, value: impl Into<String>) -> Self {
        ExportRow {
            label: label.into(),
            value: ExportValue::Text(value.into()),
        }
    }

    fn number(label: impl Into<String>, value: i64) -> Self {
        ExportRow {
            label: label.into(),
            value: ExportValue::Number(value),
        }
    }

    fn heading(label: impl Into<String>) -> Self {
        ExportRow {
            label: label.into(),
            value: ExportValue::Empty,
        }
    }

    /// Blank separator row.
    pub fn blank() -> Self {
        ExportRow::heading("")
    }

    /// True for separator rows.
    pub fn is_blank(&self) -> bool {
        self.label.is_empty() && self.value == ExportValue::Empty
    }
}

/// Flattens a report into `label | value` rows.
///
/// ## Layout
/// ```text
/// Informe de Compras            |
/// Fecha de Generación           | 2024-02-01
/// Periodo                       | 2024-01-01 - 2024-01-31
/// Número de Compras Realizadas  | 2
///                               |
/// Insumos más comprados         |
/// Harina                        | 5
/// Azúcar                        | 1
///                               |
/// Proveedores con más compras   |
/// Molinos del Sur               | $150.00
/// ```
pub fn to_export_rows(report: &Report, currency_symbol: &str) -> Vec<ExportRow> {
    let kind = report.kind;
    let mut rows = Vec::with_capacity(8 + report.item_ranking.len() + report.header_ranking.len());

    rows.push(ExportRow::heading(kind.title()));
    rows.push(ExportRow::text(
        "Fecha de Generación",
        report.generated_at.format("%Y-%m-%d").to_string(),
    ));
    rows.push(ExportRow::text("Periodo", report.period.to_string()));
    rows.push(ExportRow::number(
        kind.count_label(),
        report.transaction_count as i64,
    ));

    rows.push(ExportRow::blank());
    rows.push(ExportRow::heading(kind.item_heading()));
    rows.extend(
        report
            .item_ranking
            .iter()
            .map(|row| ExportRow::number(row.display_name.clone(), row.metric)),
    );

    rows.push(ExportRow::blank());
    rows.push(ExportRow::heading(kind.header_heading()));
    rows.extend(report.header_ranking.iter().map(|row| {
        ExportRow::text(
            row.display_name.clone(),
            row.metric.format_with_symbol(currency_symbol),
        )
    }));

    rows
}

// =============================================================================
// Unit Tests
// =============================================================================
