//! # Domain Types
//!
//! Core domain types consumed and produced by the report engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  Transaction    │   │    LineItem     │   │   EntityRef     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │◄──│  item_entity_id │   │  id             │       │
//! │  │  date           │   │  quantity       │   │  display_name   │       │
//! │  │  header_entity  │   │  unit_price?    │   └─────────────────┘       │
//! │  │  total (Money)  │   └─────────────────┘                              │
//! │  └─────────────────┘                                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  PeriodWindow   │   │  AggregateRow   │   │   ReportKind    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  start ≤ end    │   │  entity_id      │   │  Purchases      │       │
//! │  │  (inclusive)    │   │  display_name   │   │  Sales          │       │
//! │  └─────────────────┘   │  metric: M      │   └─────────────────┘       │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## One Engine, Two Domains
//! | Kind        | Line-item entity | Header entity |
//! |-------------|------------------|---------------|
//! | `Purchases` | supply (insumo)  | provider      |
//! | `Sales`     | product          | client        |

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{CoreError, ValidationError};
use crate::money::Money;

// =============================================================================
// Record Date
// =============================================================================

/// The date of a transaction as received from upstream.
///
/// Time-of-day is dropped at parse time so period comparisons work on whole
/// calendar days. A record that arrives at `2024-01-31T18:45:00Z` belongs to
/// January 31st and is inside a window ending on that day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum RecordDate {
    /// A valid calendar day.
    Date(NaiveDate),
    /// No date was sent.
    Missing,
    /// A value was sent but could not be read as a date.
    Invalid(String),
}

impl RecordDate {
    /// Parses an optional raw date.
    ///
    /// ## Accepted Formats
    /// - `2024-01-10`
    /// - `2024-01-10T15:30:00.000Z` / `2024-01-10T15:30:00-05:00` (UTC day)
    /// - `2024-01-10T15:30:00` / `2024-01-10 15:30:00`
    ///
    /// ## Example
    /// ```rust
    /// use chrono::NaiveDate;
    /// use taller_core::RecordDate;
    ///
    /// let day = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
    /// assert_eq!(RecordDate::parse(Some("2024-01-10T23:59:59.000Z")), RecordDate::Date(day));
    /// assert_eq!(RecordDate::parse(Some("  ")), RecordDate::Missing);
    /// assert!(matches!(RecordDate::parse(Some("10/01/2024")), RecordDate::Invalid(_)));
    /// ```
    pub fn parse(raw: Option<&str>) -> Self {
        let raw = match raw.map(str::trim) {
            None | Some("") => return RecordDate::Missing,
            Some(raw) => raw,
        };

        match parse_calendar_date(raw) {
            Some(date) => RecordDate::Date(date),
            None => RecordDate::Invalid(raw.to_string()),
        }
    }

    /// Returns the calendar day when the date is valid.
    #[inline]
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            RecordDate::Date(date) => Some(*date),
            _ => None,
        }
    }
}

impl From<NaiveDate> for RecordDate {
    fn from(date: NaiveDate) -> Self {
        RecordDate::Date(date)
    }
}

impl From<Option<String>> for RecordDate {
    fn from(raw: Option<String>) -> Self {
        RecordDate::parse(raw.as_deref())
    }
}

impl From<RecordDate> for Option<String> {
    fn from(date: RecordDate) -> Self {
        match date {
            RecordDate::Date(date) => Some(date.format("%Y-%m-%d").to_string()),
            RecordDate::Missing => None,
            RecordDate::Invalid(raw) => Some(raw),
        }
    }
}

/// Parses a date or timestamp string into its calendar day.
///
/// Returns `None` for anything that is not one of the formats listed on
/// [`RecordDate::parse`].
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.with_timezone(&Utc).date_naive());
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|timestamp| timestamp.date())
}

// =============================================================================
// Transaction & Line Item
// =============================================================================

/// One purchase or one sale.
///
/// Owned by the caller; the engine only ever borrows it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Upstream identifier (`id_compra` / `id_venta`).
    pub id: String,

    /// Calendar day the transaction happened.
    pub date: RecordDate,

    /// Provider (purchases) or client (sales).
    pub header_entity_id: String,

    /// Transaction total.
    pub total: Money,

    /// Ordered line items.
    #[serde(default)]
    pub line_items: Vec<LineItem>,
}

impl Transaction {
    /// Sum of all line-item quantities.
    pub fn total_quantity(&self) -> i64 {
        self.line_items.iter().map(|item| item.quantity).sum()
    }
}

/// One supply/product quantity entry within a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Supply (purchases) or product (sales).
    pub item_entity_id: String,

    /// Units bought or sold. Expected to be non-negative.
    pub quantity: i64,

    /// Price per unit, when upstream sends one.
    #[serde(default)]
    pub unit_price: Option<Money>,
}

impl LineItem {
    /// Returns `unit_price × quantity` when the unit price is known.
    ///
    /// ## Example
    /// ```rust
    /// use taller_core::{LineItem, Money};
    ///
    /// let item = LineItem {
    ///     item_entity_id: "7".to_string(),
    ///     quantity: 3,
    ///     unit_price: Some(Money::from_cents(299)),
    /// };
    /// assert_eq!(item.line_total(), Some(Money::from_cents(897)));
    /// ```
    #[inline]
    pub fn line_total(&self) -> Option<Money> {
        self.unit_price
            .map(|price| price.multiply_quantity(self.quantity))
    }
}

// =============================================================================
// Entity Reference
// =============================================================================

/// A supply, product, provider or client as listed upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    pub id: String,
    pub display_name: String,
}

impl EntityRef {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        EntityRef {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

/// Which grouping an entity id belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum EntityRole {
    /// Supply or product referenced by a line item.
    Item,
    /// Provider or client referenced by a transaction header.
    Header,
}

impl fmt::Display for EntityRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityRole::Item => write!(f, "item"),
            EntityRole::Header => write!(f, "header"),
        }
    }
}

// =============================================================================
// Period Window
// =============================================================================

/// Inclusive `[start, end]` range of calendar days.
///
/// `start > end` is representable on purpose: the filter treats such a
/// window as empty instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PeriodWindow {
    #[ts(as = "String")]
    pub start: NaiveDate,
    #[ts(as = "String")]
    pub end: NaiveDate,
}

impl PeriodWindow {
    /// Creates a window without validating its order.
    #[inline]
    pub const fn new(start: NaiveDate, end: NaiveDate) -> Self {
        PeriodWindow { start, end }
    }

    /// Builds a window from the two date inputs of a report form.
    ///
    /// ## Rules
    /// - Both dates are required
    /// - Both must be calendar dates (timestamps are truncated to their day)
    /// - `start` must not be after `end`
    ///
    /// ## Example
    /// ```rust
    /// use taller_core::PeriodWindow;
    ///
    /// assert!(PeriodWindow::from_inputs(Some("2024-01-01"), Some("2024-01-31")).is_ok());
    /// assert!(PeriodWindow::from_inputs(None, Some("2024-01-31")).is_err());
    /// assert!(PeriodWindow::from_inputs(Some("2024-02-01"), Some("2024-01-31")).is_err());
    /// ```
    pub fn from_inputs(start: Option<&str>, end: Option<&str>) -> Result<Self, ValidationError> {
        let start = required_date("start date", start)?;
        let end = required_date("end date", end)?;

        if start > end {
            return Err(ValidationError::InvalidRange {
                field: "period".to_string(),
                start: start.to_string(),
                end: end.to_string(),
            });
        }

        Ok(PeriodWindow { start, end })
    }

    /// Returns true when `start <= end`.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.start <= self.end
    }

    /// Inclusive containment check. Always false for an inverted window.
    #[inline]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl fmt::Display for PeriodWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {}",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }
}

fn required_date(field: &str, raw: Option<&str>) -> Result<NaiveDate, ValidationError> {
    match RecordDate::parse(raw) {
        RecordDate::Date(date) => Ok(date),
        RecordDate::Missing => Err(ValidationError::Required {
            field: field.to_string(),
        }),
        RecordDate::Invalid(raw) => Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: format!("'{}' is not a date (expected YYYY-MM-DD)", raw),
        }),
    }
}

// =============================================================================
// Aggregate Row
// =============================================================================

/// Accumulated metric for one entity across a filtered transaction set.
///
/// `M` is `i64` for quantity groupings and [`Money`] for money groupings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AggregateRow<M> {
    pub entity_id: String,
    pub display_name: String,
    pub metric: M,
}

// =============================================================================
// Report Kind
// =============================================================================

/// The two instantiations of the report engine.
///
/// Carries every domain-specific string; the pipeline itself never looks at
/// the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    /// Purchases grouped by supply and provider.
    Purchases,
    /// Sales grouped by product and client.
    Sales,
}

impl ReportKind {
    /// Short domain name used in file names (`compras` / `ventas`).
    pub const fn domain(&self) -> &'static str {
        match self {
            ReportKind::Purchases => "compras",
            ReportKind::Sales => "ventas",
        }
    }

    /// Report title, also used as the worksheet name.
    pub const fn title(&self) -> &'static str {
        match self {
            ReportKind::Purchases => "Informe de Compras",
            ReportKind::Sales => "Informe de Ventas",
        }
    }

    /// Label of the transaction count row.
    pub const fn count_label(&self) -> &'static str {
        match self {
            ReportKind::Purchases => "Número de Compras Realizadas",
            ReportKind::Sales => "Número de Ventas Realizadas",
        }
    }

    /// Heading of the line-item ranking section.
    pub const fn item_heading(&self) -> &'static str {
        match self {
            ReportKind::Purchases => "Insumos más comprados",
            ReportKind::Sales => "Productos más vendidos",
        }
    }

    /// Heading of the header ranking section.
    pub const fn header_heading(&self) -> &'static str {
        match self {
            ReportKind::Purchases => "Proveedores con más compras",
            ReportKind::Sales => "Clientes que más compraron",
        }
    }

    /// Dataset label for the line-item chart.
    pub const fn item_dataset_label(&self) -> &'static str {
        match self {
            ReportKind::Purchases => "Cantidad Comprada",
            ReportKind::Sales => "Cantidad Vendida",
        }
    }

    /// Dataset label for the header chart.
    pub const fn header_dataset_label(&self) -> &'static str {
        "Total Comprado"
    }

    /// Workbook name for the spreadsheet adapter.
    ///
    /// ## Example
    /// ```rust
    /// use chrono::{TimeZone, Utc};
    /// use taller_core::ReportKind;
    ///
    /// let at = Utc.with_ymd_and_hms(2024, 2, 1, 9, 30, 0).unwrap();
    /// assert_eq!(
    ///     ReportKind::Sales.workbook_file_name(at),
    ///     "informe_ventas_2024-02-01.xlsx"
    /// );
    /// ```
    pub fn workbook_file_name(&self, generated_at: DateTime<Utc>) -> String {
        format!(
            "informe_{}_{}.xlsx",
            self.domain(),
            generated_at.format("%Y-%m-%d")
        )
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportKind::Purchases => write!(f, "purchases"),
            ReportKind::Sales => write!(f, "sales"),
        }
    }
}

impl FromStr for ReportKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "purchases" | "purchase" | "compras" => Ok(ReportKind::Purchases),
            "sales" | "sale" | "ventas" => Ok(ReportKind::Sales),
            other => Err(CoreError::UnknownReportKind(other.to_string())),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_plain_date() {
        assert_eq!(
            RecordDate::parse(Some("2024-01-05")),
            RecordDate::Date(day(2024, 1, 5))
        );
    }

    #[test]
    fn test_parse_drops_time_of_day() {
        assert_eq!(
            RecordDate::parse(Some("2024-01-31T23:59:59.999Z")),
            RecordDate::Date(day(2024, 1, 31))
        );
        assert_eq!(
            RecordDate::parse(Some("2024-01-31 08:00:00")),
            RecordDate::Date(day(2024, 1, 31))
        );
        assert_eq!(
            RecordDate::parse(Some("2024-01-31T08:00:00")),
            RecordDate::Date(day(2024, 1, 31))
        );
    }

    #[test]
    fn test_parse_offset_timestamp_uses_utc_day() {
        // 22:00 at -05:00 is 03:00 UTC the next day
        assert_eq!(
            RecordDate::parse(Some("2024-01-31T22:00:00-05:00")),
            RecordDate::Date(day(2024, 2, 1))
        );
    }

    #[test]
    fn test_parse_missing_and_invalid() {
        assert_eq!(RecordDate::parse(None), RecordDate::Missing);
        assert_eq!(RecordDate::parse(Some("")), RecordDate::Missing);
        assert_eq!(
            RecordDate::parse(Some("31/01/2024")),
            RecordDate::Invalid("31/01/2024".to_string())
        );
        assert!(matches!(
            RecordDate::parse(Some("2024-02-30")),
            RecordDate::Invalid(_)
        ));
    }

    #[test]
    fn test_record_date_serde() {
        let date: RecordDate = serde_json::from_str("\"2024-03-01T10:00:00.000Z\"").unwrap();
        assert_eq!(date, RecordDate::Date(day(2024, 3, 1)));
        assert_eq!(serde_json::to_string(&date).unwrap(), "\"2024-03-01\"");

        let missing: RecordDate = serde_json::from_str("null").unwrap();
        assert_eq!(missing, RecordDate::Missing);
    }

    #[test]
    fn test_window_contains_is_inclusive() {
        let window = PeriodWindow::new(day(2024, 1, 1), day(2024, 1, 31));
        assert!(window.contains(day(2024, 1, 1)));
        assert!(window.contains(day(2024, 1, 31)));
        assert!(!window.contains(day(2023, 12, 31)));
        assert!(!window.contains(day(2024, 2, 1)));
    }

    #[test]
    fn test_inverted_window_contains_nothing() {
        let window = PeriodWindow::new(day(2024, 2, 1), day(2024, 1, 1));
        assert!(!window.is_valid());
        assert!(!window.contains(day(2024, 1, 15)));
        assert!(!window.contains(day(2024, 2, 1)));
    }

    #[test]
    fn test_window_from_inputs() {
        let window = PeriodWindow::from_inputs(Some("2024-01-01"), Some("2024-01-31")).unwrap();
        assert_eq!(window.to_string(), "2024-01-01 - 2024-01-31");

        let single_day = PeriodWindow::from_inputs(Some("2024-01-01"), Some("2024-01-01"));
        assert!(single_day.is_ok());

        assert!(matches!(
            PeriodWindow::from_inputs(Some(""), Some("2024-01-31")),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            PeriodWindow::from_inputs(Some("2024-01-01"), Some("enero")),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(matches!(
            PeriodWindow::from_inputs(Some("2024-02-01"), Some("2024-01-01")),
            Err(ValidationError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_line_total() {
        let priced = LineItem {
            item_entity_id: "A".to_string(),
            quantity: 4,
            unit_price: Some(Money::from_cents(250)),
        };
        assert_eq!(priced.line_total(), Some(Money::from_cents(1000)));

        let unpriced = LineItem {
            unit_price: None,
            ..priced
        };
        assert_eq!(unpriced.line_total(), None);
    }

    #[test]
    fn test_report_kind_parsing() {
        assert_eq!("purchases".parse::<ReportKind>().unwrap(), ReportKind::Purchases);
        assert_eq!("Compras".parse::<ReportKind>().unwrap(), ReportKind::Purchases);
        assert_eq!("ventas".parse::<ReportKind>().unwrap(), ReportKind::Sales);
        assert!("production".parse::<ReportKind>().is_err());
    }

    #[test]
    fn test_report_kind_labels() {
        assert_eq!(ReportKind::Purchases.title(), "Informe de Compras");
        assert_eq!(ReportKind::Sales.item_heading(), "Productos más vendidos");
        assert_eq!(ReportKind::Purchases.domain(), "compras");
    }
}
