//! # Report Pipeline
//!
//! Period-based aggregation of purchases or sales.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        generate_report()                                │
//! │                                                                         │
//! │  &[Transaction] ──► filter_by_period ──► aggregate ──┬──► rank(items)   │
//! │                     (period.rs)          (aggregate.rs)  └──► rank(headers)
//! │                          │                    │                 │       │
//! │                          ▼                    ▼                 ▼       │
//! │                      warnings             warnings         assemble     │
//! │                          └─────────┬──────────┘          (assemble.rs)  │
//! │                                    ▼                            │       │
//! │                          ReportOutcome { report, warnings } ◄───┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every stage is a pure function over borrowed input. There is no state
//! between invocations, so reports for independent inputs can be generated
//! concurrently without coordination.

mod aggregate;
mod assemble;
mod period;
mod rank;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use ts_rs::TS;

use crate::resolver::EntityResolver;
use crate::types::{EntityRole, PeriodWindow, ReportKind, Transaction};

pub use aggregate::{aggregate, Aggregates};
pub use assemble::{
    assemble, to_chart_series, to_export_rows, ChartSeries, ChartValue, ExportRow, ExportValue,
    Report,
};
pub use period::{filter_by_period, FilteredTransactions};
pub use rank::rank;

// =============================================================================
// Warnings
// =============================================================================

/// A recoverable problem met while generating a report.
///
/// Warnings never stop the pipeline; they travel next to the report so the
/// caller can decide whether to show them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportWarning {
    /// The window's start is after its end; nothing was selected.
    InvertedWindow { window: PeriodWindow },

    /// A transaction had no date and was skipped.
    MissingDate { transaction_id: String },

    /// A transaction's date could not be parsed and it was skipped.
    InvalidDate { transaction_id: String, raw: String },

    /// An entity id had no display name; the fallback label was used.
    UnresolvedEntity { role: EntityRole, entity_id: String },

    /// A line item carried a negative quantity; it was counted as zero.
    NegativeQuantity {
        transaction_id: String,
        entity_id: String,
        quantity: i64,
    },

    /// An entity's running sum left the `i64` range; it was clamped.
    MetricOverflow { role: EntityRole, entity_id: String },
}

impl fmt::Display for ReportWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportWarning::InvertedWindow { window } => write!(
                f,
                "period start {} is after period end {}",
                window.start, window.end
            ),
            ReportWarning::MissingDate { transaction_id } => {
                write!(f, "transaction {} has no date and was skipped", transaction_id)
            }
            ReportWarning::InvalidDate {
                transaction_id,
                raw,
            } => write!(
                f,
                "transaction {} has unreadable date '{}' and was skipped",
                transaction_id, raw
            ),
            ReportWarning::UnresolvedEntity { role, entity_id } => {
                write!(f, "unknown {} entity {}", role, entity_id)
            }
            ReportWarning::NegativeQuantity {
                transaction_id,
                entity_id,
                quantity,
            } => write!(
                f,
                "transaction {} has quantity {} for {}; counted as 0",
                transaction_id, quantity, entity_id
            ),
            ReportWarning::MetricOverflow { role, entity_id } => {
                write!(f, "{} entity {} overflowed and was clamped", role, entity_id)
            }
        }
    }
}

// =============================================================================
// Outcome
// =============================================================================

/// A report plus the warnings collected while building it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportOutcome {
    pub report: Report,
    pub warnings: Vec<ReportWarning>,
}

/// Runs the whole pipeline: filter → aggregate → rank ×2 → assemble.
///
/// Never fails. An inverted window, bad record dates, and unknown entities
/// all end up in [`ReportOutcome::warnings`].
///
/// ## Example
/// ```rust
/// use chrono::{NaiveDate, Utc};
/// use taller_core::report::generate_report;
/// use taller_core::{
///     EntityDirectory, EntityRef, LineItem, Money, PeriodWindow, RecordDate, ReportKind, Transaction,
/// };
///
/// let jan = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
/// let purchase = Transaction {
///     id: "1".into(),
///     date: RecordDate::Date(jan(5)),
///     header_entity_id: "P1".into(),
///     total: Money::from_cents(10_000),
///     line_items: vec![LineItem { item_entity_id: "A".into(), quantity: 3, unit_price: None }],
/// };
/// let supplies = EntityDirectory::from_entities(vec![EntityRef::new("A", "Harina")]);
/// let providers = EntityDirectory::from_entities(vec![EntityRef::new("P1", "Molinos")]);
///
/// let outcome = generate_report(
///     ReportKind::Purchases,
///     &[purchase],
///     PeriodWindow::new(jan(1), jan(31)),
///     &supplies,
///     &providers,
///     Utc::now(),
/// );
/// assert_eq!(outcome.report.transaction_count, 1);
/// assert_eq!(outcome.report.item_ranking[0].display_name, "Harina");
/// ```
pub fn generate_report<I, H>(
    kind: ReportKind,
    transactions: &[Transaction],
    window: PeriodWindow,
    item_resolver: &I,
    header_resolver: &H,
    generated_at: DateTime<Utc>,
) -> ReportOutcome
where
    I: EntityResolver + ?Sized,
    H: EntityResolver + ?Sized,
{
    let filtered = filter_by_period(transactions, window);
    let aggregates = aggregate(&filtered.transactions, item_resolver, header_resolver);

    let report = assemble(
        kind,
        window,
        filtered.len(),
        rank(aggregates.items),
        rank(aggregates.headers),
        generated_at,
    );

    let mut warnings = filtered.warnings;
    warnings.extend(aggregates.warnings);

    info!(
        %kind,
        %window,
        transactions = report.transaction_count,
        items = report.item_ranking.len(),
        headers = report.header_ranking.len(),
        warnings = warnings.len(),
        "Report generated"
    );

    ReportOutcome { report, warnings }
}

// =============================================================================
// Pipeline Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::resolver::{EntityDirectory, UNKNOWN_ENTITY_LABEL};
    use crate::types::{EntityRef, LineItem, RecordDate};
    use chrono::{NaiveDate, TimeZone};

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn item(id: &str, quantity: i64) -> LineItem {
        LineItem {
            item_entity_id: id.to_string(),
            quantity,
            unit_price: None,
        }
    }

    fn tx(id: &str, date: NaiveDate, header: &str, total_cents: i64, items: Vec<LineItem>) -> Transaction {
        Transaction {
            id: id.to_string(),
            date: RecordDate::Date(date),
            header_entity_id: header.to_string(),
            total: Money::from_cents(total_cents),
            line_items: items,
        }
    }

    fn example_transactions() -> Vec<Transaction> {
        vec![
            tx("1", day(1, 5), "P1", 10_000, vec![item("A", 3)]),
            tx("2", day(1, 10), "P1", 5_000, vec![item("A", 2), item("B", 1)]),
        ]
    }

    fn supplies() -> EntityDirectory {
        EntityDirectory::from_entities(vec![EntityRef::new("A", "A"), EntityRef::new("B", "B")])
    }

    fn providers() -> EntityDirectory {
        EntityDirectory::from_entities(vec![EntityRef::new("P1", "P1")])
    }

    fn run(transactions: &[Transaction], window: PeriodWindow) -> ReportOutcome {
        generate_report(
            ReportKind::Purchases,
            transactions,
            window,
            &supplies(),
            &providers(),
            at(),
        )
    }

    /// A larger, messier data set: duplicates, ties, boundaries, bad dates.
    fn mixed_transactions() -> Vec<Transaction> {
        let mut transactions = vec![
            tx("1", day(3, 1), "C1", 1_999, vec![item("X", 2), item("Y", 2)]),
            tx("2", day(3, 31), "C2", 1_999, vec![item("Y", 1)]),
            tx("3", day(3, 15), "C1", 10, vec![item("Z", 4), item("X", 1)]),
            tx("4", day(2, 29), "C3", 99_999, vec![item("X", 50)]),
            tx("5", day(4, 1), "C3", 1, vec![item("Y", 9)]),
            tx("6", day(3, 2), "C9", 333, vec![]),
        ];
        transactions.push(Transaction {
            date: RecordDate::Missing,
            ..tx("7", day(3, 3), "C1", 500, vec![item("X", 1)])
        });
        transactions
    }

    #[test]
    fn test_january_example() {
        let outcome = run(&example_transactions(), PeriodWindow::new(day(1, 1), day(1, 31)));
        let report = &outcome.report;

        assert_eq!(report.transaction_count, 2);
        let items: Vec<(&str, i64)> = report
            .item_ranking
            .iter()
            .map(|r| (r.entity_id.as_str(), r.metric))
            .collect();
        assert_eq!(items, vec![("A", 5), ("B", 1)]);

        assert_eq!(report.header_ranking.len(), 1);
        assert_eq!(report.header_ranking[0].entity_id, "P1");
        assert_eq!(report.header_ranking[0].metric, Money::from_cents(15_000));
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_february_example_is_empty() {
        let outcome = run(&example_transactions(), PeriodWindow::new(day(2, 1), day(2, 28)));

        assert_eq!(outcome.report.transaction_count, 0);
        assert!(outcome.report.item_ranking.is_empty());
        assert!(outcome.report.header_ranking.is_empty());
        assert!(outcome.report.is_empty());
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_inverted_window_yields_empty_report() {
        let window = PeriodWindow::new(day(1, 31), day(1, 1));
        let outcome = run(&example_transactions(), window);

        assert_eq!(outcome.report.transaction_count, 0);
        assert!(outcome.report.item_ranking.is_empty());
        assert!(outcome.report.header_ranking.is_empty());
        assert_eq!(outcome.warnings, vec![ReportWarning::InvertedWindow { window }]);
    }

    #[test]
    fn test_count_matches_inclusive_window() {
        let transactions = mixed_transactions();
        let window = PeriodWindow::new(day(3, 1), day(3, 31));
        let outcome = run(&transactions, window);

        let expected = transactions
            .iter()
            .filter(|t| t.date.as_date().map_or(false, |d| window.contains(d)))
            .count();
        assert_eq!(expected, 4);
        assert_eq!(outcome.report.transaction_count, expected);
    }

    #[test]
    fn test_quantity_is_conserved() {
        let transactions = mixed_transactions();
        let window = PeriodWindow::new(day(3, 1), day(3, 31));
        let outcome = run(&transactions, window);

        let expected: i64 = transactions
            .iter()
            .filter(|t| t.date.as_date().map_or(false, |d| window.contains(d)))
            .map(Transaction::total_quantity)
            .sum();
        assert_eq!(outcome.report.total_quantity(), expected);
        assert_eq!(expected, 10);
    }

    #[test]
    fn test_money_is_conserved_exactly() {
        let transactions = mixed_transactions();
        let window = PeriodWindow::new(day(3, 1), day(3, 31));
        let outcome = run(&transactions, window);

        let expected: Money = transactions
            .iter()
            .filter(|t| t.date.as_date().map_or(false, |d| window.contains(d)))
            .map(|t| t.total)
            .sum();
        assert_eq!(outcome.report.total_amount(), expected);
        assert_eq!(expected.cents(), 1_999 + 1_999 + 10 + 333);
    }

    #[test]
    fn test_rankings_are_non_increasing() {
        let outcome = run(&mixed_transactions(), PeriodWindow::new(day(1, 1), day(12, 31)));
        let report = &outcome.report;

        assert!(report.item_ranking.windows(2).all(|w| w[0].metric >= w[1].metric));
        assert!(report.header_ranking.windows(2).all(|w| w[0].metric >= w[1].metric));
    }

    #[test]
    fn test_pipeline_is_idempotent() {
        let transactions = mixed_transactions();
        let window = PeriodWindow::new(day(3, 1), day(3, 31));

        let first = run(&transactions, window);
        let second = run(&transactions, window);
        assert_eq!(first, second);
    }

    #[test]
    fn test_warnings_are_collected_across_stages() {
        let outcome = run(&mixed_transactions(), PeriodWindow::new(day(3, 1), day(3, 31)));

        assert!(outcome.warnings.contains(&ReportWarning::MissingDate {
            transaction_id: "7".to_string()
        }));
        assert!(outcome.warnings.contains(&ReportWarning::UnresolvedEntity {
            role: EntityRole::Header,
            entity_id: "C9".to_string()
        }));

        let unknown = outcome
            .report
            .header_ranking
            .iter()
            .find(|r| r.entity_id == "C9")
            .unwrap();
        assert_eq!(unknown.display_name, UNKNOWN_ENTITY_LABEL);
    }

    #[test]
    fn test_warning_display() {
        let warning = ReportWarning::InvalidDate {
            transaction_id: "12".to_string(),
            raw: "ayer".to_string(),
        };
        assert_eq!(
            warning.to_string(),
            "transaction 12 has unreadable date 'ayer' and was skipped"
        );
    }

    #[test]
    fn test_warning_serialization_is_tagged() {
        let json = serde_json::to_value(ReportWarning::MissingDate {
            transaction_id: "3".to_string(),
        })
        .unwrap();
        assert_eq!(json["kind"], "missing_date");
        assert_eq!(json["transaction_id"], "3");
    }

    #[test]
    fn test_concurrent_generation_over_shared_input() {
        let transactions = std::sync::Arc::new(mixed_transactions());
        let window = PeriodWindow::new(day(3, 1), day(3, 31));
        let expected = run(&transactions, window);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let transactions = std::sync::Arc::clone(&transactions);
                std::thread::spawn(move || run(&transactions, window))
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    }
}
