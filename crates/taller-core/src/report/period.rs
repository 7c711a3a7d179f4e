//! # Period Filter
//!
//! Selects the transactions whose calendar day falls inside a
//! [`PeriodWindow`].
//!
//! ```text
//!   input (caller-owned, untouched)       output (borrowed, same order)
//!   ───────────────────────────────       ─────────────────────────────
//!   #1  2024-01-05        ── in ──►       #1
//!   #2  <missing>         ── skip ─►      warning: MissingDate(#2)
//!   #3  2024-02-02        ── out ──
//!   #4  2024-01-31        ── in ──►       #4
//!   #5  "31/01/24"        ── skip ─►      warning: InvalidDate(#5)
//! ```

use tracing::{debug, warn};

use super::ReportWarning;
use crate::types::{PeriodWindow, RecordDate, Transaction};

/// Result of filtering a transaction set by period.
#[derive(Debug, Clone, Default)]
pub struct FilteredTransactions<'a> {
    /// Selected transactions, in their original relative order.
    pub transactions: Vec<&'a Transaction>,
    /// Records skipped because of their date, plus window problems.
    pub warnings: Vec<ReportWarning>,
}

impl<'a> FilteredTransactions<'a> {
    /// Number of selected transactions.
    #[inline]
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Number of records dropped for a missing or unreadable date.
    pub fn skipped(&self) -> usize {
        self.warnings
            .iter()
            .filter(|warning| {
                matches!(
                    warning,
                    ReportWarning::MissingDate { .. } | ReportWarning::InvalidDate { .. }
                )
            })
            .count()
    }
}

/// Keeps the transactions dated within `window`, both ends inclusive.
///
/// ## Edge Cases
/// - `window.start > window.end` → nothing selected, one
///   [`ReportWarning::InvertedWindow`], no error
/// - missing date → record skipped, [`ReportWarning::MissingDate`]
/// - unparseable date → record skipped, [`ReportWarning::InvalidDate`]
///
/// Date problems are reported even when the window is inverted, so the
/// caller always learns about bad records.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use taller_core::report::filter_by_period;
/// use taller_core::{Money, PeriodWindow, RecordDate, Transaction};
///
/// let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
/// let sale = Transaction {
///     id: "1".into(),
///     date: RecordDate::Date(day(31)),
///     header_entity_id: "C1".into(),
///     total: Money::from_cents(100),
///     line_items: vec![],
/// };
///
/// let transactions = [sale];
/// let filtered = filter_by_period(&transactions, PeriodWindow::new(day(1), day(31)));
/// assert_eq!(filtered.len(), 1);
/// ```
pub fn filter_by_period(transactions: &[Transaction], window: PeriodWindow) -> FilteredTransactions<'_> {
    let mut filtered = FilteredTransactions::default();

    if !window.is_valid() {
        warn!(%window, "Period start is after period end; selecting nothing");
        filtered.warnings.push(ReportWarning::InvertedWindow { window });
    }

    for transaction in transactions {
        match &transaction.date {
            RecordDate::Date(date) => {
                if window.contains(*date) {
                    filtered.transactions.push(transaction);
                }
            }
            RecordDate::Missing => {
                warn!(transaction_id = %transaction.id, "Skipping transaction without date");
                filtered.warnings.push(ReportWarning::MissingDate {
                    transaction_id: transaction.id.clone(),
                });
            }
            RecordDate::Invalid(raw) => {
                warn!(transaction_id = %transaction.id, raw = %raw, "Skipping transaction with unparseable date");
                filtered.warnings.push(ReportWarning::InvalidDate {
                    transaction_id: transaction.id.clone(),
                    raw: raw.clone(),
                });
            }
        }
    }

    debug!(
        total = transactions.len(),
        selected = filtered.len(),
        skipped = filtered.skipped(),
        %window,
        "Period filter applied"
    );

    filtered
}

// =============================================================================
// Unit Tests
// =============================================================================
