//! # Aggregator
//!
//! Accumulates per-entity counters over a filtered transaction set.
//!
//! ## Two Independent Groupings
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  for each transaction                                                  │
//! │  │                                                                      │
//! │  ├── for each line item ──► items[item_entity_id].metric += quantity   │
//! │  │                          (integer units)                             │
//! │  │                                                                      │
//! │  └── once ────────────────► headers[header_entity_id].metric += total  │
//! │                             (integer cents)                             │
//! │                                                                         │
//! │  Display names are resolved once, when a key is first seen.            │
//! │  A miss becomes "Desconocido", never an error.                         │
//! │  A sum past i64::MAX clamps at the bound, never wraps.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Both maps are created inside [`aggregate`] and returned by value; nothing
//! survives between calls, so the same input always yields the same maps.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use tracing::{debug, warn};

use super::ReportWarning;
use crate::money::Money;
use crate::resolver::{EntityResolver, UNKNOWN_ENTITY_LABEL};
use crate::types::{AggregateRow, EntityRole, Transaction};

/// Per-entity accumulations for one report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregates {
    /// Supply/product id → summed quantity.
    pub items: HashMap<String, AggregateRow<i64>>,
    /// Provider/client id → summed total.
    pub headers: HashMap<String, AggregateRow<Money>>,
    /// Resolver misses and clamped quantities.
    pub warnings: Vec<ReportWarning>,
}

/// Groups `transactions` by line-item entity and by header entity.
///
/// ## Arguments
/// * `transactions` - Already filtered by period
/// * `item_resolver` - Names supplies (purchases) or products (sales)
/// * `header_resolver` - Names providers (purchases) or clients (sales)
///
/// ## Rules
/// - Line-item quantities are summed as integers; a negative quantity is
///   counted as zero and reported as [`ReportWarning::NegativeQuantity`]
/// - Transaction totals are summed once per transaction, in cents
/// - Each unresolved id yields one [`ReportWarning::UnresolvedEntity`]
/// - A sum that leaves the `i64` range is clamped at the bound and yields
///   one [`ReportWarning::MetricOverflow`] per entity
pub fn aggregate<I, H>(transactions: &[&Transaction], item_resolver: &I, header_resolver: &H) -> Aggregates
where
    I: EntityResolver + ?Sized,
    H: EntityResolver + ?Sized,
{
    let mut aggregates = Aggregates::default();

    for transaction in transactions {
        for item in &transaction.line_items {
            let quantity = if item.quantity < 0 {
                warn!(
                    transaction_id = %transaction.id,
                    entity_id = %item.item_entity_id,
                    quantity = item.quantity,
                    "Negative line quantity counted as zero"
                );
                aggregates.warnings.push(ReportWarning::NegativeQuantity {
                    transaction_id: transaction.id.clone(),
                    entity_id: item.item_entity_id.clone(),
                    quantity: item.quantity,
                });
                0
            } else {
                item.quantity
            };

            let row = row_for(
                &mut aggregates.items,
                &mut aggregates.warnings,
                &item.item_entity_id,
                EntityRole::Item,
                item_resolver,
            );
            match row.metric.checked_add(quantity) {
                Some(sum) => row.metric = sum,
                None => {
                    row.metric = row.metric.saturating_add(quantity);
                    note_overflow(&mut aggregates.warnings, EntityRole::Item, &item.item_entity_id);
                }
            }
        }

        let row = row_for(
            &mut aggregates.headers,
            &mut aggregates.warnings,
            &transaction.header_entity_id,
            EntityRole::Header,
            header_resolver,
        );
        match row.metric.checked_add(transaction.total) {
            Some(sum) => row.metric = sum,
            None => {
                row.metric = row.metric.saturating_add(transaction.total);
                note_overflow(
                    &mut aggregates.warnings,
                    EntityRole::Header,
                    &transaction.header_entity_id,
                );
            }
        }
    }

    debug!(
        transactions = transactions.len(),
        items = aggregates.items.len(),
        headers = aggregates.headers.len(),
        "Aggregation complete"
    );

    aggregates
}

/// Records a clamped sum, once per entity.
fn note_overflow(warnings: &mut Vec<ReportWarning>, role: EntityRole, id: &str) {
    let seen = warnings.iter().any(|warning| {
        matches!(
            warning,
            ReportWarning::MetricOverflow { role: r, entity_id } if *r == role && entity_id == id
        )
    });
    if !seen {
        warn!(%role, entity_id = %id, "Aggregate overflowed, clamping at the i64 bound");
        warnings.push(ReportWarning::MetricOverflow {
            role,
            entity_id: id.to_string(),
        });
    }
}

/// Looks up the row for `id`, creating it with a resolved name on first sight.
fn row_for<'m, M, R>(
    rows: &'m mut HashMap<String, AggregateRow<M>>,
    warnings: &mut Vec<ReportWarning>,
    id: &str,
    role: EntityRole,
    resolver: &R,
) -> &'m mut AggregateRow<M>
where
    M: Default,
    R: EntityResolver + ?Sized,
{
    match rows.entry(id.to_string()) {
        Entry::Occupied(entry) => entry.into_mut(),
        Entry::Vacant(entry) => {
            let display_name = match resolver.resolve(id) {
                Some(name) => name,
                None => {
                    debug!(%role, entity_id = %id, "Unresolved entity, using fallback label");
                    warnings.push(ReportWarning::UnresolvedEntity {
                        role,
                        entity_id: id.to_string(),
                    });
                    UNKNOWN_ENTITY_LABEL.to_string()
                }
            };

            entry.insert(AggregateRow {
                entity_id: id.to_string(),
                display_name,
                metric: M::default(),
            })
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
