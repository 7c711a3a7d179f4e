//! # taller-core: Pure Report Engine for Taller
//!
//! This crate turns raw purchase or sale records into period reports:
//! how many transactions fell inside a date window, which supplies or
//! products moved the most units, and which providers or clients carried
//! the most money. It has no I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Taller Reporting                                 │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 taller-report (CLI, apps/report-cli)             │   │
//! │  │      args ──► config ──► fetch ──► generate ──► JSON on stdout  │   │
//! │  └──────────────┬──────────────────────────────┬───────────────────┘   │
//! │                 │                              │                        │
//! │  ┌──────────────▼───────────────┐   ┌──────────▼──────────────────┐    │
//! │  │   taller-client (REST)       │   │ ★ taller-core (THIS CRATE) ★│    │
//! │  │   /compras /insumos ...      │──►│                             │    │
//! │  │   wire DTOs → Transaction    │   │  types  money  resolver     │    │
//! │  └──────────────────────────────┘   │  report: filter → aggregate │    │
//! │                                     │          → rank → assemble  │    │
//! │                                     │                             │    │
//! │                                     │  NO I/O • NO NETWORK        │    │
//! │                                     └─────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Transactions, line items, period windows, report kinds
//! - [`money`] - Integer-cent money with exact decimal parsing
//! - [`resolver`] - Entity id → display name lookup
//! - [`report`] - The pipeline and its presentation views
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::{NaiveDate, Utc};
//! use taller_core::{generate_report, EntityDirectory, PeriodWindow, ReportKind};
//!
//! let window = PeriodWindow::from_inputs(Some("2024-01-01"), Some("2024-01-31")).unwrap();
//! let outcome = generate_report(
//!     ReportKind::Sales,
//!     &[],
//!     window,
//!     &EntityDirectory::new(),
//!     &EntityDirectory::new(),
//!     Utc::now(),
//! );
//!
//! assert!(outcome.report.is_empty());
//! assert_eq!(outcome.report.period.start, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod report;
pub mod resolver;
pub mod types;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use report::{generate_report, Report, ReportOutcome, ReportWarning};
pub use resolver::{EntityDirectory, EntityResolver, UNKNOWN_ENTITY_LABEL};
pub use types::*;
