//! # taller-client: Console API Access for Taller Reports
//!
//! Fetches purchases, sales and the entity lists that name their supplies,
//! products, providers and clients, and normalizes them into
//! [`taller_core`] types.
//!
//! ## Usage
//! ```rust,no_run
//! use taller_client::{ApiClient, DEFAULT_TIMEOUT};
//! use taller_core::{generate_report, PeriodWindow, ReportKind};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ApiClient::new("http://localhost:3000/api", DEFAULT_TIMEOUT)?;
//! let snapshot = client.fetch_snapshot(ReportKind::Purchases).await?;
//!
//! let window = PeriodWindow::from_inputs(Some("2024-01-01"), Some("2024-01-31"))?;
//! let outcome = generate_report(
//!     ReportKind::Purchases,
//!     &snapshot.transactions,
//!     window,
//!     &snapshot.items,
//!     &snapshot.headers,
//!     chrono::Utc::now(),
//! );
//! println!("{} purchases", outcome.report.transaction_count);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod dto;
pub mod error;

pub use client::{ApiClient, Endpoints, Snapshot, DEFAULT_TIMEOUT};
pub use error::{ClientError, ClientResult};
