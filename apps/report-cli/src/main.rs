//! # taller-report
//!
//! Generates a purchase or sales report for a date window and prints it as
//! one JSON document.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        taller-report                                    │
//! │                                                                         │
//! │  Cli ──► ReportConfig ──► ApiClient ──► Snapshot                        │
//! │                                            │                            │
//! │                                            ▼                            │
//! │                                   generate_report (taller-core)         │
//! │                                            │                            │
//! │                                            ▼                            │
//! │       stdout ◄── ReportDocument { report, charts, exportRows, ... }     │
//! │       stderr ◄── tracing logs                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```text
//! taller-report purchases --from 2024-01-01 --to 2024-01-31
//! taller-report ventas --from 2024-01-01 --to 2024-03-31 --limit 10 --pretty
//! ```

mod config;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::builder::RangedU64ValueParser;
use clap::Parser;
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use taller_client::ApiClient;
use taller_core::report::{ChartSeries, ExportRow};
use taller_core::{generate_report, PeriodWindow, Report, ReportKind, ReportOutcome, ReportWarning};

use crate::config::ReportConfig;

// =============================================================================
// Arguments
// =============================================================================

#[derive(Debug, Parser)]
#[command(name = "taller-report", version, about = "Generate purchase and sales reports")]
struct Cli {
    /// Report kind: purchases (compras) or sales (ventas)
    kind: ReportKind,

    /// First day of the period, inclusive (YYYY-MM-DD)
    #[arg(long)]
    from: Option<String>,

    /// Last day of the period, inclusive (YYYY-MM-DD)
    #[arg(long)]
    to: Option<String>,

    /// Maximum bars per chart, at least 1 (overrides config)
    #[arg(long, value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    limit: Option<usize>,

    /// Path to a report.toml config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

// =============================================================================
// Output Document
// =============================================================================

/// Everything the console needs to render a report.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportDocument<'a> {
    report: &'a Report,
    item_chart: ChartSeries,
    header_chart: ChartSeries,
    export_rows: Vec<ExportRow>,
    workbook_file_name: String,
    warnings: &'a [ReportWarning],
}

impl<'a> ReportDocument<'a> {
    fn build(outcome: &'a ReportOutcome, chart_limit: Option<usize>, currency_symbol: &str) -> Self {
        let report = &outcome.report;
        ReportDocument {
            report,
            item_chart: report.item_chart(chart_limit),
            header_chart: report.header_chart(chart_limit),
            export_rows: report.export_rows(currency_symbol),
            workbook_file_name: report.workbook_file_name(),
            warnings: &outcome.warnings,
        }
    }
}

// =============================================================================
// Entry Point
// =============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let json = run(cli, Utc::now()).await?;
    println!("{}", json);

    Ok(())
}

async fn run(cli: Cli, generated_at: DateTime<Utc>) -> Result<String> {
    let window = PeriodWindow::from_inputs(cli.from.as_deref(), cli.to.as_deref())
        .context("Please select valid start and end dates")?;

    let config = ReportConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    info!(kind = %cli.kind, %window, api = %config.api.base_url, "Generating report");

    let client = ApiClient::new(&config.api.base_url, config.timeout())
        .context("Failed to create API client")?;
    let snapshot = client
        .fetch_snapshot(cli.kind)
        .await
        .with_context(|| format!("Failed to fetch {} data", cli.kind.domain()))?;

    let outcome = generate_report(
        cli.kind,
        &snapshot.transactions,
        window,
        &snapshot.items,
        &snapshot.headers,
        generated_at,
    );

    if outcome.report.transaction_count == 0 {
        warn!(kind = %cli.kind, %window, "No transactions in the selected period");
    }

    let chart_limit = cli.limit.or(config.output.chart_limit);
    let document = ReportDocument::build(&outcome, chart_limit, &config.output.currency_symbol);

    let json = if cli.pretty {
        serde_json::to_string_pretty(&document)
    } else {
        serde_json::to_string(&document)
    }
    .context("Failed to serialize report")?;

    Ok(json)
}

/// Logs go to stderr; stdout carries only the report.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,taller=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
