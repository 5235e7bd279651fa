//! Artifact export — JSON reports, CSV trade ledgers and sweep tables.
//!
//! All persisted reports include a `schema_version` field; unknown
//! versions are rejected on load.

use anyhow::{bail, Context, Result};

use hedgelab_core::sim::TradeRecord;

use crate::runner::{BacktestReport, SCHEMA_VERSION};
use crate::sweep::SweepResults;

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `BacktestReport` to pretty JSON.
pub fn export_report_json(report: &BacktestReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize BacktestReport to JSON")
}

/// Deserialize a `BacktestReport` from JSON, rejecting unknown schema versions.
pub fn import_report_json(json: &str) -> Result<BacktestReport> {
    let report: BacktestReport =
        serde_json::from_str(json).context("failed to deserialize BacktestReport from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export the trade ledger as CSV.
///
/// Columns: entry_bar, exit_bar, entry_price, exit_price, size_usd,
/// pnl_usd, bars_held
pub fn export_trades_csv(trades: &[TradeRecord]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "entry_bar",
        "exit_bar",
        "entry_price",
        "exit_price",
        "size_usd",
        "pnl_usd",
        "bars_held",
    ])?;

    for t in trades {
        wtr.write_record([
            &t.entry_bar.to_string(),
            &t.exit_bar.to_string(),
            &format!("{:.6}", t.entry_price),
            &format!("{:.6}", t.exit_price),
            &format!("{:.2}", t.size_usd),
            &format!("{:.2}", t.pnl_usd),
            &t.bars_held.to_string(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export an equity curve as CSV with bar_index and equity columns.
pub fn export_equity_csv(equity_curve: &[f64]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["bar_index", "equity"])?;
    for (i, eq) in equity_curve.iter().enumerate() {
        wtr.write_record([&i.to_string(), &format!("{:.2}", eq)])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Summary statistics included in the sweep table, in column order.
const SWEEP_STAT_COLUMNS: [&str; 10] = [
    "total_return_pct",
    "annualized_return_pct",
    "sharpe_ratio",
    "max_drawdown_pct",
    "calmar_ratio",
    "win_rate_pct",
    "profit_factor",
    "num_trades",
    "final_capital",
    "total_fees_usd",
];

/// Export sweep results as CSV: one row per parameter combination.
///
/// Parameter columns come first, then the summary statistics (blank when
/// a row does not carry the stat), then the error message for failure rows.
pub fn export_sweep_csv(results: &SweepResults) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = vec![
        "delta_threshold",
        "hedge_ratio",
        "max_position_size_usd",
        "stop_loss_fraction",
        "rebalance_cooldown_periods",
        "min_liquidity_ratio",
    ];
    header.extend(SWEEP_STAT_COLUMNS);
    header.push("error");
    wtr.write_record(&header)?;

    for row in results.rows() {
        let p = &row.params;
        let mut record = vec![
            format!("{}", p.delta_threshold),
            format!("{}", p.hedge_ratio),
            format!("{}", p.max_position_size_usd),
            format!("{}", p.stop_loss_fraction),
            format!("{}", p.rebalance_cooldown_periods),
            format!("{}", p.min_liquidity_ratio),
        ];
        for stat in SWEEP_STAT_COLUMNS {
            record.push(
                row.summary
                    .get(stat)
                    .map(|v| format!("{v}"))
                    .unwrap_or_default(),
            );
        }
        record.push(row.error.clone().unwrap_or_default());
        wtr.write_record(&record)?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}
