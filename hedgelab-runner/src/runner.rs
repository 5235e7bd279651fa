//! Backtest runner — wires signals, sizing, simulation, and metrics.
//!
//! One entry point: `run_backtest()` takes a validated series plus strategy
//! and cost configuration, runs the full pipeline with a fresh per-run
//! state, and assembles a fingerprinted, schema-versioned report.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use hedgelab_core::data::MarketSeries;
use hedgelab_core::domain::{DomainError, StrategyParameters};
use hedgelab_core::sim::{simulate, BacktestConfig, ConfigError, TradeRecord};
use hedgelab_core::sizer::size_signals;
use hedgelab_core::strategy::generate_signals_with_state;

use crate::metrics::PerformanceMetrics;

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("run spec error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Relative disagreement between the configured annualization factor and
/// the detected series frequency that triggers a data-quality warning.
pub const ANNUALIZATION_MISMATCH_TOLERANCE: f64 = 0.10;

/// Complete result of a single backtest run. Immutable once returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestReport {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    /// Deterministic content hash of (params, config).
    pub run_id: String,
    pub params: StrategyParameters,
    pub config: BacktestConfig,
    pub metrics: PerformanceMetrics,
    pub equity_curve: Vec<f64>,
    pub trades: Vec<TradeRecord>,
    pub bar_count: usize,
    pub entry_signals: usize,
    pub exit_signals: usize,
    pub hold_signals: usize,
    /// Flat, ordered stat map for sweep rows and CSV export. An unbounded
    /// profit factor is omitted here; read it from `metrics`.
    pub summary_stats: BTreeMap<String, f64>,
    pub data_quality_warnings: Vec<String>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Deterministic run fingerprint: blake3 over the serialized inputs.
///
/// Two runs with identical parameters and config share a `run_id`.
pub fn compute_run_id(params: &StrategyParameters, config: &BacktestConfig) -> String {
    let json =
        serde_json::to_vec(&(params, config)).expect("run configuration serialization failed");
    blake3::hash(&json).to_hex().to_string()
}

/// Run a single backtest over an in-memory series.
pub fn run_backtest(
    series: &MarketSeries,
    params: &StrategyParameters,
    config: &BacktestConfig,
) -> Result<BacktestReport, RunError> {
    config.validate()?;
    let (signals, mut state) = generate_signals_with_state(series, params)?;
    let vectors = size_signals(&signals);
    let outcome = simulate(&series.prices(), &vectors, config)?;
    state.record_realized_pnl(outcome.realized_pnl_usd());

    let metrics = PerformanceMetrics::compute(
        &outcome.equity_curve,
        &outcome.trades,
        config.initial_capital_usd,
        config.annualization_factor,
    );

    let mut warnings = Vec::new();
    if let Some(detected) = series.detected_bars_per_year() {
        let mismatch = (config.annualization_factor - detected).abs() / detected;
        if mismatch > ANNUALIZATION_MISMATCH_TOLERANCE {
            warnings.push(format!(
                "annualization factor {:.0} disagrees with {:.0} bars/year detected from median timestamp spacing",
                config.annualization_factor, detected
            ));
        }
    }

    let entry_signals = signals.iter().filter(|s| s.is_entry()).count();
    let exit_signals = signals.iter().filter(|s| s.is_exit()).count();
    let hold_signals = signals.len() - entry_signals - exit_signals;

    let summary_stats = build_summary(
        &metrics,
        config,
        outcome.final_capital_usd,
        outcome.total_fees_usd,
        state.cumulative_hedge_notional_usd,
        state.cumulative_pnl_usd,
    );

    Ok(BacktestReport {
        schema_version: SCHEMA_VERSION,
        run_id: compute_run_id(params, config),
        params: params.clone(),
        config: config.clone(),
        metrics,
        equity_curve: outcome.equity_curve,
        trades: outcome.trades,
        bar_count: series.len(),
        entry_signals,
        exit_signals,
        hold_signals,
        summary_stats,
        data_quality_warnings: warnings,
    })
}

fn build_summary(
    metrics: &PerformanceMetrics,
    config: &BacktestConfig,
    final_capital_usd: f64,
    total_fees_usd: f64,
    cumulative_hedge_notional_usd: f64,
    realized_pnl_usd: f64,
) -> BTreeMap<String, f64> {
    let mut stats = BTreeMap::new();
    stats.insert("initial_capital".into(), config.initial_capital_usd);
    stats.insert("final_capital".into(), final_capital_usd);
    stats.insert("total_return_pct".into(), metrics.total_return * 100.0);
    stats.insert(
        "annualized_return_pct".into(),
        metrics.annualized_return * 100.0,
    );
    stats.insert(
        "annualized_volatility_pct".into(),
        metrics.annualized_volatility * 100.0,
    );
    stats.insert("sharpe_ratio".into(), metrics.sharpe_ratio);
    stats.insert("max_drawdown_pct".into(), metrics.max_drawdown * 100.0);
    stats.insert("calmar_ratio".into(), metrics.calmar_ratio);
    stats.insert("win_rate_pct".into(), metrics.win_rate * 100.0);
    if metrics.profit_factor.is_finite() {
        stats.insert("profit_factor".into(), metrics.profit_factor);
    }
    stats.insert("num_trades".into(), metrics.num_trades as f64);
    stats.insert(
        "avg_trade_duration_periods".into(),
        metrics.avg_trade_duration,
    );
    stats.insert("total_fees_usd".into(), total_fees_usd);
    stats.insert(
        "cumulative_hedge_notional_usd".into(),
        cumulative_hedge_notional_usd,
    );
    stats.insert("realized_pnl_usd".into(), realized_pnl_usd);
    stats
}
