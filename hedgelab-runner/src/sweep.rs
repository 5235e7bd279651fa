//! Parameter sweep — grid enumeration and batched independent runs.
//!
//! The grid is the Cartesian product over per-parameter candidate lists,
//! enumerated in declared-field order so row order is deterministic. Every
//! combination gets its own pipeline with a fresh per-run state; a failing
//! combination becomes a sentinel failure row instead of aborting the
//! sweep, which always emits exactly one row per combination.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use hedgelab_core::data::MarketSeries;
use hedgelab_core::domain::StrategyParameters;
use hedgelab_core::sim::BacktestConfig;

use crate::runner::run_backtest;

/// Sentinel total return (percent) recorded for a failed combination.
pub const FAILED_TOTAL_RETURN_PCT: f64 = -100.0;
/// Sentinel Sharpe ratio recorded for a failed combination.
pub const FAILED_SHARPE_RATIO: f64 = -10.0;
/// Sentinel max drawdown (percent) recorded for a failed combination.
pub const FAILED_MAX_DRAWDOWN_PCT: f64 = -100.0;

/// Candidate values per swept parameter.
///
/// Unswept axes stay at their single default value. The product of all
/// axis lengths is the number of runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParamGrid {
    pub delta_thresholds: Vec<f64>,
    pub hedge_ratios: Vec<f64>,
    pub max_position_sizes_usd: Vec<f64>,
    pub stop_loss_fractions: Vec<f64>,
    pub rebalance_cooldown_periods: Vec<u32>,
    pub min_liquidity_ratios: Vec<f64>,
}

impl Default for ParamGrid {
    fn default() -> Self {
        let base = StrategyParameters::default();
        Self {
            delta_thresholds: vec![base.delta_threshold],
            hedge_ratios: vec![base.hedge_ratio],
            max_position_sizes_usd: vec![base.max_position_size_usd],
            stop_loss_fractions: vec![base.stop_loss_fraction],
            rebalance_cooldown_periods: vec![base.rebalance_cooldown_periods],
            min_liquidity_ratios: vec![base.min_liquidity_ratio],
        }
    }
}

impl ParamGrid {
    /// Number of combinations in the full Cartesian product.
    pub fn size(&self) -> usize {
        self.delta_thresholds.len()
            * self.hedge_ratios.len()
            * self.max_position_sizes_usd.len()
            * self.stop_loss_fractions.len()
            * self.rebalance_cooldown_periods.len()
            * self.min_liquidity_ratios.len()
    }

    /// Enumerate every combination, in declared-field order.
    pub fn combinations(&self) -> Vec<StrategyParameters> {
        let mut combos = Vec::with_capacity(self.size());
        for &delta_threshold in &self.delta_thresholds {
            for &hedge_ratio in &self.hedge_ratios {
                for &max_position_size_usd in &self.max_position_sizes_usd {
                    for &stop_loss_fraction in &self.stop_loss_fractions {
                        for &rebalance_cooldown_periods in &self.rebalance_cooldown_periods {
                            for &min_liquidity_ratio in &self.min_liquidity_ratios {
                                combos.push(StrategyParameters {
                                    delta_threshold,
                                    hedge_ratio,
                                    max_position_size_usd,
                                    stop_loss_fraction,
                                    rebalance_cooldown_periods,
                                    min_liquidity_ratio,
                                    ..Default::default()
                                });
                            }
                        }
                    }
                }
            }
        }
        combos
    }
}

/// One sweep result row: the combination plus its summary statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepRow {
    pub params: StrategyParameters,
    pub summary: BTreeMap<String, f64>,
    /// Failure message for combinations whose run raised.
    pub error: Option<String>,
}

impl SweepRow {
    fn failure(params: StrategyParameters, message: String) -> Self {
        let mut summary = BTreeMap::new();
        summary.insert("total_return_pct".into(), FAILED_TOTAL_RETURN_PCT);
        summary.insert("sharpe_ratio".into(), FAILED_SHARPE_RATIO);
        summary.insert("max_drawdown_pct".into(), FAILED_MAX_DRAWDOWN_PCT);
        Self {
            params,
            summary,
            error: Some(message),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}

/// Parameter sweep executor.
pub struct ParamSweep {
    parallel: bool,
}

impl ParamSweep {
    pub fn new() -> Self {
        Self { parallel: true }
    }

    /// Enable or disable rayon execution. Row order is enumeration order
    /// either way: the parallel map preserves input indices.
    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Run one independent backtest per grid combination.
    pub fn run(
        &self,
        series: &MarketSeries,
        grid: &ParamGrid,
        config: &BacktestConfig,
    ) -> SweepResults {
        let combos = grid.combinations();

        let run_one = |params: &StrategyParameters| -> SweepRow {
            match run_backtest(series, params, config) {
                Ok(report) => SweepRow {
                    params: params.clone(),
                    summary: report.summary_stats,
                    error: None,
                },
                Err(err) => SweepRow::failure(params.clone(), err.to_string()),
            }
        };

        let rows: Vec<SweepRow> = if self.parallel {
            combos.par_iter().map(run_one).collect()
        } else {
            combos.iter().map(run_one).collect()
        };

        SweepResults { rows }
    }
}

impl Default for ParamSweep {
    fn default() -> Self {
        Self::new()
    }
}

/// Results of a sweep: one row per combination, in enumeration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepResults {
    rows: Vec<SweepRow>,
}

impl SweepResults {
    pub fn rows(&self) -> &[SweepRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows sorted descending by a summary statistic. Rows missing the key
    /// (failure rows for most keys) sort last.
    pub fn sorted_by(&self, stat: &str) -> Vec<&SweepRow> {
        let mut sorted: Vec<&SweepRow> = self.rows.iter().collect();
        sorted.sort_by(|a, b| {
            let va = a.summary.get(stat).copied().unwrap_or(f64::NEG_INFINITY);
            let vb = b.summary.get(stat).copied().unwrap_or(f64::NEG_INFINITY);
            vb.partial_cmp(&va).unwrap_or(std::cmp::Ordering::Equal)
        });
        sorted
    }

    /// Best row by a summary statistic, if any row carries it.
    pub fn best_by(&self, stat: &str) -> Option<&SweepRow> {
        self.sorted_by(stat)
            .into_iter()
            .find(|row| row.summary.contains_key(stat))
    }
}
