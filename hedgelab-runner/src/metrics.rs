//! Performance metrics — pure functions that compute run statistics.
//!
//! Every metric is a pure function: equity curve and/or trade ledger in,
//! scalar out. Degenerate inputs (empty or single-bar curves, no trades)
//! degrade to named neutral values instead of raising, so a sweep over
//! many parameter combinations never aborts on one flat run.

use serde::{Deserialize, Serialize};

use hedgelab_core::sim::TradeRecord;

/// Aggregate performance metrics for a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub total_return: f64,
    pub sharpe_ratio: f64,
    /// Negative fraction (e.g. -0.15 = 15% drawdown), 0 when equity never
    /// falls below its running peak.
    pub max_drawdown: f64,
    pub calmar_ratio: f64,
    pub win_rate: f64,
    /// Unbounded (`f64::INFINITY`) when there are wins and no losses;
    /// passes through JSON as `null`.
    #[serde(with = "unbounded_f64")]
    pub profit_factor: f64,
    pub num_trades: usize,
    /// Mean holding time of closed trades, in bars.
    pub avg_trade_duration: f64,
    pub annualized_return: f64,
    pub annualized_volatility: f64,
}

impl PerformanceMetrics {
    /// Compute all metrics from an equity curve and trade ledger.
    ///
    /// `annualization_factor` is bars per year (8760 for hourly data).
    pub fn compute(
        equity_curve: &[f64],
        trades: &[TradeRecord],
        initial_capital: f64,
        annualization_factor: f64,
    ) -> Self {
        let total = total_return(equity_curve, initial_capital);
        let drawdown = max_drawdown(equity_curve);
        Self {
            total_return: total,
            sharpe_ratio: sharpe_ratio(equity_curve, annualization_factor),
            max_drawdown: drawdown,
            calmar_ratio: calmar_ratio(total, drawdown),
            win_rate: win_rate(trades),
            profit_factor: profit_factor(trades),
            num_trades: trades.len(),
            avg_trade_duration: avg_trade_duration(trades),
            annualized_return: annualized_return(equity_curve, annualization_factor),
            annualized_volatility: annualized_volatility(equity_curve, annualization_factor),
        }
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Total return as a fraction of starting capital.
pub fn total_return(equity_curve: &[f64], initial_capital: f64) -> f64 {
    if equity_curve.is_empty() || initial_capital <= 0.0 {
        return 0.0;
    }
    let final_eq = *equity_curve.last().unwrap();
    (final_eq - initial_capital) / initial_capital
}

/// Annualized Sharpe ratio from per-bar returns.
///
/// Sharpe = mean(returns) · A / (std(returns) · sqrt(A)). Returns 0.0 for
/// a flat curve (zero variance) or fewer than 2 bars.
pub fn sharpe_ratio(equity_curve: &[f64], annualization_factor: f64) -> f64 {
    let returns = per_bar_returns(equity_curve);
    if returns.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(&returns);
    let std = std_dev(&returns);
    if std < 1e-15 {
        return 0.0;
    }
    (mean / std) * annualization_factor.sqrt()
}

/// Maximum drawdown as a negative fraction.
pub fn max_drawdown(equity_curve: &[f64]) -> f64 {
    if equity_curve.len() < 2 {
        return 0.0;
    }
    let mut peak = equity_curve[0];
    let mut max_dd = 0.0_f64;
    for &eq in equity_curve {
        if eq > peak {
            peak = eq;
        }
        if peak > 0.0 {
            let dd = (eq - peak) / peak;
            if dd < max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd
}

/// Calmar ratio: |total_return / max_drawdown|, 0.0 at zero drawdown.
pub fn calmar_ratio(total_return: f64, max_drawdown: f64) -> f64 {
    if max_drawdown == 0.0 {
        return 0.0;
    }
    (total_return / max_drawdown).abs()
}

/// Fraction of closed trades with positive PnL, 0.0 with no trades.
pub fn win_rate(trades: &[TradeRecord]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let winners = trades.iter().filter(|t| t.is_winner()).count();
    winners as f64 / trades.len() as f64
}

/// Profit factor: gross winning PnL over gross losing PnL.
///
/// `f64::INFINITY` when there are wins and zero losses; 0.0 with no trades
/// (or losses only).
pub fn profit_factor(trades: &[TradeRecord]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let gross_profit: f64 = trades
        .iter()
        .filter(|t| t.pnl_usd > 0.0)
        .map(|t| t.pnl_usd)
        .sum();
    let gross_loss: f64 = trades
        .iter()
        .filter(|t| t.pnl_usd < 0.0)
        .map(|t| t.pnl_usd.abs())
        .sum();

    if gross_loss < 1e-10 {
        return if gross_profit > 0.0 { f64::INFINITY } else { 0.0 };
    }
    gross_profit / gross_loss
}

/// Mean holding time of closed trades, in bars.
pub fn avg_trade_duration(trades: &[TradeRecord]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    trades.iter().map(|t| t.bars_held as f64).sum::<f64>() / trades.len() as f64
}

/// Mean per-bar return scaled to a year.
pub fn annualized_return(equity_curve: &[f64], annualization_factor: f64) -> f64 {
    let returns = per_bar_returns(equity_curve);
    if returns.is_empty() {
        return 0.0;
    }
    mean_f64(&returns) * annualization_factor
}

/// Per-bar return standard deviation scaled to a year.
pub fn annualized_volatility(equity_curve: &[f64], annualization_factor: f64) -> f64 {
    let returns = per_bar_returns(equity_curve);
    if returns.len() < 2 {
        return 0.0;
    }
    std_dev(&returns) * annualization_factor.sqrt()
}

// ─── Helpers ────────────────────────────────────────────────────────

/// Fractional change in equity between consecutive bars.
pub fn per_bar_returns(equity_curve: &[f64]) -> Vec<f64> {
    if equity_curve.len() < 2 {
        return Vec::new();
    }
    equity_curve
        .windows(2)
        .map(|w| if w[0] > 0.0 { (w[1] - w[0]) / w[0] } else { 0.0 })
        .collect()
}

pub(crate) fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub(crate) fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(values);
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

/// Serde adapter for metrics that may legitimately be unbounded: JSON has
/// no infinity, so the sentinel maps through `null`.
pub(crate) mod unbounded_f64 {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOURLY: f64 = 8760.0;

    fn make_trade(pnl_usd: f64, bars_held: usize) -> TradeRecord {
        TradeRecord {
            entry_bar: 0,
            exit_bar: bars_held,
            entry_price: 2000.0,
            exit_price: 2000.0 + pnl_usd / 50.0,
            size_usd: 100_000.0,
            pnl_usd,
            bars_held,
        }
    }

    // ── Total return ──

    #[test]
    fn total_return_positive() {
        let eq = vec![1_000_000.0, 1_005_000.0, 1_100_000.0];
        assert!((total_return(&eq, 1_000_000.0) - 0.1).abs() < 1e-10);
    }

    #[test]
    fn total_return_includes_day_one_costs() {
        // Equity already below initial capital on the first bar.
        let eq = vec![999_800.0, 999_800.0];
        let r = total_return(&eq, 1_000_000.0);
        assert!((r - (-0.0002)).abs() < 1e-10);
    }

    #[test]
    fn total_return_empty() {
        assert_eq!(total_return(&[], 1_000_000.0), 0.0);
    }

    // ── Sharpe ──

    #[test]
    fn sharpe_flat_curve_is_zero() {
        let eq = vec![1_000_000.0; 100];
        assert_eq!(sharpe_ratio(&eq, HOURLY), 0.0);
    }

    #[test]
    fn sharpe_constant_growth_is_zero() {
        // Identical per-bar return → zero variance → neutral 0.
        let mut eq = vec![1_000_000.0];
        for i in 1..100 {
            eq.push(eq[i - 1] * 1.0001);
        }
        assert_eq!(sharpe_ratio(&eq, HOURLY), 0.0);
    }

    #[test]
    fn sharpe_positive_for_mostly_up_curve() {
        let mut eq = vec![1_000_000.0];
        for i in 1..200 {
            let r = if i % 2 == 0 { 1.0008 } else { 1.0001 };
            eq.push(eq[i - 1] * r);
        }
        let s = sharpe_ratio(&eq, HOURLY);
        assert!(s > 0.0, "expected positive Sharpe, got {s}");
    }

    #[test]
    fn sharpe_single_bar_is_zero() {
        assert_eq!(sharpe_ratio(&[1_000_000.0], HOURLY), 0.0);
    }

    #[test]
    fn sharpe_scales_with_annualization_factor() {
        let mut eq = vec![1_000_000.0];
        for i in 1..200 {
            let r = if i % 2 == 0 { 1.0008 } else { 1.0001 };
            eq.push(eq[i - 1] * r);
        }
        let hourly = sharpe_ratio(&eq, 8760.0);
        let daily = sharpe_ratio(&eq, 365.0);
        assert!((hourly / daily - (8760.0_f64 / 365.0).sqrt()).abs() < 1e-9);
    }

    // ── Max drawdown ──

    #[test]
    fn max_drawdown_known_value() {
        let eq = vec![1_000_000.0, 1_100_000.0, 900_000.0, 950_000.0];
        let expected = (900_000.0 - 1_100_000.0) / 1_100_000.0;
        assert!((max_drawdown(&eq) - expected).abs() < 1e-10);
    }

    #[test]
    fn max_drawdown_monotonic_rise_is_zero() {
        let eq: Vec<f64> = (0..100).map(|i| 1_000_000.0 + i as f64 * 100.0).collect();
        assert_eq!(max_drawdown(&eq), 0.0);
    }

    #[test]
    fn max_drawdown_single_bar_is_zero() {
        assert_eq!(max_drawdown(&[1_000_000.0]), 0.0);
        assert_eq!(max_drawdown(&[]), 0.0);
    }

    // ── Calmar ──

    #[test]
    fn calmar_known_value() {
        assert!((calmar_ratio(0.2, -0.1) - 2.0).abs() < 1e-10);
    }

    #[test]
    fn calmar_zero_drawdown_is_zero() {
        assert_eq!(calmar_ratio(0.5, 0.0), 0.0);
    }

    #[test]
    fn calmar_is_absolute() {
        assert!((calmar_ratio(-0.2, -0.1) - 2.0).abs() < 1e-10);
    }

    // ── Win rate ──

    #[test]
    fn win_rate_mixed() {
        let trades = vec![
            make_trade(500.0, 3),
            make_trade(-200.0, 5),
            make_trade(300.0, 2),
            make_trade(-100.0, 4),
        ];
        assert!((win_rate(&trades) - 0.5).abs() < 1e-10);
    }

    #[test]
    fn win_rate_no_trades() {
        assert_eq!(win_rate(&[]), 0.0);
    }

    // ── Profit factor ──

    #[test]
    fn profit_factor_mixed() {
        let trades = vec![make_trade(800.0, 1), make_trade(-200.0, 1)];
        assert!((profit_factor(&trades) - 4.0).abs() < 1e-10);
    }

    #[test]
    fn profit_factor_unbounded_with_no_losses() {
        let trades = vec![make_trade(500.0, 1), make_trade(300.0, 1)];
        assert_eq!(profit_factor(&trades), f64::INFINITY);
    }

    #[test]
    fn profit_factor_all_losses_is_zero() {
        let trades = vec![make_trade(-500.0, 1)];
        assert_eq!(profit_factor(&trades), 0.0);
    }

    #[test]
    fn profit_factor_no_trades_is_zero() {
        assert_eq!(profit_factor(&[]), 0.0);
    }

    // ── Duration ──

    #[test]
    fn avg_trade_duration_mean_of_bars_held() {
        let trades = vec![make_trade(100.0, 2), make_trade(100.0, 6)];
        assert!((avg_trade_duration(&trades) - 4.0).abs() < 1e-10);
    }

    #[test]
    fn avg_trade_duration_no_trades() {
        assert_eq!(avg_trade_duration(&[]), 0.0);
    }

    // ── Annualized return/volatility ──

    #[test]
    fn annualized_return_known() {
        // Constant +0.01% per bar over hourly bars.
        let mut eq = vec![1_000_000.0];
        for i in 1..100 {
            eq.push(eq[i - 1] * 1.0001);
        }
        let r = annualized_return(&eq, HOURLY);
        assert!((r - 0.0001 * HOURLY).abs() < 1e-4);
    }

    #[test]
    fn annualized_volatility_flat_is_zero() {
        let eq = vec![1_000_000.0; 50];
        assert_eq!(annualized_volatility(&eq, HOURLY), 0.0);
    }

    // ── Aggregate ──

    #[test]
    fn compute_all_metrics_degenerate_single_bar() {
        let m = PerformanceMetrics::compute(&[1_000_000.0], &[], 1_000_000.0, HOURLY);
        assert_eq!(m.num_trades, 0);
        assert_eq!(m.sharpe_ratio, 0.0);
        assert_eq!(m.max_drawdown, 0.0);
        assert_eq!(m.calmar_ratio, 0.0);
        assert_eq!(m.win_rate, 0.0);
        assert_eq!(m.profit_factor, 0.0);
        assert_eq!(m.avg_trade_duration, 0.0);
    }

    #[test]
    fn compute_all_metrics_with_trades() {
        let mut eq = vec![1_000_000.0];
        for i in 1..200 {
            let r = if i % 3 == 0 { 0.9995 } else { 1.0006 };
            eq.push(eq[i - 1] * r);
        }
        let trades = vec![
            make_trade(500.0, 3),
            make_trade(-200.0, 5),
            make_trade(300.0, 2),
        ];
        let m = PerformanceMetrics::compute(&eq, &trades, 1_000_000.0, HOURLY);
        assert!(m.total_return > 0.0);
        assert!(m.sharpe_ratio > 0.0);
        assert!(m.max_drawdown < 0.0);
        assert!(m.calmar_ratio > 0.0);
        assert_eq!(m.num_trades, 3);
        assert!((m.win_rate - 2.0 / 3.0).abs() < 1e-10);
        assert!((m.profit_factor - 4.0).abs() < 1e-10);
        assert!(m.annualized_volatility > 0.0);
    }

    // ── JSON behavior of the unbounded sentinel ──

    #[test]
    fn infinite_profit_factor_roundtrips_via_null() {
        let m = PerformanceMetrics::compute(
            &[1_000_000.0, 1_001_000.0],
            &[make_trade(1000.0, 1)],
            1_000_000.0,
            HOURLY,
        );
        assert_eq!(m.profit_factor, f64::INFINITY);

        let json = serde_json::to_string(&m).unwrap();
        assert!(json.contains(r#""profit_factor":null"#));

        let deser: PerformanceMetrics = serde_json::from_str(&json).unwrap();
        assert_eq!(deser.profit_factor, f64::INFINITY);
    }

    // ── Range invariants ──

    use proptest::prelude::*;

    proptest! {
        /// Drawdown is never positive and win rate stays in [0, 1] for any
        /// equity path and ledger.
        #[test]
        fn metric_ranges_hold(
            eq in prop::collection::vec(1.0..2_000_000.0_f64, 0..80),
            pnls in prop::collection::vec(-1_000.0..1_000.0_f64, 0..20),
        ) {
            let trades: Vec<TradeRecord> = pnls.iter().map(|&p| make_trade(p, 1)).collect();
            prop_assert!(max_drawdown(&eq) <= 0.0);
            let wr = win_rate(&trades);
            prop_assert!((0.0..=1.0).contains(&wr));
            prop_assert!(profit_factor(&trades) >= 0.0);
            prop_assert!(avg_trade_duration(&trades) >= 0.0);
        }
    }

    #[test]
    fn finite_metrics_roundtrip_exactly() {
        let trades = vec![make_trade(800.0, 1), make_trade(-200.0, 1)];
        let m = PerformanceMetrics::compute(
            &[1_000_000.0, 1_000_600.0],
            &trades,
            1_000_000.0,
            HOURLY,
        );
        let json = serde_json::to_string(&m).unwrap();
        let deser: PerformanceMetrics = serde_json::from_str(&json).unwrap();
        assert_eq!(m, deser);
    }
}
