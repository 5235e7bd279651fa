//! StrategyState — mutable per-run accumulators.

use serde::{Deserialize, Serialize};

use super::signal::Signal;

/// Sequential state threaded through one signal-engine run.
///
/// Owned exclusively by a single run; every sweep trial constructs its own
/// fresh instance. Sharing one instance across runs corrupts the cooldown
/// and notional accounting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategyState {
    /// Periods since the last non-Hold action. Gates rebalancing.
    pub periods_since_last_rebalance: u32,
    /// Total hedge notional opened over the run, USD.
    pub cumulative_hedge_notional_usd: f64,
    /// Realized PnL folded in after simulation, USD.
    pub cumulative_pnl_usd: f64,
}

impl StrategyState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Caller-side state update after a decision.
    ///
    /// Any non-Hold action resets the cooldown counter and accumulates the
    /// traded notional; a Hold advances the counter by one period.
    pub fn apply(&mut self, signal: &Signal) {
        if signal.is_entry() || signal.is_exit() {
            self.periods_since_last_rebalance = 0;
            self.cumulative_hedge_notional_usd += signal.notional_usd();
        } else {
            self.periods_since_last_rebalance += 1;
        }
    }

    /// Fold the simulation's realized PnL into the run state.
    pub fn record_realized_pnl(&mut self, pnl_usd: f64) {
        self.cumulative_pnl_usd += pnl_usd;
    }
}
