//! Simulation engine — bar-by-bar capital evolution over signal vectors.
//!
//! Per bar: exits close all open exposure at that bar's price, then an
//! entry may open a single net position. Mark-to-market equity is recorded
//! once per bar. An entry while a position is open is ignored; an exit with
//! nothing open is a no-op.

use serde::{Deserialize, Serialize};

use crate::sim::config::{BacktestConfig, ConfigError};
use crate::sim::trade::TradeRecord;
use crate::sizer::SignalVectors;

/// The open hedge leg between an entry bar and its exit.
#[derive(Debug, Clone, Copy)]
struct OpenPosition {
    size_usd: f64,
    entry_price: f64,
    entry_bar: usize,
}

impl OpenPosition {
    fn unrealized_pnl(&self, price: f64) -> f64 {
        self.size_usd * (price / self.entry_price - 1.0)
    }
}

/// Everything a simulation run produces. Immutable once returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationOutcome {
    /// Mark-to-market capital, one value per input bar.
    pub equity_curve: Vec<f64>,
    /// Closed trades in exit order. A position still open at the end of
    /// the series stays unrealized and is not in the ledger.
    pub trades: Vec<TradeRecord>,
    /// Total transaction + slippage + gas costs paid, USD.
    pub total_fees_usd: f64,
    /// Final mark-to-market capital.
    pub final_capital_usd: f64,
}

impl SimulationOutcome {
    /// Sum of realized PnL over closed trades.
    pub fn realized_pnl_usd(&self) -> f64 {
        self.trades.iter().map(|t| t.pnl_usd).sum()
    }
}

/// Run the capital simulation over a price series and aligned vectors.
///
/// Validates the config and the vector/price alignment up front; after
/// that the loop cannot fail — degenerate statistics are the metric
/// layer's concern, not the simulator's.
pub fn simulate(
    prices: &[f64],
    vectors: &SignalVectors,
    config: &BacktestConfig,
) -> Result<SimulationOutcome, ConfigError> {
    config.validate()?;
    if vectors.len() != prices.len() {
        return Err(ConfigError::LengthMismatch {
            prices: prices.len(),
            vectors: vectors.len(),
        });
    }

    let mut capital = config.initial_capital_usd;
    let mut total_fees = 0.0;
    let mut open: Option<OpenPosition> = None;
    let mut trades = Vec::new();
    let mut equity_curve = Vec::with_capacity(prices.len());

    for (bar, &price) in prices.iter().enumerate() {
        if vectors.exits[bar] {
            if let Some(position) = open.take() {
                let gross = position.unrealized_pnl(price);
                let cost = config.trade_cost(position.size_usd);
                capital += gross - cost;
                total_fees += cost;
                trades.push(TradeRecord {
                    entry_bar: position.entry_bar,
                    exit_bar: bar,
                    entry_price: position.entry_price,
                    exit_price: price,
                    size_usd: position.size_usd,
                    pnl_usd: gross - cost,
                    bars_held: bar - position.entry_bar,
                });
            }
        }

        if vectors.entries[bar] && open.is_none() && capital > 0.0 {
            let requested = vectors.sizes[bar];
            let max_notional = config.leverage_limit * capital;
            let size = requested.clamp(-max_notional, max_notional);
            let margin_ok = size.abs() * config.margin_requirement <= capital;
            if size != 0.0 && margin_ok {
                let cost = config.trade_cost(size);
                capital -= cost;
                total_fees += cost;
                open = Some(OpenPosition {
                    size_usd: size,
                    entry_price: price,
                    entry_bar: bar,
                });
            }
        }

        let unrealized = open.map(|p| p.unrealized_pnl(price)).unwrap_or(0.0);
        equity_curve.push(capital + unrealized);
    }

    let final_capital_usd = equity_curve.last().copied().unwrap_or(capital);
    Ok(SimulationOutcome {
        equity_curve,
        trades,
        total_fees_usd: total_fees,
        final_capital_usd,
    })
}
