//! Backtest configuration — capital, costs, leverage, annualization.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Invalid backtest configuration, raised once at the simulation boundary.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("initial_capital_usd must be positive, got {0}")]
    NonPositiveCapital(f64),

    #[error("{name} must be a non-negative finite rate, got {value}")]
    NegativeRate { name: &'static str, value: f64 },

    #[error("leverage_limit must be positive, got {0}")]
    NonPositiveLeverage(f64),

    #[error("margin_requirement must be in (0, 1), got {0}")]
    MarginOutOfRange(f64),

    #[error("annualization_factor must be positive, got {0}")]
    NonPositiveAnnualization(f64),

    #[error("signal vectors have {vectors} rows but price series has {prices}")]
    LengthMismatch { prices: usize, vectors: usize },
}

/// Cost and capital model for a simulation run.
///
/// `annualization_factor` is the number of bars per year the Sharpe and
/// volatility annualization assumes; the default of 8760 matches hourly
/// data. A mismatch against the detected series spacing is reported as a
/// data-quality warning by the runner, never an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    pub initial_capital_usd: f64,
    /// Proportional fee on traded notional.
    pub transaction_cost_rate: f64,
    /// Market-impact slippage, proportional on traded notional.
    pub slippage_rate: f64,
    /// Fixed cost per trade, USD.
    pub gas_cost_per_trade_usd: f64,
    /// Max open notional as a multiple of current equity.
    pub leverage_limit: f64,
    /// Fraction of open notional that must be backed by capital. In (0, 1).
    pub margin_requirement: f64,
    /// Bars per year assumed when annualizing returns.
    pub annualization_factor: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            initial_capital_usd: 1_000_000.0,
            transaction_cost_rate: 0.001,
            slippage_rate: 0.0005,
            gas_cost_per_trade_usd: 50.0,
            leverage_limit: 3.0,
            margin_requirement: 0.2,
            annualization_factor: 8760.0,
        }
    }
}

impl BacktestConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.initial_capital_usd.is_finite() || self.initial_capital_usd <= 0.0 {
            return Err(ConfigError::NonPositiveCapital(self.initial_capital_usd));
        }
        for (name, value) in [
            ("transaction_cost_rate", self.transaction_cost_rate),
            ("slippage_rate", self.slippage_rate),
            ("gas_cost_per_trade_usd", self.gas_cost_per_trade_usd),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::NegativeRate { name, value });
            }
        }
        if !self.leverage_limit.is_finite() || self.leverage_limit <= 0.0 {
            return Err(ConfigError::NonPositiveLeverage(self.leverage_limit));
        }
        if !self.margin_requirement.is_finite()
            || self.margin_requirement <= 0.0
            || self.margin_requirement >= 1.0
        {
            return Err(ConfigError::MarginOutOfRange(self.margin_requirement));
        }
        if !self.annualization_factor.is_finite() || self.annualization_factor <= 0.0 {
            return Err(ConfigError::NonPositiveAnnualization(
                self.annualization_factor,
            ));
        }
        Ok(())
    }

    /// Proportional plus fixed cost of turning over `notional_usd`.
    pub fn trade_cost(&self, notional_usd: f64) -> f64 {
        notional_usd.abs() * (self.transaction_cost_rate + self.slippage_rate)
            + self.gas_cost_per_trade_usd
    }
}
