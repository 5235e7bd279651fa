//! Strategy hyperparameters and domain-level input validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Invalid numeric input to the strategy layer.
///
/// Raised once at construction/entry-point boundaries for malformed
/// parameters, and by the delta computation for non-positive prices
/// (a caller/data-quality bug, never a strategy condition).
#[derive(Debug, Error, PartialEq)]
pub enum DomainError {
    #[error("non-positive price ratio: {price}")]
    NonPositivePrice { price: f64 },

    #[error("invalid parameter {name} = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
}

/// Fraction of available borrow capacity a single hedge may consume.
pub const DEFAULT_LIQUIDITY_USAGE_CAP: f64 = 0.9;

/// Smallest hedge notional worth executing, in USD.
pub const DEFAULT_MIN_VIABLE_TRADE_USD: f64 = 1000.0;

/// Hyperparameters of the delta-neutral rebalancing strategy.
///
/// Validated once via [`StrategyParameters::validate`]; the signal engine
/// assumes validated parameters and never re-checks them per snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyParameters {
    /// Hysteresis band: rebalance only when |delta| exceeds this. In (0, 1].
    pub delta_threshold: f64,
    /// Fraction of the computed imbalance to neutralize. Positive.
    pub hedge_ratio: f64,
    /// Hard cap on a single hedge notional, USD. Positive.
    pub max_position_size_usd: f64,
    /// Absolute price-change fraction that forces an exit. In (0, 1).
    pub stop_loss_fraction: f64,
    /// Minimum periods between rebalances.
    pub rebalance_cooldown_periods: u32,
    /// Minimum available/total liquidity ratio considered tradeable. In (0, 1).
    pub min_liquidity_ratio: f64,
    /// Fraction of available borrow capacity usable per hedge. In (0, 1].
    pub liquidity_usage_cap: f64,
    /// Smallest hedge notional worth executing, USD. Non-negative.
    pub min_viable_trade_usd: f64,
}

impl Default for StrategyParameters {
    fn default() -> Self {
        Self {
            delta_threshold: 0.1,
            hedge_ratio: 1.0,
            max_position_size_usd: 1_000_000.0,
            stop_loss_fraction: 0.15,
            rebalance_cooldown_periods: 6,
            min_liquidity_ratio: 0.1,
            liquidity_usage_cap: DEFAULT_LIQUIDITY_USAGE_CAP,
            min_viable_trade_usd: DEFAULT_MIN_VIABLE_TRADE_USD,
        }
    }
}

impl StrategyParameters {
    /// Check every field against its documented range.
    pub fn validate(&self) -> Result<(), DomainError> {
        check_range(
            "delta_threshold",
            self.delta_threshold,
            self.delta_threshold > 0.0 && self.delta_threshold <= 1.0,
            "must be in (0, 1]",
        )?;
        check_range(
            "hedge_ratio",
            self.hedge_ratio,
            self.hedge_ratio > 0.0,
            "must be positive",
        )?;
        check_range(
            "max_position_size_usd",
            self.max_position_size_usd,
            self.max_position_size_usd > 0.0,
            "must be positive",
        )?;
        check_range(
            "stop_loss_fraction",
            self.stop_loss_fraction,
            self.stop_loss_fraction > 0.0 && self.stop_loss_fraction < 1.0,
            "must be in (0, 1)",
        )?;
        check_range(
            "min_liquidity_ratio",
            self.min_liquidity_ratio,
            self.min_liquidity_ratio > 0.0 && self.min_liquidity_ratio < 1.0,
            "must be in (0, 1)",
        )?;
        check_range(
            "liquidity_usage_cap",
            self.liquidity_usage_cap,
            self.liquidity_usage_cap > 0.0 && self.liquidity_usage_cap <= 1.0,
            "must be in (0, 1]",
        )?;
        check_range(
            "min_viable_trade_usd",
            self.min_viable_trade_usd,
            self.min_viable_trade_usd >= 0.0,
            "must be non-negative",
        )?;
        Ok(())
    }
}

fn check_range(
    name: &'static str,
    value: f64,
    ok: bool,
    reason: &'static str,
) -> Result<(), DomainError> {
    if value.is_finite() && ok {
        Ok(())
    } else {
        Err(DomainError::InvalidParameter {
            name,
            value,
            reason,
        })
    }
}
