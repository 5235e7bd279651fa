//! Rebalancing signal engine — the per-snapshot decision state machine.
//!
//! `decide` is a pure function over one snapshot; `generate_signals` walks
//! a whole series in timestamp order, threading a fresh [`StrategyState`]
//! and applying the caller-side state update after every decision.
//!
//! Gate order: cooldown → stop-loss → delta threshold → hedge sizing.
//! Cooldown wins over everything, including an extreme stop-loss move —
//! the counter keeps advancing, so the stop fires on the first post-cooldown
//! snapshot if the move persists.

use crate::data::MarketSeries;
use crate::domain::{
    DomainError, MarketSnapshot, Signal, SignalAction, StrategyParameters, StrategyState,
};
use crate::strategy::delta::position_delta;

/// 24h volatility above this scales hedge confidence down.
pub const HIGH_VOLATILITY_THRESHOLD: f64 = 0.05;

/// Confidence multiplier applied in high-volatility regimes.
pub const HIGH_VOLATILITY_CONFIDENCE_SCALE: f64 = 0.8;

/// Upper bound on hedge confidence.
pub const MAX_CONFIDENCE: f64 = 0.9;

/// Decide the action for one snapshot.
///
/// Reads `state` but does not mutate it; the caller applies
/// [`StrategyState::apply`] afterwards so the decision logic stays
/// independently testable. Errors only on non-positive prices.
pub fn decide(
    snapshot: &MarketSnapshot,
    initial_price: f64,
    state: &StrategyState,
    params: &StrategyParameters,
) -> Result<Signal, DomainError> {
    if !initial_price.is_finite() || initial_price <= 0.0 {
        return Err(DomainError::NonPositivePrice {
            price: initial_price,
        });
    }
    let price_ratio = snapshot.price / initial_price;
    let delta = position_delta(price_ratio)?;

    if state.periods_since_last_rebalance < params.rebalance_cooldown_periods {
        return Ok(Signal::hold(0.1, "cooldown_period"));
    }

    let price_change = price_ratio - 1.0;
    if price_change.abs() > params.stop_loss_fraction {
        return Ok(Signal::stop_loss(
            0.9,
            format!("stop_loss_triggered_{:.2}%", price_change * 100.0),
        ));
    }

    if delta.abs() <= params.delta_threshold {
        return Ok(Signal::hold(
            0.3,
            format!("delta_within_threshold_{delta:.3}"),
        ));
    }

    // Opposite sign to neutralize the LP exposure. Exactly zero is
    // unreachable here: the threshold gate already excluded it.
    let hedge_ratio_signed = -delta * params.hedge_ratio;

    // Half-pool reference notional, capped by the position-size limit.
    let base_amount = 0.5 * snapshot.total_liquidity_usd;
    let mut amount_usd =
        (base_amount * hedge_ratio_signed.abs()).min(params.max_position_size_usd);

    let usable = params.liquidity_usage_cap * snapshot.available_borrow_usd;
    if amount_usd > usable {
        amount_usd = usable;
        if amount_usd < params.min_viable_trade_usd {
            return Ok(Signal::hold(0.2, "insufficient_liquidity"));
        }
    }

    let mut confidence =
        (delta.abs() / params.delta_threshold * 0.5 + 0.3).min(MAX_CONFIDENCE);
    if snapshot.price_volatility_24h > HIGH_VOLATILITY_THRESHOLD {
        confidence *= HIGH_VOLATILITY_CONFIDENCE_SCALE;
    }

    let action = if hedge_ratio_signed > 0.0 {
        // Price rose, LP is short the quote leg: hedge with the quote asset.
        SignalAction::BorrowAsset1 { amount_usd }
    } else {
        SignalAction::BorrowAsset0 { amount_usd }
    };

    Ok(Signal {
        action,
        confidence,
        reason: format!("delta_hedge_required_{delta:.3}"),
    })
}

/// Generate one signal per series row and return the final run state.
///
/// Validates parameters once, takes the first row's price as the LP entry
/// price, and owns a fresh [`StrategyState`] for the whole run.
pub fn generate_signals_with_state(
    series: &MarketSeries,
    params: &StrategyParameters,
) -> Result<(Vec<Signal>, StrategyState), DomainError> {
    params.validate()?;
    let initial_price = series.initial_price();
    let mut state = StrategyState::new();
    let mut signals = Vec::with_capacity(series.len());
    for snapshot in series.iter() {
        let signal = decide(snapshot, initial_price, &state, params)?;
        state.apply(&signal);
        signals.push(signal);
    }
    Ok((signals, state))
}

/// Generate one signal per series row.
pub fn generate_signals(
    series: &MarketSeries,
    params: &StrategyParameters,
) -> Result<Vec<Signal>, DomainError> {
    generate_signals_with_state(series, params).map(|(signals, _)| signals)
}
