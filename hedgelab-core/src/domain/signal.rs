//! Signal — the tagged per-snapshot action emitted by the signal engine.

use serde::{Deserialize, Serialize};

/// Discrete action for one snapshot.
///
/// Borrow variants carry the hedge notional; direction is encoded in the
/// variant itself (asset0 = base leg, asset1 = quote leg). Matching is
/// exhaustive downstream so a new action kind breaks the sizer and the
/// simulator at compile time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SignalAction {
    Hold,
    BorrowAsset0 { amount_usd: f64 },
    BorrowAsset1 { amount_usd: f64 },
    StopLoss,
}

/// One signal-engine decision: action plus confidence and a reason code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    #[serde(flatten)]
    pub action: SignalAction,
    /// Confidence in [0, 1].
    pub confidence: f64,
    /// Human-readable reason code, e.g. `cooldown_period`.
    pub reason: String,
}

impl Signal {
    pub fn hold(confidence: f64, reason: impl Into<String>) -> Self {
        Self {
            action: SignalAction::Hold,
            confidence,
            reason: reason.into(),
        }
    }

    pub fn stop_loss(confidence: f64, reason: impl Into<String>) -> Self {
        Self {
            action: SignalAction::StopLoss,
            confidence,
            reason: reason.into(),
        }
    }

    /// True for borrow actions (a hedge position is opened).
    pub fn is_entry(&self) -> bool {
        matches!(
            self.action,
            SignalAction::BorrowAsset0 { .. } | SignalAction::BorrowAsset1 { .. }
        )
    }

    /// True for stop-loss (all open exposure is closed).
    pub fn is_exit(&self) -> bool {
        matches!(self.action, SignalAction::StopLoss)
    }

    /// Hedge notional carried by the action, zero for Hold/StopLoss.
    pub fn notional_usd(&self) -> f64 {
        match self.action {
            SignalAction::BorrowAsset0 { amount_usd } => amount_usd,
            SignalAction::BorrowAsset1 { amount_usd } => amount_usd,
            SignalAction::Hold | SignalAction::StopLoss => 0.0,
        }
    }
}
