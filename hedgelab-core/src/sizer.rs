//! Position sizer — turns a signal sequence into simulation vectors.

use serde::{Deserialize, Serialize};

use crate::domain::{Signal, SignalAction};

/// Entry/exit/size vectors aligned index-for-index with the signal series.
///
/// `sizes` carries signed USD notional: positive for BorrowAsset0 (base
/// leg), negative for BorrowAsset1 (the opposing quote leg), zero
/// elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalVectors {
    pub entries: Vec<bool>,
    pub exits: Vec<bool>,
    pub sizes: Vec<f64>,
}

impl SignalVectors {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Convert signals to aligned vectors. No row is skipped or reordered.
///
/// Notionals are weighted by signal confidence, so a low-conviction hedge
/// commits proportionally less capital.
pub fn size_signals(signals: &[Signal]) -> SignalVectors {
    let n = signals.len();
    let mut vectors = SignalVectors {
        entries: vec![false; n],
        exits: vec![false; n],
        sizes: vec![0.0; n],
    };

    for (i, signal) in signals.iter().enumerate() {
        match signal.action {
            SignalAction::BorrowAsset0 { amount_usd } => {
                vectors.entries[i] = true;
                vectors.sizes[i] = amount_usd * signal.confidence;
            }
            SignalAction::BorrowAsset1 { amount_usd } => {
                vectors.entries[i] = true;
                vectors.sizes[i] = -amount_usd * signal.confidence;
            }
            SignalAction::StopLoss => {
                vectors.exits[i] = true;
            }
            SignalAction::Hold => {}
        }
    }

    vectors
}
