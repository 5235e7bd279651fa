//! TradeRecord — a closed round-trip hedge in the ledger.

use serde::{Deserialize, Serialize};

/// One closed trade: entry → exit, with net PnL and duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub entry_bar: usize,
    pub exit_bar: usize,
    pub entry_price: f64,
    pub exit_price: f64,
    /// Signed USD notional: positive = base-asset leg, negative = quote leg.
    pub size_usd: f64,
    /// Realized PnL net of exit cost, USD.
    pub pnl_usd: f64,
    pub bars_held: usize,
}

impl TradeRecord {
    pub fn is_winner(&self) -> bool {
        self.pnl_usd > 0.0
    }

    /// Net PnL as a fraction of the traded notional.
    pub fn return_pct(&self) -> f64 {
        if self.size_usd == 0.0 {
            return 0.0;
        }
        self.pnl_usd / self.size_usd.abs()
    }
}
