//! MarketSnapshot — the fundamental market data unit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single time-indexed row of pool market data.
///
/// `price` is the asset0/asset1 value ratio of the pool. Liquidity and
/// borrow capacity are USD-denominated; `price_volatility_24h` is trailing
/// realized volatility as a fraction. Immutable once produced upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    pub total_liquidity_usd: f64,
    pub available_borrow_usd: f64,
    pub price_volatility_24h: f64,
    pub swap_volume_usd: f64,
}

impl MarketSnapshot {
    /// Basic sanity check: positive finite price, non-negative USD fields,
    /// borrow capacity bounded by total liquidity.
    pub fn is_sane(&self) -> bool {
        self.price.is_finite()
            && self.price > 0.0
            && self.total_liquidity_usd >= 0.0
            && self.available_borrow_usd >= 0.0
            && self.available_borrow_usd <= self.total_liquidity_usd
            && self.price_volatility_24h >= 0.0
            && self.swap_volume_usd >= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_snapshot() -> MarketSnapshot {
        MarketSnapshot {
            timestamp: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            price: 2000.0,
            total_liquidity_usd: 5_000_000.0,
            available_borrow_usd: 2_500_000.0,
            price_volatility_24h: 0.02,
            swap_volume_usd: 10_000.0,
        }
    }

    #[test]
    fn snapshot_is_sane() {
        assert!(sample_snapshot().is_sane());
    }

    #[test]
    fn detects_non_positive_price() {
        let mut snap = sample_snapshot();
        snap.price = 0.0;
        assert!(!snap.is_sane());
        snap.price = -1.0;
        assert!(!snap.is_sane());
    }

    #[test]
    fn detects_borrow_above_liquidity() {
        let mut snap = sample_snapshot();
        snap.available_borrow_usd = snap.total_liquidity_usd + 1.0;
        assert!(!snap.is_sane());
    }

    #[test]
    fn serialization_roundtrip() {
        let snap = sample_snapshot();
        let json = serde_json::to_string(&snap).unwrap();
        let deser: MarketSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(snap, deser);
    }
}
