//! MarketSeries — an ordered, validated sequence of snapshots.
//!
//! All schema problems surface here, at construction time; downstream code
//! (signal engine, simulator) assumes a well-formed series and never
//! re-validates rows mid-run.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::MarketSnapshot;

/// Default for a missing `total_liquidity_usd` column.
pub const DEFAULT_TOTAL_LIQUIDITY_USD: f64 = 1_000_000.0;
/// Default for a missing `available_borrow_usd` column.
pub const DEFAULT_AVAILABLE_BORROW_USD: f64 = 500_000.0;
/// Default for a missing `price_volatility_24h` column.
pub const DEFAULT_PRICE_VOLATILITY_24H: f64 = 0.02;
/// Default for a missing `swap_volume_usd` column.
pub const DEFAULT_SWAP_VOLUME_USD: f64 = 10_000.0;

/// Schema/shape problems in input data, raised at construction.
#[derive(Debug, Error, PartialEq)]
pub enum SeriesError {
    #[error("series contains no rows")]
    Empty,

    #[error("timestamps not strictly increasing at row {index}")]
    NonMonotonicTimestamps { index: usize },

    #[error("non-positive price {price} at row {index}")]
    NonPositivePrice { index: usize, price: f64 },

    #[error("no price column: expected 'price_ratio' or 'asset0_price_usd'")]
    MissingPriceColumn,

    #[error("column '{column}' has {got} rows, expected {expected}")]
    ColumnLength {
        column: String,
        expected: usize,
        got: usize,
    },
}

/// An ordered market time series, the read-only input to a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSeries {
    snapshots: Vec<MarketSnapshot>,
}

impl MarketSeries {
    /// Validate and wrap a snapshot sequence.
    ///
    /// Requires at least one row, strictly increasing timestamps, and
    /// positive finite prices.
    pub fn from_snapshots(snapshots: Vec<MarketSnapshot>) -> Result<Self, SeriesError> {
        if snapshots.is_empty() {
            return Err(SeriesError::Empty);
        }
        for (index, snap) in snapshots.iter().enumerate() {
            if !snap.price.is_finite() || snap.price <= 0.0 {
                return Err(SeriesError::NonPositivePrice {
                    index,
                    price: snap.price,
                });
            }
            if index > 0 && snap.timestamp <= snapshots[index - 1].timestamp {
                return Err(SeriesError::NonMonotonicTimestamps { index });
            }
        }
        Ok(Self { snapshots })
    }

    /// Build a series from named numeric columns.
    ///
    /// The price column is `price_ratio`, falling back to
    /// `asset0_price_usd`. Missing optional columns take the documented
    /// defaults instead of failing.
    pub fn from_columns(
        timestamps: &[DateTime<Utc>],
        columns: &BTreeMap<String, Vec<f64>>,
    ) -> Result<Self, SeriesError> {
        let n = timestamps.len();
        if n == 0 {
            return Err(SeriesError::Empty);
        }
        for (name, values) in columns {
            if values.len() != n {
                return Err(SeriesError::ColumnLength {
                    column: name.clone(),
                    expected: n,
                    got: values.len(),
                });
            }
        }

        let prices = columns
            .get("price_ratio")
            .or_else(|| columns.get("asset0_price_usd"))
            .ok_or(SeriesError::MissingPriceColumn)?;

        let column_or = |name: &str, default: f64| -> Vec<f64> {
            columns
                .get(name)
                .cloned()
                .unwrap_or_else(|| vec![default; n])
        };
        let liquidity = column_or("total_liquidity_usd", DEFAULT_TOTAL_LIQUIDITY_USD);
        let borrow = column_or("available_borrow_usd", DEFAULT_AVAILABLE_BORROW_USD);
        let volatility = column_or("price_volatility_24h", DEFAULT_PRICE_VOLATILITY_24H);
        let volume = column_or("swap_volume_usd", DEFAULT_SWAP_VOLUME_USD);

        let snapshots = (0..n)
            .map(|i| MarketSnapshot {
                timestamp: timestamps[i],
                price: prices[i],
                total_liquidity_usd: liquidity[i],
                available_borrow_usd: borrow[i],
                price_volatility_24h: volatility[i],
                swap_volume_usd: volume[i],
            })
            .collect();
        Self::from_snapshots(snapshots)
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// A validated series is never empty; kept for idiomatic pairing with `len`.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn snapshots(&self) -> &[MarketSnapshot] {
        &self.snapshots
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MarketSnapshot> {
        self.snapshots.iter()
    }

    /// Price column as a contiguous vector, for the simulator.
    pub fn prices(&self) -> Vec<f64> {
        self.snapshots.iter().map(|s| s.price).collect()
    }

    /// Entry price of the LP position: the first row's price.
    pub fn initial_price(&self) -> f64 {
        self.snapshots[0].price
    }

    /// Bars per year implied by the median timestamp spacing.
    ///
    /// `None` for a single-row series, where spacing is undefined.
    pub fn detected_bars_per_year(&self) -> Option<f64> {
        if self.snapshots.len() < 2 {
            return None;
        }
        let mut spacings: Vec<i64> = self
            .snapshots
            .windows(2)
            .map(|w| (w[1].timestamp - w[0].timestamp).num_seconds())
            .collect();
        spacings.sort_unstable();
        let median = spacings[spacings.len() / 2] as f64;
        const SECONDS_PER_YEAR: f64 = 365.0 * 24.0 * 3600.0;
        Some(SECONDS_PER_YEAR / median)
    }
}
