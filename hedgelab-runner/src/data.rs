//! Series loading and synthetic generation for the runner.
//!
//! Two ways to obtain a [`MarketSeries`] without touching the network:
//! - `load_series_csv()` reads a CSV export with the same column names and
//!   fallback defaults the core accepts
//! - `synthetic_series()` generates a seeded random-walk series for
//!   experiments and tests; identical seeds produce identical series
//!
//! Synthetic data is a developer/debug aid; results derived from it should
//! be labeled as such by the caller.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use hedgelab_core::data::series::{
    DEFAULT_AVAILABLE_BORROW_USD, DEFAULT_PRICE_VOLATILITY_24H, DEFAULT_SWAP_VOLUME_USD,
    DEFAULT_TOTAL_LIQUIDITY_USD,
};
use hedgelab_core::data::{MarketSeries, SeriesError};
use hedgelab_core::domain::MarketSnapshot;

/// Errors from the series loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("series error: {0}")]
    Series(#[from] SeriesError),
    #[error("row {row} has no timestamp")]
    MissingTimestamp { row: usize },
}

/// One CSV row. `timestamp` is RFC 3339; every numeric column is optional
/// and falls back to the core defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SeriesRow {
    timestamp: Option<DateTime<Utc>>,
    price_ratio: Option<f64>,
    asset0_price_usd: Option<f64>,
    total_liquidity_usd: Option<f64>,
    available_borrow_usd: Option<f64>,
    price_volatility_24h: Option<f64>,
    swap_volume_usd: Option<f64>,
}

/// Load a market series from a CSV file.
pub fn load_series_csv(path: &Path) -> Result<MarketSeries, LoadError> {
    load_series_csv_reader(File::open(path)?)
}

/// Load a market series from any CSV reader.
///
/// Price resolution matches the core column rules: `price_ratio` first,
/// then `asset0_price_usd`; a row with neither fails the load.
pub fn load_series_csv_reader<R: Read>(reader: R) -> Result<MarketSeries, LoadError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut snapshots = Vec::new();

    for (index, record) in csv_reader.deserialize().enumerate() {
        let row: SeriesRow = record?;
        let price = row
            .price_ratio
            .or(row.asset0_price_usd)
            .ok_or(LoadError::Series(SeriesError::MissingPriceColumn))?;
        let timestamp = row
            .timestamp
            .ok_or(LoadError::MissingTimestamp { row: index })?;
        snapshots.push(MarketSnapshot {
            timestamp,
            price,
            total_liquidity_usd: row
                .total_liquidity_usd
                .unwrap_or(DEFAULT_TOTAL_LIQUIDITY_USD),
            available_borrow_usd: row
                .available_borrow_usd
                .unwrap_or(DEFAULT_AVAILABLE_BORROW_USD),
            price_volatility_24h: row
                .price_volatility_24h
                .unwrap_or(DEFAULT_PRICE_VOLATILITY_24H),
            swap_volume_usd: row.swap_volume_usd.unwrap_or(DEFAULT_SWAP_VOLUME_USD),
        });
    }

    Ok(MarketSeries::from_snapshots(snapshots)?)
}

/// Shape of a generated synthetic series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticSeriesConfig {
    /// Number of hourly bars. One week by default.
    pub bars: usize,
    pub initial_price: f64,
    /// Deterministic per-bar price drift, as a fraction.
    pub drift_per_bar: f64,
    /// Half-width of the uniform per-bar price shock, as a fraction.
    pub volatility_per_bar: f64,
}

impl Default for SyntheticSeriesConfig {
    fn default() -> Self {
        Self {
            bars: 168,
            initial_price: 2000.0,
            drift_per_bar: 0.0,
            volatility_per_bar: 0.0025,
        }
    }
}

/// Generate a seeded synthetic hourly series.
///
/// Prices follow a multiplicative walk with uniform shocks; liquidity,
/// borrow capacity, and volatility are drawn from fixed bands. The same
/// seed always yields the same series.
pub fn synthetic_series(
    config: &SyntheticSeriesConfig,
    seed: u64,
) -> Result<MarketSeries, SeriesError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let base = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    let mut price = config.initial_price;

    let snapshots: Vec<MarketSnapshot> = (0..config.bars)
        .map(|i| {
            if i > 0 {
                let shock = rng.gen_range(-1.0..1.0) * config.volatility_per_bar;
                price = (price * (1.0 + config.drift_per_bar + shock)).max(1e-6);
            }
            let total_liquidity_usd = rng.gen_range(4_000_000.0..6_000_000.0);
            MarketSnapshot {
                timestamp: base + Duration::hours(i as i64),
                price,
                total_liquidity_usd,
                available_borrow_usd: rng.gen_range(2_000_000.0..3_000_000.0),
                price_volatility_24h: rng.gen_range(0.01..0.05),
                swap_volume_usd: rng.gen_range(5_000.0..50_000.0),
            }
        })
        .collect();

    MarketSeries::from_snapshots(snapshots)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_is_deterministic_per_seed() {
        let config = SyntheticSeriesConfig::default();
        let a = synthetic_series(&config, 42).unwrap();
        let b = synthetic_series(&config, 42).unwrap();
        assert_eq!(a, b);

        let c = synthetic_series(&config, 99).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn synthetic_rows_are_sane_and_hourly() {
        let series = synthetic_series(&SyntheticSeriesConfig::default(), 7).unwrap();
        assert_eq!(series.len(), 168);
        assert!(series.iter().all(|s| s.is_sane()));
        let bars_per_year = series.detected_bars_per_year().unwrap();
        assert!((bars_per_year - 8760.0).abs() < 1.0);
    }

    #[test]
    fn synthetic_zero_bars_is_rejected() {
        let config = SyntheticSeriesConfig {
            bars: 0,
            ..Default::default()
        };
        assert_eq!(synthetic_series(&config, 1).unwrap_err(), SeriesError::Empty);
    }

    #[test]
    fn csv_with_all_columns_loads() {
        let csv = "\
timestamp,price_ratio,total_liquidity_usd,available_borrow_usd,price_volatility_24h,swap_volume_usd
2025-01-01T00:00:00Z,2000.0,5000000.0,2500000.0,0.02,10000.0
2025-01-01T01:00:00Z,2010.0,5100000.0,2600000.0,0.03,12000.0
";
        let series = load_series_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.initial_price(), 2000.0);
        assert_eq!(series.snapshots()[1].price_volatility_24h, 0.03);
    }

    #[test]
    fn csv_missing_optional_columns_uses_defaults() {
        let csv = "\
timestamp,price_ratio
2025-01-01T00:00:00Z,2000.0
2025-01-01T01:00:00Z,2010.0
";
        let series = load_series_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(
            series.snapshots()[0].total_liquidity_usd,
            DEFAULT_TOTAL_LIQUIDITY_USD
        );
        assert_eq!(
            series.snapshots()[0].swap_volume_usd,
            DEFAULT_SWAP_VOLUME_USD
        );
    }

    #[test]
    fn csv_falls_back_to_asset0_price() {
        let csv = "\
timestamp,asset0_price_usd
2025-01-01T00:00:00Z,1800.0
2025-01-01T01:00:00Z,1790.0
";
        let series = load_series_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(series.initial_price(), 1800.0);
    }

    #[test]
    fn csv_without_price_column_fails() {
        let csv = "\
timestamp,total_liquidity_usd
2025-01-01T00:00:00Z,5000000.0
";
        let err = load_series_csv_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Series(SeriesError::MissingPriceColumn)
        ));
    }

    #[test]
    fn csv_with_unordered_timestamps_fails() {
        let csv = "\
timestamp,price_ratio
2025-01-01T01:00:00Z,2000.0
2025-01-01T00:00:00Z,2010.0
";
        let err = load_series_csv_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Series(SeriesError::NonMonotonicTimestamps { index: 1 })
        ));
    }

    #[test]
    fn synthetic_series_runs_through_the_pipeline() {
        use hedgelab_core::domain::StrategyParameters;
        use hedgelab_core::sim::BacktestConfig;

        let series = synthetic_series(&SyntheticSeriesConfig::default(), 42).unwrap();
        let report = crate::runner::run_backtest(
            &series,
            &StrategyParameters::default(),
            &BacktestConfig::default(),
        )
        .unwrap();
        assert_eq!(report.bar_count, 168);
        assert!(report.data_quality_warnings.is_empty());
    }
}
