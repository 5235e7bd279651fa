//! Input data — validated market time series.

pub mod series;

pub use series::{MarketSeries, SeriesError};
