//! HedgeLab Runner — backtest orchestration, parameter sweeps, metrics, export.
//!
//! This crate builds on `hedgelab-core` to provide:
//! - Pure performance-metric functions with degenerate-input guarantees
//! - The single-run entry point assembling a fingerprinted report
//! - Grid parameter sweeps with per-combination failure isolation
//! - TOML run specifications
//! - CSV series loading and seeded synthetic series generation
//! - JSON/CSV artifact export with schema versioning

pub mod config;
pub mod data;
pub mod export;
pub mod metrics;
pub mod runner;
pub mod sweep;

pub use config::RunSpec;
pub use data::{
    load_series_csv, load_series_csv_reader, synthetic_series, LoadError, SyntheticSeriesConfig,
};
pub use export::{
    export_equity_csv, export_report_json, export_sweep_csv, export_trades_csv,
    import_report_json,
};
pub use metrics::PerformanceMetrics;
pub use runner::{compute_run_id, run_backtest, BacktestReport, RunError, SCHEMA_VERSION};
pub use sweep::{ParamGrid, ParamSweep, SweepResults, SweepRow};
