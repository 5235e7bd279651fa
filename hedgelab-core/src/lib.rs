//! HedgeLab Core — delta-neutral LP hedging: domain types, signal engine,
//! position sizing, backtest simulation.
//!
//! This crate contains the heart of the simulator:
//! - Domain types (snapshots, parameters, signals, per-run state)
//! - Validated market time series input
//! - The per-snapshot rebalancing signal engine (cooldown, stop-loss,
//!   delta-threshold gates)
//! - Signal-to-vector position sizing
//! - The bar-by-bar capital simulation with cost model and trade ledger
//!
//! No I/O and no orchestration live here; see `hedgelab-runner` for
//! metrics, parameter sweeps, and artifact export.

pub mod data;
pub mod domain;
pub mod sim;
pub mod sizer;
pub mod strategy;
