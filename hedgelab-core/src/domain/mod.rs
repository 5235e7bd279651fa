//! Domain types — snapshots, parameters, signals, per-run state.

pub mod params;
pub mod signal;
pub mod snapshot;
pub mod state;

pub use params::{DomainError, StrategyParameters};
pub use signal::{Signal, SignalAction};
pub use snapshot::MarketSnapshot;
pub use state::StrategyState;
