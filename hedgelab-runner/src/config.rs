//! Serializable run specification — the TOML surface of a backtest.

use serde::{Deserialize, Serialize};

use hedgelab_core::domain::StrategyParameters;
use hedgelab_core::sim::BacktestConfig;

use crate::runner::RunError;
use crate::sweep::ParamGrid;

/// A complete run specification: strategy, cost model, optional sweep.
///
/// Every section and every field is optional in the TOML; omitted values
/// take the library defaults. Parsed specs are validated before use.
///
/// ```toml
/// [strategy]
/// delta_threshold = 0.05
/// rebalance_cooldown_periods = 12
///
/// [backtest]
/// initial_capital_usd = 250000.0
///
/// [sweep]
/// delta_thresholds = [0.02, 0.05, 0.1]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSpec {
    pub strategy: StrategyParameters,
    pub backtest: BacktestConfig,
    pub sweep: Option<ParamGrid>,
}

impl RunSpec {
    /// Parse and validate a TOML run specification.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, RunError> {
        let spec: RunSpec = toml::from_str(toml_str)?;
        spec.strategy.validate()?;
        spec.backtest.validate()?;
        Ok(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_spec_uses_all_defaults() {
        let spec = RunSpec::from_toml_str("").unwrap();
        assert_eq!(spec.strategy, StrategyParameters::default());
        assert_eq!(spec.backtest, BacktestConfig::default());
        assert!(spec.sweep.is_none());
    }

    #[test]
    fn partial_sections_fill_defaults() {
        let spec = RunSpec::from_toml_str(
            r#"
            [strategy]
            delta_threshold = 0.05
            rebalance_cooldown_periods = 12

            [backtest]
            initial_capital_usd = 250000.0
            "#,
        )
        .unwrap();

        assert_eq!(spec.strategy.delta_threshold, 0.05);
        assert_eq!(spec.strategy.rebalance_cooldown_periods, 12);
        assert_eq!(spec.strategy.hedge_ratio, 1.0);
        assert_eq!(spec.backtest.initial_capital_usd, 250_000.0);
        assert_eq!(spec.backtest.annualization_factor, 8760.0);
    }

    #[test]
    fn sweep_section_parses_axes() {
        let spec = RunSpec::from_toml_str(
            r#"
            [sweep]
            delta_thresholds = [0.02, 0.05, 0.1]
            stop_loss_fractions = [0.1, 0.2]
            "#,
        )
        .unwrap();

        let grid = spec.sweep.unwrap();
        assert_eq!(grid.delta_thresholds, vec![0.02, 0.05, 0.1]);
        assert_eq!(grid.stop_loss_fractions, vec![0.1, 0.2]);
        // Unswept axes default to a single value.
        assert_eq!(grid.hedge_ratios.len(), 1);
        assert_eq!(grid.size(), 6);
    }

    #[test]
    fn invalid_strategy_values_are_rejected() {
        let err = RunSpec::from_toml_str(
            r#"
            [strategy]
            stop_loss_fraction = 1.5
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, RunError::Domain(_)));
    }

    #[test]
    fn malformed_toml_is_rejected() {
        assert!(matches!(
            RunSpec::from_toml_str("[strategy").unwrap_err(),
            RunError::Toml(_)
        ));
    }

    #[test]
    fn spec_roundtrips_through_toml() {
        let spec = RunSpec {
            strategy: StrategyParameters {
                delta_threshold: 0.07,
                ..Default::default()
            },
            backtest: BacktestConfig::default(),
            sweep: Some(ParamGrid::default()),
        };
        let encoded = toml::to_string(&spec).unwrap();
        let decoded = RunSpec::from_toml_str(&encoded).unwrap();
        assert_eq!(spec, decoded);
    }
}
