use serde::{Deserialize, Serialize};

use crate::{
    average::AverageMethod,
    ci::{CiMethod, DifferenceSettings, bootstrap::BootstrapConfig, monte_carlo::DEFAULT_TRIALS},
    convert::UnitConversion,
    equalize::GroupKeys,
    schema::{ExtractOptions, LineType},
    statistic::Statistic,
};

/// Everything a verification run needs besides the table and the random
/// number generator.
///
/// Every field has a default, so a JSON document only lists what it changes:
///
/// ```
/// use metstat_engine::{average::AverageMethod, config::VerificationConfig, statistic::Statistic};
///
/// let config: VerificationConfig =
///     serde_json::from_str(r#"{"statistic": "rmse", "average_method": "median"}"#).unwrap();
/// assert_eq!(config.statistic, Statistic::Rmse);
/// assert_eq!(config.average_method, AverageMethod::Median);
/// assert!(config.event_equalization);
/// assert!(config.bootstrap.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VerificationConfig {
    pub statistic: Statistic,
    pub average_method: AverageMethod,
    pub ci_method: CiMethod,
    pub monte_carlo_trials: usize,
    /// Bootstrap each model when present.
    pub bootstrap: Option<BootstrapConfig>,
    /// Applied to the sufficient statistics before anything is derived.
    pub conversion: Option<UnitConversion>,
    pub seed: Option<u64>,
    pub group_keys: GroupKeys,
    pub event_equalization: bool,
    /// Event category of multi-category rows without `EVENT_CAT`.
    pub event_category: Option<usize>,
    /// Forces the line type instead of detecting it.
    pub line_type: Option<LineType>,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            statistic: Statistic::default(),
            average_method: AverageMethod::default(),
            ci_method: CiMethod::default(),
            monte_carlo_trials: DEFAULT_TRIALS,
            bootstrap: None,
            conversion: None,
            seed: None,
            group_keys: GroupKeys::default(),
            event_equalization: true,
            event_category: None,
            line_type: None,
        }
    }
}

impl VerificationConfig {
    #[must_use]
    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            line_type: self.line_type,
            event_category: self.event_category,
        }
    }

    #[must_use]
    pub fn difference_settings(&self) -> DifferenceSettings {
        DifferenceSettings {
            method: self.ci_method,
            statistic: self.statistic,
            average_method: self.average_method,
            trials: self.monte_carlo_trials,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ci::bootstrap::BootstrapMethod;

    #[test]
    fn test_nested_settings() {
        let config: VerificationConfig = serde_json::from_str(
            r#"{
                "ci_method": "EMC_MONTE_CARLO",
                "monte_carlo_trials": 500,
                "bootstrap": {"method": "matched_pairs", "nrepl": 1000},
                "conversion": {"coefficient": 1.8, "constant": -459.67},
                "group_keys": {"independent": "FCST_VALID_BEG"},
                "line_type": "sl1l2",
                "seed": 7
            }"#,
        )
        .unwrap();
        assert_eq!(config.ci_method, CiMethod::EmcMonteCarlo);
        assert_eq!(config.difference_settings().trials, 500);
        let bootstrap = config.bootstrap.unwrap();
        assert_eq!(bootstrap.method, BootstrapMethod::MatchedPairs);
        assert_eq!(bootstrap.nrepl, 1000);
        assert_eq!(bootstrap.level, 0.95);
        assert_eq!(config.group_keys.model, "MODEL");
        assert_eq!(config.group_keys.independent, "FCST_VALID_BEG");
        assert_eq!(config.extract_options().line_type, Some(LineType::Sl1l2));
        assert_eq!(config.seed, Some(7));
    }

    #[test]
    fn test_rejects_unknown_fields_and_names() {
        assert!(serde_json::from_str::<VerificationConfig>(r#"{"stat": "me"}"#).is_err());
        let error = serde_json::from_str::<VerificationConfig>(r#"{"statistic": "nope"}"#)
            .unwrap_err()
            .to_string();
        assert!(error.contains("nope is not a valid statistic"), "{error}");
    }

    #[test]
    fn test_round_trips_through_json() {
        let config = VerificationConfig {
            statistic: Statistic::Ets,
            bootstrap: Some(BootstrapConfig::default()),
            ..VerificationConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(serde_json::from_str::<VerificationConfig>(&json).unwrap(), config);
    }
}
