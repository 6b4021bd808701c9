use crate::classify::TimingHeuristic;
use crate::cost::CostModel;
use crate::errors::FlakyError;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const SUPPORTED_CONFIG_VERSION: u32 = 1;
pub const DEFAULT_DB_PATH: &str = "flakyguard.db";
pub const DEFAULT_MIN_RUNS: u64 = 3;
pub const DEFAULT_THRESHOLD: f64 = 0.1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GuardConfig {
    pub version: u32,
    pub detect: DetectSettings,
    pub cost: CostModel,
    pub classifier: TimingHeuristic,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            version: SUPPORTED_CONFIG_VERSION,
            detect: DetectSettings::default(),
            cost: CostModel::default(),
            classifier: TimingHeuristic::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DetectSettings {
    /// Tests with fewer observations are not evaluated.
    pub min_runs: u64,
    /// Flip rate in [0, 1] at or above which a test is reported.
    pub threshold: f64,
}

impl Default for DetectSettings {
    fn default() -> Self {
        Self {
            min_runs: DEFAULT_MIN_RUNS,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl GuardConfig {
    pub fn from_yaml_str(raw: &str) -> Result<Self, FlakyError> {
        let cfg: GuardConfig = serde_yaml::from_str(raw)
            .map_err(|e| FlakyError::Config(format!("failed to parse YAML: {}", e)))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), FlakyError> {
        if self.version != SUPPORTED_CONFIG_VERSION {
            return Err(FlakyError::Config(format!(
                "unsupported config version {} (supported: {})",
                self.version, SUPPORTED_CONFIG_VERSION
            )));
        }
        validate_threshold(self.detect.threshold)?;
        self.cost.validate()?;
        self.classifier.validate()?;
        Ok(())
    }
}

pub fn validate_threshold(threshold: f64) -> Result<(), FlakyError> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(FlakyError::Config(format!(
            "threshold must be within [0, 1], got {}",
            threshold
        )));
    }
    Ok(())
}

pub fn load_config(path: &Path) -> Result<GuardConfig, FlakyError> {
    let raw = std::fs::read_to_string(path).map_err(|e| FlakyError::io(path, e))?;
    GuardConfig::from_yaml_str(&raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let cfg = GuardConfig::from_yaml_str("{}").unwrap();
        assert_eq!(cfg, GuardConfig::default());
        assert_eq!(cfg.detect.min_runs, 3);
        assert_eq!(cfg.cost.ci_rate_per_minute, 0.008);
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let cfg = GuardConfig::from_yaml_str(
            "version: 1\ndetect:\n  threshold: 0.25\nclassifier:\n  timing_bonus: 5\n",
        )
        .unwrap();
        assert_eq!(cfg.detect.threshold, 0.25);
        assert_eq!(cfg.detect.min_runs, 3);
        assert_eq!(cfg.classifier.bonus, 5);
        assert_eq!(cfg.classifier.ratio, 3.0);
    }

    #[test]
    fn rejects_unsupported_version() {
        let err = GuardConfig::from_yaml_str("version: 2").unwrap_err();
        assert!(err.to_string().contains("unsupported config version 2"));
    }

    #[test]
    fn rejects_threshold_out_of_range() {
        let err = GuardConfig::from_yaml_str("detect:\n  threshold: 1.5").unwrap_err();
        assert!(matches!(err, FlakyError::Config(_)));
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(GuardConfig::from_yaml_str("detect:\n  min_run: 4").is_err());
    }
}
