//! Store -> detector -> classifier -> cost attribution, over one snapshot.

use crate::classify::Classifier;
use crate::config::GuardConfig;
use crate::cost::{attribute_cost, CostModel};
use crate::detect::Detector;
use crate::errors::Result;
use crate::model::FlakinessRecord;
use crate::storage::Store;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Analysis {
    pub detector: Detector,
    pub cost: CostModel,
}

impl Analysis {
    pub fn from_config(cfg: &GuardConfig) -> Self {
        Self {
            detector: Detector::new(cfg.detect, Classifier::new(cfg.classifier)),
            cost: cfg.cost,
        }
    }

    /// Flagged tests with root cause, without cost.
    pub fn flag(&self, store: &Store) -> Result<Vec<FlakinessRecord>> {
        let history = store.history()?;
        Ok(self.detector.detect(&history))
    }

    /// Flagged tests with root cause and cost.
    pub fn run(&self, store: &Store) -> Result<Vec<FlakinessRecord>> {
        let history = store.history()?;
        let records = self.detector.detect(&history);
        tracing::debug!(
            results = history.len(),
            flagged = records.len(),
            "detection pass complete"
        );
        Ok(attribute_cost(records, &history, &self.cost))
    }
}
