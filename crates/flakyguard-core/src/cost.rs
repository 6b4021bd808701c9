use crate::errors::FlakyError;
use crate::model::{round_to, FlakinessRecord, TestResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// CI pricing used to turn reruns into dollars.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CostModel {
    pub ci_rate_per_minute: f64,
    pub rerun_duration_minutes: f64,
}

impl Default for CostModel {
    fn default() -> Self {
        Self {
            ci_rate_per_minute: 0.008,
            rerun_duration_minutes: 10.0,
        }
    }
}

impl CostModel {
    pub fn new(ci_rate_per_minute: f64, rerun_duration_minutes: f64) -> Self {
        Self {
            ci_rate_per_minute,
            rerun_duration_minutes,
        }
    }

    pub fn validate(&self) -> Result<(), FlakyError> {
        for (name, v) in [
            ("ci_rate_per_minute", self.ci_rate_per_minute),
            ("rerun_duration_minutes", self.rerun_duration_minutes),
        ] {
            if !(v.is_finite() && v >= 0.0) {
                return Err(FlakyError::Config(format!(
                    "{} must be a non-negative number, got {}",
                    name, v
                )));
            }
        }
        Ok(())
    }

    pub fn cost_for(&self, rerun_count: u64) -> f64 {
        round_to(
            rerun_count as f64 * self.rerun_duration_minutes * self.ci_rate_per_minute,
            2,
        )
    }
}

/// Distinct run ids with at least one non-passing result, per test name.
pub fn rerun_counts(history: &[TestResult]) -> BTreeMap<&str, u64> {
    let mut runs: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for r in history.iter().filter(|r| !r.status.is_pass()) {
        runs.entry(r.test_name.as_str())
            .or_default()
            .insert(r.run_id.as_str());
    }
    runs.into_iter()
        .map(|(name, ids)| (name, ids.len() as u64))
        .collect()
}

/// Fills `rerun_count` and `cost_usd` on each record.
pub fn attribute_cost(
    mut records: Vec<FlakinessRecord>,
    history: &[TestResult],
    model: &CostModel,
) -> Vec<FlakinessRecord> {
    let counts = rerun_counts(history);
    for rec in &mut records {
        rec.rerun_count = counts.get(rec.test_name.as_str()).copied().unwrap_or(0);
        rec.cost_usd = model.cost_for(rec.rerun_count);
    }
    records
}
