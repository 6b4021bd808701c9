//! Flip-rate detection.
//!
//! A flip is a status change between chronologically consecutive results of
//! the same test. Any change counts, including `fail` -> `error`.

use crate::classify::{Classifier, FailureEvidence};
use crate::config::DetectSettings;
use crate::model::{round_to, FlakinessRecord, TestResult, TestStatus};
use std::collections::BTreeMap;

/// Fraction of consecutive pairs whose status differs.
///
/// Always within `[0, 1]`; an empty or single-element sequence yields 0.
pub fn flip_rate(statuses: &[TestStatus]) -> f64 {
    let flips = statuses.windows(2).filter(|w| w[0] != w[1]).count();
    flips as f64 / statuses.len().saturating_sub(1).max(1) as f64
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Detector {
    pub settings: DetectSettings,
    pub classifier: Classifier,
}

impl Detector {
    pub fn new(settings: DetectSettings, classifier: Classifier) -> Self {
        Self {
            settings,
            classifier,
        }
    }

    /// Evaluates every test in `history`, which must be in insertion order.
    ///
    /// Output is sorted by test name; cost fields are left at zero.
    pub fn detect(&self, history: &[TestResult]) -> Vec<FlakinessRecord> {
        let mut by_name: BTreeMap<&str, Vec<&TestResult>> = BTreeMap::new();
        for r in history {
            by_name.entry(r.test_name.as_str()).or_default().push(r);
        }

        let mut out = Vec::new();
        for (name, mut results) in by_name {
            let total = results.len() as u64;
            if total < self.settings.min_runs {
                tracing::debug!(test = name, runs = total, "insufficient runs, skipping");
                continue;
            }

            // stable: equal timestamps keep insertion order
            results.sort_by_key(|r| r.timestamp);
            let statuses: Vec<TestStatus> = results.iter().map(|r| r.status).collect();
            let rate = flip_rate(&statuses);
            tracing::debug!(test = name, runs = total, flip_rate = rate, "evaluated");
            if rate < self.settings.threshold {
                continue;
            }

            let evidence = FailureEvidence::from_results(results.iter().copied());
            out.push(FlakinessRecord {
                test_name: name.to_string(),
                flip_rate: round_to(rate, 3),
                total_runs: total,
                failure_count: results.iter().filter(|r| !r.status.is_pass()).count() as u64,
                root_cause: self.classifier.classify(&evidence),
                cost_usd: 0.0,
                rerun_count: 0,
            });
        }
        out
    }
}

/// Detects with the default classifier.
pub fn detect(history: &[TestResult], min_runs: u64, threshold: f64) -> Vec<FlakinessRecord> {
    Detector::new(
        DetectSettings {
            min_runs,
            threshold,
        },
        Classifier::default(),
    )
    .detect(history)
}
