//! Root-cause classification for flaky tests.
//!
//! Deterministic keyword scoring over the error messages of non-passing
//! results, plus a duration-spread bonus for the timing cause. Ties resolve
//! to the cause declared first in [`TAXONOMY`].

use crate::errors::FlakyError;
use crate::model::TestResult;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RootCause {
    Timing,
    ResourceLeak,
    SharedState,
    Ordering,
    RaceCondition,
    Timezone,
    FloatPrecision,
    /// No keyword matched and no timing bonus applied.
    NonDeterministic,
}

impl RootCause {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Timing => "timing",
            Self::ResourceLeak => "resource_leak",
            Self::SharedState => "shared_state",
            Self::Ordering => "ordering",
            Self::RaceCondition => "race_condition",
            Self::Timezone => "timezone",
            Self::FloatPrecision => "float_precision",
            Self::NonDeterministic => "non_deterministic",
        }
    }
}

impl std::fmt::Display for RootCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Causes in tie-break order, each with its lowercase keyword substrings.
pub const TAXONOMY: &[(RootCause, &[&str])] = &[
    (
        RootCause::Timing,
        &["timeout", "timed out", "sleep", "deadline", "async", "wait"],
    ),
    (
        RootCause::ResourceLeak,
        &["memory", "oom", "connection", "file descriptor", "too many"],
    ),
    (
        RootCause::SharedState,
        &["already exists", "duplicate", "conflict", "locked", "dirty"],
    ),
    (
        RootCause::Ordering,
        &["not found", "setup", "fixture", "depends", "missing"],
    ),
    (
        RootCause::RaceCondition,
        &["race", "concurrent", "thread", "deadlock"],
    ),
    (
        RootCause::Timezone,
        &["timezone", "utc", "tz", "offset", "dst"],
    ),
    (
        RootCause::FloatPrecision,
        &["precision", "float", "decimal", "almost equal"],
    ),
];

/// Bonus for `timing` when failing durations spread widely.
///
/// Triggers when there are at least two non-passing durations and
/// `max > ratio * max(min, floor_secs)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimingHeuristic {
    #[serde(rename = "timing_ratio")]
    pub ratio: f64,
    #[serde(rename = "timing_floor_secs")]
    pub floor_secs: f64,
    #[serde(rename = "timing_bonus")]
    pub bonus: u32,
}

impl Default for TimingHeuristic {
    fn default() -> Self {
        Self {
            ratio: 3.0,
            floor_secs: 0.001,
            bonus: 2,
        }
    }
}

impl TimingHeuristic {
    pub fn validate(&self) -> Result<(), FlakyError> {
        if !(self.ratio.is_finite() && self.ratio > 0.0) {
            return Err(FlakyError::Config(format!(
                "timing_ratio must be a positive number, got {}",
                self.ratio
            )));
        }
        if !(self.floor_secs.is_finite() && self.floor_secs > 0.0) {
            return Err(FlakyError::Config(format!(
                "timing_floor_secs must be a positive number, got {}",
                self.floor_secs
            )));
        }
        Ok(())
    }

    pub fn triggers(&self, durations: &[f64]) -> bool {
        if durations.len() < 2 {
            return false;
        }
        let max = durations.iter().copied().fold(f64::MIN, f64::max);
        let min = durations.iter().copied().fold(f64::MAX, f64::min);
        max > self.ratio * min.max(self.floor_secs)
    }
}

/// Evidence for one test: its non-passing results only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FailureEvidence {
    /// Lowercased, empty messages dropped.
    pub messages: Vec<String>,
    pub durations: Vec<f64>,
}

impl FailureEvidence {
    /// Collects evidence from any results; passing ones are ignored.
    pub fn from_results<'a>(results: impl IntoIterator<Item = &'a TestResult>) -> Self {
        let mut ev = Self::default();
        for r in results.into_iter().filter(|r| !r.status.is_pass()) {
            if !r.error_message.is_empty() {
                ev.messages.push(r.error_message.to_lowercase());
            }
            ev.durations.push(r.duration);
        }
        ev
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Classifier {
    pub timing: TimingHeuristic,
}

impl Classifier {
    pub fn new(timing: TimingHeuristic) -> Self {
        Self { timing }
    }

    /// Scores per cause, in [`TAXONOMY`] order.
    pub fn scores(&self, evidence: &FailureEvidence) -> Vec<(RootCause, u32)> {
        let mut scores: Vec<(RootCause, u32)> = TAXONOMY
            .iter()
            .map(|(cause, keywords)| {
                let hits = evidence
                    .messages
                    .iter()
                    .flat_map(|m| keywords.iter().filter(move |kw| m.contains(*kw)))
                    .count();
                (*cause, u32::try_from(hits).unwrap_or(u32::MAX))
            })
            .collect();

        if self.timing.triggers(&evidence.durations) {
            if let Some(slot) = scores.iter_mut().find(|(c, _)| *c == RootCause::Timing) {
                slot.1 = slot.1.saturating_add(self.timing.bonus);
            }
        }
        scores
    }

    pub fn classify(&self, evidence: &FailureEvidence) -> RootCause {
        let mut best: Option<(RootCause, u32)> = None;
        for (cause, score) in self.scores(evidence) {
            // strict > keeps the first-declared cause on ties
            if score > best.map_or(0, |(_, s)| s) {
                best = Some((cause, score));
            }
        }
        best.map_or(RootCause::NonDeterministic, |(cause, _)| cause)
    }
}

/// Classifies with the default timing heuristic.
pub fn classify<'a>(history_for_test: impl IntoIterator<Item = &'a TestResult>) -> RootCause {
    Classifier::default().classify(&FailureEvidence::from_results(history_for_test))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evidence(messages: &[&str], durations: &[f64]) -> FailureEvidence {
        FailureEvidence {
            messages: messages.iter().map(|m| m.to_lowercase()).collect(),
            durations: durations.to_vec(),
        }
    }

    #[test]
    fn taxonomy_order_is_fixed() {
        let order: Vec<&str> = TAXONOMY.iter().map(|(c, _)| c.label()).collect();
        assert_eq!(
            order,
            [
                "timing",
                "resource_leak",
                "shared_state",
                "ordering",
                "race_condition",
                "timezone",
                "float_precision"
            ]
        );
    }

    #[test]
    fn timeout_message_classifies_as_timing() {
        let ev = evidence(&["Timeout waiting for response"; 2], &[0.5, 0.5]);
        assert_eq!(Classifier::default().classify(&ev), RootCause::Timing);
    }

    #[test]
    fn connection_exhaustion_classifies_as_resource_leak() {
        let ev = evidence(
            &["connection refused, too many open files"; 4],
            &[0.1, 0.1, 0.1, 0.1],
        );
        assert_eq!(Classifier::default().classify(&ev), RootCause::ResourceLeak);
    }

    #[test]
    fn counts_every_message_keyword_pair() {
        let ev = evidence(&["deadlock in thread pool", "race detected"], &[]);
        let scores = Classifier::default().scores(&ev);
        let race = scores
            .iter()
            .find(|(c, _)| *c == RootCause::RaceCondition)
            .unwrap();
        assert_eq!(race.1, 3);
    }

    #[test]
    fn tie_goes_to_first_declared_cause() {
        // one hit each for shared_state ("duplicate") and race_condition ("race")
        let ev = evidence(&["duplicate key", "race"], &[]);
        assert_eq!(Classifier::default().classify(&ev), RootCause::SharedState);
    }

    #[test]
    fn no_signal_is_non_deterministic() {
        let ev = evidence(&["assertionerror: expected 1 got 2"], &[0.2, 0.3]);
        assert_eq!(Classifier::default().classify(&ev), RootCause::NonDeterministic);
        assert_eq!(
            Classifier::default().classify(&FailureEvidence::default()),
            RootCause::NonDeterministic
        );
    }

    #[test]
    fn duration_spread_alone_selects_timing() {
        let ev = evidence(&[], &[0.1, 0.5]);
        assert_eq!(Classifier::default().classify(&ev), RootCause::Timing);
    }

    #[test]
    fn duration_bonus_needs_two_samples() {
        let ev = evidence(&[], &[10.0]);
        assert_eq!(Classifier::default().classify(&ev), RootCause::NonDeterministic);
    }

    #[test]
    fn zero_durations_use_floor() {
        let h = TimingHeuristic::default();
        assert!(!h.triggers(&[0.0, 0.002]));
        assert!(h.triggers(&[0.0, 0.004]));
        assert!(!h.triggers(&[0.0, 0.0]));
    }

    #[test]
    fn bonus_can_outweigh_keywords() {
        // "missing" gives ordering one hit; the timing bonus of 2 wins
        let ev = evidence(&["missing row"], &[0.1, 1.0]);
        assert_eq!(Classifier::default().classify(&ev), RootCause::Timing);

        let quiet = Classifier::new(TimingHeuristic {
            bonus: 0,
            ..TimingHeuristic::default()
        });
        assert_eq!(quiet.classify(&ev), RootCause::Ordering);
    }

    #[test]
    fn evidence_skips_passing_results_and_empty_messages() {
        use crate::model::TestStatus;
        let ts = chrono::Utc::now();
        let rows = vec![
            TestResult::new("a.b", TestStatus::Pass, 9.0, "", "r1", ts),
            TestResult::new("a.b", TestStatus::Fail, 1.0, "Float mismatch", "r2", ts),
            TestResult::new("a.b", TestStatus::Error, 2.0, "", "r3", ts),
        ];
        let ev = FailureEvidence::from_results(&rows);
        assert_eq!(ev.messages, vec!["float mismatch".to_string()]);
        assert_eq!(ev.durations, vec![1.0, 2.0]);
        assert_eq!(classify(&rows), RootCause::FloatPrecision);
    }

    #[test]
    fn maximal_bonus_saturates_instead_of_overflowing() {
        let yaml = "classifier:\n  timing_bonus: 4294967295\n";
        let cfg = crate::config::GuardConfig::from_yaml_str(yaml).unwrap();
        let classifier = Classifier::new(cfg.classifier);
        let ev = evidence(&["timeout"], &[0.1, 1.0]);

        let scores = classifier.scores(&ev);
        assert_eq!(scores[0], (RootCause::Timing, u32::MAX));
        assert_eq!(classifier.classify(&ev), RootCause::Timing);
    }
}
