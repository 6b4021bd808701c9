use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classify::RootCause;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestStatus {
    Pass,
    Fail,
    Error,
}

impl TestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestStatus::Pass => "pass",
            TestStatus::Fail => "fail",
            TestStatus::Error => "error",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pass" => Some(Self::Pass),
            "fail" => Some(Self::Fail),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, TestStatus::Pass)
    }
}

impl std::fmt::Display for TestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One test-case outcome from one report. Never mutated once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub test_name: String,
    pub status: TestStatus,
    /// Seconds, always >= 0.
    pub duration: f64,
    /// Empty when the test passed.
    pub error_message: String,
    pub run_id: String,
    pub timestamp: DateTime<Utc>,
}

impl TestResult {
    pub fn new(
        test_name: impl Into<String>,
        status: TestStatus,
        duration: f64,
        error_message: impl Into<String>,
        run_id: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            test_name: test_name.into(),
            status,
            duration,
            error_message: error_message.into(),
            run_id: run_id.into(),
            timestamp,
        }
    }
}

/// Derived per detection pass, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlakinessRecord {
    #[serde(rename = "test")]
    pub test_name: String,
    pub flip_rate: f64,
    #[serde(rename = "runs")]
    pub total_runs: u64,
    #[serde(rename = "failures")]
    pub failure_count: u64,
    pub root_cause: RootCause,
    pub cost_usd: f64,
    #[serde(rename = "reruns")]
    pub rerun_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestOutcome {
    pub run_id: String,
    pub recorded: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub files_ingested: usize,
    pub tests_recorded: usize,
    pub files_skipped: usize,
    pub files_failed: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    pub results: u64,
    pub tests: u64,
    pub runs: u64,
}

/// Per-name totals as aggregated by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameCounts {
    pub test_name: String,
    pub total: u64,
    pub failures: u64,
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
