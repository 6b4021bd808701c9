//! FlakyGuard core: flaky test detection over a JUnit result history.
//!
//! Reports are ingested into an append-only SQLite [`storage::Store`]. A
//! detection pass computes per-test flip rates ([`mod@detect`]), labels a likely
//! root cause ([`mod@classify`]), prices the wasted reruns ([`mod@cost`]) and can
//! render a pytest skip-list ([`mod@quarantine`]).

pub mod classify;
pub mod config;
pub mod cost;
pub mod detect;
pub mod errors;
pub mod ingest;
pub mod model;
pub mod pipeline;
pub mod quarantine;
pub mod report;
pub mod storage;
pub mod trends;

pub use classify::{classify, Classifier, RootCause, TimingHeuristic};
pub use config::GuardConfig;
pub use cost::{attribute_cost, CostModel};
pub use detect::{detect, flip_rate, Detector};
pub use errors::FlakyError;
pub use model::{FlakinessRecord, TestResult, TestStatus};
pub use pipeline::Analysis;
pub use quarantine::emit_quarantine;
pub use storage::Store;
