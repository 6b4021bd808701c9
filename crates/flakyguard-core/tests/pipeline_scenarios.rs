//! End-to-end scenarios: JUnit files -> store -> detection -> cost -> quarantine.

use flakyguard_core::classify::FailureEvidence;
use flakyguard_core::ingest::ingest_report;
use flakyguard_core::{
    emit_quarantine, Analysis, Classifier, CostModel, GuardConfig, RootCause, Store,
};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const JUNIT_PASS: &str = r#"<?xml version="1.0"?>
<testsuite tests="2">
  <testcase classname="test_math" name="test_add" time="0.01"/>
  <testcase classname="test_math" name="test_sub" time="0.02"/>
</testsuite>"#;

const JUNIT_FAIL: &str = r#"<?xml version="1.0"?>
<testsuite tests="2">
  <testcase classname="test_math" name="test_add" time="0.5">
    <failure message="timeout waiting for response">AssertionError</failure>
  </testcase>
  <testcase classname="test_math" name="test_sub" time="0.02"/>
</testsuite>"#;

const JUNIT_LEAK: &str = r#"<?xml version="1.0"?>
<testsuite tests="1">
  <testcase classname="test_db" name="test_pool" time="0.3">
    <error message="connection refused, too many open files"/>
  </testcase>
</testsuite>"#;

struct Fixture {
    _dir: TempDir,
    pass: PathBuf,
    fail: PathBuf,
    leak: PathBuf,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let write = |name: &str, body: &str| {
        let p = dir.path().join(name);
        std::fs::write(&p, body).unwrap();
        p
    };
    let pass = write("pass.xml", JUNIT_PASS);
    let fail = write("fail.xml", JUNIT_FAIL);
    let leak = write("leak.xml", JUNIT_LEAK);
    Fixture {
        _dir: dir,
        pass,
        fail,
        leak,
    }
}

fn ingest_sequence(store: &Store, files: &[&Path]) {
    for (i, path) in files.iter().enumerate() {
        ingest_report(store, path, Some(&format!("run-{i}"))).unwrap();
    }
}

#[test]
fn alternating_timeout_is_flagged_as_timing() {
    let fx = fixture();
    let store = Store::memory().unwrap();
    ingest_sequence(&store, &[&fx.pass, &fx.fail, &fx.pass, &fx.fail, &fx.pass]);

    let records = Analysis::default().run(&store).unwrap();
    let flaky: Vec<_> = records
        .iter()
        .filter(|r| r.test_name == "test_math.test_add")
        .collect();
    assert_eq!(flaky.len(), 1);
    assert!(flaky[0].flip_rate >= 0.5);
    assert_eq!(flaky[0].root_cause, RootCause::Timing);
    assert_eq!(flaky[0].total_runs, 5);
    assert_eq!(flaky[0].failure_count, 2);

    assert!(records.iter().all(|r| r.test_name != "test_math.test_sub"));
}

#[test]
fn mostly_failing_timeout_still_timing() {
    let fx = fixture();
    let store = Store::memory().unwrap();
    ingest_sequence(&store, &[&fx.fail, &fx.fail, &fx.fail, &fx.fail, &fx.pass]);

    let records = Analysis::default().run(&store).unwrap();
    let flaky: Vec<_> = records
        .iter()
        .filter(|r| r.test_name.contains("test_add"))
        .collect();
    assert_eq!(flaky.len(), 1);
    assert_eq!(flaky[0].root_cause, RootCause::Timing);
}

#[test]
fn consistent_failure_is_classified_but_not_flagged() {
    let fx = fixture();
    let store = Store::memory().unwrap();
    ingest_sequence(&store, &[&fx.leak, &fx.leak, &fx.leak, &fx.leak]);

    let history = store.query_by_name("test_db.test_pool").unwrap();
    assert_eq!(history.len(), 4);
    let cause = Classifier::default().classify(&FailureEvidence::from_results(&history));
    assert_eq!(cause, RootCause::ResourceLeak);

    let statuses: Vec<_> = history.iter().map(|r| r.status).collect();
    assert_eq!(flakyguard_core::flip_rate(&statuses), 0.0);

    let records = Analysis::default().run(&store).unwrap();
    assert!(records.is_empty(), "always-failing test must not be flagged");
}

#[test]
fn cost_attribution_prices_failing_runs() {
    let fx = fixture();
    let store = Store::memory().unwrap();
    ingest_sequence(&store, &[&fx.pass, &fx.fail, &fx.pass, &fx.fail]);

    let analysis = Analysis {
        cost: CostModel::new(0.01, 10.0),
        ..Analysis::default()
    };
    let records = analysis.run(&store).unwrap();
    assert!(!records.is_empty());
    for r in &records {
        assert_eq!(r.rerun_count, 2);
        assert_eq!(r.cost_usd, 0.2);
    }
}

#[test]
fn insufficient_runs_stay_in_store() {
    let fx = fixture();
    let store = Store::memory().unwrap();
    ingest_sequence(&store, &[&fx.pass, &fx.fail]);

    assert!(Analysis::default().run(&store).unwrap().is_empty());
    assert_eq!(store.count().unwrap(), 4);

    ingest_sequence(&store, &[&fx.pass]);
    assert_eq!(Analysis::default().run(&store).unwrap().len(), 1);
}

#[test]
fn ingest_round_trip_filters_by_run_id() {
    let fx = fixture();
    let store = Store::memory().unwrap();
    ingest_report(&store, &fx.pass, None).unwrap();
    let before = store.count().unwrap();

    let outcome = ingest_report(&store, &fx.fail, None).unwrap();
    assert_eq!(outcome.recorded, 2);
    assert_eq!(store.count().unwrap(), before + 2);

    let rows = store.results_for_run(&outcome.run_id).unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.run_id == outcome.run_id));
}

#[test]
fn quarantine_artifact_lists_flagged_tests() {
    let fx = fixture();
    let store = Store::memory().unwrap();
    ingest_sequence(&store, &[&fx.pass, &fx.fail, &fx.pass, &fx.fail, &fx.pass]);

    let records = Analysis::default().flag(&store).unwrap();
    let code = emit_quarantine(&records);
    assert!(code.contains("QUARANTINED"));
    assert!(code.contains("pytest_collection_modifyitems"));
    assert!(code.contains("\"test_math.test_add\",  # flip=100% timing"));
    assert!(!code.contains("test_sub"));
    assert_eq!(code.matches('{').count() - code.matches("{item.").count(), 1);
    assert_eq!(store.count().unwrap(), 10, "quarantine must not touch history");
}

#[test]
fn config_overrides_reach_the_pipeline() {
    let fx = fixture();
    let store = Store::memory().unwrap();
    ingest_sequence(&store, &[&fx.pass, &fx.fail, &fx.pass]);

    let cfg = GuardConfig::from_yaml_str("detect:\n  min_runs: 4\n").unwrap();
    assert!(Analysis::from_config(&cfg).run(&store).unwrap().is_empty());

    let cfg = GuardConfig::from_yaml_str("cost:\n  ci_rate_per_minute: 0.1\n").unwrap();
    let records = Analysis::from_config(&cfg).run(&store).unwrap();
    assert_eq!(records[0].cost_usd, 1.0);
}
