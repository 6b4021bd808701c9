pub const DDL: &str = r#"
CREATE TABLE IF NOT EXISTS results (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  name TEXT NOT NULL,
  status TEXT NOT NULL,
  duration REAL NOT NULL DEFAULT 0,
  error TEXT NOT NULL DEFAULT '',
  run_id TEXT NOT NULL,
  ts TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_results_name ON results(name, ts, id);
CREATE INDEX IF NOT EXISTS idx_results_run ON results(run_id);

-- Batch ingest: content digests of report files already recorded
CREATE TABLE IF NOT EXISTS ingested_files (
  digest TEXT PRIMARY KEY,
  path TEXT NOT NULL,
  run_id TEXT NOT NULL,
  ingested_at TEXT NOT NULL
);
"#;
