use crate::errors::{FlakyError, Result};
use crate::model::{NameCounts, StoreStats, TestResult, TestStatus};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::time::Duration;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SELECT_RESULT: &str = "SELECT name, status, duration, error, run_id, ts FROM results";

/// Report file a batch of results came from; keyed by content digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub digest: String,
    pub path: String,
    pub run_id: String,
}

/// Append-only result log backed by one SQLite file.
///
/// Open per command and drop (or [`Store::close`]) when done. Writers in
/// other processes are serialized by SQLite's file lock.
pub struct Store {
    pub(crate) conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| FlakyError::io(parent, e))?;
        }
        let conn = Connection::open(path)?;
        Self::init_connection(conn)
    }

    pub fn memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_connection(conn)
    }

    fn init_connection(conn: Connection) -> Result<Self> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        // WAL for file-backed DBs; in-memory reports "memory"
        let _mode: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
        conn.execute_batch(crate::storage::schema::DDL)?;
        Ok(Self { conn })
    }

    /// Flushes and releases the connection.
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| FlakyError::from(e))
    }

    pub fn append(&self, result: &TestResult) -> Result<()> {
        insert_result(&self.conn, result)
    }

    /// Appends all results atomically: every row is recorded or none is.
    pub fn append_all(&self, results: &[TestResult]) -> Result<usize> {
        self.append_report(results, None)
    }

    /// Like [`Store::append_all`], also recording the source file digest in
    /// the same transaction.
    pub fn append_report(&self, results: &[TestResult], source: Option<&SourceFile>) -> Result<usize> {
        self.conn.execute_batch("BEGIN IMMEDIATE")?;
        let outcome = self.append_report_inner(results, source).and_then(|n| {
            self.conn.execute_batch("COMMIT")?;
            Ok(n)
        });
        if outcome.is_err() {
            // fails harmlessly if SQLite already rolled back
            let _ = self.conn.execute_batch("ROLLBACK");
        }
        outcome
    }

    fn append_report_inner(&self, results: &[TestResult], source: Option<&SourceFile>) -> Result<usize> {
        for r in results {
            insert_result(&self.conn, r)?;
        }
        if let Some(src) = source {
            self.conn.execute(
                "INSERT OR IGNORE INTO ingested_files(digest, path, run_id, ingested_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![src.digest, src.path, src.run_id, format_ts(&Utc::now())],
            )?;
        }
        Ok(results.len())
    }

    /// Results for one test, ordered by timestamp then insertion.
    pub fn query_by_name(&self, name: &str) -> Result<Vec<TestResult>> {
        self.query_results(
            &format!("{} WHERE name = ?1 ORDER BY ts, id", SELECT_RESULT),
            params![name],
        )
    }

    /// Every result in insertion order.
    pub fn history(&self) -> Result<Vec<TestResult>> {
        self.query_results(&format!("{} ORDER BY id", SELECT_RESULT), [])
    }

    pub fn results_for_run(&self, run_id: &str) -> Result<Vec<TestResult>> {
        self.query_results(
            &format!("{} WHERE run_id = ?1 ORDER BY id", SELECT_RESULT),
            params![run_id],
        )
    }

    /// Per-name totals for names with at least `min_runs` results.
    pub fn aggregate_counts(&self, min_runs: u64) -> Result<Vec<NameCounts>> {
        let mut stmt = self.conn.prepare(
            "SELECT name, COUNT(*), SUM(CASE WHEN status != 'pass' THEN 1 ELSE 0 END)
             FROM results
             GROUP BY name
             HAVING COUNT(*) >= ?1
             ORDER BY name",
        )?;
        let rows = stmt.query_map(params![min_runs as i64], |row| {
            Ok(NameCounts {
                test_name: row.get(0)?,
                total: row.get::<_, i64>(1)? as u64,
                failures: row.get::<_, i64>(2)? as u64,
            })
        })?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    pub fn count(&self) -> Result<u64> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM results", [], |row| row.get(0))?;
        Ok(n as u64)
    }

    pub fn stats(&self) -> Result<StoreStats> {
        let (results, tests, runs): (i64, i64, i64) = self.conn.query_row(
            "SELECT COUNT(*), COUNT(DISTINCT name), COUNT(DISTINCT run_id) FROM results",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;
        Ok(StoreStats {
            results: results as u64,
            tests: tests as u64,
            runs: runs as u64,
        })
    }

    pub fn has_digest(&self, digest: &str) -> Result<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM ingested_files WHERE digest = ?1",
                params![digest],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn query_results<P: rusqlite::Params>(&self, sql: &str, p: P) -> Result<Vec<TestResult>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(p, row_to_result)?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }
}

fn insert_result(conn: &Connection, r: &TestResult) -> Result<()> {
    conn.execute(
        "INSERT INTO results(name, status, duration, error, run_id, ts)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            r.test_name,
            r.status.as_str(),
            r.duration,
            r.error_message,
            r.run_id,
            format_ts(&r.timestamp)
        ],
    )?;
    Ok(())
}

fn row_to_result(row: &rusqlite::Row<'_>) -> rusqlite::Result<TestResult> {
    let status: String = row.get(1)?;
    let status = TestStatus::parse(&status).ok_or_else(|| {
        conversion_error(1, FlakyError::Store(format!("unknown status '{}'", status)))
    })?;
    let ts: String = row.get(5)?;
    let timestamp = parse_ts(&ts).map_err(|e| conversion_error(5, e))?;

    Ok(TestResult {
        test_name: row.get(0)?,
        status,
        duration: row.get(2)?,
        error_message: row.get(3)?,
        run_id: row.get(4)?,
        timestamp,
    })
}

fn conversion_error(idx: usize, e: FlakyError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
}

/// Fixed-width RFC 3339 so lexical order is chronological order.
pub(crate) fn format_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_ts(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| FlakyError::Store(format!("bad timestamp '{}': {}", s, e)))
}
