//! Plain-text tables for terminal output.

use crate::model::{FlakinessRecord, StoreStats};
use crate::trends::TrendRecord;

const NAME_WIDTH: usize = 55;

/// Keeps the tail of long names; the test's own name is the useful part.
fn truncate_left(s: &str, max: usize) -> String {
    let n = s.chars().count();
    if n <= max {
        s.to_string()
    } else {
        s.chars().skip(n - max).collect()
    }
}

fn render_table(title: &str, headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let line = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:<width$}", c, width = *w))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = String::new();
    out.push_str(title);
    out.push('\n');
    let header: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    out.push_str(&line(&header));
    out.push('\n');
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&line(&rule));
    out.push('\n');
    for row in rows {
        out.push_str(&line(row));
        out.push('\n');
    }
    out
}

/// Flaky-test table, highest flip rate first, with a cost footer.
pub fn format_flaky_table(records: &[FlakinessRecord]) -> String {
    if records.is_empty() {
        return "No flaky tests detected!\n".to_string();
    }
    let mut sorted: Vec<&FlakinessRecord> = records.iter().collect();
    sorted.sort_by(|a, b| {
        b.flip_rate
            .total_cmp(&a.flip_rate)
            .then_with(|| a.test_name.cmp(&b.test_name))
    });

    let rows: Vec<Vec<String>> = sorted
        .iter()
        .map(|r| {
            vec![
                truncate_left(&r.test_name, NAME_WIDTH),
                format!("{:.0}%", r.flip_rate * 100.0),
                r.total_runs.to_string(),
                r.failure_count.to_string(),
                r.root_cause.to_string(),
                format!("${:.2}", r.cost_usd),
            ]
        })
        .collect();

    let total_cost: f64 = records.iter().map(|r| r.cost_usd).sum();
    let mut out = render_table(
        "FlakyGuard - Flaky Test Report",
        &["Test", "Flip Rate", "Runs", "Fails", "Root Cause", "Cost"],
        &rows,
    );
    out.push_str(&format!(
        "\nCI waste: ${:.2} | {} flaky tests found\n",
        total_cost,
        records.len()
    ));
    out
}

pub fn format_trend_table(records: &[TrendRecord], window_days: u32) -> String {
    if records.is_empty() {
        return "No trend data available.\n".to_string();
    }
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|r| {
            vec![
                truncate_left(&r.test_name, NAME_WIDTH),
                r.total_runs.to_string(),
                format!("{:.1}%", r.fail_rate * 100.0),
                format!("{:.4}", r.slope),
                r.trend.as_str().to_string(),
            ]
        })
        .collect();
    render_table(
        &format!("FlakyGuard - Flakiness Trends ({} days)", window_days),
        &["Test", "Runs", "Fail Rate", "Slope", "Trend"],
        &rows,
    )
}

pub fn format_stats(stats: &StoreStats) -> String {
    format!(
        "{} results | {} unique tests | {} CI runs",
        stats.results, stats.tests, stats.runs
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::RootCause;

    fn record(name: &str, flip_rate: f64, cost: f64) -> FlakinessRecord {
        FlakinessRecord {
            test_name: name.into(),
            flip_rate,
            total_runs: 5,
            failure_count: 2,
            root_cause: RootCause::Timing,
            cost_usd: cost,
            rerun_count: 2,
        }
    }

    #[test]
    fn empty_report_message() {
        assert_eq!(format_flaky_table(&[]), "No flaky tests detected!\n");
    }

    #[test]
    fn sorts_by_flip_rate_and_totals_cost() {
        let out = format_flaky_table(&[record("a.slow", 0.25, 0.08), record("b.bad", 1.0, 0.16)]);
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[1].starts_with("Test"));
        assert!(lines[3].starts_with("b.bad"));
        assert!(lines[3].contains("100%"));
        assert!(lines[3].contains("$0.16"));
        assert!(lines[4].starts_with("a.slow"));
        assert!(out.contains("CI waste: $0.24 | 2 flaky tests found"));
    }

    #[test]
    fn long_names_keep_their_tail() {
        let long = format!("{}.test_the_end", "pkg".repeat(30));
        let out = format_flaky_table(&[record(&long, 0.5, 0.0)]);
        let row = out.lines().nth(3).unwrap();
        assert!(row.starts_with(&long[long.len() - NAME_WIDTH..]));
        assert_eq!(truncate_left("short", 10), "short");
    }

    #[test]
    fn stats_line() {
        let s = StoreStats {
            results: 10,
            tests: 3,
            runs: 4,
        };
        assert_eq!(format_stats(&s), "10 results | 3 unique tests | 4 CI runs");
    }
}
