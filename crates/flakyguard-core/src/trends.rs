use crate::model::{round_to, TestResult};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Slopes beyond +/- this are a trend rather than noise.
pub const TREND_EPSILON: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Improving,
    Stable,
    Worsening,
}

impl Trend {
    pub fn from_slope(slope: f64) -> Self {
        if slope > TREND_EPSILON {
            Trend::Worsening
        } else if slope < -TREND_EPSILON {
            Trend::Improving
        } else {
            Trend::Stable
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Improving => "improving",
            Trend::Stable => "stable",
            Trend::Worsening => "worsening",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendRecord {
    pub test_name: String,
    pub total_runs: u64,
    pub fail_rate: f64,
    pub slope: f64,
    pub trend: Trend,
}

/// Least-squares slope of `ys` against their index. Zero below two points.
pub fn linear_slope(ys: &[f64]) -> f64 {
    let n = ys.len();
    if n < 2 {
        return 0.0;
    }
    let mean_x = (n - 1) as f64 / 2.0;
    let mean_y = ys.iter().sum::<f64>() / n as f64;
    let (mut num, mut den) = (0.0, 0.0);
    for (i, y) in ys.iter().enumerate() {
        let dx = i as f64 - mean_x;
        num += dx * (y - mean_y);
        den += dx * dx;
    }
    num / den
}

/// Failure-rate trend per test over the last `window_days` before `now`.
///
/// Tests with fewer than two results in the window are omitted. Sorted by
/// slope, most worsening first.
pub fn analyze_trends(history: &[TestResult], window_days: u32, now: DateTime<Utc>) -> Vec<TrendRecord> {
    // windows reaching past the representable range cover the whole history
    let since = now
        .checked_sub_signed(Duration::days(i64::from(window_days)))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    let mut by_name: BTreeMap<&str, Vec<&TestResult>> = BTreeMap::new();
    for r in history.iter().filter(|r| r.timestamp >= since) {
        by_name.entry(r.test_name.as_str()).or_default().push(r);
    }

    let mut out: Vec<TrendRecord> = by_name
        .into_iter()
        .filter(|(_, results)| results.len() >= 2)
        .map(|(name, mut results)| {
            results.sort_by_key(|r| r.timestamp);
            let ys: Vec<f64> = results
                .iter()
                .map(|r| if r.status.is_pass() { 0.0 } else { 1.0 })
                .collect();
            let fail_rate = ys.iter().sum::<f64>() / ys.len() as f64;
            let slope = round_to(linear_slope(&ys), 4);
            TrendRecord {
                test_name: name.to_string(),
                total_runs: ys.len() as u64,
                fail_rate: round_to(fail_rate, 3),
                slope,
                trend: Trend::from_slope(slope),
            }
        })
        .collect();

    out.sort_by(|a, b| {
        b.slope
            .total_cmp(&a.slope)
            .then_with(|| a.test_name.cmp(&b.test_name))
    });
    out
}
