use crate::errors::FlakyError;
use crate::model::FlakinessRecord;
use crate::trends::TrendRecord;

/// Pretty JSON array of flagged tests.
pub fn flaky_json(records: &[FlakinessRecord]) -> Result<String, FlakyError> {
    Ok(serde_json::to_string_pretty(records)?)
}

pub fn trends_json(records: &[TrendRecord]) -> Result<String, FlakyError> {
    Ok(serde_json::to_string_pretty(records)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::RootCause;
    use crate::trends::Trend;

    #[test]
    fn empty_list_is_empty_array() {
        assert_eq!(flaky_json(&[]).unwrap(), "[]");
    }

    #[test]
    fn flaky_keys_match_contract() {
        let rec = FlakinessRecord {
            test_name: "m.t".into(),
            flip_rate: 0.5,
            total_runs: 4,
            failure_count: 2,
            root_cause: RootCause::SharedState,
            cost_usd: 0.16,
            rerun_count: 2,
        };
        let v: serde_json::Value = serde_json::from_str(&flaky_json(&[rec]).unwrap()).unwrap();
        let obj = v[0].as_object().unwrap();
        let mut keys: Vec<&str> = obj.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            ["cost_usd", "failures", "flip_rate", "reruns", "root_cause", "runs", "test"]
        );
        assert_eq!(v[0]["root_cause"], "shared_state");
    }

    #[test]
    fn trend_keys_match_contract() {
        let rec = TrendRecord {
            test_name: "m.t".into(),
            total_runs: 3,
            fail_rate: 0.333,
            slope: -0.5,
            trend: Trend::Improving,
        };
        let v: serde_json::Value = serde_json::from_str(&trends_json(&[rec]).unwrap()).unwrap();
        assert_eq!(v[0]["test_name"], "m.t");
        assert_eq!(v[0]["total_runs"], 3);
        assert_eq!(v[0]["trend"], "improving");
    }
}
