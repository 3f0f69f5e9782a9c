//! Mocha JSON reporter adapter
//!
//! Shape: `{ stats: { passes, failures, pending, start, end, duration },
//! tests: [{ title, fullTitle, file, duration, currentRetry, err: {} }] }`.
//! Per-record outcome is only passed or failed; pending counts come from `stats`.

use super::json::{
    array_field, count_field, is_non_empty_object, millis_field, parse_timestamp,
    resolve_duration, str_field,
};
use super::FormatAdapter;
use crate::error::{ConversionError, ConversionResult};
use crate::report::{FailureDetail, Report, RunSummary, StatusCounts, TestRecord, TestStatus};
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::warn;

pub struct MochaAdapter;

impl FormatAdapter for MochaAdapter {
    fn name(&self) -> &'static str {
        "mocha"
    }

    fn can_recognize(&self, raw: &Value) -> bool {
        raw.get("stats").is_some_and(Value::is_object)
            && raw.get("tests").is_some_and(Value::is_array)
    }

    fn convert_at(&self, raw: &Value, now: DateTime<Utc>) -> ConversionResult<Report> {
        let tests = raw
            .get("tests")
            .and_then(Value::as_array)
            .ok_or(ConversionError::MissingField {
                framework: "mocha",
                field: "tests",
            })?;
        let stats = raw.get("stats").ok_or(ConversionError::MissingField {
            framework: "mocha",
            field: "stats",
        })?;

        let results: Vec<TestRecord> = tests.iter().map(convert_test).collect();

        let counts = StatusCounts {
            passed: count_field(stats, "passes"),
            failed: count_field(stats, "failures"),
            skipped: count_field(stats, "pending"),
            flaky: 0,
        };
        if let Some(reported) = stats.get("tests").and_then(Value::as_u64) {
            if reported != counts.total() {
                warn!(
                    reported,
                    derived = counts.total(),
                    "mocha stats.tests disagrees with passes + failures + pending"
                );
            }
        }

        let duration = resolve_duration(millis_field(stats, "duration"), stats.get("start"), now);
        let timestamp = parse_timestamp(stats.get("end")).unwrap_or(now);

        let summary = RunSummary::new(counts, duration, self.name(), timestamp);
        Ok(Report::new(summary, results))
    }
}

fn convert_test(test: &Value) -> TestRecord {
    let title = str_field(test, "title").unwrap_or_default();
    let full_title = str_field(test, "fullTitle").unwrap_or(title);

    let suite = match str_field(test, "file") {
        Some(file) if !file.is_empty() => file.to_string(),
        _ => full_title
            .strip_suffix(title)
            .unwrap_or_default()
            .trim_end()
            .to_string(),
    };

    let err = test.get("err");
    let (status, error) = if is_non_empty_object(err) {
        let err = err.unwrap_or(&Value::Null);
        let detail = FailureDetail::new(str_field(err, "message").unwrap_or_default())
            .with_stack(str_field(err, "stack").map(String::from))
            .with_diff(str_field(err, "diff").map(String::from));
        (TestStatus::Failed, Some(detail))
    } else {
        (TestStatus::Passed, None)
    };

    let retries = test
        .get("currentRetry")
        .and_then(Value::as_u64)
        .filter(|r| *r > 0)
        .map(|r| r as u32);

    TestRecord {
        id: full_title.to_string(),
        name: title.to_string(),
        suite,
        status,
        duration: millis_field(test, "duration").unwrap_or(0),
        error,
        retries,
        history: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fixture() -> Value {
        json!({
            "stats": {
                "suites": 1, "tests": 3, "passes": 1, "pending": 1, "failures": 1,
                "start": "2024-02-01T08:00:00.000Z",
                "end": "2024-02-01T08:00:02.000Z",
                "duration": 2000
            },
            "tests": [
                {"title": "adds", "fullTitle": "Math adds", "file": "test/math.js", "duration": 2, "err": {}},
                {"title": "divides", "fullTitle": "Math divides", "duration": 7, "currentRetry": 2,
                 "err": {"message": "expected 0 to equal 1", "stack": "AssertionError: ...", "diff": "- 0\n+ 1"}},
                {"title": "rounds", "fullTitle": "Math rounds", "file": "test/math.js", "err": {}}
            ],
            "passes": [], "failures": [], "pending": []
        })
    }

    #[test]
    fn test_recognizes_stats_and_tests() {
        assert!(MochaAdapter.can_recognize(&fixture()));
        assert!(!MochaAdapter.can_recognize(&json!({"stats": {}})));
        assert!(!MochaAdapter.can_recognize(&json!({"stats": 3, "tests": []})));
    }

    #[test]
    fn test_error_object_implies_failed() {
        let report = MochaAdapter.convert(&fixture()).unwrap();
        let statuses: Vec<TestStatus> = report.results.iter().map(|r| r.status).collect();
        // Pending tests are not distinguished per record.
        assert_eq!(
            statuses,
            [TestStatus::Passed, TestStatus::Failed, TestStatus::Passed]
        );
        let failed = &report.results[1];
        assert_eq!(failed.error_message(), Some("expected 0 to equal 1"));
        assert_eq!(failed.error.as_ref().unwrap().diff.as_deref(), Some("- 0\n+ 1"));
        assert_eq!(failed.retries, Some(2));
    }

    #[test]
    fn test_counts_come_from_stats() {
        let report = MochaAdapter.convert(&fixture()).unwrap();
        let s = &report.summary;
        assert_eq!((s.total, s.passed, s.failed, s.skipped, s.flaky), (3, 1, 1, 1, 0));
        assert_eq!(s.duration, 2000);
        assert_eq!(s.timestamp.to_rfc3339(), "2024-02-01T08:00:02+00:00");
    }

    #[test]
    fn test_identity_fields() {
        let report = MochaAdapter.convert(&fixture()).unwrap();
        assert_eq!(report.results[0].id, "Math adds");
        assert_eq!(report.results[0].suite, "test/math.js");
        // No file: suite is the fullTitle prefix.
        assert_eq!(report.results[1].suite, "Math");
    }

    #[test]
    fn test_missing_end_uses_conversion_time() {
        let now = Utc::now();
        let raw = json!({"stats": {"passes": 0}, "tests": []});
        let report = MochaAdapter.convert_at(&raw, now).unwrap();
        assert_eq!(report.summary.timestamp, now);
        assert_eq!(report.summary.duration, 0);
    }
}
