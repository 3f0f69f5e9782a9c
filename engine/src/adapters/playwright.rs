//! Playwright JSON reporter adapter
//!
//! Shape: `{ config, suites: [{ title, specs: [{ id, title, tests: [{ projectName,
//! results: [{ status, duration, error }] }] }], suites: [...] }], stats }`.

use super::json::{array_field, millis_field, resolve_duration, str_field};
use super::{attempt_status, FormatAdapter};
use crate::error::{ConversionError, ConversionResult};
use crate::report::{
    FailureDetail, OutcomeHistory, Report, RunSummary, StatusCounts, TestRecord, TestStatus,
};
use chrono::{DateTime, Utc};
use serde_json::Value;

pub struct PlaywrightAdapter;

impl FormatAdapter for PlaywrightAdapter {
    fn name(&self) -> &'static str {
        "playwright"
    }

    fn can_recognize(&self, raw: &Value) -> bool {
        raw.get("config").is_some_and(|c| !c.is_null())
            && raw.get("suites").is_some_and(Value::is_array)
    }

    fn convert_at(&self, raw: &Value, now: DateTime<Utc>) -> ConversionResult<Report> {
        let suites = raw
            .get("suites")
            .and_then(Value::as_array)
            .ok_or(ConversionError::MissingField {
                framework: "playwright",
                field: "suites",
            })?;

        let mut results = Vec::new();
        walk_suites(suites, &mut results);

        let stats = raw.get("stats").unwrap_or(&Value::Null);
        let duration = resolve_duration(
            millis_field(stats, "duration"),
            stats.get("startTime"),
            now,
        );

        let summary = RunSummary::new(StatusCounts::tally(&results), duration, self.name(), now);
        Ok(Report::new(summary, results))
    }
}

/// Depth-first: a suite's own specs, then its child suites.
fn walk_suites(suites: &[Value], out: &mut Vec<TestRecord>) {
    for suite in suites {
        let suite_title = str_field(suite, "title").unwrap_or_default();

        for spec in array_field(suite, "specs") {
            let spec_title = str_field(spec, "title").unwrap_or_default();
            let base_id = str_field(spec, "id")
                .map(String::from)
                .unwrap_or_else(|| format!("{}-{}", suite_title, spec_title));

            let tests = array_field(spec, "tests");
            for (index, test) in tests.iter().enumerate() {
                // One test per project; keep ids unique when a spec ran under several.
                let id = if tests.len() > 1 {
                    match str_field(test, "projectName").filter(|p| !p.is_empty()) {
                        Some(project) => format!("{}-{}", base_id, project),
                        None => format!("{}-{}", base_id, index),
                    }
                } else {
                    base_id.clone()
                };
                out.push(convert_test(test, id, spec_title, suite_title));
            }
        }

        walk_suites(array_field(suite, "suites"), out);
    }
}

fn convert_test(test: &Value, id: String, name: &str, suite: &str) -> TestRecord {
    let attempts = array_field(test, "results");
    let first = attempts.first().unwrap_or(&Value::Null);

    let status = match str_field(first, "status") {
        Some("unexpected") => TestStatus::Failed,
        Some("expected") => TestStatus::Passed,
        _ => TestStatus::Skipped,
    };

    let error = match (status, first.get("error")) {
        (TestStatus::Failed, Some(err)) if err.is_object() => Some(
            FailureDetail::new(str_field(err, "message").unwrap_or_default())
                .with_stack(str_field(err, "stack").map(String::from)),
        ),
        _ => None,
    };

    let (retries, history) = if attempts.len() > 1 {
        let history = OutcomeHistory::from_attempts(
            attempts
                .iter()
                .filter_map(|a| str_field(a, "status").and_then(attempt_status)),
        );
        (Some(attempts.len() as u32 - 1), Some(history))
    } else {
        (None, None)
    };

    TestRecord {
        id,
        name: name.to_string(),
        suite: suite.to_string(),
        status,
        duration: millis_field(first, "duration").unwrap_or(0),
        error,
        retries,
        history,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fixture() -> Value {
        json!({
            "config": {"version": "1.40.0"},
            "suites": [{
                "title": "auth.spec.ts",
                "specs": [
                    {
                        "id": "spec-login",
                        "title": "logs in",
                        "tests": [{"results": [{"status": "expected", "duration": 120}]}]
                    },
                    {
                        "title": "rejects bad password",
                        "tests": [{"results": [{
                            "status": "unexpected",
                            "duration": 80,
                            "error": {"message": "Timeout 5000ms exceeded", "stack": "at login.ts:4"}
                        }]}]
                    }
                ],
                "suites": [{
                    "title": "nested",
                    "specs": [{
                        "id": "spec-deep",
                        "title": "deep spec",
                        "tests": [{"results": [{"status": "skipped", "duration": 0}]}]
                    }]
                }]
            }],
            "stats": {"duration": 1500.4}
        })
    }

    #[test]
    fn test_recognizes_config_and_suites() {
        assert!(PlaywrightAdapter.can_recognize(&fixture()));
        assert!(!PlaywrightAdapter.can_recognize(&json!({"suites": []})));
        assert!(!PlaywrightAdapter.can_recognize(&json!({"config": {}, "suites": "x"})));
    }

    #[test]
    fn test_walks_nested_suites() {
        let report = PlaywrightAdapter.convert(&fixture()).unwrap();
        let ids: Vec<&str> = report.results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(
            ids,
            ["spec-login", "auth.spec.ts-rejects bad password", "spec-deep"]
        );
        assert_eq!(report.results[2].suite, "nested");
    }

    #[test]
    fn test_status_mapping_and_error() {
        let report = PlaywrightAdapter.convert(&fixture()).unwrap();
        assert_eq!(report.results[0].status, TestStatus::Passed);
        assert!(report.results[0].error.is_none());

        let failed = &report.results[1];
        assert_eq!(failed.status, TestStatus::Failed);
        assert_eq!(failed.error_message(), Some("Timeout 5000ms exceeded"));
        assert_eq!(
            failed.error.as_ref().unwrap().stack.as_deref(),
            Some("at login.ts:4")
        );

        assert_eq!(report.results[2].status, TestStatus::Skipped);
    }

    #[test]
    fn test_only_failed_results_carry_errors() {
        let raw = json!({
            "config": {},
            "suites": [{"title": "s", "specs": [
                {
                    "id": "ok",
                    "title": "passes",
                    "tests": [{"results": [{"status": "expected", "error": {"message": "stale"}}]}]
                },
                {
                    "id": "slow",
                    "title": "times out",
                    "tests": [{"results": [{"status": "timedOut", "error": {"message": "Timeout"}}]}]
                }
            ]}]
        });
        let report = PlaywrightAdapter.convert(&raw).unwrap();
        assert_eq!(report.results[0].status, TestStatus::Passed);
        assert_eq!(report.results[1].status, TestStatus::Skipped);
        for record in &report.results {
            assert!(record.error.is_none(), "{} carries an error", record.id);
        }
    }

    #[test]
    fn test_summary_counts_from_records() {
        let report = PlaywrightAdapter.convert(&fixture()).unwrap();
        let s = &report.summary;
        assert_eq!((s.total, s.passed, s.failed, s.skipped, s.flaky), (3, 1, 1, 1, 0));
        assert_eq!(s.duration, 1500);
        assert_eq!(s.framework, "playwright");
    }

    #[test]
    fn test_first_attempt_decides_outcome() {
        let raw = json!({
            "config": {},
            "suites": [{"title": "s", "specs": [{
                "id": "retry",
                "title": "retried",
                "tests": [{"results": [
                    {"status": "unexpected", "duration": 30, "error": {"message": "boom"}},
                    {"status": "expected", "duration": 40}
                ]}]
            }]}]
        });
        let report = PlaywrightAdapter.convert(&raw).unwrap();
        let r = &report.results[0];
        assert_eq!(r.status, TestStatus::Failed);
        assert_eq!(r.duration, 30);
        assert_eq!(r.retries, Some(1));
        assert_eq!(r.history.as_ref().unwrap().last_five_statuses.len(), 2);
    }

    #[test]
    fn test_multi_project_ids_are_unique() {
        let raw = json!({
            "config": {},
            "suites": [{"title": "s", "specs": [{
                "id": "abc",
                "title": "t",
                "tests": [
                    {"projectName": "chromium", "results": [{"status": "expected"}]},
                    {"projectName": "firefox", "results": [{"status": "expected"}]}
                ]
            }]}]
        });
        let report = PlaywrightAdapter.convert(&raw).unwrap();
        assert_eq!(report.results[0].id, "abc-chromium");
        assert_eq!(report.results[1].id, "abc-firefox");
    }

    #[test]
    fn test_duration_falls_back_to_start_time() {
        let now = DateTime::parse_from_rfc3339("2024-01-01T00:00:03Z")
            .unwrap()
            .with_timezone(&Utc);
        let raw = json!({
            "config": {},
            "suites": [],
            "stats": {"startTime": "2024-01-01T00:00:00Z"}
        });
        let report = PlaywrightAdapter.convert_at(&raw, now).unwrap();
        assert_eq!(report.summary.duration, 3_000);
        assert_eq!(report.summary.timestamp, now);
        assert_eq!(report.summary.total, 0);
    }

    #[test]
    fn test_convert_without_suites_errors() {
        let err = PlaywrightAdapter.convert(&json!({})).unwrap_err();
        assert!(matches!(err, ConversionError::MissingField { field: "suites", .. }));
    }
}
