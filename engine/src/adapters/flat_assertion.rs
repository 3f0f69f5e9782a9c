//! Jest and Vitest JSON adapters
//!
//! Both frameworks export `{ numTotalTests, numPassedTests, ..., startTime,
//! testResults: [{ name, assertionResults: [{ title, status, duration,
//! failureMessages }] }] }`. Vitest additionally attaches a `meta` object to
//! each assertion result, which is what tells the two apart.

use super::json::{array_field, count_field, millis_field, resolve_duration, str_field};
use super::FormatAdapter;
use crate::error::{ConversionError, ConversionResult};
use crate::report::{FailureDetail, Report, RunSummary, StatusCounts, TestRecord, TestStatus};
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::warn;

pub struct JestAdapter;

pub struct VitestAdapter;

impl FormatAdapter for JestAdapter {
    fn name(&self) -> &'static str {
        "jest"
    }

    fn can_recognize(&self, raw: &Value) -> bool {
        has_flat_assertion_shape(raw)
    }

    fn convert_at(&self, raw: &Value, now: DateTime<Utc>) -> ConversionResult<Report> {
        convert(raw, self.name(), now)
    }
}

impl FormatAdapter for VitestAdapter {
    fn name(&self) -> &'static str {
        "vitest"
    }

    fn can_recognize(&self, raw: &Value) -> bool {
        has_flat_assertion_shape(raw)
            && array_field(raw, "testResults")
                .iter()
                .flat_map(|suite| array_field(suite, "assertionResults"))
                .any(|a| a.get("meta").is_some_and(Value::is_object))
    }

    fn convert_at(&self, raw: &Value, now: DateTime<Utc>) -> ConversionResult<Report> {
        convert(raw, self.name(), now)
    }
}

fn has_flat_assertion_shape(raw: &Value) -> bool {
    raw.get("numTotalTests").is_some() && raw.get("testResults").is_some_and(Value::is_array)
}

fn convert(raw: &Value, framework: &'static str, now: DateTime<Utc>) -> ConversionResult<Report> {
    let suites = raw
        .get("testResults")
        .and_then(Value::as_array)
        .ok_or(ConversionError::MissingField {
            framework,
            field: "testResults",
        })?;

    let mut results = Vec::new();
    for suite in suites {
        let suite_name = str_field(suite, "name").unwrap_or_default();
        for assertion in array_field(suite, "assertionResults") {
            results.push(convert_assertion(assertion, suite_name));
        }
    }

    let counts = StatusCounts {
        passed: count_field(raw, "numPassedTests"),
        failed: count_field(raw, "numFailedTests"),
        skipped: count_field(raw, "numPendingTests") + count_field(raw, "numTodoTests"),
        flaky: 0,
    };
    let reported = count_field(raw, "numTotalTests");
    if reported != counts.total() {
        warn!(
            framework,
            reported,
            derived = counts.total(),
            "numTotalTests disagrees with per-status counts"
        );
    }

    // No explicit total duration in either export.
    let duration = resolve_duration(None, raw.get("startTime"), now);

    let summary = RunSummary::new(counts, duration, framework, now);
    Ok(Report::new(summary, results))
}

fn convert_assertion(assertion: &Value, suite: &str) -> TestRecord {
    let title = str_field(assertion, "title").unwrap_or_default();

    let status = match str_field(assertion, "status") {
        Some("passed") => TestStatus::Passed,
        Some("failed") => TestStatus::Failed,
        _ => TestStatus::Skipped,
    };

    let messages: Vec<&str> = array_field(assertion, "failureMessages")
        .iter()
        .filter_map(Value::as_str)
        .collect();
    let error = match messages.first() {
        Some(first) if status == TestStatus::Failed => {
            Some(FailureDetail::new(*first).with_stack(Some(messages.join("\n"))))
        }
        _ => None,
    };

    let retries = assertion
        .get("invocations")
        .and_then(Value::as_u64)
        .filter(|n| *n > 1)
        .map(|n| (n - 1) as u32);

    TestRecord {
        id: format!("{}-{}", suite, title),
        name: title.to_string(),
        suite: suite.to_string(),
        status,
        duration: millis_field(assertion, "duration").unwrap_or(0),
        error,
        retries,
        history: None,
    }
}
