//! Cypress module API results adapter
//!
//! Shape: `{ totalTests, totalDuration, startedTestsAt, endedTestsAt, runs: [{
//! spec: { relative }, tests: [{ title: [..], state, displayError, attempts: [{ state, duration }] }] }] }`.

use super::json::{
    array_field, count_field, millis_field, parse_timestamp, resolve_duration, str_field,
};
use super::{attempt_status, FormatAdapter};
use crate::error::{ConversionError, ConversionResult};
use crate::report::{
    FailureDetail, OutcomeHistory, Report, RunSummary, StatusCounts, TestRecord, TestStatus,
};
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::warn;

pub struct CypressAdapter;

impl FormatAdapter for CypressAdapter {
    fn name(&self) -> &'static str {
        "cypress"
    }

    fn can_recognize(&self, raw: &Value) -> bool {
        raw.get("runs").is_some_and(Value::is_array) && raw.get("totalTests").is_some()
    }

    fn convert_at(&self, raw: &Value, now: DateTime<Utc>) -> ConversionResult<Report> {
        let runs = raw
            .get("runs")
            .and_then(Value::as_array)
            .ok_or(ConversionError::MissingField {
                framework: "cypress",
                field: "runs",
            })?;

        let mut results = Vec::new();
        for run in runs {
            let spec = run.get("spec").unwrap_or(&Value::Null);
            let spec_path = str_field(spec, "relative")
                .or_else(|| str_field(spec, "name"))
                .unwrap_or_default();
            for test in array_field(run, "tests") {
                results.push(convert_test(test, spec_path));
            }
        }

        let counts = StatusCounts::tally(&results);
        let reported_total = count_field(raw, "totalTests");
        if reported_total != counts.total() {
            warn!(
                reported = reported_total,
                converted = counts.total(),
                "cypress totalTests disagrees with converted test count"
            );
        }

        let duration = resolve_duration(
            millis_field(raw, "totalDuration"),
            raw.get("startedTestsAt"),
            now,
        );
        let timestamp = parse_timestamp(raw.get("endedTestsAt")).unwrap_or(now);

        let summary = RunSummary::new(counts, duration, self.name(), timestamp);
        Ok(Report::new(summary, results))
    }
}

fn convert_test(test: &Value, spec_path: &str) -> TestRecord {
    let titles: Vec<&str> = array_field(test, "title")
        .iter()
        .filter_map(Value::as_str)
        .collect();
    let (name, ancestors) = match titles.split_last() {
        Some((last, rest)) => (last.to_string(), rest),
        None => (String::new(), &[][..]),
    };
    let suite = if ancestors.is_empty() {
        spec_path.to_string()
    } else {
        ancestors.join(" > ")
    };
    let id = format!("{}::{}", spec_path, titles.join(" > "));

    let attempts = array_field(test, "attempts");
    let first = attempts.first().unwrap_or(&Value::Null);
    let first_state = str_field(first, "state").or_else(|| str_field(test, "state"));
    let final_state = str_field(test, "state");

    let status = match (first_state, final_state) {
        (Some("failed"), Some("passed")) => TestStatus::Flaky,
        (Some("failed"), _) => TestStatus::Failed,
        (Some("passed"), _) => TestStatus::Passed,
        _ => TestStatus::Skipped,
    };

    let error = if status == TestStatus::Failed {
        failure_detail(test, first)
    } else {
        None
    };

    let duration = millis_field(first, "duration")
        .or_else(|| millis_field(first, "wallClockDuration"))
        .or_else(|| millis_field(test, "duration"))
        .unwrap_or(0);

    let (retries, history) = if attempts.len() > 1 {
        let history = OutcomeHistory::from_attempts(
            attempts
                .iter()
                .filter_map(|a| str_field(a, "state").and_then(attempt_status)),
        );
        (Some(attempts.len() as u32 - 1), Some(history))
    } else {
        (None, None)
    };

    TestRecord {
        id,
        name,
        suite,
        status,
        duration,
        error,
        retries,
        history,
    }
}

/// `displayError` holds the full rendered error; older exports keep it per attempt.
fn failure_detail(test: &Value, first_attempt: &Value) -> Option<FailureDetail> {
    if let Some(display) = str_field(test, "displayError") {
        let message = display.lines().next().unwrap_or_default();
        return Some(FailureDetail::new(message).with_stack(Some(display.to_string())));
    }
    let err = first_attempt.get("error")?;
    Some(
        FailureDetail::new(str_field(err, "message").unwrap_or_default())
            .with_stack(str_field(err, "stack").map(String::from)),
    )
}
