//! Canonical report model
//!
//! Every adapter produces a [`Report`]; every downstream consumer (analysis,
//! HTML rendering, webhook notification) reads one. The wire shape is
//! camelCase JSON so exported reports stay compatible with existing tooling.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of a single test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestStatus {
    Passed,
    Failed,
    Skipped,
    /// Failed at least once, then passed on retry
    Flaky,
}

impl std::fmt::Display for TestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Passed => write!(f, "passed"),
            Self::Failed => write!(f, "failed"),
            Self::Skipped => write!(f, "skipped"),
            Self::Flaky => write!(f, "flaky"),
        }
    }
}

/// Outcome of one past attempt, as kept in [`OutcomeHistory`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
    Passed,
    Failed,
}

/// Failure detail attached to a failed test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureDetail {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff: Option<String>,
}

impl FailureDetail {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stack: None,
            diff: None,
        }
    }

    pub fn with_stack(mut self, stack: Option<String>) -> Self {
        self.stack = stack;
        self
    }

    pub fn with_diff(mut self, diff: Option<String>) -> Self {
        self.diff = diff;
        self
    }
}

/// Short outcome history, oldest first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeHistory {
    pub last_five_statuses: Vec<AttemptStatus>,
}

impl OutcomeHistory {
    /// Maximum number of statuses retained
    pub const CAPACITY: usize = 5;

    /// Keep the most recent [`Self::CAPACITY`] statuses.
    pub fn from_attempts(attempts: impl IntoIterator<Item = AttemptStatus>) -> Self {
        let all: Vec<AttemptStatus> = attempts.into_iter().collect();
        let skip = all.len().saturating_sub(Self::CAPACITY);
        Self {
            last_five_statuses: all.into_iter().skip(skip).collect(),
        }
    }
}

/// One test in the canonical report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRecord {
    /// Unique within a report, except for flat-assertion frameworks with repeated titles
    pub id: String,
    pub name: String,
    pub suite: String,
    pub status: TestStatus,
    /// Duration in milliseconds
    pub duration: u64,
    /// Present only when `status` is [`TestStatus::Failed`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<FailureDetail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retries: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<OutcomeHistory>,
}

impl TestRecord {
    pub fn is_failed(&self) -> bool {
        self.status == TestStatus::Failed
    }

    /// The failure message, if one is present and non-empty.
    pub fn error_message(&self) -> Option<&str> {
        self.error
            .as_ref()
            .map(|e| e.message.as_str())
            .filter(|m| !m.is_empty())
    }
}

/// Per-status counts used to build a [`RunSummary`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub passed: u64,
    pub failed: u64,
    pub skipped: u64,
    pub flaky: u64,
}

impl StatusCounts {
    /// Count statuses of already-converted records.
    pub fn tally<'a>(records: impl IntoIterator<Item = &'a TestRecord>) -> Self {
        let mut counts = Self::default();
        for record in records {
            match record.status {
                TestStatus::Passed => counts.passed += 1,
                TestStatus::Failed => counts.failed += 1,
                TestStatus::Skipped => counts.skipped += 1,
                TestStatus::Flaky => counts.flaky += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> u64 {
        self.passed + self.failed + self.skipped + self.flaky
    }
}

/// Aggregate statistics for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    /// Always `passed + failed + skipped + flaky`
    pub total: u64,
    pub passed: u64,
    pub failed: u64,
    pub skipped: u64,
    pub flaky: u64,
    /// Total run duration in milliseconds
    pub duration: u64,
    pub framework: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
}

impl RunSummary {
    /// Build a summary whose total is derived from the counts.
    pub fn new(
        counts: StatusCounts,
        duration: u64,
        framework: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            total: counts.total(),
            passed: counts.passed,
            failed: counts.failed,
            skipped: counts.skipped,
            flaky: counts.flaky,
            duration,
            framework: framework.into(),
            timestamp,
            environment: None,
        }
    }

    pub fn counts(&self) -> StatusCounts {
        StatusCounts {
            passed: self.passed,
            failed: self.failed,
            skipped: self.skipped,
            flaky: self.flaky,
        }
    }

    /// Percentage of passed tests, `None` for an empty run.
    pub fn pass_rate(&self) -> Option<f64> {
        if self.total == 0 {
            None
        } else {
            Some(self.passed as f64 / self.total as f64 * 100.0)
        }
    }
}

/// Failures sharing one normalized error signature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorCluster {
    pub message: String,
    pub count: usize,
    pub test_ids: Vec<String>,
}

/// Canonical, framework-agnostic report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub summary: RunSummary,
    pub results: Vec<TestRecord>,
    /// Populated by analysis
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clusters: Option<Vec<ErrorCluster>>,
    /// Populated by analysis
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insights: Option<Vec<String>>,
}

impl Report {
    pub fn new(summary: RunSummary, results: Vec<TestRecord>) -> Self {
        Self {
            summary,
            results,
            clusters: None,
            insights: None,
        }
    }

    pub fn failed_records(&self) -> Vec<&TestRecord> {
        self.results.iter().filter(|r| r.is_failed()).collect()
    }

    pub fn has_failures(&self) -> bool {
        self.results.iter().any(TestRecord::is_failed)
    }

    pub fn is_analyzed(&self) -> bool {
        self.clusters.is_some() && self.insights.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, status: TestStatus) -> TestRecord {
        TestRecord {
            id: id.to_string(),
            name: id.to_string(),
            suite: "suite".to_string(),
            status,
            duration: 10,
            error: None,
            retries: None,
            history: None,
        }
    }

    #[test]
    fn test_summary_total_is_sum_of_counts() {
        let records = vec![
            record("a", TestStatus::Passed),
            record("b", TestStatus::Failed),
            record("c", TestStatus::Skipped),
            record("d", TestStatus::Flaky),
            record("e", TestStatus::Passed),
        ];
        let summary = RunSummary::new(StatusCounts::tally(&records), 0, "jest", Utc::now());
        assert_eq!(summary.total, 5);
        assert_eq!(summary.passed, 2);
        assert_eq!(
            summary.total,
            summary.passed + summary.failed + summary.skipped + summary.flaky
        );
    }

    #[test]
    fn test_pass_rate_empty_run() {
        let summary = RunSummary::new(StatusCounts::default(), 0, "mocha", Utc::now());
        assert_eq!(summary.pass_rate(), None);
    }

    #[test]
    fn test_empty_error_message_is_ignored() {
        let mut r = record("a", TestStatus::Failed);
        r.error = Some(FailureDetail::new(""));
        assert_eq!(r.error_message(), None);

        r.error = Some(FailureDetail::new("   "));
        assert_eq!(r.error_message(), Some("   "));

        r.error = Some(FailureDetail::new("boom"));
        assert_eq!(r.error_message(), Some("boom"));
    }

    #[test]
    fn test_history_keeps_last_five() {
        let attempts = [
            AttemptStatus::Failed,
            AttemptStatus::Failed,
            AttemptStatus::Passed,
            AttemptStatus::Failed,
            AttemptStatus::Passed,
            AttemptStatus::Passed,
        ];
        let history = OutcomeHistory::from_attempts(attempts);
        assert_eq!(history.last_five_statuses.len(), 5);
        assert_eq!(history.last_five_statuses[0], AttemptStatus::Failed);
        assert_eq!(history.last_five_statuses[4], AttemptStatus::Passed);
    }

    #[test]
    fn test_report_wire_format_is_camel_case() {
        let mut report = Report::new(
            RunSummary::new(StatusCounts::default(), 0, "jest", Utc::now()),
            vec![],
        );
        report.clusters = Some(vec![ErrorCluster {
            message: "boom".to_string(),
            count: 1,
            test_ids: vec!["a".to_string()],
        }]);
        let json = serde_json::to_value(&report).unwrap();
        assert!(json["clusters"][0]["testIds"].is_array());
        assert!(json.get("insights").is_none());
        assert_eq!(json["summary"]["framework"], "jest");
    }
}
