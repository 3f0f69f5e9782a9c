//! Heuristic insight rules
//!
//! A fixed battery of independent rules over clusters, the run summary and
//! the failed records. Every rule may fire; output order is the rule order.

use crate::report::{ErrorCluster, RunSummary, TestRecord};
use regex::Regex;
use std::sync::LazyLock;

/// Sole insight for a run without failures
pub const ALL_PASSED: &str = "✨ All tests passed! The codebase looks healthy.";

/// Failures faster than this are suspicious
pub const SUSPICIOUS_DURATION_MS: u64 = 50;

/// Share of failures above which the largest cluster is systemic
pub const SYSTEMIC_SHARE: f64 = 0.5;

/// Pass rate (percent) below which a freeze is recommended
pub const STABILITY_RISK_PASS_RATE: f64 = 70.0;

/// Pass rate (percent) from which the run is nearly green
pub const NEAR_GREEN_PASS_RATE: f64 = 90.0;

static CONFIG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(env|config|variable|api_key)").unwrap());

/// Inputs shared by every rule
struct RuleContext<'a> {
    clusters: &'a [ErrorCluster],
    summary: &'a RunSummary,
    failed: &'a [&'a TestRecord],
}

impl RuleContext<'_> {
    fn messages(&self) -> impl Iterator<Item = &str> + '_ {
        self.failed.iter().filter_map(|r| r.error_message())
    }
}

type Rule = fn(&RuleContext<'_>) -> Option<String>;

const RULES: [Rule; 5] = [
    systemic_issue,
    latency,
    configuration_risk,
    suspicious_speed,
    pass_rate,
];

/// Run every rule and collect the findings in rule order.
///
/// With no failed records the only finding is [`ALL_PASSED`].
pub fn generate_insights(
    clusters: &[ErrorCluster],
    summary: &RunSummary,
    failed: &[&TestRecord],
) -> Vec<String> {
    if failed.is_empty() {
        return vec![ALL_PASSED.to_string()];
    }

    let ctx = RuleContext {
        clusters,
        summary,
        failed,
    };
    RULES.iter().filter_map(|rule| rule(&ctx)).collect()
}

fn systemic_issue(ctx: &RuleContext<'_>) -> Option<String> {
    let top = ctx.clusters.first()?;
    let share = top.count as f64 / ctx.failed.len() as f64;
    (share > SYSTEMIC_SHARE).then(|| {
        format!(
            "🚨 Systemic Issue: {}% of failures are caused by: \"{}\"",
            (share * 100.0).round() as u64,
            top.message
        )
    })
}

fn latency(ctx: &RuleContext<'_>) -> Option<String> {
    let timeouts = ctx
        .messages()
        .filter(|m| m.to_lowercase().contains("timeout"))
        .count();
    (timeouts > 0).then(|| {
        format!(
            "⏳ Latency Alert: {} tests failed due to timeouts. Consider checking network stability or increasing wait times.",
            timeouts
        )
    })
}

fn configuration_risk(ctx: &RuleContext<'_>) -> Option<String> {
    ctx.messages().any(|m| CONFIG_PATTERN.is_match(m)).then(|| {
        "⚙️ Configuration Risk: Detected possible environment variable or config issues."
            .to_string()
    })
}

fn suspicious_speed(ctx: &RuleContext<'_>) -> Option<String> {
    let fast = ctx
        .failed
        .iter()
        .filter(|r| r.duration < SUSPICIOUS_DURATION_MS)
        .count();
    (fast > 0).then(|| {
        format!(
            "🔍 Flakiness Warning: {} tests failed suspiciously fast (<{}ms). Possible infrastructure or setup issue.",
            fast, SUSPICIOUS_DURATION_MS
        )
    })
}

fn pass_rate(ctx: &RuleContext<'_>) -> Option<String> {
    let rate = ctx.summary.pass_rate()?;
    if rate < STABILITY_RISK_PASS_RATE {
        Some(
            "⚠️ Stability Risk: Pass rate is below 70%. We recommend a code freeze until these are resolved."
                .to_string(),
        )
    } else if (NEAR_GREEN_PASS_RATE..100.0).contains(&rate) {
        Some("👌 High Quality: Only a few tests failing. You're close to a green build!".to_string())
    } else {
        None
    }
}
