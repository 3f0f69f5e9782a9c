//! Analysis configuration
//!
//! Environment variables are read once, at the edge, into [`AnalysisConfig`];
//! the analyzer only ever sees the struct.

use std::time::Duration;

/// Enables the summarization hook when set to exactly `true`
pub const AI_TOGGLE_ENV: &str = "SMART_TEST_AI";

/// Summarization time budget in seconds; `0` disables the limit
pub const SUMMARY_TIMEOUT_ENV: &str = "FAILSAFE_SUMMARY_TIMEOUT_SECS";

/// Environment label stamped into reports that lack one
pub const ENVIRONMENT_ENV: &str = "FAILSAFE_ENVIRONMENT";

const DEFAULT_SUMMARY_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings consumed by [`crate::analysis::Analyzer`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisConfig {
    /// Invoke the summarization hook
    pub ai_summary: bool,
    /// Upper bound on the hook; `None` waits indefinitely
    pub summary_timeout: Option<Duration>,
    /// Label for the run environment (e.g. "staging")
    pub environment: Option<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            ai_summary: false,
            summary_timeout: Some(DEFAULT_SUMMARY_TIMEOUT),
            environment: None,
        }
    }
}

impl AnalysisConfig {
    /// Build from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let ai_summary = lookup(AI_TOGGLE_ENV).as_deref() == Some("true");

        let summary_timeout = match lookup(SUMMARY_TIMEOUT_ENV).map(|v| v.trim().parse::<u64>()) {
            Some(Ok(0)) => None,
            Some(Ok(secs)) => Some(Duration::from_secs(secs)),
            Some(Err(_)) | None => defaults.summary_timeout,
        };

        let environment = lookup(ENVIRONMENT_ENV).filter(|v| !v.trim().is_empty());

        Self {
            ai_summary,
            summary_timeout,
            environment,
        }
    }

    pub fn with_ai_summary(mut self, enabled: bool) -> Self {
        self.ai_summary = enabled;
        self
    }

    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = AnalysisConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config, AnalysisConfig::default());
        assert!(!config.ai_summary);
    }

    #[test]
    fn test_ai_toggle_requires_exact_true() {
        for (value, expected) in [("true", true), ("TRUE", false), ("1", false), ("", false)] {
            let config = AnalysisConfig::from_lookup(lookup_from(&[(AI_TOGGLE_ENV, value)]));
            assert_eq!(config.ai_summary, expected, "value {value:?}");
        }
    }

    #[test]
    fn test_timeout_parsing() {
        let config = AnalysisConfig::from_lookup(lookup_from(&[(SUMMARY_TIMEOUT_ENV, "5")]));
        assert_eq!(config.summary_timeout, Some(Duration::from_secs(5)));

        let config = AnalysisConfig::from_lookup(lookup_from(&[(SUMMARY_TIMEOUT_ENV, "0")]));
        assert_eq!(config.summary_timeout, None);

        let config = AnalysisConfig::from_lookup(lookup_from(&[(SUMMARY_TIMEOUT_ENV, "soon")]));
        assert_eq!(config.summary_timeout, Some(DEFAULT_SUMMARY_TIMEOUT));
    }

    #[test]
    fn test_blank_environment_is_ignored() {
        let config = AnalysisConfig::from_lookup(lookup_from(&[(ENVIRONMENT_ENV, "  ")]));
        assert_eq!(config.environment, None);

        let config = AnalysisConfig::from_lookup(lookup_from(&[(ENVIRONMENT_ENV, "staging")]));
        assert_eq!(config.environment.as_deref(), Some("staging"));
    }
}
