//! Analysis orchestrator
//!
//! Sequences clustering, insight rules and the optional summarization hook.
//! The input report is borrowed and never modified; every call recomputes
//! clusters and insights from scratch.

use super::clustering::cluster_failures;
use super::insights::{generate_insights, ALL_PASSED};
use super::summarizer::{CannedSummarizer, FailureSummarizer, SummarizerError, AI_INSIGHT_PREFIX};
use crate::config::AnalysisConfig;
use crate::report::{Report, TestRecord};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Derive clusters and rule-based insights without the summarization hook.
pub fn analyze_report(report: &Report) -> Report {
    let failed = report.failed_records();

    let (clusters, insights) = if failed.is_empty() {
        (Vec::new(), vec![ALL_PASSED.to_string()])
    } else {
        let clusters = cluster_failures(&failed);
        let insights = generate_insights(&clusters, &report.summary, &failed);
        (clusters, insights)
    };

    Report {
        summary: report.summary.clone(),
        results: report.results.clone(),
        clusters: Some(clusters),
        insights: Some(insights),
    }
}

/// Configured analysis pipeline
pub struct Analyzer {
    config: AnalysisConfig,
    summarizer: Arc<dyn FailureSummarizer>,
}

impl Analyzer {
    /// Create an analyzer using the canned summarizer for the hook
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            summarizer: Arc::new(CannedSummarizer),
        }
    }

    /// Replace the summarization hook
    pub fn with_summarizer(mut self, summarizer: Arc<dyn FailureSummarizer>) -> Self {
        self.summarizer = summarizer;
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Produce a new report with clusters and insights attached.
    pub async fn analyze(&self, report: &Report) -> Report {
        let mut analyzed = analyze_report(report);

        if analyzed.summary.environment.is_none() {
            analyzed.summary.environment = self.config.environment.clone();
        }

        let failed = report.failed_records();
        if self.config.ai_summary && !failed.is_empty() {
            if let Some(summary) = self.summarize(&failed).await {
                if let Some(insights) = analyzed.insights.as_mut() {
                    insights.insert(0, format!("{}{}", AI_INSIGHT_PREFIX, summary));
                }
            }
        }

        info!(
            framework = %analyzed.summary.framework,
            failed = failed.len(),
            clusters = analyzed.clusters.as_ref().map_or(0, Vec::len),
            insights = analyzed.insights.as_ref().map_or(0, Vec::len),
            "analysis complete"
        );
        analyzed
    }

    /// Run the hook; any failure, timeout or blank answer yields `None`.
    async fn summarize(&self, failed: &[&TestRecord]) -> Option<String> {
        let call = self.summarizer.summarize(failed);
        let outcome = match self.config.summary_timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result,
                Err(_) => Err(SummarizerError::TimedOut(limit)),
            },
            None => call.await,
        };

        match outcome {
            Ok(Some(text)) if !text.trim().is_empty() => Some(text.trim().to_string()),
            Ok(_) => {
                debug!(summarizer = self.summarizer.name(), "summarizer returned nothing");
                None
            }
            Err(e) => {
                warn!(summarizer = self.summarizer.name(), error = %e, "summarization skipped");
                None
            }
        }
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}
