//! External failure summarization hook.
//!
//! Defines the summarizer interface and the canned stand-in used until a
//! model-backed implementation exists. Any error or empty answer from a
//! summarizer means "no summary", never a failed analysis.

use crate::report::TestRecord;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Prefix for summaries prepended to the insight list
pub const AI_INSIGHT_PREFIX: &str = "🤖 AI Analysis: ";

/// Failure count above which the canned summary reports a cascade
const CASCADE_THRESHOLD: usize = 5;

/// Summarizer failure; never propagated past the analyzer
#[derive(Error, Debug)]
pub enum SummarizerError {
    /// Backend could not be reached
    #[error("summarizer unavailable: {0}")]
    Unavailable(String),

    /// Exceeded the configured time budget
    #[error("summarizer timed out after {0:?}")]
    TimedOut(Duration),
}

/// Produces one natural-language summary of the failed tests
#[async_trait]
pub trait FailureSummarizer: Send + Sync {
    /// Identifier for logs
    fn name(&self) -> &str;

    /// Summarize the failures; `Ok(None)` means nothing to add.
    async fn summarize(&self, failed: &[&TestRecord]) -> Result<Option<String>, SummarizerError>;
}

/// Deterministic summarizer returning fixed text
pub struct CannedSummarizer;

#[async_trait]
impl FailureSummarizer for CannedSummarizer {
    fn name(&self) -> &str {
        "canned"
    }

    async fn summarize(&self, failed: &[&TestRecord]) -> Result<Option<String>, SummarizerError> {
        let text = if failed.len() > CASCADE_THRESHOLD {
            "Multiple cascading failures detected in the checkout module. Likely caused by a recent change in the shipping API response schema."
        } else {
            "The failures appear to be isolated to authentication timeouts. Check if the test environment database is lagging."
        };
        Ok(Some(text.to_string()))
    }
}
