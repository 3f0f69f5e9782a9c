//! Failure Analysis Module
//!
//! Turns a converted report into an enriched one:
//! - Cluster failed tests by normalized error signature
//! - Apply heuristic insight rules to clusters and summary statistics
//! - Optionally prepend a summary from an external summarizer
//!
//! # Architecture
//!
//! ```text
//! Report → failed records → Clustering → Insight rules → Report + clusters + insights
//!                                 └──────→ Summarizer hook (optional, async) ─┘
//! ```

pub mod analyzer;
pub mod clustering;
pub mod insights;
pub mod summarizer;

pub use analyzer::{analyze_report, Analyzer};
pub use clustering::{cluster_failures, normalize_message};
pub use insights::{generate_insights, ALL_PASSED};
pub use summarizer::{CannedSummarizer, FailureSummarizer, SummarizerError};
