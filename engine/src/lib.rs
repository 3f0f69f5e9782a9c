//! Failsafe Test Report Engine
//!
//! This library provides:
//! - Format adapters turning Playwright, Cypress, Mocha, Vitest and Jest JSON
//!   exports into one canonical [`Report`]
//! - Structural framework detection with an explicit override
//! - Failure analysis: error-signature clustering, rule-based insights and an
//!   optional asynchronous summarization hook
//! - Static HTML rendering and Slack/Teams webhook notifications
//!
//! # Usage
//!
//! ```no_run
//! use failsafe_engine::{AdapterRegistry, AnalysisConfig, Analyzer};
//!
//! # async fn run(raw: serde_json::Value) -> failsafe_engine::EngineResult<()> {
//! let report = AdapterRegistry::new().parse(&raw, None)?;
//! let analyzed = Analyzer::new(AnalysisConfig::from_env()).analyze(&report).await;
//! println!("{}", failsafe_engine::render_html(&analyzed));
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod analysis;
pub mod config;
pub mod error;
pub mod notify;
pub mod registry;
pub mod render;
pub mod report;

pub use adapters::{AdapterKind, FormatAdapter};
pub use analysis::{analyze_report, Analyzer, FailureSummarizer};
pub use config::AnalysisConfig;
pub use error::{ConversionError, DetectionError, EngineError, EngineResult};
pub use notify::{NotificationKind, NotificationTarget, NotifyError, WebhookNotifier};
pub use registry::AdapterRegistry;
pub use render::{render_html, write_html, RenderError};
pub use report::{
    ErrorCluster, FailureDetail, OutcomeHistory, Report, RunSummary, StatusCounts, TestRecord,
    TestStatus,
};
