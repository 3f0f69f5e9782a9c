//! Format adapters
//!
//! One adapter per supported test framework. Each knows the structural
//! fingerprint of its framework's JSON export and converts it into the
//! canonical [`Report`].
//!
//! # Detection order
//!
//! ```text
//! playwright → cypress → mocha → vitest → jest
//! (trees)      (trees)   (stats+array)  (flat assertions, specific first)
//! ```
//!
//! Vitest's export is a superset of Jest's, so the vitest predicate must be
//! evaluated before the jest one.

mod cypress;
mod flat_assertion;
pub(crate) mod json;
mod mocha;
mod playwright;

pub use cypress::CypressAdapter;
pub use flat_assertion::{JestAdapter, VitestAdapter};
pub use mocha::MochaAdapter;
pub use playwright::PlaywrightAdapter;

use crate::error::ConversionResult;
use crate::report::{AttemptStatus, Report};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Capability shared by all adapters
pub trait FormatAdapter {
    /// Lowercase framework identifier, also used as `RunSummary::framework`
    fn name(&self) -> &'static str;

    /// Pure structural check; never panics on malformed input.
    fn can_recognize(&self, raw: &Value) -> bool;

    /// Convert using `now` for any wall-clock fallbacks.
    fn convert_at(&self, raw: &Value, now: DateTime<Utc>) -> ConversionResult<Report>;

    /// Convert a payload this adapter recognized.
    fn convert(&self, raw: &Value) -> ConversionResult<Report> {
        self.convert_at(raw, Utc::now())
    }
}

/// Closed set of supported frameworks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterKind {
    Playwright,
    Cypress,
    Mocha,
    Vitest,
    Jest,
}

impl AdapterKind {
    /// All adapters in detection order
    pub fn all() -> &'static [AdapterKind] {
        &[
            AdapterKind::Playwright,
            AdapterKind::Cypress,
            AdapterKind::Mocha,
            AdapterKind::Vitest,
            AdapterKind::Jest,
        ]
    }

    fn adapter(&self) -> &'static dyn FormatAdapter {
        match self {
            Self::Playwright => &PlaywrightAdapter,
            Self::Cypress => &CypressAdapter,
            Self::Mocha => &MochaAdapter,
            Self::Vitest => &VitestAdapter,
            Self::Jest => &JestAdapter,
        }
    }
}

impl FormatAdapter for AdapterKind {
    fn name(&self) -> &'static str {
        self.adapter().name()
    }

    fn can_recognize(&self, raw: &Value) -> bool {
        self.adapter().can_recognize(raw)
    }

    fn convert_at(&self, raw: &Value, now: DateTime<Utc>) -> ConversionResult<Report> {
        self.adapter().convert_at(raw, now)
    }
}

impl std::fmt::Display for AdapterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Map a per-attempt status string onto the pass/fail history vocabulary.
pub(crate) fn attempt_status(state: &str) -> Option<AttemptStatus> {
    match state {
        "passed" | "expected" => Some(AttemptStatus::Passed),
        "failed" | "unexpected" | "timedOut" | "interrupted" => Some(AttemptStatus::Failed),
        _ => None,
    }
}
