//! Adapter registry and framework detection
//!
//! Holds the fixed, ordered list of adapters and selects one for a payload,
//! either by explicit name or by the first structural match in registration
//! order. Selection is a pure function of its input.

use crate::adapters::{AdapterKind, FormatAdapter};
use crate::error::{DetectionError, EngineResult};
use crate::report::Report;
use serde_json::Value;
use tracing::debug;

/// Ordered registry of all supported adapters
pub struct AdapterRegistry {
    adapters: Vec<AdapterKind>,
}

impl AdapterRegistry {
    /// Create a registry with every adapter in detection order
    pub fn new() -> Self {
        Self {
            adapters: AdapterKind::all().to_vec(),
        }
    }

    /// Adapter names in detection order
    pub fn names(&self) -> Vec<&'static str> {
        self.adapters.iter().map(|a| a.name()).collect()
    }

    /// Look up an adapter by name, ignoring case
    pub fn by_name(&self, name: &str) -> Option<AdapterKind> {
        self.adapters
            .iter()
            .copied()
            .find(|a| a.name().eq_ignore_ascii_case(name.trim()))
    }

    /// Select the adapter for `raw`, honoring an explicit override.
    pub fn detect(
        &self,
        raw: &Value,
        framework: Option<&str>,
    ) -> Result<AdapterKind, DetectionError> {
        if let Some(name) = framework {
            return self
                .by_name(name)
                .ok_or_else(|| DetectionError::UnknownFramework {
                    name: name.to_string(),
                    supported: self.names().join(", "),
                });
        }

        let adapter = self
            .adapters
            .iter()
            .copied()
            .find(|a| a.can_recognize(raw))
            .ok_or(DetectionError::UnrecognizedFormat)?;
        debug!(framework = %adapter, "detected report format");
        Ok(adapter)
    }

    /// Detect and convert in one step.
    pub fn parse(&self, raw: &Value, framework: Option<&str>) -> EngineResult<Report> {
        let adapter = self.detect(raw, framework)?;
        let report = adapter.convert(raw)?;
        debug!(
            framework = %adapter,
            results = report.results.len(),
            total = report.summary.total,
            "converted report"
        );
        Ok(report)
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::new()
    }
}
