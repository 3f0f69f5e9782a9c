//! Engine error types
//!
//! Only two conditions are checked errors for callers of the engine:
//! no adapter recognizes the input, or an explicit framework override names
//! an adapter that does not exist. Conversion errors exist for adapters
//! invoked directly on input they did not recognize.

use thiserror::Error;

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Result type alias for adapter conversion
pub type ConversionResult<T> = Result<T, ConversionError>;

/// Adapter selection failed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DetectionError {
    /// No registered adapter recognized the payload
    #[error("Could not detect test framework from report structure")]
    UnrecognizedFormat,

    /// The explicit override does not name a registered adapter
    #[error("Unknown framework '{name}' (supported: {supported})")]
    UnknownFramework { name: String, supported: String },
}

/// Adapter was handed a payload it cannot convert
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    /// A structurally required field is absent or has the wrong type
    #[error("{framework} report is missing required field `{field}`")]
    MissingField {
        framework: &'static str,
        field: &'static str,
    },
}

/// Any failure on the detect-and-convert path
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error(transparent)]
    Detection(#[from] DetectionError),

    #[error(transparent)]
    Conversion(#[from] ConversionError),
}

impl EngineError {
    /// Machine-readable code, stable across releases
    pub fn code(&self) -> &'static str {
        match self {
            Self::Detection(DetectionError::UnrecognizedFormat) => "UNRECOGNIZED_FORMAT",
            Self::Detection(DetectionError::UnknownFramework { .. }) => "UNKNOWN_FRAMEWORK",
            Self::Conversion(ConversionError::MissingField { .. }) => "MISSING_FIELD",
        }
    }
}
