//! Error types for valuation and loading

use thiserror::Error;

/// Errors raised when a caller hands the engine something it cannot value,
/// or when holdings cannot be read
#[derive(Debug, Error)]
pub enum ValuationError {
    #[error("Invalid input: {field} ({reason})")]
    InvalidInput { field: String, reason: String },

    #[error("Unknown {field}: {value}")]
    UnknownVariant { field: String, value: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Date error: {0}")]
    Date(#[from] chrono::ParseError),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ValuationError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        ValuationError::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unknown(field: &str, value: &str) -> Self {
        ValuationError::UnknownVariant {
            field: field.to_string(),
            value: value.to_string(),
        }
    }
}
