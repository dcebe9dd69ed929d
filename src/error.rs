//! Error types for the layers around the simulation core
//!
//! The engines themselves never fail: they are total over validated input.
//! Everything here is raised before a simulation starts (validation) or after
//! it finishes (export, batch loading).

use thiserror::Error;

/// Rejected calculator input. The core is never invoked when one of these is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("{field} must be greater than zero (got {value})")]
    NotPositive { field: &'static str, value: f64 },

    #[error("{field} must not be negative (got {value})")]
    Negative { field: &'static str, value: f64 },

    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },

    #[error("{field} is required when {context}")]
    Missing { field: &'static str, context: &'static str },

    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Failure while writing a report or reading a batch file
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("row {row}: {source}")]
    Record {
        row: usize,
        #[source]
        source: InputError,
    },
}

/// Crate-level error for callers that drive both validation and export
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
