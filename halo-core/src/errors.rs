//! Error types shared across the halo analysis crates.
//!
//! [`HaloError`] covers the failure modes of the numeric layer: unit and
//! constant lookups, numerical issues, data access problems, and algorithm
//! failures. Format-specific parse errors live next to their parsers in
//! `halo-formats`; this type is for everything downstream of parsing.

use thiserror::Error;

/// Classification of mathematical errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MathErrorKind {
    /// Attempted division by zero or near-zero value.
    DivisionByZero,
    /// Input value is invalid for the operation.
    InvalidInput,
    /// Result is NaN or infinity.
    NotFinite,
    /// Value outside the valid domain (e.g. negative radius).
    OutOfRange,
}

/// Unified error type for halo analysis computations.
#[derive(Error, Debug)]
pub enum HaloError {
    /// Requested a unit that is not in the scale table.
    #[error("Unknown unit: {name:?}")]
    UnknownUnit { name: String },

    /// Numerical computation failure.
    #[error("Math error in {operation} ({kind:?}): {message}")]
    MathError {
        operation: String,
        kind: MathErrorKind,
        message: String,
    },

    /// Data access failure (file I/O, parsing, missing columns).
    ///
    /// This is the only recoverable variant — an alternate file or column
    /// selection may succeed.
    #[error("Data error ({file_type} - {operation}): {message}")]
    DataError {
        file_type: String,
        operation: String,
        message: String,
    },

    /// Algorithm failure (empty input, no crossing found, ...).
    #[error("Calculation error in {context}: {message}")]
    CalculationError { context: String, message: String },
}

/// Convenience alias for `Result<T, HaloError>`.
pub type HaloResult<T> = Result<T, HaloError>;

impl HaloError {
    /// Creates an [`UnknownUnit`](Self::UnknownUnit) error.
    pub fn unknown_unit(name: &str) -> Self {
        Self::UnknownUnit {
            name: name.to_string(),
        }
    }

    /// Creates a [`MathError`](Self::MathError) with the given kind.
    pub fn math_error(operation: &str, kind: MathErrorKind, reason: &str) -> Self {
        Self::MathError {
            operation: operation.to_string(),
            kind,
            message: reason.to_string(),
        }
    }

    /// Creates a [`DataError`](Self::DataError) (the only recoverable variant).
    pub fn data_error(file_type: &str, operation: &str, reason: &str) -> Self {
        Self::DataError {
            file_type: file_type.to_string(),
            operation: operation.to_string(),
            message: reason.to_string(),
        }
    }

    /// Creates a [`CalculationError`](Self::CalculationError).
    pub fn calculation_error(context: &str, reason: &str) -> Self {
        Self::CalculationError {
            context: context.to_string(),
            message: reason.to_string(),
        }
    }

    /// Returns `true` if retrying with different inputs might succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::DataError { .. })
    }
}
