//! Error types for uncertainty propagation
//!
//! Provides a unified error type for all uncprop crates.

use thiserror::Error;

/// Core error type for uncertainty-propagation operations
#[derive(Error, Debug)]
pub enum Error {
    /// Unit-checked operation invoked on incompatible units
    #[error("Unit mismatch: cannot combine {left} with {right}")]
    UnitMismatch { left: String, right: String },

    /// Array operand shape disagreement
    #[error("Shape mismatch: expected {expected} elements, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// Operand is none of {number, quantity, scalar value, compatible array}
    #[error("Invalid operand: {0}")]
    InvalidOperand(String),

    /// Rejection resampling against a bound did not converge
    #[error(
        "Support exhausted: {violating} samples still outside limit {limit} after {rounds} resampling rounds"
    )]
    SupportExhausted {
        limit: f64,
        violating: usize,
        rounds: usize,
    },

    /// Too few samples for the requested order-statistic reduction
    #[error("Insufficient samples: order-statistic reduction needs at least {expected}, got {actual}")]
    InsufficientSamples { expected: usize, actual: usize },

    /// Invalid parameter provided to a function
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Numerical computation error
    #[error("Computation error: {0}")]
    Computation(String),

    /// Threading or parallelization error
    #[error("Execution error: {0}")]
    Execution(String),

    /// Other errors
    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

// Helper functions for common error patterns

impl Error {
    /// Create an error for incompatible units, formatting "no unit" for `None`
    pub fn unit_mismatch(left: Option<&str>, right: Option<&str>) -> Self {
        Self::UnitMismatch {
            left: left.unwrap_or("unitless").to_string(),
            right: right.unwrap_or("unitless").to_string(),
        }
    }

    /// Create an error for mismatched array lengths
    pub fn shape_mismatch(expected: usize, actual: usize) -> Self {
        Self::ShapeMismatch { expected, actual }
    }

    /// Create an error for a negative error bar
    pub fn negative_error(which: &str, value: f64) -> Self {
        Self::InvalidParameter(format!("{which} error must be non-negative, got {value}"))
    }

    /// Create an error for NaN/Inf values
    pub fn non_finite(context: &str) -> Self {
        Self::Computation(format!("{context} contains NaN or infinite values"))
    }
}
