// ============================================================================
// Numeric Errors
// Error types for arbitrary-precision fixed-point arithmetic
// ============================================================================

use num_bigint::BigInt;
use thiserror::Error;

/// A lossy downward rescale or division discarded a non-zero remainder.
///
/// This is a warning, not a failure: the truncated value is still returned
/// alongside it. Strict callers promote it with [`NumericError::PrecisionLoss`].
/// The dropped quantity is `remainder / divisor` of one unit at `exponent`.
#[derive(Error, Debug, Clone, PartialEq, Eq, Hash)]
#[error("precision loss at exponent {exponent}: discarded {remainder}/{divisor} of a unit")]
pub struct PrecisionLossWarning {
    /// Exponent of the truncated result
    pub exponent: u32,
    /// Raw remainder left over by the floor division
    pub remainder: BigInt,
    /// Divisor the remainder is expressed against
    pub divisor: BigInt,
}

/// Errors that can occur during fixed-point arithmetic operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NumericError {
    /// Attempted division by zero
    #[error("division by zero")]
    DivisionByZero,

    /// Input string or value is invalid
    #[error("invalid input: could not parse value")]
    InvalidInput,

    /// Operation would lose significant digits and the caller asked for exactness
    #[error(transparent)]
    PrecisionLoss(#[from] PrecisionLossWarning),

    /// Value does not fit the target representation
    #[error("arithmetic overflow: value does not fit the target representation")]
    Overflow,
}

/// Result type alias for numeric operations
pub type NumericResult<T> = Result<T, NumericError>;
