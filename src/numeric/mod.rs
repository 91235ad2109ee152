// ============================================================================
// Numeric Module
// Exact fixed-point arithmetic across mismatched decimal bases
// ============================================================================
//
// This module provides:
// - FixedPoint: arbitrary-precision integer scaled by a runtime power of ten
// - Rescaled / PrecisionLossWarning: truncation is reported, never silent
// - Exact rational helpers for ratio computation
//
// Design principles:
// - No floating-point operations
// - Multiply before divide, in big integers
// - Downward rescales are explicit and logged

mod errors;
mod fixed_point;
mod rational;

pub use errors::{NumericError, NumericResult, PrecisionLossWarning};
pub use fixed_point::{FixedPoint, Rescaled};
pub use num_rational::BigRational;
pub use rational::{magnitude, rational_to_fixed, to_rational};

/// Express `value` at `target_exponent`; see [`FixedPoint::rescale`].
pub fn rescale(value: &FixedPoint, target_exponent: u32) -> Rescaled {
    value.rescale(target_exponent)
}

/// `(a × b × 10^k) / divisor` at `result_exponent`; see
/// [`FixedPoint::multiply_then_divide`].
pub fn multiply_then_divide(
    a: &FixedPoint,
    b: &FixedPoint,
    divisor: &FixedPoint,
    result_exponent: u32,
) -> NumericResult<Rescaled> {
    FixedPoint::multiply_then_divide(a, b, divisor, result_exponent)
}
