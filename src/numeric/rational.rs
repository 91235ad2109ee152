// ============================================================================
// Exact Ratios
// Conversions between fixed-point values and big rationals
// ============================================================================

use super::fixed_point::{pow10, FixedPoint};
use num_bigint::{BigInt, Sign};
use num_integer::Integer;
use num_rational::BigRational;

/// The exact rational value of a fixed-point number.
pub fn to_rational(value: &FixedPoint) -> BigRational {
    BigRational::new(value.raw().clone(), pow10(value.exponent()))
}

/// Express a rational at `exponent` decimal places, flooring.
pub fn rational_to_fixed(ratio: &BigRational, exponent: u32) -> FixedPoint {
    let scaled = ratio.numer() * pow10(exponent);
    FixedPoint::new(scaled.div_floor(ratio.denom()), exponent)
}

/// `numer / denom >= 10^power`, for positive operands.
fn at_least_pow10(numer: &BigInt, denom: &BigInt, power: i64) -> bool {
    if power >= 0 {
        *numer >= denom * pow10(power as u32)
    } else {
        numer * pow10(power.unsigned_abs() as u32) >= *denom
    }
}

/// The power of ten nearest to `ratio` on a logarithmic scale.
///
/// Returns `Some(-6)` for ratios around `0.000001`, `Some(0)` for ratios
/// between `10^-0.5` and `10^0.5`. Computed with integer comparisons only.
/// `None` for zero or negative ratios.
pub fn magnitude(ratio: &BigRational) -> Option<i32> {
    let numer = ratio.numer();
    let denom = ratio.denom();
    if numer.sign() != Sign::Plus {
        return None;
    }

    let digits = |v: &BigInt| v.magnitude().to_string().len() as i64;
    let mut floor_log = digits(numer) - digits(denom);
    if !at_least_pow10(numer, denom, floor_log) {
        floor_log -= 1;
    }

    // Round up once the ratio passes 10^(k + 1/2), i.e. ratio^2 >= 10^(2k + 1)
    let numer_sq = numer * numer;
    let denom_sq = denom * denom;
    let nearest = if at_least_pow10(&numer_sq, &denom_sq, 2 * floor_log + 1) {
        floor_log + 1
    } else {
        floor_log
    };

    i32::try_from(nearest).ok()
}
