// ============================================================================
// Fixed-Point Value
// Arbitrary-precision fixed-point arithmetic with a runtime exponent
// ============================================================================

use super::errors::{NumericError, NumericResult, PrecisionLossWarning};
use num_bigint::{BigInt, Sign};
use num_integer::Integer;
use num_traits::{ToPrimitive, Zero};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

/// Fixed-point number of arbitrary precision.
///
/// Denotes `raw × 10^-exponent`. The raw integer is never implicitly
/// truncated: moving to a larger exponent multiplies, moving to a smaller one
/// goes through [`FixedPoint::rescale`] which reports any lost remainder.
///
/// Equality and hashing are structural (`1.0` and `1.00` differ). Use
/// [`FixedPoint::cmp_value`] / [`FixedPoint::eq_value`] to compare values.
///
/// # Example
/// ```
/// use allocation_engine::numeric::FixedPoint;
///
/// let capital: FixedPoint = "125000.000000".parse().unwrap();
/// assert_eq!(capital.exponent(), 6);
/// assert_eq!(capital.raw().to_string(), "125000000000");
/// ```
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct FixedPoint {
    raw: BigInt,
    exponent: u32,
}

/// Compute 10^n as a big integer
pub(crate) fn pow10(n: u32) -> BigInt {
    BigInt::from(10u32).pow(n)
}

/// Result of a rescale or division that may have truncated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rescaled {
    /// The (possibly truncated) value
    pub value: FixedPoint,
    /// Set when a non-zero remainder was discarded
    pub precision_loss: Option<PrecisionLossWarning>,
}

impl Rescaled {
    fn exact(value: FixedPoint) -> Self {
        Self {
            value,
            precision_loss: None,
        }
    }

    /// Whether a remainder was discarded.
    #[inline]
    pub fn is_lossy(&self) -> bool {
        self.precision_loss.is_some()
    }

    /// Take the value, accepting any truncation.
    #[inline]
    pub fn into_value(self) -> FixedPoint {
        self.value
    }

    /// Take the value, failing if a remainder was discarded.
    pub fn strict(self) -> NumericResult<FixedPoint> {
        match self.precision_loss {
            Some(warning) => Err(NumericError::PrecisionLoss(warning)),
            None => Ok(self.value),
        }
    }
}

impl FixedPoint {
    // ========================================================================
    // Construction
    // ========================================================================

    /// Create from a raw integer already scaled by `10^exponent`.
    #[inline]
    pub fn new(raw: impl Into<BigInt>, exponent: u32) -> Self {
        Self {
            raw: raw.into(),
            exponent,
        }
    }

    /// Create from a count of whole units, expressed at `exponent`.
    ///
    /// `from_units(3000, 6)` is `3000.000000`.
    pub fn from_units(whole: impl Into<BigInt>, exponent: u32) -> Self {
        Self {
            raw: whole.into() * pow10(exponent),
            exponent,
        }
    }

    /// Zero at exponent 0.
    pub fn zero() -> Self {
        Self::new(0, 0)
    }

    /// One whole unit at exponent 0.
    pub fn one() -> Self {
        Self::new(1, 0)
    }

    /// Parse a decimal string and express it at exactly `exponent`.
    ///
    /// # Errors
    /// - `InvalidInput` if the string is not a decimal number
    /// - `PrecisionLoss` if it carries significant digits beyond `exponent`
    pub fn parse_with_exponent(s: &str, exponent: u32) -> NumericResult<Self> {
        let parsed: Self = s.parse()?;
        parsed.rescale(exponent).strict()
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// The scaled integer.
    #[inline]
    pub fn raw(&self) -> &BigInt {
        &self.raw
    }

    /// Number of decimal places the raw integer is scaled by.
    #[inline]
    pub fn exponent(&self) -> u32 {
        self.exponent
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.raw.is_zero()
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.raw.sign() == Sign::Plus
    }

    #[inline]
    pub fn is_negative(&self) -> bool {
        self.raw.sign() == Sign::Minus
    }

    /// Absolute value.
    pub fn abs(&self) -> Self {
        Self::new(self.raw.magnitude().clone(), self.exponent)
    }

    // ========================================================================
    // Rescaling
    // ========================================================================

    /// Express this value at `target` decimal places.
    ///
    /// Moving up is an exact multiply. Moving down floor-divides and reports
    /// the discarded remainder in [`Rescaled::precision_loss`]; every lossy
    /// rescale is logged.
    pub fn rescale(&self, target: u32) -> Rescaled {
        match target.cmp(&self.exponent) {
            Ordering::Equal => Rescaled::exact(self.clone()),
            Ordering::Greater => Rescaled::exact(Self {
                raw: &self.raw * pow10(target - self.exponent),
                exponent: target,
            }),
            Ordering::Less => {
                let divisor = pow10(self.exponent - target);
                let (quotient, remainder) = self.raw.div_mod_floor(&divisor);
                let precision_loss = if remainder.is_zero() {
                    None
                } else {
                    tracing::warn!(
                        value = %self,
                        from_exponent = self.exponent,
                        to_exponent = target,
                        %remainder,
                        "lossy downward rescale"
                    );
                    Some(PrecisionLossWarning {
                        exponent: target,
                        remainder,
                        divisor,
                    })
                };
                Rescaled {
                    value: Self {
                        raw: quotient,
                        exponent: target,
                    },
                    precision_loss,
                }
            }
        }
    }

    /// Rescale upward only. Never truncates; a smaller `target` is ignored and
    /// the value comes back at its own exponent.
    pub fn widen(&self, target: u32) -> Self {
        if target > self.exponent {
            self.rescale(target).into_value()
        } else {
            self.clone()
        }
    }

    /// Raw integers of both operands at their common (larger) exponent.
    pub fn align(&self, other: &Self) -> (BigInt, BigInt, u32) {
        let exponent = self.exponent.max(other.exponent);
        let lhs = self.widen(exponent).raw;
        let rhs = other.widen(exponent).raw;
        (lhs, rhs, exponent)
    }

    // ========================================================================
    // Arithmetic
    // ========================================================================

    /// Compute `a × b ÷ divisor` expressed at `result_exponent`.
    ///
    /// Both products are formed before the single floor division, so no
    /// intermediate is ever truncated. When the exponents require a negative
    /// power of ten it is folded into the divisor instead of dividing early.
    ///
    /// # Errors
    /// Returns `DivisionByZero` if `divisor` is zero.
    pub fn multiply_then_divide(
        a: &Self,
        b: &Self,
        divisor: &Self,
        result_exponent: u32,
    ) -> NumericResult<Rescaled> {
        if divisor.is_zero() {
            return Err(NumericError::DivisionByZero);
        }

        // raw = a.raw * b.raw * 10^k / divisor.raw
        let k = i64::from(result_exponent) + i64::from(divisor.exponent)
            - i64::from(a.exponent)
            - i64::from(b.exponent);

        let shift = u32::try_from(k.unsigned_abs()).map_err(|_| NumericError::Overflow)?;
        let mut numerator = &a.raw * &b.raw;
        let mut denominator = divisor.raw.clone();
        if k >= 0 {
            numerator *= pow10(shift);
        } else {
            denominator *= pow10(shift);
        }

        // Keep the divisor positive so floor division rounds toward -inf
        if denominator.sign() == Sign::Minus {
            numerator = -numerator;
            denominator = -denominator;
        }

        let (quotient, remainder) = numerator.div_mod_floor(&denominator);
        let precision_loss = if remainder.is_zero() {
            None
        } else {
            tracing::trace!(
                exponent = result_exponent,
                %remainder,
                %denominator,
                "multiply-then-divide truncated"
            );
            Some(PrecisionLossWarning {
                exponent: result_exponent,
                remainder,
                divisor: denominator,
            })
        };

        Ok(Rescaled {
            value: Self::new(quotient, result_exponent),
            precision_loss,
        })
    }

    /// Exact product; the exponents add.
    ///
    /// # Errors
    /// Returns `Overflow` if the combined exponent does not fit in a `u32`.
    pub fn checked_mul(&self, rhs: &Self) -> NumericResult<Self> {
        let exponent = self
            .exponent
            .checked_add(rhs.exponent)
            .ok_or(NumericError::Overflow)?;
        Ok(Self::new(&self.raw * &rhs.raw, exponent))
    }

    // ========================================================================
    // Comparison
    // ========================================================================

    /// Compare by value, ignoring representation.
    pub fn cmp_value(&self, other: &Self) -> Ordering {
        let (lhs, rhs, _) = self.align(other);
        lhs.cmp(&rhs)
    }

    /// Equal by value, ignoring representation.
    pub fn eq_value(&self, other: &Self) -> bool {
        self.cmp_value(other) == Ordering::Equal
    }
}

// ============================================================================
// Operators (exact)
// ============================================================================

impl Add<&FixedPoint> for &FixedPoint {
    type Output = FixedPoint;

    fn add(self, rhs: &FixedPoint) -> FixedPoint {
        let (lhs, rhs, exponent) = self.align(rhs);
        FixedPoint::new(lhs + rhs, exponent)
    }
}

impl Add for FixedPoint {
    type Output = FixedPoint;

    fn add(self, rhs: FixedPoint) -> FixedPoint {
        &self + &rhs
    }
}

impl Sub<&FixedPoint> for &FixedPoint {
    type Output = FixedPoint;

    fn sub(self, rhs: &FixedPoint) -> FixedPoint {
        let (lhs, rhs, exponent) = self.align(rhs);
        FixedPoint::new(lhs - rhs, exponent)
    }
}

impl Sub for FixedPoint {
    type Output = FixedPoint;

    fn sub(self, rhs: FixedPoint) -> FixedPoint {
        &self - &rhs
    }
}

// Infallible Mul for ergonomics (panics on exponent overflow - use checked_mul
// where inputs are not already bounded)
impl Mul<&FixedPoint> for &FixedPoint {
    type Output = FixedPoint;

    fn mul(self, rhs: &FixedPoint) -> FixedPoint {
        let exponent = self.exponent.checked_add(rhs.exponent);
        match exponent {
            Some(exponent) => FixedPoint::new(&self.raw * &rhs.raw, exponent),
            None => panic!("FixedPoint multiplication exponent overflow"),
        }
    }
}

impl Mul for FixedPoint {
    type Output = FixedPoint;

    fn mul(self, rhs: FixedPoint) -> FixedPoint {
        &self * &rhs
    }
}

impl Neg for FixedPoint {
    type Output = FixedPoint;

    fn neg(self) -> FixedPoint {
        FixedPoint::new(-self.raw, self.exponent)
    }
}

// ============================================================================
// Display and Debug
// ============================================================================

impl fmt::Debug for FixedPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FixedPoint({}, raw={}, exp={})",
            self, self.raw, self.exponent
        )
    }
}

impl fmt::Display for FixedPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.raw.magnitude().to_string();
        let sign = if self.is_negative() { "-" } else { "" };
        let places = self.exponent as usize;

        if places == 0 {
            return write!(f, "{}{}", sign, digits);
        }

        let padded = format!("{:0>width$}", digits, width = places + 1);
        let (int_part, frac_part) = padded.split_at(padded.len() - places);
        write!(f, "{}{}.{}", sign, int_part, frac_part)
    }
}

// ============================================================================
// String Parsing
// ============================================================================

impl std::str::FromStr for FixedPoint {
    type Err = NumericError;

    /// Parse from a decimal string. The exponent is the number of digits
    /// after the decimal point.
    ///
    /// # Examples
    /// - "115000.000000" -> raw 115000000000, exponent 6
    /// - "0.125" -> raw 125, exponent 3
    /// - "-42" -> raw -42, exponent 0
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (is_negative, unsigned) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };

        let (int_str, frac_str) = match unsigned.split_once('.') {
            Some((int_str, frac_str)) => (int_str, frac_str),
            None => (unsigned, ""),
        };

        if int_str.is_empty() && frac_str.is_empty() {
            return Err(NumericError::InvalidInput);
        }
        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(int_str) || !all_digits(frac_str) {
            return Err(NumericError::InvalidInput);
        }

        let exponent = u32::try_from(frac_str.len()).map_err(|_| NumericError::Overflow)?;
        let digits = format!("{}{}", int_str, frac_str);
        let mut raw: BigInt = digits.parse().map_err(|_| NumericError::InvalidInput)?;
        if is_negative {
            raw = -raw;
        }

        Ok(Self { raw, exponent })
    }
}

// ============================================================================
// Conversion from rust_decimal (for API boundaries)
// ============================================================================

impl FixedPoint {
    /// Convert from `rust_decimal::Decimal`. Exact: the mantissa becomes the
    /// raw integer and the scale becomes the exponent.
    pub fn from_decimal(d: rust_decimal::Decimal) -> Self {
        Self::new(d.mantissa(), d.scale())
    }

    /// Convert to `rust_decimal::Decimal`.
    ///
    /// # Errors
    /// Returns `Overflow` if the raw integer exceeds 96 bits or the exponent
    /// exceeds the decimal's maximum scale.
    pub fn to_decimal(&self) -> NumericResult<rust_decimal::Decimal> {
        let mantissa = self.raw.to_i128().ok_or(NumericError::Overflow)?;
        rust_decimal::Decimal::try_from_i128_with_scale(mantissa, self.exponent)
            .map_err(|_| NumericError::Overflow)
    }
}

// ============================================================================
// Serialization (decimal string form)
// ============================================================================

#[cfg(feature = "serde")]
impl serde::Serialize for FixedPoint {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for FixedPoint {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <std::borrow::Cow<'de, str>>::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn fp(s: &str) -> FixedPoint {
        s.parse().unwrap()
    }

    #[test]
    fn test_from_str() {
        let x = fp("123.456");
        assert_eq!(x.raw(), &BigInt::from(123_456));
        assert_eq!(x.exponent(), 3);

        let y = fp("-0.001");
        assert!(y.is_negative());
        assert_eq!(y.raw(), &BigInt::from(-1));
        assert_eq!(y.exponent(), 3);

        let z = fp("42");
        assert_eq!(z.raw(), &BigInt::from(42));
        assert_eq!(z.exponent(), 0);

        assert_eq!(fp(".5"), FixedPoint::new(5, 1));
        assert_eq!(fp("5."), FixedPoint::new(5, 0));
    }

    #[test]
    fn test_from_str_invalid() {
        for bad in ["", ".", "not_a_number", "1.2.3", "1e5", "--1", " 1 2 "] {
            let result: Result<FixedPoint, _> = bad.parse();
            assert_eq!(result, Err(NumericError::InvalidInput), "input {:?}", bad);
        }
    }

    #[test]
    fn test_parse_with_exponent() {
        let x = FixedPoint::parse_with_exponent("3000", 6).unwrap();
        assert_eq!(x, FixedPoint::new(3_000_000_000u64, 6));

        let y = FixedPoint::parse_with_exponent("1.50", 1).unwrap();
        assert_eq!(y, FixedPoint::new(15, 1));

        let err = FixedPoint::parse_with_exponent("1.1234567", 6).unwrap_err();
        assert!(matches!(err, NumericError::PrecisionLoss(_)));
    }

    #[test]
    fn test_display() {
        assert_eq!(fp("123.456").to_string(), "123.456");
        assert_eq!(FixedPoint::new(5, 3).to_string(), "0.005");
        assert_eq!(FixedPoint::new(-5, 3).to_string(), "-0.005");
        assert_eq!(FixedPoint::new(0, 2).to_string(), "0.00");
        assert_eq!(FixedPoint::new(108_695_652, 8).to_string(), "1.08695652");
        assert_eq!(FixedPoint::new(-42, 0).to_string(), "-42");
    }

    #[test]
    fn test_rescale_up_is_exact() {
        let x = fp("1.5");
        let r = x.rescale(6);
        assert!(!r.is_lossy());
        assert_eq!(r.value, FixedPoint::new(1_500_000, 6));
    }

    #[test]
    fn test_rescale_down_exact_when_remainder_zero() {
        let x = FixedPoint::new(1_500_000, 6);
        let r = x.rescale(1);
        assert!(!r.is_lossy());
        assert_eq!(r.value, FixedPoint::new(15, 1));
    }

    #[test]
    fn test_rescale_down_reports_loss() {
        let x = FixedPoint::new(1_234_567, 6);
        let r = x.rescale(2);
        assert_eq!(r.value, FixedPoint::new(123, 2));
        let warning = r.precision_loss.clone().unwrap();
        assert_eq!(warning.exponent, 2);
        assert_eq!(warning.remainder, BigInt::from(4_567));
        assert_eq!(warning.divisor, BigInt::from(10_000));
        assert!(r.strict().is_err());
    }

    #[test]
    fn test_rescale_down_floors_negative() {
        let x = FixedPoint::new(-15, 1);
        let r = x.rescale(0);
        assert_eq!(r.value, FixedPoint::new(-2, 0));
        assert!(r.is_lossy());
    }

    #[test]
    fn test_multiply_then_divide_keeps_precision() {
        // 125000 USDC at 115000 USDC/BTC into 8-decimal BTC
        let capital = fp("125000.000000");
        let rate = fp("115000.000000");
        let amount = FixedPoint::multiply_then_divide(&capital, &FixedPoint::one(), &rate, 8)
            .unwrap();
        assert_eq!(amount.value, FixedPoint::new(108_695_652, 8));
        assert!(amount.is_lossy());
    }

    #[test]
    fn test_multiply_then_divide_negative_k() {
        // 1.23456789 * 2 / 1 at exponent 2 -> k = 2 - 8 = -6
        let a = FixedPoint::new(123_456_789, 8);
        let b = FixedPoint::from_units(2, 0);
        let r = FixedPoint::multiply_then_divide(&a, &b, &FixedPoint::one(), 2).unwrap();
        assert_eq!(r.value, FixedPoint::new(246, 2));
        assert!(r.is_lossy());
    }

    #[test]
    fn test_multiply_then_divide_by_zero() {
        let a = fp("1.0");
        let zero = FixedPoint::new(0, 6);
        assert_eq!(
            FixedPoint::multiply_then_divide(&a, &a, &zero, 6),
            Err(NumericError::DivisionByZero)
        );
    }

    #[test]
    fn test_exponent_overflow_is_an_error() {
        let huge = FixedPoint::new(1, u32::MAX);
        let tenth = FixedPoint::new(1, 1);
        assert_eq!(huge.checked_mul(&tenth), Err(NumericError::Overflow));
        assert_eq!(tenth.checked_mul(&tenth), Ok(FixedPoint::new(1, 2)));

        // k = result + divisor exponents, beyond u32 range
        assert_eq!(
            FixedPoint::multiply_then_divide(&tenth, &tenth, &huge, u32::MAX),
            Err(NumericError::Overflow)
        );
    }

    #[test]
    fn test_arithmetic_is_exact() {
        let a = fp("0.1");
        let b = fp("0.02");
        assert_eq!(&a + &b, FixedPoint::new(12, 2));
        assert_eq!(&a - &b, FixedPoint::new(8, 2));
        assert_eq!(&a * &b, FixedPoint::new(2, 3));
        assert_eq!(-a, FixedPoint::new(-1, 1));
    }

    #[test]
    fn test_value_comparison() {
        assert_ne!(fp("1.0"), fp("1.00"));
        assert!(fp("1.0").eq_value(&fp("1.00")));
        assert_eq!(fp("0.999").cmp_value(&fp("1")), Ordering::Less);
        assert_eq!(fp("2").cmp_value(&fp("1.999999")), Ordering::Greater);
    }

    #[test]
    fn test_from_decimal() {
        use rust_decimal::Decimal;

        let d = Decimal::new(12345, 2); // 123.45
        let x = FixedPoint::from_decimal(d);
        assert_eq!(x, FixedPoint::new(12_345, 2));
    }

    #[test]
    fn test_to_decimal() {
        let x = fp("123.456");
        assert_eq!(x.to_decimal().unwrap().to_string(), "123.456");

        let huge = FixedPoint::new(pow10(40), 0);
        assert_eq!(huge.to_decimal(), Err(NumericError::Overflow));
    }

    #[test]
    fn test_zero_and_one() {
        assert!(FixedPoint::zero().is_zero());
        assert!(FixedPoint::one().is_positive());
        assert_eq!(FixedPoint::from_units(3, 2), FixedPoint::new(300, 2));
        assert_eq!(FixedPoint::new(-7, 1).abs(), FixedPoint::new(7, 1));
    }
}
