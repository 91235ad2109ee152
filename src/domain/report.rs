// ============================================================================
// Verification Report
// Expected-versus-observed comparison for one allocated asset
// ============================================================================

use super::asset::Asset;
use crate::numeric::{magnitude, rational_to_fixed, BigRational, FixedPoint};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Classification of an observed balance against its expected amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Anomaly {
    /// No named anomaly
    None,

    /// Observed is smaller than expected by (roughly) a power of ten:
    /// a decimal rescale was omitted or applied twice
    ScaleMismatch,

    /// Nothing observed for the asset
    Missing,

    /// Observed is well above expected
    Excess,
}

/// Outcome of checking one allocation entry against an observed balance
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VerificationReport {
    pub asset: Asset,

    /// Amount the allocation computed
    pub expected: FixedPoint,

    /// Amount observed; `None` when no observation exists for the asset
    pub actual: Option<FixedPoint>,

    /// Exact `actual / expected`; `None` when either side is absent or zero-expected
    pub ratio: Option<BigRational>,

    pub anomaly: Anomaly,

    /// Whether `ratio` fell inside the configured tolerance band
    pub within_tolerance: bool,
}

impl VerificationReport {
    /// Whether a named anomaly fired
    #[inline]
    pub fn is_anomalous(&self) -> bool {
        self.anomaly != Anomaly::None
    }

    /// The power of ten `ratio` is nearest to: `-6` when the observed
    /// balance is a millionth of what was expected, `0` for a clean match.
    pub fn magnitude_offset(&self) -> Option<i32> {
        self.ratio.as_ref().and_then(magnitude)
    }

    /// `ratio` as a decimal floored at `exponent` places, for display
    pub fn ratio_as_fixed(&self, exponent: u32) -> Option<FixedPoint> {
        self.ratio
            .as_ref()
            .map(|ratio| rational_to_fixed(ratio, exponent))
    }
}

/// Anomaly counts over a sequence of reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VerificationSummary {
    pub checked: usize,
    pub within_tolerance: usize,
    pub scale_mismatches: usize,
    pub missing: usize,
    pub excess: usize,
}

impl VerificationSummary {
    pub fn from_reports(reports: &[VerificationReport]) -> Self {
        reports.iter().fold(Self::default(), |mut summary, report| {
            summary.checked += 1;
            if report.within_tolerance {
                summary.within_tolerance += 1;
            }
            match report.anomaly {
                Anomaly::None => {}
                Anomaly::ScaleMismatch => summary.scale_mismatches += 1,
                Anomaly::Missing => summary.missing += 1,
                Anomaly::Excess => summary.excess += 1,
            }
            summary
        })
    }

    /// Every report landed inside the tolerance band
    pub fn is_consistent(&self) -> bool {
        self.within_tolerance == self.checked
    }

    pub fn anomalies(&self) -> usize {
        self.scale_mismatches + self.missing + self.excess
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;

    fn report(ratio: Option<(i64, i64)>, anomaly: Anomaly, within: bool) -> VerificationReport {
        VerificationReport {
            asset: Asset::new("WBTC", 8, FixedPoint::from_units(115_000, 6), FixedPoint::one()),
            expected: FixedPoint::new(108_695_652, 8),
            actual: None,
            ratio: ratio.map(|(n, d)| BigRational::new(BigInt::from(n), BigInt::from(d))),
            anomaly,
            within_tolerance: within,
        }
    }

    #[test]
    fn test_magnitude_offset() {
        let scaled = report(Some((1, 1_000_000_000)), Anomaly::ScaleMismatch, false);
        assert_eq!(scaled.magnitude_offset(), Some(-9));
        assert!(scaled.is_anomalous());

        let missing = report(None, Anomaly::Missing, false);
        assert_eq!(missing.magnitude_offset(), None);
    }

    #[test]
    fn test_ratio_as_fixed() {
        let r = report(Some((1, 1_000)), Anomaly::ScaleMismatch, false);
        assert_eq!(r.ratio_as_fixed(4), Some(FixedPoint::new(10, 4)));
    }

    #[test]
    fn test_summary() {
        let reports = vec![
            report(Some((1, 1)), Anomaly::None, true),
            report(Some((1, 1_000)), Anomaly::ScaleMismatch, false),
            report(None, Anomaly::Missing, false),
            report(Some((5, 1)), Anomaly::Excess, false),
            report(Some((3, 2)), Anomaly::None, false),
        ];
        let summary = VerificationSummary::from_reports(&reports);
        assert_eq!(summary.checked, 5);
        assert_eq!(summary.within_tolerance, 1);
        assert_eq!(summary.scale_mismatches, 1);
        assert_eq!(summary.missing, 1);
        assert_eq!(summary.excess, 1);
        assert_eq!(summary.anomalies(), 3);
        assert!(!summary.is_consistent());
    }
}
