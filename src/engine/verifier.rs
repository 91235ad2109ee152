// ============================================================================
// Consistency Verifier
// Compares allocated amounts against observed balances
// ============================================================================

use super::snapshot::ObservedBalances;
use crate::domain::{
    Allocation, Anomaly, Asset, ConfigError, VerificationReport, VerifierConfig,
};
use crate::numeric::{rational_to_fixed, to_rational, BigRational, FixedPoint};
use num_traits::{One, Zero};
use std::collections::HashMap;

/// Decimal places used when a ratio is rendered into log output
const LOG_RATIO_PLACES: u32 = 9;

/// Diagnostic pass over an allocation.
///
/// Never mutates its inputs; anomalies come back as report data.
#[derive(Debug, Clone)]
pub struct Verifier {
    config: VerifierConfig,
    band_low: BigRational,
    band_high: BigRational,
    low_threshold: BigRational,
    high_threshold: BigRational,
}

impl Verifier {
    /// Create a verifier from a validated configuration
    pub fn new(config: VerifierConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_valid(config))
    }

    fn from_valid(config: VerifierConfig) -> Self {
        let tolerance = to_rational(&config.tolerance);
        Self {
            band_low: BigRational::one() - &tolerance,
            band_high: BigRational::one() + &tolerance,
            low_threshold: to_rational(&config.low_threshold),
            high_threshold: to_rational(&config.high_threshold),
            config,
        }
    }

    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// Check every allocation entry against `observed`, keyed by asset symbol.
    ///
    /// Reports follow allocation order.
    pub fn verify(
        &self,
        allocation: &Allocation,
        observed: &HashMap<String, FixedPoint>,
    ) -> Vec<VerificationReport> {
        allocation
            .iter()
            .map(|entry| self.check(&entry.asset, &entry.amount, observed.get(&entry.asset.symbol)))
            .collect()
    }

    /// Check an allocation against a ledger snapshot
    pub fn verify_snapshot(
        &self,
        allocation: &Allocation,
        snapshot: &ObservedBalances,
    ) -> Vec<VerificationReport> {
        tracing::debug!(
            owner = %snapshot.owner,
            taken_at = %snapshot.taken_at,
            "verifying against snapshot"
        );
        self.verify(allocation, &snapshot.balances)
    }

    /// Compare one expected amount with an optional observation.
    pub fn check(
        &self,
        asset: &Asset,
        expected: &FixedPoint,
        actual: Option<&FixedPoint>,
    ) -> VerificationReport {
        let (ratio, anomaly, within_tolerance) = match actual {
            None => (None, Anomaly::Missing, false),
            Some(actual) if expected.is_zero() => {
                // Ratio undefined; anything observed is more than expected
                let anomaly = if actual.is_positive() {
                    Anomaly::Excess
                } else {
                    Anomaly::None
                };
                (None, anomaly, actual.is_zero())
            }
            Some(actual) => {
                let (expected_raw, actual_raw, _) = expected.align(actual);
                let ratio = BigRational::new(actual_raw, expected_raw);
                let (anomaly, within) = if ratio.is_zero() {
                    (Anomaly::Missing, false)
                } else {
                    self.classify(&ratio)
                };
                (Some(ratio), anomaly, within)
            }
        };

        let report = VerificationReport {
            asset: asset.clone(),
            expected: expected.clone(),
            actual: actual.cloned(),
            ratio,
            anomaly,
            within_tolerance,
        };
        log_report(&report);
        report
    }

    fn classify(&self, ratio: &BigRational) -> (Anomaly, bool) {
        if *ratio >= self.band_low && *ratio <= self.band_high {
            (Anomaly::None, true)
        } else if *ratio < self.low_threshold {
            (Anomaly::ScaleMismatch, false)
        } else if *ratio > self.high_threshold {
            (Anomaly::Excess, false)
        } else {
            (Anomaly::None, false)
        }
    }
}

impl Default for Verifier {
    fn default() -> Self {
        Self::from_valid(VerifierConfig::default())
    }
}

fn log_report(report: &VerificationReport) {
    let symbol = report.asset.symbol.as_str();
    let ratio = report
        .ratio
        .as_ref()
        .map(|r| rational_to_fixed(r, LOG_RATIO_PLACES).to_string());

    match report.anomaly {
        Anomaly::None if report.within_tolerance => {
            tracing::debug!(symbol, expected = %report.expected, ?ratio, "balance consistent");
        }
        Anomaly::None => {
            tracing::debug!(
                symbol,
                expected = %report.expected,
                ?ratio,
                "balance outside tolerance without a named anomaly"
            );
        }
        Anomaly::Missing => {
            tracing::warn!(symbol, expected = %report.expected, "no balance observed");
        }
        Anomaly::ScaleMismatch | Anomaly::Excess => {
            tracing::warn!(
                symbol,
                anomaly = ?report.anomaly,
                expected = %report.expected,
                actual = ?report.actual.as_ref().map(ToString::to_string),
                ?ratio,
                magnitude = ?report.magnitude_offset(),
                "balance anomaly"
            );
        }
    }
}

/// Verify with the default thresholds.
pub fn verify(
    allocation: &Allocation,
    observed: &HashMap<String, FixedPoint>,
) -> Vec<VerificationReport> {
    Verifier::default().verify(allocation, observed)
}
