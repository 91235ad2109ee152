// ============================================================================
// Engine Configuration
// Registry source configuration, allocation and verification tuning
// ============================================================================

use super::asset::Asset;
use super::errors::ConfigError;
use super::registry::{DEFAULT_RATIO_PRECISION, DEFAULT_WEIGHT_PRECISION};
use crate::numeric::FixedPoint;
use std::cmp::Ordering;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ============================================================================
// Registry Configuration
// ============================================================================

#[cfg(feature = "serde")]
fn default_weight_precision() -> u32 {
    DEFAULT_WEIGHT_PRECISION
}

#[cfg(feature = "serde")]
fn default_ratio_precision() -> u32 {
    DEFAULT_RATIO_PRECISION
}

/// External description of an asset registry, as loaded by tooling.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RegistryConfig {
    /// Whether the fund buys assets at their configured fixed rates
    pub fixed_rate_mode_enabled: bool,

    /// Decimal places the weights must sum to one at
    #[cfg_attr(feature = "serde", serde(default = "default_weight_precision"))]
    pub weight_precision: u32,

    /// Decimal places per-share ratios are expressed at
    #[cfg_attr(feature = "serde", serde(default = "default_ratio_precision"))]
    pub ratio_precision: u32,

    /// Assets in allocation order
    pub assets: Vec<Asset>,
}

impl RegistryConfig {
    pub fn new(assets: Vec<Asset>) -> Self {
        Self {
            fixed_rate_mode_enabled: true,
            weight_precision: DEFAULT_WEIGHT_PRECISION,
            ratio_precision: DEFAULT_RATIO_PRECISION,
            assets,
        }
    }
}

// ============================================================================
// Allocation Configuration
// ============================================================================

/// Tuning for the allocation calculator
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AllocationConfig {
    /// Share of total capital deployed into assets; the rest stays in the
    /// quote currency. 1 deploys everything.
    pub invested_fraction: FixedPoint,
}

impl AllocationConfig {
    /// Builder method: Set the invested fraction
    pub fn with_invested_fraction(mut self, fraction: FixedPoint) -> Self {
        self.invested_fraction = fraction;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fraction = &self.invested_fraction;
        if !fraction.is_positive() || fraction.cmp_value(&FixedPoint::one()) == Ordering::Greater
        {
            return Err(ConfigError::InvalidFraction(fraction.to_string()));
        }
        Ok(())
    }
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            invested_fraction: FixedPoint::one(),
        }
    }
}

// ============================================================================
// Verifier Configuration
// ============================================================================

/// Anomaly classification thresholds for the consistency verifier.
///
/// A ratio `actual / expected` within `[1 - tolerance, 1 + tolerance]` is
/// clean, below `low_threshold` is a scale mismatch, above `high_threshold`
/// is an excess.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VerifierConfig {
    /// Accepted relative deviation from the expected amount
    pub tolerance: FixedPoint,

    /// Ratios below this are reported as `ScaleMismatch`
    pub low_threshold: FixedPoint,

    /// Ratios above this are reported as `Excess`
    pub high_threshold: FixedPoint,
}

impl VerifierConfig {
    pub fn new(tolerance: FixedPoint, low_threshold: FixedPoint, high_threshold: FixedPoint) -> Self {
        Self {
            tolerance,
            low_threshold,
            high_threshold,
        }
    }

    /// Builder method: Set tolerance
    pub fn with_tolerance(mut self, tolerance: FixedPoint) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Builder method: Set the scale-mismatch threshold
    pub fn with_low_threshold(mut self, threshold: FixedPoint) -> Self {
        self.low_threshold = threshold;
        self
    }

    /// Builder method: Set the excess threshold
    pub fn with_high_threshold(mut self, threshold: FixedPoint) -> Self {
        self.high_threshold = threshold;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let one = FixedPoint::one();

        if self.tolerance.is_negative() || self.tolerance.cmp_value(&one) != Ordering::Less {
            return Err(ConfigError::InvalidTolerance(format!(
                "tolerance must be in [0, 1), got {}",
                self.tolerance
            )));
        }

        let band_low = &one - &self.tolerance;
        let band_high = &one + &self.tolerance;

        if !self.low_threshold.is_positive()
            || self.low_threshold.cmp_value(&band_low) == Ordering::Greater
        {
            return Err(ConfigError::InvalidThresholds(format!(
                "low threshold {} must be in (0, {}]",
                self.low_threshold, band_low
            )));
        }

        if self.high_threshold.cmp_value(&band_high) == Ordering::Less {
            return Err(ConfigError::InvalidThresholds(format!(
                "high threshold {} must be at least {}",
                self.high_threshold, band_high
            )));
        }

        Ok(())
    }
}

impl Default for VerifierConfig {
    /// 1 part in 10,000 tolerance, scale mismatch below 0.01, excess above 2
    fn default() -> Self {
        Self {
            tolerance: FixedPoint::new(1, 4),
            low_threshold: FixedPoint::new(1, 2),
            high_threshold: FixedPoint::from_units(2, 0),
        }
    }
}

// ============================================================================
// Preset Configurations (Factory Methods)
// ============================================================================

impl VerifierConfig {
    /// Exact matching: any deviation leaves the tolerance band
    pub fn strict() -> Self {
        Self::default().with_tolerance(FixedPoint::zero())
    }

    /// Loose band for eyeballing live balances that drift with fees
    /// - Tolerance: 1%
    /// - Scale mismatch below 0.01, excess above 10
    pub fn diagnostic() -> Self {
        Self::new(
            FixedPoint::new(1, 2),
            FixedPoint::new(1, 2),
            FixedPoint::from_units(10, 0),
        )
    }
}
