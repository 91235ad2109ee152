// ============================================================================
// Domain Errors
// Registry configuration and allocation precondition failures
// ============================================================================

use crate::numeric::NumericError;
use thiserror::Error;

/// The registry or engine configuration is unusable.
///
/// Fatal to the calling workflow; fixed by reconfiguration, never worked around.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("fixed rate not set for asset {symbol}")]
    RateNotSet { symbol: String },

    #[error("fixed-rate mode is disabled while assets are configured")]
    ModeDisabled,

    #[error("asset weights sum to {sum}, expected exactly 1")]
    WeightSumMismatch { sum: String },

    #[error("weight for asset {symbol} must be strictly positive")]
    NonPositiveWeight { symbol: String },

    #[error("weight for asset {symbol} has digits beyond {precision} decimal places")]
    WeightTooPrecise { symbol: String, precision: u32 },

    #[error("asset {symbol} is configured more than once")]
    DuplicateAsset { symbol: String },

    #[error("invalid tolerance: {0}")]
    InvalidTolerance(String),

    #[error("invalid anomaly thresholds: {0}")]
    InvalidThresholds(String),

    #[error("invested fraction must be in (0, 1], got {0}")]
    InvalidFraction(String),
}

/// Caller misuse of the allocation calculator. Fatal, not retried.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreconditionError {
    #[error("total capital must be strictly positive")]
    ZeroCapital,

    #[error("division by zero share supply: fund shares have not been minted")]
    ZeroShareSupply,
}

/// Everything [`allocate`](crate::engine::allocate) can fail with.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllocationError {
    #[error("registry failed validation: {0}")]
    Config(#[from] ConfigError),

    #[error("precondition violated: {0}")]
    Precondition(#[from] PreconditionError),

    #[error("arithmetic error: {0}")]
    Numeric(#[from] NumericError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ConfigError::RateNotSet {
            symbol: "WBTC".to_string(),
        };
        assert_eq!(err.to_string(), "fixed rate not set for asset WBTC");

        let err = AllocationError::from(PreconditionError::ZeroShareSupply);
        assert_eq!(
            err.to_string(),
            "precondition violated: division by zero share supply: fund shares have not been minted"
        );
    }

    #[test]
    fn test_error_conversion() {
        let err: AllocationError = ConfigError::ModeDisabled.into();
        assert!(matches!(err, AllocationError::Config(ConfigError::ModeDisabled)));

        let err: AllocationError = NumericError::DivisionByZero.into();
        assert!(matches!(err, AllocationError::Numeric(_)));
    }
}
