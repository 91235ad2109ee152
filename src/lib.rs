// ============================================================================
// Allocation Engine Library
// Exact multi-asset fund allocation with decimal-consistency verification
// ============================================================================

//! # Allocation Engine
//!
//! Splits quote-currency capital across assets with different native
//! decimals and fixed conversion rates, and checks observed balances for the
//! off-by-a-power-of-ten defects that mismatched decimal scaling produces.
//!
//! ## Features
//!
//! - **Arbitrary-precision fixed point**: no floating point anywhere
//! - **Multiply before divide**: one floor division per computed amount
//! - **Explicit precision loss**: truncation is reported, never silent
//! - **Exact ratios**: verification compares big rationals
//! - **Read-only ledger boundary** for feeding rates and balances in
//!
//! ## Example
//!
//! ```rust
//! use allocation_engine::prelude::*;
//! use std::collections::HashMap;
//!
//! let registry = AssetRegistry::builder()
//!     .asset("WETH", 18, "3000.000000".parse().unwrap(), "0.5".parse().unwrap())
//!     .asset("WBTC", 8, "115000.000000".parse().unwrap(), "0.5".parse().unwrap())
//!     .build()
//!     .unwrap();
//! registry.validate().unwrap();
//!
//! let capital: FixedPoint = "250000.000000".parse().unwrap();
//! let supply = FixedPoint::from_units(1_000_000, 18);
//! let allocation = allocate(&registry, &capital, &supply).unwrap();
//!
//! // A balance that lost eight decimals somewhere along the way
//! let mut observed = HashMap::new();
//! observed.insert("WETH".to_string(), allocation.get("WETH").unwrap().amount.clone());
//! observed.insert("WBTC".to_string(), FixedPoint::new(1, 8));
//!
//! let reports = verify(&allocation, &observed);
//! assert_eq!(reports[0].anomaly, Anomaly::None);
//! assert_eq!(reports[1].anomaly, Anomaly::ScaleMismatch);
//! ```

pub mod domain;
pub mod engine;
pub mod interfaces;
pub mod numeric;
pub mod utils;

// Re-exports for convenience
pub mod prelude {
    pub use crate::domain::{
        Allocation, AllocationConfig, AllocationEntry, AllocationError, Anomaly, Asset,
        AssetRegistry, AssetRegistryBuilder, ConfigError, PreconditionError, RegistryConfig,
        VerificationReport, VerificationSummary, VerifierConfig,
    };
    pub use crate::engine::{
        allocate, observe_balances, registry_from_ledger, verify, Allocator, AssetSpec,
        LedgerError, ObservedBalances, Verifier,
    };
    pub use crate::interfaces::{InMemoryLedger, Ledger};
    pub use crate::numeric::{
        multiply_then_divide, rescale, FixedPoint, NumericError, PrecisionLossWarning, Rescaled,
    };
}

#[cfg(test)]
mod integration_tests {
    use super::prelude::*;
    use std::collections::HashMap;

    fn fp(s: &str) -> FixedPoint {
        s.parse().unwrap()
    }

    #[test]
    fn test_end_to_end_allocate_and_verify() {
        let registry = AssetRegistry::builder()
            .asset("WETH", 18, fp("3000.000000"), fp("0.5"))
            .asset("DAI", 18, fp("1.000000"), fp("0.5"))
            .build()
            .unwrap();
        registry.validate().unwrap();

        let allocation = allocate(
            &registry,
            &fp("6000.000000"),
            &FixedPoint::from_units(1_000, 18),
        )
        .unwrap();

        let weth = allocation.get("WETH").unwrap();
        assert!(weth.amount.eq_value(&fp("1")));
        assert!(!weth.truncated);

        let observed: HashMap<_, _> = allocation
            .iter()
            .map(|e| (e.asset.symbol.clone(), e.amount.clone()))
            .collect();
        let reports = verify(&allocation, &observed);
        let summary = VerificationSummary::from_reports(&reports);
        assert!(summary.is_consistent());
        assert_eq!(summary.anomalies(), 0);
    }

    #[test]
    fn test_types_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FixedPoint>();
        assert_send_sync::<AssetRegistry>();
        assert_send_sync::<Allocation>();
        assert_send_sync::<VerificationReport>();
        assert_send_sync::<Verifier>();
        assert_send_sync::<Allocator>();
    }
}
