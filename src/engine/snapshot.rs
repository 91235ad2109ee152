// ============================================================================
// Ledger Snapshots
// Point-in-time reads that feed the registry and the verifier
// ============================================================================

use crate::domain::{Allocation, AssetRegistry, AssetRegistryBuilder, ConfigError};
use crate::interfaces::Ledger;
use crate::numeric::FixedPoint;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Failure while reading from a [`Ledger`]
#[derive(Error, Debug)]
pub enum LedgerError<E>
where
    E: std::error::Error + 'static,
{
    #[error("ledger query {operation} failed")]
    Query {
        operation: &'static str,
        #[source]
        source: E,
    },

    #[error(transparent)]
    Registry(#[from] ConfigError),
}

fn query<T, E>(operation: &'static str, result: Result<T, E>) -> Result<T, LedgerError<E>>
where
    E: std::error::Error + 'static,
{
    result.map_err(|source| LedgerError::Query { operation, source })
}

/// Balances observed for one owner at one point in time.
///
/// Only as consistent as the reads that produced it: balances fetched one by
/// one are not an atomic view of the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ObservedBalances {
    pub owner: String,
    pub taken_at: DateTime<Utc>,
    pub balances: HashMap<String, FixedPoint>,
}

impl ObservedBalances {
    /// Empty snapshot stamped now
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            taken_at: Utc::now(),
            balances: HashMap::new(),
        }
    }

    /// Builder method: Record a balance
    pub fn with_balance(mut self, symbol: impl Into<String>, amount: FixedPoint) -> Self {
        self.balances.insert(symbol.into(), amount);
        self
    }

    pub fn get(&self, symbol: &str) -> Option<&FixedPoint> {
        self.balances.get(symbol)
    }
}

/// How to size an asset whose rate lives on the ledger
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AssetSpec {
    pub symbol: String,
    pub decimals: u32,
    pub weight: FixedPoint,
}

impl AssetSpec {
    pub fn new(symbol: impl Into<String>, decimals: u32, weight: FixedPoint) -> Self {
        Self {
            symbol: symbol.into(),
            decimals,
            weight,
        }
    }
}

/// Read the balance of every allocated asset held by `owner`.
pub fn observe_balances<L: Ledger>(
    ledger: &L,
    owner: &str,
    allocation: &Allocation,
) -> Result<ObservedBalances, LedgerError<L::Error>> {
    let mut snapshot = ObservedBalances::new(owner);
    for entry in allocation {
        let symbol = entry.asset.symbol.as_str();
        let balance = query("asset_balance", ledger.asset_balance(owner, symbol))?;
        snapshot.balances.insert(symbol.to_string(), balance);
    }

    tracing::debug!(
        owner,
        assets = snapshot.balances.len(),
        taken_at = %snapshot.taken_at,
        "observed balances"
    );
    Ok(snapshot)
}

/// Build a registry whose fixed rates and mode come from the ledger.
///
/// `builder` supplies precision settings; assets already on it come first.
/// The registry is returned unvalidated, like any freshly built one.
pub fn registry_from_ledger<L: Ledger>(
    ledger: &L,
    specs: &[AssetSpec],
    builder: AssetRegistryBuilder,
) -> Result<AssetRegistry, LedgerError<L::Error>> {
    let enabled = query("fixed_rate_mode_enabled", ledger.fixed_rate_mode_enabled())?;

    let mut builder = builder.fixed_rate_mode(enabled);
    for spec in specs {
        let rate = query("fixed_rate", ledger.fixed_rate(&spec.symbol))?;
        tracing::debug!(symbol = %spec.symbol, %rate, "fetched fixed rate");
        builder = builder.asset(spec.symbol.clone(), spec.decimals, rate, spec.weight.clone());
    }

    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interfaces::{InMemoryLedger, InMemoryLedgerError};

    fn fp(s: &str) -> FixedPoint {
        s.parse().unwrap()
    }

    fn ledger() -> InMemoryLedger {
        InMemoryLedger::new()
            .with_fixed_rate_mode(true)
            .with_rate("WETH", fp("3000.000000"))
            .with_rate("DAI", fp("1.000000"))
            .with_share_supply(FixedPoint::from_units(1_000, 18))
    }

    #[test]
    fn test_registry_from_ledger() {
        let specs = vec![
            AssetSpec::new("WETH", 18, fp("0.5")),
            AssetSpec::new("DAI", 18, fp("0.5")),
        ];
        let registry = registry_from_ledger(&ledger(), &specs, AssetRegistry::builder()).unwrap();
        assert!(registry.validate().is_ok());
        assert_eq!(registry.get("WETH").unwrap().fixed_rate, fp("3000.000000"));
    }

    #[test]
    fn test_registry_from_ledger_unset_rate() {
        let specs = vec![
            AssetSpec::new("WETH", 18, fp("0.5")),
            AssetSpec::new("LINK", 18, fp("0.5")),
        ];
        let registry = registry_from_ledger(&ledger(), &specs, AssetRegistry::builder()).unwrap();
        assert_eq!(
            registry.validate(),
            Err(ConfigError::RateNotSet {
                symbol: "LINK".to_string()
            })
        );
    }

    #[test]
    fn test_registry_from_ledger_duplicate() {
        let specs = vec![
            AssetSpec::new("DAI", 18, fp("0.5")),
            AssetSpec::new("DAI", 18, fp("0.5")),
        ];
        let result = registry_from_ledger(&ledger(), &specs, AssetRegistry::builder());
        assert!(matches!(
            result,
            Err(LedgerError::Registry(ConfigError::DuplicateAsset { .. }))
        ));
    }

    #[test]
    fn test_observe_balances() {
        let specs = vec![AssetSpec::new("DAI", 18, fp("1"))];
        let ledger = ledger().with_balance("fund", "DAI", FixedPoint::from_units(100, 18));
        let registry = registry_from_ledger(&ledger, &specs, AssetRegistry::builder()).unwrap();
        let allocation = crate::engine::allocate(
            &registry,
            &fp("100.000000"),
            &ledger.share_supply().unwrap(),
        )
        .unwrap();

        let snapshot = observe_balances(&ledger, "fund", &allocation).unwrap();
        assert_eq!(snapshot.owner, "fund");
        assert_eq!(snapshot.get("DAI"), Some(&FixedPoint::from_units(100, 18)));
    }

    #[test]
    fn test_observe_balances_query_failure() {
        let allocation_ledger = ledger().with_rate("WBTC", fp("115000.000000"));
        let specs = vec![AssetSpec::new("WBTC", 8, fp("1"))];
        let registry =
            registry_from_ledger(&allocation_ledger, &specs, AssetRegistry::builder()).unwrap();
        let allocation = crate::engine::allocate(
            &registry,
            &fp("115000.000000"),
            &FixedPoint::from_units(1, 0),
        )
        .unwrap();

        // A ledger that has never seen WBTC
        let err = observe_balances(&ledger(), "fund", &allocation).unwrap_err();
        match err {
            LedgerError::Query { operation, source } => {
                assert_eq!(operation, "asset_balance");
                assert_eq!(
                    source,
                    InMemoryLedgerError::UnknownAsset {
                        symbol: "WBTC".to_string()
                    }
                );
            }
            other => panic!("unexpected error: {}", other),
        }
    }
}
