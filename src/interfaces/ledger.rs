// ============================================================================
// Ledger Interface
// Read-only view of the deployed fund, its rates and balances
// ============================================================================

use crate::numeric::FixedPoint;
use std::collections::HashMap;
use thiserror::Error;

/// Read-only queries against the ledger hosting the fund.
///
/// Implementations own transport, retries and backoff. The engine only ever
/// reads through this trait and never issues a write.
pub trait Ledger {
    /// Failure reported by the underlying query mechanism
    type Error: std::error::Error + Send + Sync + 'static;

    /// Balance of `symbol` held by `owner`, at the asset's native decimals
    fn asset_balance(&self, owner: &str, symbol: &str) -> Result<FixedPoint, Self::Error>;

    /// Quote value of one whole unit of `symbol`; zero when unset
    fn fixed_rate(&self, symbol: &str) -> Result<FixedPoint, Self::Error>;

    /// Whether the fund buys at fixed rates
    fn fixed_rate_mode_enabled(&self) -> Result<bool, Self::Error>;

    /// Total supply of the fund's share token
    fn share_supply(&self) -> Result<FixedPoint, Self::Error>;
}

/// Errors from [`InMemoryLedger`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InMemoryLedgerError {
    #[error("unknown asset: {symbol}")]
    UnknownAsset { symbol: String },
}

/// Map-backed ledger for tests, demos and replaying captured state.
///
/// Unset rates read as zero, as a contract would report them. Balance queries
/// for an asset the ledger has never heard of fail with `UnknownAsset`; known
/// assets read as zero for owners without a recorded balance.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    balances: HashMap<(String, String), FixedPoint>,
    rates: HashMap<String, FixedPoint>,
    fixed_rate_mode_enabled: bool,
    share_supply: FixedPoint,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: Record a balance
    pub fn with_balance(
        mut self,
        owner: impl Into<String>,
        symbol: impl Into<String>,
        amount: FixedPoint,
    ) -> Self {
        self.balances.insert((owner.into(), symbol.into()), amount);
        self
    }

    /// Builder method: Set an asset's fixed rate
    pub fn with_rate(mut self, symbol: impl Into<String>, rate: FixedPoint) -> Self {
        self.rates.insert(symbol.into(), rate);
        self
    }

    /// Builder method: Toggle fixed-rate mode
    pub fn with_fixed_rate_mode(mut self, enabled: bool) -> Self {
        self.fixed_rate_mode_enabled = enabled;
        self
    }

    /// Builder method: Set share token supply
    pub fn with_share_supply(mut self, supply: FixedPoint) -> Self {
        self.share_supply = supply;
        self
    }

    fn knows(&self, symbol: &str) -> bool {
        self.rates.contains_key(symbol) || self.balances.keys().any(|(_, s)| s == symbol)
    }
}

impl Ledger for InMemoryLedger {
    type Error = InMemoryLedgerError;

    fn asset_balance(&self, owner: &str, symbol: &str) -> Result<FixedPoint, Self::Error> {
        if !self.knows(symbol) {
            return Err(InMemoryLedgerError::UnknownAsset {
                symbol: symbol.to_string(),
            });
        }
        Ok(self
            .balances
            .get(&(owner.to_string(), symbol.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    fn fixed_rate(&self, symbol: &str) -> Result<FixedPoint, Self::Error> {
        Ok(self.rates.get(symbol).cloned().unwrap_or_default())
    }

    fn fixed_rate_mode_enabled(&self) -> Result<bool, Self::Error> {
        Ok(self.fixed_rate_mode_enabled)
    }

    fn share_supply(&self) -> Result<FixedPoint, Self::Error> {
        Ok(self.share_supply.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_ledger() {
        let ledger = InMemoryLedger::new()
            .with_rate("WETH", FixedPoint::from_units(3_000, 6))
            .with_balance("fund", "WETH", FixedPoint::from_units(41, 18))
            .with_fixed_rate_mode(true)
            .with_share_supply(FixedPoint::from_units(1_000_000, 18));

        assert_eq!(
            ledger.asset_balance("fund", "WETH").unwrap(),
            FixedPoint::from_units(41, 18)
        );
        assert!(ledger.asset_balance("someone", "WETH").unwrap().is_zero());
        assert_eq!(
            ledger.asset_balance("fund", "DOGE"),
            Err(InMemoryLedgerError::UnknownAsset {
                symbol: "DOGE".to_string()
            })
        );
        assert!(ledger.fixed_rate("LINK").unwrap().is_zero());
        assert!(ledger.fixed_rate_mode_enabled().unwrap());
        assert!(ledger.share_supply().unwrap().is_positive());
    }
}
