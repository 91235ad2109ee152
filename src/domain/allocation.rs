// ============================================================================
// Allocation Domain Model
// Result of one allocation run
// ============================================================================

use super::asset::Asset;
use crate::numeric::FixedPoint;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The quantity of one asset bought by an allocation run
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AllocationEntry {
    /// The asset bought
    pub asset: Asset,

    /// Quote capital allotted to the asset (exact)
    pub capital: FixedPoint,

    /// Quantity bought, at the asset's native decimals
    pub amount: FixedPoint,

    /// `amount` per unit of fund share supply, at the registry's ratio precision
    pub share_ratio: FixedPoint,

    /// Whether flooring `amount` or `share_ratio` discarded a remainder
    pub truncated: bool,
}

/// Per-asset quantities computed from a registry and a capital amount.
///
/// Owned by the caller; entries follow registry order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Allocation {
    entries: Vec<AllocationEntry>,
    total_capital: FixedPoint,
    invested_capital: FixedPoint,
    share_supply: FixedPoint,
}

impl Allocation {
    pub(crate) fn new(
        entries: Vec<AllocationEntry>,
        total_capital: FixedPoint,
        invested_capital: FixedPoint,
        share_supply: FixedPoint,
    ) -> Self {
        Self {
            entries,
            total_capital,
            invested_capital,
            share_supply,
        }
    }

    pub fn entries(&self) -> &[AllocationEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AllocationEntry> {
        self.entries.iter()
    }

    /// Entry for `symbol`, if the registry contained it
    pub fn get(&self, symbol: &str) -> Option<&AllocationEntry> {
        self.entries.iter().find(|e| e.asset.symbol == symbol)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Capital the run was asked to allocate
    pub fn total_capital(&self) -> &FixedPoint {
        &self.total_capital
    }

    /// Portion of total capital deployed into assets
    pub fn invested_capital(&self) -> &FixedPoint {
        &self.invested_capital
    }

    pub fn share_supply(&self) -> &FixedPoint {
        &self.share_supply
    }

    /// Quote value of everything bought: Σ amount × fixed rate, exact.
    ///
    /// Never exceeds [`Allocation::invested_capital`]; the gap is what flooring
    /// each amount to native decimals cost, bounded per asset by the value of
    /// one native unit.
    pub fn reconstructed_capital(&self) -> FixedPoint {
        self.entries.iter().fold(FixedPoint::zero(), |acc, entry| {
            &acc + &entry.asset.quote_value(&entry.amount)
        })
    }

    /// Invested capital left unspent by truncation (exact, never negative).
    pub fn dust(&self) -> FixedPoint {
        &self.invested_capital - &self.reconstructed_capital()
    }
}

impl<'a> IntoIterator for &'a Allocation {
    type Item = &'a AllocationEntry;
    type IntoIter = std::slice::Iter<'a, AllocationEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
