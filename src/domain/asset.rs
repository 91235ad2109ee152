// ============================================================================
// Asset Domain Model
// ============================================================================

use crate::numeric::FixedPoint;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A fund asset purchasable under fixed-rate mode.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Asset {
    /// Asset identifier (e.g., "WETH", "WBTC")
    pub symbol: String,

    /// Native integer precision of the asset's raw quantities
    pub decimals: u32,

    /// Quote-currency value of one whole asset unit
    pub fixed_rate: FixedPoint,

    /// Fraction of invested capital allocated to this asset (0 < weight <= 1)
    pub weight: FixedPoint,
}

impl Asset {
    pub fn new(
        symbol: impl Into<String>,
        decimals: u32,
        fixed_rate: FixedPoint,
        weight: FixedPoint,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            decimals,
            fixed_rate,
            weight,
        }
    }

    /// A zero or unset rate means the asset cannot be bought at a fixed rate.
    #[inline]
    pub fn is_tradable(&self) -> bool {
        self.fixed_rate.is_positive()
    }

    /// One whole unit at the asset's native precision (`10^decimals` raw).
    pub fn one_unit(&self) -> FixedPoint {
        FixedPoint::from_units(1, self.decimals)
    }

    /// Quote value of a native-precision quantity of this asset (exact).
    pub fn quote_value(&self, amount: &FixedPoint) -> FixedPoint {
        amount * &self.fixed_rate
    }
}
