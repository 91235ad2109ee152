// ============================================================================
// Allocation Calculator
// Capital -> per-asset native quantities and per-share ratios
// ============================================================================

use crate::domain::{
    Allocation, AllocationConfig, AllocationEntry, AllocationError, Asset, AssetRegistry,
    ConfigError, PreconditionError,
};
use crate::numeric::FixedPoint;

/// Splits quote capital across a registry's assets.
///
/// For each asset, in registry order:
///
/// ```text
/// capital     = total_capital × invested_fraction × weight      (exact)
/// amount      = capital × 1 ÷ fixed_rate   @ asset decimals     (one floor)
/// share_ratio = amount  × 1 ÷ share_supply @ ratio precision    (one floor)
/// ```
///
/// Products are always formed before the division, so an 8-decimal asset
/// priced in 6-decimal quote capital keeps all its significant digits.
#[derive(Debug, Clone, Default)]
pub struct Allocator {
    config: AllocationConfig,
}

impl Allocator {
    /// Create an allocator from a validated configuration
    pub fn new(config: AllocationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Allocator that deploys only `fraction` of the capital into assets
    pub fn with_invested_fraction(fraction: FixedPoint) -> Result<Self, ConfigError> {
        Self::new(AllocationConfig::default().with_invested_fraction(fraction))
    }

    pub fn config(&self) -> &AllocationConfig {
        &self.config
    }

    /// Compute the allocation of `total_capital` across `registry`.
    ///
    /// Pure: identical inputs always yield identical allocations.
    ///
    /// # Errors
    /// - `Config` if the registry fails [`AssetRegistry::validate`]
    /// - `Precondition(ZeroCapital)` if `total_capital` is not positive
    /// - `Precondition(ZeroShareSupply)` if `share_supply` is not positive;
    ///   a zero supply means the fund has not been minted, not a zero ratio
    /// - `Numeric(Overflow)` if combined exponents leave the `u32` range
    pub fn allocate(
        &self,
        registry: &AssetRegistry,
        total_capital: &FixedPoint,
        share_supply: &FixedPoint,
    ) -> Result<Allocation, AllocationError> {
        registry.validate()?;

        if !total_capital.is_positive() {
            return Err(PreconditionError::ZeroCapital.into());
        }
        if !share_supply.is_positive() {
            return Err(PreconditionError::ZeroShareSupply.into());
        }

        let invested = total_capital.checked_mul(&self.config.invested_fraction)?;

        let entries = registry
            .iter()
            .map(|asset| allocate_asset(asset, &invested, share_supply, registry.ratio_precision()))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            assets = entries.len(),
            %total_capital,
            %invested,
            %share_supply,
            "allocation computed"
        );

        Ok(Allocation::new(
            entries,
            total_capital.clone(),
            invested,
            share_supply.clone(),
        ))
    }
}

fn allocate_asset(
    asset: &Asset,
    invested: &FixedPoint,
    share_supply: &FixedPoint,
    ratio_precision: u32,
) -> Result<AllocationEntry, AllocationError> {
    let one = FixedPoint::one();
    let capital = invested.checked_mul(&asset.weight)?;

    let amount = FixedPoint::multiply_then_divide(&capital, &one, &asset.fixed_rate, asset.decimals)?;
    let share_ratio =
        FixedPoint::multiply_then_divide(&amount.value, &one, share_supply, ratio_precision)?;
    let truncated = amount.is_lossy() || share_ratio.is_lossy();

    tracing::debug!(
        symbol = %asset.symbol,
        %capital,
        amount = %amount.value,
        share_ratio = %share_ratio.value,
        truncated,
        "allocated asset"
    );

    Ok(AllocationEntry {
        asset: asset.clone(),
        capital,
        amount: amount.into_value(),
        share_ratio: share_ratio.into_value(),
        truncated,
    })
}

/// Allocate all of `total_capital` with the default configuration.
///
/// # Example
/// ```
/// use allocation_engine::domain::AssetRegistry;
/// use allocation_engine::engine::allocate;
/// use allocation_engine::numeric::FixedPoint;
///
/// let registry = AssetRegistry::builder()
///     .asset("WBTC", 8, "115000.000000".parse().unwrap(), "1".parse().unwrap())
///     .build()
///     .unwrap();
///
/// let capital: FixedPoint = "125000.000000".parse().unwrap();
/// let supply = FixedPoint::from_units(1_000_000, 18);
/// let allocation = allocate(&registry, &capital, &supply).unwrap();
///
/// assert_eq!(allocation.get("WBTC").unwrap().amount.to_string(), "1.08695652");
/// ```
pub fn allocate(
    registry: &AssetRegistry,
    total_capital: &FixedPoint,
    share_supply: &FixedPoint,
) -> Result<Allocation, AllocationError> {
    Allocator::default().allocate(registry, total_capital, share_supply)
}
