// ============================================================================
// Asset Registry
// Ordered, symbol-keyed set of fixed-rate assets
// ============================================================================

use super::asset::Asset;
use super::config::RegistryConfig;
use super::errors::ConfigError;
use crate::numeric::{rational_to_fixed, to_rational, FixedPoint};
use indexmap::IndexMap;

/// Default number of decimal places a weight may carry
pub const DEFAULT_WEIGHT_PRECISION: u32 = 18;

/// Default decimal places per-share ratios are expressed at
pub const DEFAULT_RATIO_PRECISION: u32 = 18;

/// Supported assets in insertion order, plus the fixed-rate mode switch.
///
/// Immutable once built: there is no API to add, remove or edit an asset.
/// Build a new registry to change it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRegistry {
    assets: IndexMap<String, Asset>,
    fixed_rate_mode_enabled: bool,
    weight_precision: u32,
    ratio_precision: u32,
}

impl AssetRegistry {
    /// Start building a registry.
    pub fn builder() -> AssetRegistryBuilder {
        AssetRegistryBuilder::new()
    }

    /// Build from external configuration.
    ///
    /// # Errors
    /// Returns `DuplicateAsset` if a symbol appears twice. Content is not
    /// validated; call [`AssetRegistry::validate`].
    pub fn from_config(config: &RegistryConfig) -> Result<Self, ConfigError> {
        config
            .assets
            .iter()
            .cloned()
            .fold(AssetRegistryBuilder::new(), AssetRegistryBuilder::with_asset)
            .fixed_rate_mode(config.fixed_rate_mode_enabled)
            .with_weight_precision(config.weight_precision)
            .with_ratio_precision(config.ratio_precision)
            .build()
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Check the registry can drive an allocation.
    ///
    /// Checks run in order: every rate set, fixed-rate mode enabled, every
    /// weight positive, every weight within the weight precision, weights
    /// summing to exactly one. Pure: no logging, no state.
    ///
    /// # Errors
    /// - `RateNotSet` for the first asset whose rate is zero, whatever the mode
    /// - `ModeDisabled` if assets are present but fixed-rate mode is off
    /// - `NonPositiveWeight` for the first asset with a zero or negative weight
    /// - `WeightTooPrecise` for the first weight with significant digits
    ///   beyond the weight precision
    /// - `WeightSumMismatch` if the weights do not sum to exactly one (an
    ///   empty registry sums to zero)
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(asset) = self.assets.values().find(|a| !a.is_tradable()) {
            return Err(ConfigError::RateNotSet {
                symbol: asset.symbol.clone(),
            });
        }

        if !self.assets.is_empty() && !self.fixed_rate_mode_enabled {
            return Err(ConfigError::ModeDisabled);
        }

        if let Some(asset) = self.assets.values().find(|a| !a.weight.is_positive()) {
            return Err(ConfigError::NonPositiveWeight {
                symbol: asset.symbol.clone(),
            });
        }

        if let Some(asset) = self.assets.values().find(|a| !self.fits_weight_precision(&a.weight)) {
            return Err(ConfigError::WeightTooPrecise {
                symbol: asset.symbol.clone(),
                precision: self.weight_precision,
            });
        }

        let sum = self.weight_sum();
        if !sum.eq_value(&FixedPoint::one()) {
            return Err(ConfigError::WeightSumMismatch {
                sum: sum.to_string(),
            });
        }

        Ok(())
    }

    /// Exact sum of all weights.
    pub fn weight_sum(&self) -> FixedPoint {
        self.assets
            .values()
            .fold(FixedPoint::zero(), |acc, asset| &acc + &asset.weight)
    }

    // Floors without going through `rescale`, which would log
    fn fits_weight_precision(&self, weight: &FixedPoint) -> bool {
        rational_to_fixed(&to_rational(weight), self.weight_precision).eq_value(weight)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn get(&self, symbol: &str) -> Option<&Asset> {
        self.assets.get(symbol)
    }

    /// Assets in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Asset> {
        self.assets.values()
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.assets.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn fixed_rate_mode_enabled(&self) -> bool {
        self.fixed_rate_mode_enabled
    }

    pub fn weight_precision(&self) -> u32 {
        self.weight_precision
    }

    pub fn ratio_precision(&self) -> u32 {
        self.ratio_precision
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`AssetRegistry`].
///
/// # Example
/// ```
/// use allocation_engine::domain::AssetRegistry;
///
/// let registry = AssetRegistry::builder()
///     .asset("WETH", 18, "3000.000000".parse().unwrap(), "0.5".parse().unwrap())
///     .asset("DAI", 18, "1.000000".parse().unwrap(), "0.5".parse().unwrap())
///     .build()
///     .unwrap();
///
/// assert!(registry.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct AssetRegistryBuilder {
    assets: Vec<Asset>,
    fixed_rate_mode_enabled: bool,
    weight_precision: u32,
    ratio_precision: u32,
}

impl AssetRegistryBuilder {
    /// Empty builder with fixed-rate mode enabled and default precisions
    pub fn new() -> Self {
        Self {
            assets: Vec::new(),
            fixed_rate_mode_enabled: true,
            weight_precision: DEFAULT_WEIGHT_PRECISION,
            ratio_precision: DEFAULT_RATIO_PRECISION,
        }
    }

    /// Append an asset
    pub fn with_asset(mut self, asset: Asset) -> Self {
        self.assets.push(asset);
        self
    }

    /// Append an asset from its parts
    pub fn asset(
        self,
        symbol: impl Into<String>,
        decimals: u32,
        fixed_rate: FixedPoint,
        weight: FixedPoint,
    ) -> Self {
        self.with_asset(Asset::new(symbol, decimals, fixed_rate, weight))
    }

    /// Set whether the fund is in fixed-rate mode
    pub fn fixed_rate_mode(mut self, enabled: bool) -> Self {
        self.fixed_rate_mode_enabled = enabled;
        self
    }

    /// Set the precision weights must sum to one at
    pub fn with_weight_precision(mut self, precision: u32) -> Self {
        self.weight_precision = precision;
        self
    }

    /// Set the precision per-share ratios are expressed at
    pub fn with_ratio_precision(mut self, precision: u32) -> Self {
        self.ratio_precision = precision;
        self
    }

    /// Freeze the registry.
    ///
    /// # Errors
    /// Returns `DuplicateAsset` if two assets share a symbol.
    pub fn build(self) -> Result<AssetRegistry, ConfigError> {
        let mut assets = IndexMap::with_capacity(self.assets.len());
        for asset in self.assets {
            if assets.contains_key(&asset.symbol) {
                return Err(ConfigError::DuplicateAsset {
                    symbol: asset.symbol,
                });
            }
            assets.insert(asset.symbol.clone(), asset);
        }

        Ok(AssetRegistry {
            assets,
            fixed_rate_mode_enabled: self.fixed_rate_mode_enabled,
            weight_precision: self.weight_precision,
            ratio_precision: self.ratio_precision,
        })
    }
}

impl Default for AssetRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
