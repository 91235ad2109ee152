// ============================================================================
// Domain Models Module
// Assets, registry, allocation results and verification reports
// ============================================================================

pub mod allocation;
pub mod asset;
pub mod config;
pub mod errors;
pub mod registry;
pub mod report;

pub use allocation::{Allocation, AllocationEntry};
pub use asset::Asset;
pub use config::{AllocationConfig, RegistryConfig, VerifierConfig};
pub use errors::{AllocationError, ConfigError, PreconditionError};
pub use registry::{
    AssetRegistry, AssetRegistryBuilder, DEFAULT_RATIO_PRECISION, DEFAULT_WEIGHT_PRECISION,
};
pub use report::{Anomaly, VerificationReport, VerificationSummary};
