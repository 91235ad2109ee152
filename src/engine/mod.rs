// ============================================================================
// Engine Module
// Allocation, verification and ledger snapshot logic
// ============================================================================

mod allocator;
mod verifier;

pub mod snapshot;

pub use allocator::{allocate, Allocator};
pub use snapshot::{
    observe_balances, registry_from_ledger, AssetSpec, LedgerError, ObservedBalances,
};
pub use verifier::{verify, Verifier};
