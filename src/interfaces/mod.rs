// ============================================================================
// Interfaces Module
// Contracts for the collaborators the engine reads from
// ============================================================================

mod ledger;

pub use ledger::{InMemoryLedger, InMemoryLedgerError, Ledger};
