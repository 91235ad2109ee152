// ============================================================================
// Utilities Module
// Helpers for hosting the engine
// ============================================================================

#[cfg(feature = "logging")]
mod logging;

#[cfg(feature = "logging")]
pub use logging::init_logging;
