// ============================================================================
// Logging Bootstrap
// Installs a tracing subscriber for binaries and tests driving the engine
// ============================================================================

use tracing::Level;

/// Install a global `fmt` subscriber capped at `level`.
///
/// Returns `false` if a global subscriber was already installed, which is
/// the normal case when several tests call this.
pub fn init_logging(level: Level) -> bool {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .try_init()
        .is_ok()
}
