//! src/logging.rs
//!
//! Structured logging initialization (SPEC_FULL.md ambient stack table).
//!
//! Grounded on the pack-wide `tracing_subscriber::fmt` init pattern used by
//! several `other_examples/` server/proxy binaries. `RUST_LOG` controls
//! verbosity the usual way; defaults to `info` when unset.

/// Install a global `tracing` subscriber. Call once, at the very top of
/// `main`, before anything else logs.
pub fn init() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
