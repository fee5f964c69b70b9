//! # Interop-Bridge Test Suite
//!
//! Unified test crate driving cross-module scenarios against the public
//! `interop-dispatch` API.
//!
//! ```text
//! tests/src/
//! └── integration/      # End-to-end channel choreography
//!     ├── dispatch_flows.rs   # Inbound sync + async dispatch
//!     └── outbound_flows.rs   # Outbound calls and completion routing
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p interop-tests
//!
//! # With logs
//! RUST_LOG=interop_dispatch=debug cargo test -p interop-tests -- --nocapture
//! ```

#[cfg(test)]
pub mod integration;

/// Initialize tracing for a test, honoring RUST_LOG. Safe to call from
/// every test; only the first call installs the subscriber.
#[cfg(test)]
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
