//! WireLink client application library
//!
//! Thin shell over the `wirelink` session layer: re-exports the library for
//! the demo binaries in `bin/` and hosts their shared setup.

// Re-export workspace library for convenience
pub use wirelink;

/// Initialize tracing with standard configuration
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .init();
}
