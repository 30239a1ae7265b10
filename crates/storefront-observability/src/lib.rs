//! Logging setup for the storefront crates.
//!
//! Library crates only emit `tracing` events; the composition root calls
//! [`init`] once to decide where they go.

mod logging;

pub use logging::*;
