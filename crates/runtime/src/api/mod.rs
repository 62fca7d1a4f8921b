//! Public API surface for runtime consumers.
//!
//! Re-exports the handle and error types that clients use to drive the
//! simulation.
mod errors;
mod handle;

pub use errors::{Result, RuntimeError};
pub use handle::RuntimeHandle;
