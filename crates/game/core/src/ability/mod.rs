//! Ability handlers and their registry.
//!
//! ```text
//! CastCommand → GameEngine::execute → HandlerRegistry lookup
//!                                 ├─ handler.validate / execute (+ optional hooks)
//!                                 └─ generic::validate / execute (no handler)
//! ```

pub mod common;
mod context;
pub mod generic;
mod handler;
pub mod handlers;
mod registry;

pub use context::{CastContext, CastParams};
pub use handler::{
    AbilityHandler, CollisionContext, Component, ExecutionResult, FailureReason,
    HandlerCapabilities, HitContext, Validation,
};
pub use registry::{HandlerRegistry, RegisteredHandler};
