//! Runtime orchestration for the authoritative ability simulation.
//!
//! This crate wraps the deterministic rules in `arena-core` with a tokio
//! worker that owns the world, applies cast commands in arrival order and
//! advances the fixed-rate step. Consumers embed [`Runtime`] and interact
//! with the world through [`RuntimeHandle`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides the topic-based event bus
//! - `workers` keeps background tasks internal to the crate
pub mod api;
pub mod events;
pub mod runtime;

mod workers;

pub use api::{Result, RuntimeError, RuntimeHandle};
pub use events::{CastEvent, Event, EventBus, TickEvent, Topic};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
