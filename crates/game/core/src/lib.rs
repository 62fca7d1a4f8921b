//! Deterministic ability rules shared by the server runtime and offline tools.
//!
//! `arena-core` decides whether an ability activation is legal, computes its
//! magnitudes from the caster's stats, resolves who it touches and mutates
//! the world accordingly. All state mutation flows through
//! [`engine::GameEngine`]: commands through `execute`, time through `step`.
//! The crate performs no I/O and reads no clock; every timer counts ticks.
pub mod ability;
pub mod catalogue;
pub mod config;
pub mod engine;
pub mod error;
pub mod scaling;
pub mod state;
pub mod stats;
pub mod targeting;

pub use ability::{
    AbilityHandler, CastContext, CastParams, CollisionContext, Component, ExecutionResult,
    FailureReason, HandlerCapabilities, HandlerRegistry, HitContext, Validation,
};
pub use catalogue::{
    AbilityDefinition, AbilityKind, Catalogue, ChampionArchetype, ConfigError, EffectCatalogue,
    EffectCategory, EffectDefinition, EffectId, EffectPayload, Shape, TargetMask, TargetSide,
};
pub use config::GameConfig;
pub use engine::{
    CastCommand, CastError, CastInput, CastOutcome, CastReport, DeferredQueue, DeferredTask,
    GameEngine, GameState, Rules, StepEvent, StepReport, TaskKind,
};
pub use error::{ErrorSeverity, GameError};
pub use scaling::{ScalingContext, compute_magnitude};
pub use state::{
    AbilitySlot, AbilityState, Entity, EntityId, EntityKind, Loadout, Team, Tick, Vec2, World,
};
pub use stats::{BaseStats, StatKind, StatsSnapshot};
