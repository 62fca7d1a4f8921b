//! Authoritative simulation state.
//!
//! Each [`Entity`] exclusively owns its stats, active effects, ability state
//! and forced-movement descriptor. Everything else reaches it through the
//! mutation surface on [`Entity`] and [`World`].

mod ability;
mod common;
mod effects;
mod entity;
mod movement;
mod objects;
mod world;

pub use ability::{
    AbilitySlot, AbilityState, AbilityTick, Channel, ChargePool, Loadout, RecastWindow,
};
pub use common::{EntityId, Team, Tick, Vec2};
pub use effects::{ActiveEffect, ActiveEffects, ApplyOutcome, PeriodicTick};
pub use entity::{
    CombatTally, DamageOutcome, Entity, EntityKind, EntityTick, ShieldInstance,
};
pub use movement::{ContactTag, ForcedMovement, MovementKind};
pub use objects::{
    CompanionOrder, CompanionState, Obstacle, Projectile, ProjectileId, TrapState,
};
pub use world::World;
