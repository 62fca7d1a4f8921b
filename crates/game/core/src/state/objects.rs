//! Owned world objects: companions, traps, projectiles and obstacles.

use std::collections::BTreeSet;
use std::fmt;

use crate::catalogue::AbilityKind;

use super::{AbilitySlot, EntityId, Team, Tick, Vec2};

/// What a companion is currently doing.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CompanionOrder {
    /// Holding position.
    Idle,
    /// Travelling to a point; impact is a scheduled task, not a proximity check.
    Travelling { target: Vec2 },
    /// Returning to its owner.
    Returning,
}

/// Companion-specific state carried by a `EntityKind::Companion` entity.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CompanionState {
    pub ability: AbilityKind,
    pub order: CompanionOrder,
    /// Units per tick.
    pub speed: f32,
    pub leash: f32,
    /// Bumped on every new order so stale arrival tasks are ignored.
    pub order_seq: u32,
}

impl CompanionState {
    /// Issues a new order and returns its sequence token.
    pub fn command(&mut self, order: CompanionOrder) -> u32 {
        self.order = order;
        self.order_seq = self.order_seq.wrapping_add(1);
        self.order_seq
    }
}

/// Trap-specific state carried by a `EntityKind::Trap` entity.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrapState {
    pub ability: AbilityKind,
    pub slot: AbilitySlot,
    pub rank: u8,
    pub armed: bool,
    pub trigger_radius: f32,
    pub placed_at: Tick,
    pub expires_at: Tick,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProjectileId(pub u32);

impl fmt::Display for ProjectileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

/// A skillshot in flight. Advances every tick until it hits, exhausts its
/// range or strikes an obstacle.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Projectile {
    pub owner: EntityId,
    pub team: Team,
    pub ability: AbilityKind,
    pub slot: AbilitySlot,
    pub rank: u8,
    pub position: Vec2,
    /// Unit vector.
    pub direction: Vec2,
    /// Units per tick.
    pub speed: f32,
    pub width: f32,
    pub max_range: f32,
    pub traveled: f32,
    pub piercing: bool,
    pub hits: BTreeSet<EntityId>,
}

impl Projectile {
    pub fn is_spent(&self) -> bool {
        self.traveled >= self.max_range
    }

    /// Distance the projectile covers on its next step.
    pub fn next_step(&self) -> f32 {
        self.speed.min(self.max_range - self.traveled).max(0.0)
    }
}

/// Static circular terrain that stops projectiles.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Obstacle {
    pub center: Vec2,
    pub radius: f32,
}

impl Obstacle {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }

    pub fn contains(&self, point: Vec2) -> bool {
        self.center.distance(point) <= self.radius
    }
}
