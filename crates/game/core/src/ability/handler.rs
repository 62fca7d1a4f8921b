//! The ability handler contract.
//!
//! A handler implements `execute` and whichever optional hooks its mechanic
//! needs. Optional hooks are announced through [`HandlerCapabilities`], which
//! the registry records once at registration; the engine consults the flags
//! instead of calling hooks speculatively.

use std::fmt;

use bitflags::bitflags;

use crate::catalogue::{AbilityDefinition, AbilityKind};
use crate::engine::DeferredTask;
use crate::state::{Channel, EntityId, ForcedMovement, ProjectileId, RecastWindow, Vec2};

use super::CastContext;

bitflags! {
    /// Optional hooks a handler implements.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct HandlerCapabilities: u8 {
        const RECAST         = 1 << 0;
        const PROJECTILE_HIT = 1 << 1;
        const DASH_COLLISION = 1 << 2;
        const COMPLETION     = 1 << 3;
        const DEFERRED       = 1 << 4;
    }
}

/// Why a cast was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum FailureReason {
    NotLearned,
    OnCooldown,
    InsufficientResource,
    InvalidTarget,
    OutOfRange,
    Silenced,
    Stunned,
    DependentObjectDestroyed,
    NoAmmo,
    Custom(&'static str),
}

impl FailureReason {
    /// A plain press on an ability that must be charged first.
    pub const HOLD_TO_CHARGE: Self = Self::Custom("hold_to_charge");
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom(reason) => f.write_str(reason),
            other => {
                let name: &'static str = other.into();
                f.write_str(name)
            }
        }
    }
}

/// Outcome of a handler's pre-cost legality check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Validation {
    pub valid: bool,
    pub reason: Option<FailureReason>,
}

impl Validation {
    pub const fn ok() -> Self {
        Self {
            valid: true,
            reason: None,
        }
    }

    pub const fn fail(reason: FailureReason) -> Self {
        Self {
            valid: false,
            reason: Some(reason),
        }
    }

    pub fn into_result(self) -> Result<(), FailureReason> {
        match (self.valid, self.reason) {
            (true, _) => Ok(()),
            (false, reason) => Err(reason.unwrap_or(FailureReason::Custom("rejected"))),
        }
    }
}

/// Outcome of `execute` / `execute_recast`.
///
/// `success: false` means nothing was charged: no mana, no cooldown.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExecutionResult {
    pub success: bool,
    pub skip_cooldown: bool,
    pub skip_resource_cost: bool,
    /// Replaces the catalogue cooldown, in ticks.
    pub cooldown_override: Option<u64>,
    /// Window persisted onto the caster's slot.
    pub recast: Option<RecastWindow>,
    /// Movement persisted onto the caster.
    pub forced_movement: Option<ForcedMovement>,
    /// Channel persisted onto the caster's slot.
    pub channel: Option<Channel>,
}

impl ExecutionResult {
    pub fn success() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    pub fn failed() -> Self {
        Self::default()
    }

    /// Succeeds without charging cooldown or cost.
    pub fn free() -> Self {
        Self {
            success: true,
            skip_cooldown: true,
            skip_resource_cost: true,
            ..Self::default()
        }
    }

    pub fn with_recast(mut self, window: RecastWindow) -> Self {
        self.recast = Some(window);
        self
    }

    pub fn with_movement(mut self, movement: ForcedMovement) -> Self {
        self.forced_movement = Some(movement);
        self
    }

    pub fn with_channel(mut self, channel: Channel) -> Self {
        self.channel = Some(channel);
        self
    }

    pub fn with_cooldown_override(mut self, ticks: u64) -> Self {
        self.cooldown_override = Some(ticks);
        self
    }
}

/// A projectile spawned by the handler's ability struck something.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitContext {
    pub projectile: ProjectileId,
    pub position: Vec2,
    /// `None` when the projectile hit an obstacle.
    pub target: Option<EntityId>,
}

impl HitContext {
    pub fn hit_obstacle(&self) -> bool {
        self.target.is_none()
    }
}

/// A forced movement started by the handler's ability newly overlapped an
/// entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CollisionContext {
    pub mover: EntityId,
    pub target: EntityId,
    pub position: Vec2,
}

/// Optional definition components a handler depends on; checked against the
/// catalogue at startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Component {
    Damage,
    Heal,
    Shield,
    Dash,
    Charge,
    Projectile,
    Recast,
    Trap,
    Pool,
    Transform,
    Aura,
    Companion,
    Channel,
    Refund,
}

impl Component {
    pub fn present_in(self, def: &AbilityDefinition) -> bool {
        match self {
            Self::Damage => def.damage.is_some(),
            Self::Heal => def.heal.is_some(),
            Self::Shield => def.shield.is_some(),
            Self::Dash => def.dash.is_some(),
            Self::Charge => def.charge.is_some(),
            Self::Projectile => def.projectile.is_some(),
            Self::Recast => def.recast.is_some(),
            Self::Trap => def.trap.is_some(),
            Self::Pool => def.pool.is_some(),
            Self::Transform => def.transform.is_some(),
            Self::Aura => def.aura.is_some(),
            Self::Companion => def.companion.is_some(),
            Self::Channel => def.channel.is_some(),
            Self::Refund => def.refund.is_some(),
        }
    }
}

/// Behavior of one ability with non-default mechanics.
///
/// Handlers are stateless; everything they remember lives on entities, in
/// world objects or in deferred tasks. They never panic: every failure path
/// is a [`Validation`] or an unsuccessful [`ExecutionResult`].
pub trait AbilityHandler: Send + Sync {
    fn ability(&self) -> AbilityKind;

    /// Optional hooks this handler implements.
    fn capabilities(&self) -> HandlerCapabilities {
        HandlerCapabilities::empty()
    }

    /// Definition components this handler reads.
    fn requires(&self) -> &'static [Component] {
        &[]
    }

    /// Ability-specific preconditions, checked before cooldown and cost.
    fn validate(&self, _ctx: &CastContext<'_>) -> Validation {
        Validation::ok()
    }

    fn execute(&self, ctx: &mut CastContext<'_>) -> ExecutionResult;

    /// Whether the caster's open window may be used right now.
    fn can_recast(&self, ctx: &CastContext<'_>) -> bool {
        ctx.slot_state().is_some_and(|state| state.recast_open())
    }

    fn execute_recast(&self, _ctx: &mut CastContext<'_>) -> ExecutionResult {
        ExecutionResult::failed()
    }

    fn on_projectile_hit(&self, _hit: &HitContext, _ctx: &mut CastContext<'_>) {}

    fn on_dash_collision(&self, _collision: &CollisionContext, _ctx: &mut CastContext<'_>) {}

    fn on_complete(&self, _ctx: &mut CastContext<'_>) {}

    fn on_deferred(&self, _task: &DeferredTask, _ctx: &mut CastContext<'_>) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_reasons_render_snake_case() {
        assert_eq!(FailureReason::NoAmmo.to_string(), "no_ammo");
        assert_eq!(
            FailureReason::DependentObjectDestroyed.to_string(),
            "dependent_object_destroyed"
        );
        assert_eq!(FailureReason::Custom("no_anchor").to_string(), "no_anchor");
    }

    #[test]
    fn invalid_validation_always_has_a_reason() {
        let bare = Validation {
            valid: false,
            reason: None,
        };
        assert!(bare.into_result().is_err());
        assert_eq!(
            Validation::fail(FailureReason::OutOfRange).into_result(),
            Err(FailureReason::OutOfRange)
        );
    }
}
