//! Snare trap: place a trap from a charge pool that replenishes on its own
//! schedule, independent of the cooldown.
//!
//! Traps arm after a delay, expire after their lifetime and are capped per
//! owner (placing past the cap removes the oldest). Triggering is handled by
//! the simulation step through [`detonate`].

use crate::ability::common::validate_point;
use crate::ability::{
    AbilityHandler, CastContext, Component, ExecutionResult, FailureReason, HandlerCapabilities,
    Validation,
};
use crate::catalogue::AbilityKind;
use crate::engine::{DeferredTask, TaskKind};
use crate::state::{Entity, EntityId, EntityKind, TrapState};
use crate::stats::BaseStats;

pub struct SnareTrapHandler;

const TRAP_RADIUS: f32 = 15.0;

/// Springs a trap: damages and applies effects to enemies inside its trigger
/// radius, then removes it. Runs in the context of the trap's ability.
pub fn detonate(ctx: &mut CastContext<'_>, trap: EntityId) {
    let Some((center, radius)) = ctx
        .world
        .get(trap)
        .and_then(|e| e.trap.map(|t| (e.position, t.trigger_radius)))
    else {
        return;
    };
    let damage = ctx.damage(1.0);
    for victim in ctx.enemies_around(center, radius) {
        ctx.strike(victim, damage);
        ctx.apply_effects(victim, None);
    }
    ctx.world.remove(trap);
}

/// Traps `owner` placed with `ability`, oldest first.
pub fn traps_of(ctx: &CastContext<'_>, owner: EntityId, ability: AbilityKind) -> Vec<EntityId> {
    let mut traps: Vec<_> = ctx
        .world
        .owned_by(owner)
        .into_iter()
        .filter_map(|id| {
            let trap = ctx.world.get(id)?.trap?;
            (trap.ability == ability).then_some((trap.placed_at, id))
        })
        .collect();
    traps.sort();
    traps.into_iter().map(|(_, id)| id).collect()
}

impl AbilityHandler for SnareTrapHandler {
    fn ability(&self) -> AbilityKind {
        AbilityKind::SnareTrap
    }

    fn capabilities(&self) -> HandlerCapabilities {
        HandlerCapabilities::DEFERRED
    }

    fn requires(&self) -> &'static [Component] {
        &[Component::Pool, Component::Trap]
    }

    fn validate(&self, ctx: &CastContext<'_>) -> Validation {
        let empty = ctx
            .slot_state()
            .and_then(|s| s.pool)
            .is_none_or(|pool| pool.is_empty());
        if empty {
            return Validation::fail(FailureReason::NoAmmo);
        }
        validate_point(ctx)
    }

    fn execute(&self, ctx: &mut CastContext<'_>) -> ExecutionResult {
        let Some(config) = ctx.definition.trap else {
            return ExecutionResult::failed();
        };
        let (Some(point), Some(origin)) = (ctx.params.target_point, ctx.caster_position()) else {
            return ExecutionResult::failed();
        };
        let consumed = ctx
            .slot_state_mut()
            .and_then(|s| s.pool.as_mut())
            .is_some_and(|pool| pool.consume());
        if !consumed {
            return ExecutionResult::failed();
        }

        let caster = ctx.params.caster;
        let existing = traps_of(ctx, caster, AbilityKind::SnareTrap);
        let excess = (existing.len() + 1).saturating_sub(usize::from(config.max_active));
        for old in existing.into_iter().take(excess) {
            ctx.world.remove(old);
        }

        let now = ctx.now();
        let position = if ctx.definition.range > 0.0 {
            origin.clamp_within(point, ctx.definition.range)
        } else {
            point
        };
        let stats = BaseStats {
            max_health: 1.0,
            max_mana: 0.0,
            ..BaseStats::default()
        };
        let mut trap = Entity::new(EntityKind::Trap, ctx.caster_team(), position, stats)
            .with_owner(caster)
            .with_radius(TRAP_RADIUS);
        trap.trap = Some(TrapState {
            ability: AbilityKind::SnareTrap,
            slot: ctx.params.slot,
            rank: ctx.params.rank,
            armed: false,
            trigger_radius: config.trigger_radius,
            placed_at: now,
            expires_at: now + ctx.ticks(config.lifetime_ms),
        });
        let id = ctx.world.insert(trap);

        let arm = ctx.task(TaskKind::Arm).anchor(id);
        ctx.schedule(ctx.ticks(config.arm_delay_ms), arm);
        ExecutionResult::success()
    }

    fn on_deferred(&self, task: &DeferredTask, ctx: &mut CastContext<'_>) {
        let Some(trap) = task.anchor else {
            return;
        };
        match task.kind {
            TaskKind::Arm => {
                if let Some(state) = ctx.world.get_mut(trap).and_then(|e| e.trap.as_mut()) {
                    state.armed = true;
                }
            }
            TaskKind::Resolve => detonate(ctx, trap),
            _ => {}
        }
    }
}
