//! Companion orb: send a persistent owned orb to a point, recall it early.
//!
//! The first cast lazily creates the orb. Impact at the destination is a
//! scheduled `Arrival` task carrying the order sequence, so a recall issued
//! mid-flight makes the pending arrival stale. The recast window opens on
//! cast and recalls for free.

use crate::ability::{
    AbilityHandler, CastContext, Component, ExecutionResult, FailureReason, HandlerCapabilities,
    Validation,
};
use crate::catalogue::{AbilityKind, CompanionConfig};
use crate::engine::{DeferredTask, TaskKind};
use crate::state::{
    CompanionOrder, CompanionState, Entity, EntityId, EntityKind, RecastWindow, Vec2,
};
use crate::stats::BaseStats;

pub struct CompanionOrbHandler;

const ORB_HEALTH: f32 = 400.0;
const ORB_RADIUS: f32 = 20.0;

fn find_orb(ctx: &CastContext<'_>) -> Option<EntityId> {
    ctx.world
        .owned_by(ctx.params.caster)
        .into_iter()
        .find(|id| {
            ctx.world.get(*id).is_some_and(|e| {
                e.kind == EntityKind::Companion
                    && e.is_alive()
                    && e.companion
                        .is_some_and(|c| c.ability == AbilityKind::CompanionOrb)
            })
        })
}

fn spawn_orb(ctx: &mut CastContext<'_>, config: CompanionConfig) -> Option<EntityId> {
    let caster = ctx.caster()?;
    let stats = BaseStats {
        max_health: ORB_HEALTH,
        max_mana: 0.0,
        attack_damage: 0.0,
        move_speed: config.speed,
        ..BaseStats::default()
    };
    let mut orb = Entity::new(EntityKind::Companion, caster.team, caster.position, stats)
        .with_owner(caster.id)
        .with_radius(ORB_RADIUS);
    orb.companion = Some(CompanionState {
        ability: AbilityKind::CompanionOrb,
        order: CompanionOrder::Idle,
        speed: ctx.config.per_tick(config.speed),
        leash: config.leash,
        order_seq: 0,
    });
    Some(ctx.world.insert(orb))
}

/// Deals the ability's damage around `center`.
fn impact(ctx: &mut CastContext<'_>, center: Vec2, radius: f32) {
    let damage = ctx.damage(1.0);
    for target in ctx.enemies_around(center, radius) {
        ctx.strike(target, damage);
        ctx.apply_effects(target, None);
    }
}

impl AbilityHandler for CompanionOrbHandler {
    fn ability(&self) -> AbilityKind {
        AbilityKind::CompanionOrb
    }

    fn capabilities(&self) -> HandlerCapabilities {
        HandlerCapabilities::RECAST | HandlerCapabilities::DEFERRED
    }

    fn requires(&self) -> &'static [Component] {
        &[Component::Companion, Component::Recast, Component::Damage]
    }

    /// A cast while the recall window is still open but the orb is gone has
    /// nothing to command.
    fn validate(&self, ctx: &CastContext<'_>) -> Validation {
        let window_open = ctx.slot_state().is_some_and(|s| s.recast_open());
        if window_open && find_orb(ctx).is_none() {
            return Validation::fail(FailureReason::DependentObjectDestroyed);
        }
        Validation::ok()
    }

    fn execute(&self, ctx: &mut CastContext<'_>) -> ExecutionResult {
        let (Some(config), Some(recast)) = (ctx.definition.companion, ctx.definition.recast) else {
            return ExecutionResult::failed();
        };
        let (Some(target), Some(origin)) = (ctx.target_position(), ctx.caster_position()) else {
            return ExecutionResult::failed();
        };
        let destination = if ctx.definition.range > 0.0 {
            origin.clamp_within(target, ctx.definition.range)
        } else {
            target
        };

        let orb = match find_orb(ctx) {
            Some(orb) => orb,
            None => match spawn_orb(ctx, config) {
                Some(orb) => orb,
                None => return ExecutionResult::failed(),
            },
        };
        let Some(entity) = ctx.world.get_mut(orb) else {
            return ExecutionResult::failed();
        };
        let Some(state) = entity.companion.as_mut() else {
            return ExecutionResult::failed();
        };
        let token = state.command(CompanionOrder::Travelling {
            target: destination,
        });
        let speed = state.speed.max(f32::EPSILON);
        let travel = (entity.position.distance(destination) / speed).ceil() as u64;

        let arrival = ctx
            .task(TaskKind::Arrival)
            .anchor(orb)
            .at(destination)
            .token(token);
        ctx.schedule(travel.max(1), arrival);

        let window = RecastWindow::new(ctx.ticks(recast.window_ms), ctx.params.rank).anchored_to(orb);
        ExecutionResult::success().with_recast(window)
    }

    fn can_recast(&self, ctx: &CastContext<'_>) -> bool {
        ctx.slot_state().is_some_and(|s| s.recast_open()) && find_orb(ctx).is_some()
    }

    /// Recalls the orb toward its owner.
    fn execute_recast(&self, ctx: &mut CastContext<'_>) -> ExecutionResult {
        let Some(orb) = find_orb(ctx) else {
            return ExecutionResult::failed();
        };
        match ctx
            .world
            .get_mut(orb)
            .and_then(|entity| entity.companion.as_mut())
        {
            Some(state) => {
                state.command(CompanionOrder::Returning);
                ExecutionResult::free()
            }
            None => ExecutionResult::failed(),
        }
    }

    fn on_deferred(&self, task: &DeferredTask, ctx: &mut CastContext<'_>) {
        let Some(orb) = task.anchor else {
            return;
        };
        let Some(config) = ctx.definition.companion else {
            return;
        };
        let Some(entity) = ctx.world.get(orb) else {
            return;
        };
        let Some(state) = entity.companion else {
            return;
        };
        if !entity.is_alive() {
            return;
        }
        let position = entity.position;

        match task.kind {
            TaskKind::Arrival if state.order_seq == task.token => {
                impact(ctx, position, config.impact_radius);
                if let Some(state) = ctx.world.get_mut(orb).and_then(|e| e.companion.as_mut()) {
                    state.order = CompanionOrder::Idle;
                }
            }
            TaskKind::Resolve => {
                // Forced early: stop where it is and detonate.
                if let Some(state) = ctx.world.get_mut(orb).and_then(|e| e.companion.as_mut()) {
                    state.command(CompanionOrder::Idle);
                }
                impact(ctx, position, config.impact_radius);
            }
            _ => {}
        }
    }
}
