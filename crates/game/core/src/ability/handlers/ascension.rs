//! Ascension: a timed transformation.
//!
//! On cast the caster gains the configured timed stat modifiers and an
//! attack-range override, a one-time stack bonus, and a damage aura that
//! pulses on its own schedule. Every other live object the caster owns is
//! forced to resolve immediately (a `Resolve` task due this tick, routed to
//! the object's own ability). A `Complete` task ends the transformation.

use crate::ability::{
    AbilityHandler, CastContext, Component, ExecutionResult, HandlerCapabilities,
};
use crate::catalogue::AbilityKind;
use crate::engine::{DeferredTask, TaskKind};
use crate::state::EntityId;
use crate::stats::{ModifierKind, ModifierSource, StatKind, StatModifier};

pub struct AscensionHandler;

/// `(object, its ability)` for every live object `owner` owns.
fn owned_objects(ctx: &CastContext<'_>, owner: EntityId) -> Vec<(EntityId, AbilityKind)> {
    ctx.world
        .owned_by(owner)
        .into_iter()
        .filter_map(|id| {
            let entity = ctx.world.get(id)?;
            if !entity.is_alive() {
                return None;
            }
            let ability = entity
                .companion
                .map(|c| c.ability)
                .or(entity.trap.map(|t| t.ability))?;
            Some((id, ability))
        })
        .collect()
}

impl AbilityHandler for AscensionHandler {
    fn ability(&self) -> AbilityKind {
        AbilityKind::Ascension
    }

    fn capabilities(&self) -> HandlerCapabilities {
        HandlerCapabilities::DEFERRED | HandlerCapabilities::COMPLETION
    }

    fn requires(&self) -> &'static [Component] {
        &[Component::Transform, Component::Aura, Component::Damage]
    }

    fn execute(&self, ctx: &mut CastContext<'_>) -> ExecutionResult {
        let (Some(transform), Some(aura)) =
            (ctx.definition.transform.as_ref(), ctx.definition.aura)
        else {
            return ExecutionResult::failed();
        };
        let caster = ctx.params.caster;
        let duration = ctx.ticks(transform.duration_ms).max(1);
        let source = ModifierSource {
            entity: caster,
            ability: Some(AbilityKind::Ascension),
        };

        let Some(entity) = ctx.world.get_mut(caster) else {
            return ExecutionResult::failed();
        };
        for modifier in &transform.modifiers {
            entity.add_modifier(StatModifier::timed(
                modifier.stat,
                modifier.kind,
                modifier.value,
                duration,
                source,
            ));
        }
        if let Some(range) = transform.attack_range {
            entity.add_modifier(StatModifier::timed(
                StatKind::AttackRange,
                ModifierKind::Override,
                range,
                duration,
                source,
            ));
        }
        entity.add_stacks(transform.stack_bonus);

        for (object, ability) in owned_objects(ctx, caster) {
            let Some(slot) = ctx.caster().and_then(|c| c.slot_of(ability)) else {
                continue;
            };
            let rank = ctx
                .caster()
                .and_then(|c| c.ability(slot))
                .map(|s| s.rank)
                .unwrap_or(0);
            let task = DeferredTask::new(ability, slot, caster, rank, TaskKind::Resolve).anchor(object);
            ctx.schedule(0, task);
        }

        let interval = ctx.ticks(aura.interval_ms).max(1);
        let pulses = duration / interval;
        if pulses > 0 {
            let pulse = ctx
                .task(TaskKind::Pulse)
                .repeating(u32::try_from(pulses - 1).unwrap_or(u32::MAX), interval);
            ctx.schedule(interval, pulse);
        }
        let complete = ctx.task(TaskKind::Complete);
        ctx.schedule(duration, complete);

        ExecutionResult::success()
    }

    fn on_deferred(&self, task: &DeferredTask, ctx: &mut CastContext<'_>) {
        if task.kind != TaskKind::Pulse {
            return;
        }
        let Some(aura) = ctx.definition.aura else {
            return;
        };
        let Some(center) = ctx.caster().filter(|c| c.is_alive()).map(|c| c.position) else {
            return;
        };
        let damage = ctx.damage(aura.damage_ratio);
        for target in ctx.enemies_around(center, aura.radius) {
            ctx.strike(target, damage);
        }
    }

    /// Strips whatever the transformation granted and drops pulses that
    /// would land after it ended.
    fn on_complete(&self, ctx: &mut CastContext<'_>) {
        let caster = ctx.params.caster;
        let now = ctx.now();
        if let Some(entity) = ctx.caster_mut() {
            entity.remove_modifiers_from(AbilityKind::Ascension);
        }
        ctx.deferred.cancel_where(|task| {
            task.caster == caster
                && task.ability == AbilityKind::Ascension
                && task.kind == TaskKind::Pulse
                && task.due > now
        });
    }
}
