//! Warding barrier: shield one ally, or the caster when no target is given.

use crate::ability::common::validate_target;
use crate::ability::{AbilityHandler, CastContext, Component, ExecutionResult, Validation};
use crate::catalogue::{AbilityKind, TargetSide};

pub struct WardingBarrierHandler;

impl AbilityHandler for WardingBarrierHandler {
    fn ability(&self) -> AbilityKind {
        AbilityKind::WardingBarrier
    }

    fn requires(&self) -> &'static [Component] {
        &[Component::Shield]
    }

    fn validate(&self, ctx: &CastContext<'_>) -> Validation {
        validate_target(ctx)
    }

    fn execute(&self, ctx: &mut CastContext<'_>) -> ExecutionResult {
        let target = ctx.params.target_entity.unwrap_or(ctx.params.caster);
        let eligible = ctx
            .world
            .get(target)
            .is_some_and(|e| ctx.filter(TargetSide::Ally).eligible(e));
        if !eligible {
            return ExecutionResult::failed();
        }

        let amount = ctx.shield_amount(1.0);
        let duration = ctx.ticks(ctx.definition.shield_duration_ms);
        let source = ctx.params.caster;
        if let Some(entity) = ctx.world.get_mut(target) {
            entity.grant_shield(amount, duration, source);
        }
        ctx.apply_effects(target, None);
        ExecutionResult::success()
    }
}
