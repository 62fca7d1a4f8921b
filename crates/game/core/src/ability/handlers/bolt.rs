//! Piercing bolt: a line projectile that damages and marks every enemy it
//! passes through.

use crate::ability::common::launch_projectile;
use crate::ability::{
    AbilityHandler, CastContext, Component, ExecutionResult, HandlerCapabilities, HitContext,
};
use crate::catalogue::{AbilityKind, TargetSide};

pub struct PiercingBoltHandler;

impl AbilityHandler for PiercingBoltHandler {
    fn ability(&self) -> AbilityKind {
        AbilityKind::PiercingBolt
    }

    fn capabilities(&self) -> HandlerCapabilities {
        HandlerCapabilities::PROJECTILE_HIT
    }

    fn requires(&self) -> &'static [Component] {
        &[Component::Projectile, Component::Damage]
    }

    fn execute(&self, ctx: &mut CastContext<'_>) -> ExecutionResult {
        let Some(direction) = ctx.aim_direction() else {
            return ExecutionResult::failed();
        };
        let range = ctx.definition.range;
        match launch_projectile(ctx, direction, range) {
            Some(_) => ExecutionResult::success(),
            None => ExecutionResult::failed(),
        }
    }

    fn on_projectile_hit(&self, hit: &HitContext, ctx: &mut CastContext<'_>) {
        let Some(target) = hit.target else {
            return;
        };
        let hostile = ctx
            .world
            .get(target)
            .is_some_and(|e| ctx.filter(TargetSide::Enemy).eligible(e));
        if !hostile {
            return;
        }
        let damage = ctx.damage(1.0);
        ctx.strike(target, damage);
        ctx.apply_effects(target, None);
    }
}
