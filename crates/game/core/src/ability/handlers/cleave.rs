//! Cleaving arc: cone strike in front of the caster. Enemies already at the
//! arc's maximum sunder stacks take amplified damage before the new
//! application.

use crate::ability::{AbilityHandler, CastContext, Component, ExecutionResult};
use crate::catalogue::{AbilityKind, Shape, TargetSide};

pub struct CleavingArcHandler;

const SHATTER_MULTIPLIER: f32 = 1.5;

impl AbilityHandler for CleavingArcHandler {
    fn ability(&self) -> AbilityKind {
        AbilityKind::CleavingArc
    }

    fn requires(&self) -> &'static [Component] {
        &[Component::Damage]
    }

    fn execute(&self, ctx: &mut CastContext<'_>) -> ExecutionResult {
        let Shape::Cone { angle } = ctx.definition.shape else {
            return ExecutionResult::failed();
        };
        let (Some(origin), Some(direction)) = (ctx.caster_position(), ctx.aim_direction()) else {
            return ExecutionResult::failed();
        };
        if let Some(caster) = ctx.caster_mut() {
            caster.facing = direction;
        }

        let sunder = ctx
            .definition
            .effects
            .first()
            .and_then(|app| ctx.effect(&app.effect));
        let targets = ctx.filter(TargetSide::Enemy).in_cone(
            ctx.world,
            origin,
            direction,
            angle,
            ctx.definition.range,
        );

        for target in targets {
            let shattered = sunder.is_some_and(|def| {
                ctx.world
                    .get(target)
                    .and_then(|e| e.effects().get(&def.id))
                    .is_some_and(|held| held.stacks >= def.max_stacks)
            });
            let multiplier = if shattered { SHATTER_MULTIPLIER } else { 1.0 };
            let damage = ctx.damage(multiplier);
            ctx.strike(target, damage);
            ctx.apply_effects(target, None);
        }
        ExecutionResult::success()
    }
}
