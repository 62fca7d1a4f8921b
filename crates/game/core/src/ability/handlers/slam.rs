//! Ground slam: damages every enemy around the caster; only those within the
//! inner half of the radius receive the slam's effects.

use crate::ability::{AbilityHandler, CastContext, Component, ExecutionResult};
use crate::catalogue::{AbilityKind, Shape};

pub struct GroundSlamHandler;

impl AbilityHandler for GroundSlamHandler {
    fn ability(&self) -> AbilityKind {
        AbilityKind::GroundSlam
    }

    fn requires(&self) -> &'static [Component] {
        &[Component::Damage]
    }

    fn execute(&self, ctx: &mut CastContext<'_>) -> ExecutionResult {
        let Shape::Circle { radius } = ctx.definition.shape else {
            return ExecutionResult::failed();
        };
        let Some(center) = ctx.caster_position() else {
            return ExecutionResult::failed();
        };
        let inner = radius / 2.0;
        let damage = ctx.damage(1.0);

        for target in ctx.enemies_around(center, radius) {
            let close = ctx
                .world
                .get(target)
                .is_some_and(|e| e.position.distance(center) <= inner + e.radius);
            ctx.strike(target, damage);
            if close {
                ctx.apply_effects(target, None);
            }
        }
        ExecutionResult::success()
    }
}
