//! Sanctuary: heal every living ally around the caster, caster included, and
//! strip every debuff from them whether or not it is cleansable.

use crate::ability::{AbilityHandler, CastContext, Component, ExecutionResult};
use crate::catalogue::{AbilityKind, EffectCategory, Shape};

pub struct SanctuaryHandler;

impl AbilityHandler for SanctuaryHandler {
    fn ability(&self) -> AbilityKind {
        AbilityKind::Sanctuary
    }

    fn requires(&self) -> &'static [Component] {
        &[Component::Heal]
    }

    fn execute(&self, ctx: &mut CastContext<'_>) -> ExecutionResult {
        let Some(center) = ctx.caster_position() else {
            return ExecutionResult::failed();
        };
        let radius = match ctx.definition.shape {
            Shape::Circle { radius } => radius,
            _ => ctx.definition.range,
        };
        let heal = ctx.heal_amount(1.0);

        for ally in ctx.allies_around(center, radius) {
            ctx.restore(ally, heal);
            if let Some(entity) = ctx.world.get_mut(ally) {
                entity.cleanse(EffectCategory::Debuff, false);
            }
            ctx.apply_effects(ally, Some(EffectCategory::Buff));
        }
        ExecutionResult::success()
    }
}
