//! Blitz dash: buff the caster at once, debuff whatever the dash runs
//! through, and refund the cooldown when a marked enemy is nearby.

use crate::ability::common::{dash_toward, enemy_marked_near};
use crate::ability::{
    AbilityHandler, CastContext, CollisionContext, Component, ExecutionResult, FailureReason,
    HandlerCapabilities, Validation,
};
use crate::catalogue::{AbilityKind, EffectCategory, TargetSide};

pub struct BlitzDashHandler;

impl AbilityHandler for BlitzDashHandler {
    fn ability(&self) -> AbilityKind {
        AbilityKind::BlitzDash
    }

    fn capabilities(&self) -> HandlerCapabilities {
        HandlerCapabilities::DASH_COLLISION
    }

    fn requires(&self) -> &'static [Component] {
        &[Component::Dash]
    }

    fn validate(&self, ctx: &CastContext<'_>) -> Validation {
        if ctx.caster().is_some_and(|c| c.is_rooted()) {
            return Validation::fail(FailureReason::Custom("rooted"));
        }
        Validation::ok()
    }

    fn execute(&self, ctx: &mut CastContext<'_>) -> ExecutionResult {
        let (Some(dash), Some(caster)) = (ctx.definition.dash, ctx.caster()) else {
            return ExecutionResult::failed();
        };
        let origin = caster.position;
        let caster_id = caster.id;
        let destination = ctx
            .target_position()
            .unwrap_or(origin + caster.facing * dash.distance);
        let Some(movement) = dash_toward(ctx, destination, true) else {
            return ExecutionResult::failed();
        };

        // Buffs land on cast; debuffs wait for contact.
        ctx.apply_effects(caster_id, Some(EffectCategory::Buff));
        if let Some(caster) = ctx.caster_mut() {
            caster.facing = movement.direction;
        }

        let mut result = ExecutionResult::success().with_movement(movement);
        if let Some(refund) = ctx.definition.refund.as_ref() {
            let radius = refund.radius.unwrap_or(ctx.config.refund_scan_radius);
            if enemy_marked_near(ctx, origin, radius, &refund.marker) {
                result = result.with_cooldown_override(0);
            }
        }
        result
    }

    fn on_dash_collision(&self, collision: &CollisionContext, ctx: &mut CastContext<'_>) {
        let hostile = ctx
            .world
            .get(collision.target)
            .is_some_and(|e| ctx.filter(TargetSide::Enemy).eligible(e));
        if !hostile {
            return;
        }
        let damage = ctx.damage(1.0);
        ctx.strike(collision.target, damage);
        ctx.apply_effects(collision.target, Some(EffectCategory::Debuff));
    }
}
