//! Siphon: channel on an enemy; if the channel runs its full course, drain
//! the target and heal the caster for the health taken.
//!
//! Interruption (stun, silence, death of either side) is a per-tick guard in
//! the simulation step that clears the channel without completion.

use crate::ability::common::validate_target;
use crate::ability::{
    AbilityHandler, CastContext, Component, ExecutionResult, HandlerCapabilities, Validation,
};
use crate::catalogue::{AbilityKind, TargetSide};
use crate::state::Channel;

pub struct SiphonHandler;

impl AbilityHandler for SiphonHandler {
    fn ability(&self) -> AbilityKind {
        AbilityKind::Siphon
    }

    fn capabilities(&self) -> HandlerCapabilities {
        HandlerCapabilities::COMPLETION
    }

    fn requires(&self) -> &'static [Component] {
        &[Component::Channel, Component::Damage]
    }

    fn validate(&self, ctx: &CastContext<'_>) -> Validation {
        validate_target(ctx)
    }

    /// Without a target entity there is nothing to channel on.
    fn execute(&self, ctx: &mut CastContext<'_>) -> ExecutionResult {
        let (Some(channel), Some(target)) = (ctx.definition.channel, ctx.params.target_entity)
        else {
            return ExecutionResult::failed();
        };
        ExecutionResult::success().with_channel(Channel {
            remaining: ctx.ticks(channel.duration_ms).max(1),
            rank: ctx.params.rank,
            target_entity: Some(target),
            target_point: None,
        })
    }

    fn on_complete(&self, ctx: &mut CastContext<'_>) {
        let Some(target) = ctx.params.target_entity else {
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
        let drained = ctx.strike(target, damage).map(|o| o.dealt).unwrap_or(0.0);
        let bonus = ctx.heal_amount(1.0);
        let caster = ctx.params.caster;
        ctx.restore(caster, drained + bonus);
        ctx.apply_effects(target, None);
    }
}
