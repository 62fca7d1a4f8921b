//! Charged spear: hold to extend range, throw a skillshot, and dash to the
//! impact point during a short recast window.

use crate::ability::common::{dash_toward, launch_projectile};
use crate::ability::{
    AbilityHandler, CastContext, Component, ExecutionResult, HandlerCapabilities, HitContext,
};
use crate::catalogue::{AbilityKind, ChargeConfig};
use crate::config::GameConfig;
use crate::state::RecastWindow;

pub struct ChargedSpearHandler;

/// Range after holding for `held` ticks: linear between the configured
/// bounds, with the hold clamped to `[min_charge, max_charge]`.
pub fn charged_range(charge: &ChargeConfig, held: u64, config: &GameConfig) -> f32 {
    let min = config.ticks(charge.min_charge_ms);
    let max = config.ticks(charge.max_charge_ms).max(min);
    let held = held.clamp(min, max);
    let progress = if max == min {
        1.0
    } else {
        (held - min) as f32 / (max - min) as f32
    };
    charge.min_range + (charge.max_range - charge.min_range) * progress
}

impl AbilityHandler for ChargedSpearHandler {
    fn ability(&self) -> AbilityKind {
        AbilityKind::ChargedSpear
    }

    fn capabilities(&self) -> HandlerCapabilities {
        HandlerCapabilities::RECAST | HandlerCapabilities::PROJECTILE_HIT
    }

    fn requires(&self) -> &'static [Component] {
        &[
            Component::Charge,
            Component::Projectile,
            Component::Recast,
            Component::Dash,
            Component::Damage,
        ]
    }

    fn execute(&self, ctx: &mut CastContext<'_>) -> ExecutionResult {
        let Some(charge) = ctx.definition.charge else {
            return ExecutionResult::failed();
        };
        let Some(direction) = ctx.aim_direction() else {
            return ExecutionResult::failed();
        };
        let range = charged_range(&charge, ctx.params.charge_ticks, ctx.config);
        if let Some(caster) = ctx.caster_mut() {
            caster.facing = direction;
        }
        match launch_projectile(ctx, direction, range) {
            Some(_) => ExecutionResult::success(),
            None => ExecutionResult::failed(),
        }
    }

    /// Dashes to where the spear landed.
    fn execute_recast(&self, ctx: &mut CastContext<'_>) -> ExecutionResult {
        let Some(anchor) = ctx.slot_state().and_then(|s| s.recast.as_ref()).and_then(|w| w.anchor_point)
        else {
            return ExecutionResult::failed();
        };
        match dash_toward(ctx, anchor, false) {
            Some(movement) => ExecutionResult::free().with_movement(movement),
            None => ExecutionResult::failed(),
        }
    }

    /// Any impact, on a unit or on terrain, opens the dash window there.
    fn on_projectile_hit(&self, hit: &HitContext, ctx: &mut CastContext<'_>) {
        if let Some(target) = hit.target {
            let damage = ctx.damage(1.0);
            ctx.strike(target, damage);
            ctx.apply_effects(target, None);
        }
        let Some(recast) = ctx.definition.recast else {
            return;
        };
        let mut window =
            RecastWindow::new(ctx.ticks(recast.window_ms), ctx.params.rank).anchored_at(hit.position);
        if let Some(target) = hit.target {
            window = window.anchored_to(target).with_targets(vec![target]);
        }
        let slot = ctx.params.slot;
        if let Some(caster) = ctx.caster_mut() {
            caster.open_recast(slot, window);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_scales_linearly_and_clamps() {
        let config = GameConfig::with_tick_rate(10);
        let charge = ChargeConfig {
            min_charge_ms: 200,
            max_charge_ms: 1200,
            min_range: 400.0,
            max_range: 900.0,
        };
        // 2..=12 ticks of hold.
        assert_eq!(charged_range(&charge, 0, &config), 400.0);
        assert_eq!(charged_range(&charge, 7, &config), 650.0);
        assert_eq!(charged_range(&charge, 12, &config), 900.0);
        assert_eq!(charged_range(&charge, 500, &config), 900.0);
    }
}
