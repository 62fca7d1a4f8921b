//! Building blocks shared by the generic executor and the handlers.

use crate::catalogue::{EffectId, Shape, TargetSide};
use crate::state::{ContactTag, EntityId, ForcedMovement, Projectile, ProjectileId, Vec2};

use super::{CastContext, FailureReason, Validation};

/// Slack added to range checks for the target's body.
fn reach(ctx: &CastContext<'_>, target: EntityId) -> f32 {
    ctx.definition.range + ctx.world.get(target).map(|e| e.radius).unwrap_or(0.0)
}

/// Checks an explicit target entity (side, liveness, mask) and range. Casts
/// without a target entity pass; missing input is handled at execution.
pub fn validate_target(ctx: &CastContext<'_>) -> Validation {
    let Some(target) = ctx.params.target_entity else {
        return Validation::ok();
    };
    let (Some(caster), Some(entity)) = (ctx.caster(), ctx.world.get(target)) else {
        return Validation::fail(FailureReason::InvalidTarget);
    };
    if !ctx.filter(ctx.definition.side).eligible(entity) {
        return Validation::fail(FailureReason::InvalidTarget);
    }
    if ctx.definition.range > 0.0 && caster.position.distance(entity.position) > reach(ctx, target)
    {
        return Validation::fail(FailureReason::OutOfRange);
    }
    Validation::ok()
}

/// Checks that an explicit target point is within range.
pub fn validate_point(ctx: &CastContext<'_>) -> Validation {
    match (ctx.params.target_point, ctx.caster_position()) {
        (Some(point), Some(origin))
            if ctx.definition.range > 0.0 && origin.distance(point) > ctx.definition.range =>
        {
            Validation::fail(FailureReason::OutOfRange)
        }
        _ => Validation::ok(),
    }
}

/// Entities inside the ability's shape, ascending id. `None` when the shape
/// needs input the cast did not supply.
pub fn resolve_area(ctx: &CastContext<'_>) -> Option<Vec<EntityId>> {
    let caster = ctx.caster()?;
    let origin = caster.position;
    let side = ctx.definition.side;
    let filter = ctx.filter(side);

    let targets = match ctx.definition.shape {
        Shape::SelfCast => vec![caster.id],
        Shape::Point => {
            let target = ctx.params.target_entity?;
            let entity = ctx.world.get(target)?;
            if filter.eligible(entity) {
                vec![target]
            } else {
                Vec::new()
            }
        }
        Shape::Circle { radius } => {
            let center = match (ctx.definition.range > 0.0, ctx.target_position()) {
                (true, Some(point)) => origin.clamp_within(point, ctx.definition.range),
                (true, None) => return None,
                (false, _) => origin,
            };
            filter.in_radius(ctx.world, center, radius)
        }
        Shape::Cone { angle } => {
            let direction = ctx.aim_direction()?;
            filter.in_cone(ctx.world, origin, direction, angle, ctx.definition.range)
        }
        Shape::Line { width } => {
            let direction = ctx.aim_direction()?;
            let end = origin + direction * ctx.definition.range;
            filter.in_line(ctx.world, origin, end, width)
        }
    };
    Some(targets)
}

/// Applies the ability's damage, heal, shield and effects to each target.
/// Damage only lands on enemies; heals and shields only on allies.
pub fn apply_payload(ctx: &mut CastContext<'_>, targets: &[EntityId], multiplier: f32) {
    let damage = ctx.damage(multiplier);
    let heal = ctx.heal_amount(multiplier);
    let shield = ctx.shield_amount(multiplier);
    let shield_ticks = ctx.ticks(ctx.definition.shield_duration_ms);
    let team = ctx.caster_team();
    let source = ctx.params.caster;

    for &target in targets {
        let Some(hostile) = ctx.world.get(target).map(|e| e.team.is_enemy_of(team)) else {
            continue;
        };
        if hostile {
            ctx.strike(target, damage);
        } else {
            ctx.restore(target, heal);
            if let Some(entity) = ctx.world.get_mut(target) {
                entity.grant_shield(shield, shield_ticks, source);
            }
        }
        ctx.apply_effects(target, None);
    }
}

/// Spawns the ability's projectile from the caster toward `direction`.
pub fn launch_projectile(
    ctx: &mut CastContext<'_>,
    direction: Vec2,
    range: f32,
) -> Option<ProjectileId> {
    let config = ctx.definition.projectile?;
    let caster = ctx.caster()?;
    let projectile = Projectile {
        owner: caster.id,
        team: caster.team,
        ability: ctx.params.ability,
        slot: ctx.params.slot,
        rank: ctx.params.rank,
        position: caster.position,
        direction: direction.normalized()?,
        speed: ctx.config.per_tick(config.speed),
        width: config.width,
        max_range: range,
        traveled: 0.0,
        piercing: config.piercing,
        hits: Default::default(),
    };
    Some(ctx.world.spawn_projectile(projectile))
}

/// Dash descriptor toward `point`, tagged for collisions when the ability's
/// handler listens for them.
pub fn dash_toward(ctx: &CastContext<'_>, point: Vec2, with_contact: bool) -> Option<ForcedMovement> {
    let dash = ctx.definition.dash?;
    let origin = ctx.caster_position()?;
    let movement = ForcedMovement::dash(
        origin,
        point,
        dash.distance,
        ctx.ticks(dash.duration_ms),
    )?;
    if !with_contact {
        return Some(movement);
    }
    Some(movement.with_contact(ContactTag {
        ability: ctx.params.ability,
        slot: ctx.params.slot,
        rank: ctx.params.rank,
        radius: dash.collision_radius,
    }))
}

/// True if any living enemy within `radius` of `center` carries `marker`.
pub fn enemy_marked_near(ctx: &CastContext<'_>, center: Vec2, radius: f32, marker: &EffectId) -> bool {
    ctx.filter(TargetSide::Enemy)
        .in_radius(ctx.world, center, radius)
        .into_iter()
        .filter_map(|id| ctx.world.get(id))
        .any(|e| e.has_effect(marker))
}
