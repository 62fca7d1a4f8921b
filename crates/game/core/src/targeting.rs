//! Targeting resolver: pure geometry plus ally/enemy selection over the world.
//!
//! Every selection returns ids in ascending order so multi-target
//! application is deterministic.

use std::f32::consts::{PI, TAU};

use crate::catalogue::{TargetMask, TargetSide};
use crate::state::{Entity, EntityId, Team, Vec2, World};

/// True if `point` lies within `radius` of `center`.
pub fn in_circle(center: Vec2, radius: f32, point: Vec2) -> bool {
    center.distance(point) <= radius
}

/// Wraps an angle into `(-π, π]`.
pub fn normalize_angle(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI { wrapped + TAU } else { wrapped }
}

/// Cone containment.
///
/// False beyond `max_range`; otherwise true iff the angle between `direction`
/// and `point - origin` is at most `full_angle / 2`, boundary included. The
/// origin itself is always inside.
pub fn in_cone(origin: Vec2, direction: Vec2, full_angle: f32, max_range: f32, point: Vec2) -> bool {
    let offset = point - origin;
    if offset.length() > max_range {
        return false;
    }
    if offset.normalized().is_none() {
        return true;
    }
    let diff = normalize_angle(offset.angle() - direction.angle()).abs();
    diff <= full_angle / 2.0 + ANGLE_EPSILON
}

/// Absorbs float noise so a point placed exactly on the edge counts.
const ANGLE_EPSILON: f32 = 1e-5;

/// Distance from `point` to the segment `a..b`.
pub fn distance_to_segment(a: Vec2, b: Vec2, point: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.dot(ab);
    if len_sq <= f32::EPSILON {
        return a.distance(point);
    }
    let t = ((point - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    (a + ab * t).distance(point)
}

/// Line containment: within `half_width + target_radius` of the segment.
pub fn in_skillshot(start: Vec2, end: Vec2, half_width: f32, target_radius: f32, point: Vec2) -> bool {
    distance_to_segment(start, end, point) <= half_width + target_radius
}

/// Distance along a path from `start` in unit `direction` at which it first
/// touches the circle, if within `length`. Zero when `start` is already
/// inside.
pub fn segment_circle_entry(
    start: Vec2,
    direction: Vec2,
    length: f32,
    center: Vec2,
    radius: f32,
) -> Option<f32> {
    let offset = start - center;
    let c = offset.dot(offset) - radius * radius;
    if c <= 0.0 {
        return Some(0.0);
    }
    let b = offset.dot(direction);
    let discriminant = b * b - c;
    if b > 0.0 || discriminant < 0.0 {
        return None;
    }
    let t = -b - discriminant.sqrt();
    (t <= length).then_some(t.max(0.0))
}

/// Side, liveness and entity-kind filter relative to a caster's team.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetFilter {
    pub team: Team,
    pub side: TargetSide,
    pub mask: TargetMask,
}

impl TargetFilter {
    pub fn new(team: Team, side: TargetSide, mask: TargetMask) -> Self {
        Self { team, side, mask }
    }

    pub fn enemies(team: Team, mask: TargetMask) -> Self {
        Self::new(team, TargetSide::Enemy, mask)
    }

    pub fn allies(team: Team, mask: TargetMask) -> Self {
        Self::new(team, TargetSide::Ally, mask)
    }

    /// Dead entities are never eligible.
    pub fn eligible(&self, entity: &Entity) -> bool {
        let side_ok = match self.side {
            TargetSide::Ally => entity.team.is_ally_of(self.team),
            TargetSide::Enemy => entity.team.is_enemy_of(self.team),
        };
        side_ok && entity.is_alive() && self.mask.allows(entity.kind)
    }

    pub fn in_radius(&self, world: &World, center: Vec2, radius: f32) -> Vec<EntityId> {
        world
            .entities_in_radius(center, radius)
            .into_iter()
            .filter(|id| world.get(*id).is_some_and(|e| self.eligible(e)))
            .collect()
    }

    pub fn in_cone(
        &self,
        world: &World,
        origin: Vec2,
        direction: Vec2,
        full_angle: f32,
        range: f32,
    ) -> Vec<EntityId> {
        world
            .entities()
            .filter(|e| self.eligible(e))
            .filter(|e| in_cone(origin, direction, full_angle, range, e.position))
            .map(|e| e.id)
            .collect()
    }

    pub fn in_line(&self, world: &World, start: Vec2, end: Vec2, width: f32) -> Vec<EntityId> {
        world
            .entities()
            .filter(|e| self.eligible(e))
            .filter(|e| in_skillshot(start, end, width / 2.0, e.radius, e.position))
            .map(|e| e.id)
            .collect()
    }
}

pub fn enemies_in_radius(
    world: &World,
    team: Team,
    center: Vec2,
    radius: f32,
    mask: TargetMask,
) -> Vec<EntityId> {
    TargetFilter::enemies(team, mask).in_radius(world, center, radius)
}

pub fn allies_in_radius(
    world: &World,
    team: Team,
    center: Vec2,
    radius: f32,
    mask: TargetMask,
) -> Vec<EntityId> {
    TargetFilter::allies(team, mask).in_radius(world, center, radius)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::EntityKind;
    use crate::stats::BaseStats;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn cone_excludes_points_past_range() {
        let dir = Vec2::new(1.0, 0.0);
        assert!(!in_cone(Vec2::ZERO, dir, PI, 100.0, Vec2::new(100.5, 0.0)));
        assert!(in_cone(Vec2::ZERO, dir, PI, 100.0, Vec2::new(100.0, 0.0)));
        // Even a full circle does not reach past range.
        assert!(!in_cone(Vec2::ZERO, dir, TAU, 100.0, Vec2::new(-150.0, 0.0)));
    }

    #[test]
    fn cone_includes_half_angle_boundary() {
        // 90° cone: boundary at ±45°.
        let dir = Vec2::new(1.0, 0.0);
        let edge = Vec2::new(50.0, 50.0);
        assert!(in_cone(Vec2::ZERO, dir, FRAC_PI_2, 200.0, edge));
        assert!(in_cone(Vec2::ZERO, dir, FRAC_PI_2, 200.0, Vec2::new(50.0, -50.0)));
        assert!(!in_cone(Vec2::ZERO, dir, FRAC_PI_2, 200.0, Vec2::new(49.0, 51.0)));
    }

    #[test]
    fn cone_wraps_across_pi() {
        // Facing -x; a point just below the -x axis is a tiny angle away.
        let dir = Vec2::new(-1.0, 0.0001);
        assert!(in_cone(Vec2::ZERO, dir, 0.2, 100.0, Vec2::new(-50.0, -1.0)));
    }

    #[test]
    fn normalize_angle_range() {
        assert!((normalize_angle(3.0 * PI) - PI).abs() < 1e-5);
        assert!((normalize_angle(-PI) - PI).abs() < 1e-5);
        assert!((normalize_angle(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn skillshot_accounts_for_target_radius() {
        let start = Vec2::ZERO;
        let end = Vec2::new(500.0, 0.0);
        assert!(in_skillshot(start, end, 30.0, 35.0, Vec2::new(250.0, 64.0)));
        assert!(!in_skillshot(start, end, 30.0, 35.0, Vec2::new(250.0, 66.0)));
        assert!(!in_skillshot(start, end, 30.0, 0.0, Vec2::new(600.0, 0.0)));
    }

    #[test]
    fn path_enters_circle_at_first_contact() {
        let dir = Vec2::new(1.0, 0.0);
        let center = Vec2::new(100.0, 0.0);
        let t = segment_circle_entry(Vec2::ZERO, dir, 200.0, center, 20.0).unwrap();
        assert!((t - 80.0).abs() < 1e-3);
        // Too short to reach, or pointing away.
        assert!(segment_circle_entry(Vec2::ZERO, dir, 50.0, center, 20.0).is_none());
        assert!(segment_circle_entry(Vec2::ZERO, -dir, 500.0, center, 20.0).is_none());
        // Passing beside it.
        assert!(segment_circle_entry(Vec2::new(0.0, 30.0), dir, 500.0, center, 20.0).is_none());
        assert_eq!(segment_circle_entry(center, dir, 10.0, center, 20.0), Some(0.0));
    }

    #[test]
    fn selection_skips_dead_allies_and_masked_kinds() {
        let mut world = World::new();
        let base = BaseStats::default();
        let caster = world.insert(Entity::new(EntityKind::Champion, Team::Blue, Vec2::ZERO, base));
        let enemy = world.insert(Entity::new(EntityKind::Champion, Team::Red, Vec2::new(50.0, 0.0), base));
        let dead = world.insert(Entity::new(EntityKind::Minion, Team::Red, Vec2::new(60.0, 0.0), base));
        let _tower = world.insert(Entity::new(EntityKind::Structure, Team::Red, Vec2::new(70.0, 0.0), base));
        let neutral = world.insert(Entity::new(EntityKind::Monster, Team::Neutral, Vec2::new(80.0, 0.0), base));
        world.deal_damage(caster, dead, 10_000.0, crate::catalogue::DamageKind::True);

        let picked = enemies_in_radius(&world, Team::Blue, Vec2::ZERO, 200.0, TargetMask::UNITS);
        assert_eq!(picked, vec![enemy, neutral]);

        let allies = allies_in_radius(&world, Team::Blue, Vec2::ZERO, 200.0, TargetMask::UNITS);
        assert_eq!(allies, vec![caster]);
    }
}
