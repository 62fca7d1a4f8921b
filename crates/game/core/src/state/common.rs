use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

/// Unique identifier for any entity tracked in the world.
///
/// Identifiers are allocated monotonically by [`crate::state::World`] and never
/// reused, so ordering by id is a stable, replayable ordering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityId(pub u32);

impl EntityId {
    /// Reserved identifier for effects without an attributable source
    /// (environment, map hazards).
    pub const SYSTEM: Self = Self(u32::MAX);

    #[inline]
    pub const fn is_system(self) -> bool {
        self.0 == Self::SYSTEM.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Simulation tick counter.
///
/// Every timer in the engine (cooldowns, effect durations, recast windows,
/// deferred tasks) is expressed in ticks, never in wall-clock time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Self = Self(0);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Ticks elapsed since `earlier`, saturating at zero.
    pub fn since(self, earlier: Tick) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl Add<u64> for Tick {
    type Output = Tick;
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Continuous 2D position or direction in world units.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn distance(self, other: Vec2) -> f32 {
        (other - self).length()
    }

    pub fn dot(self, other: Vec2) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// Angle of this vector in radians, in `(-π, π]`.
    pub fn angle(self) -> f32 {
        self.y.atan2(self.x)
    }

    /// Unit vector in the same direction, or `None` for a (near) zero vector.
    pub fn normalized(self) -> Option<Vec2> {
        let len = self.length();
        if len <= f32::EPSILON {
            None
        } else {
            Some(Vec2::new(self.x / len, self.y / len))
        }
    }

    /// Moves from `self` toward `target` by at most `max_step`.
    pub fn move_toward(self, target: Vec2, max_step: f32) -> Vec2 {
        let delta = target - self;
        let dist = delta.length();
        if dist <= max_step || dist <= f32::EPSILON {
            target
        } else {
            self + delta * (max_step / dist)
        }
    }

    /// Returns `target` if it lies within `range` of `self`, otherwise the point
    /// at `range` along the same direction.
    pub fn clamp_within(self, target: Vec2, range: f32) -> Vec2 {
        self.move_toward(target, range)
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

/// Team allegiance. Entities on the same team are allies.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Team {
    #[default]
    Blue,
    Red,
    /// Hostile to both teams (jungle monsters).
    Neutral,
}

impl Team {
    pub fn is_ally_of(self, other: Team) -> bool {
        self == other
    }

    pub fn is_enemy_of(self, other: Team) -> bool {
        self != other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_toward_stops_at_target() {
        let from = Vec2::new(0.0, 0.0);
        let to = Vec2::new(3.0, 4.0);

        assert_eq!(from.move_toward(to, 10.0), to);
        let halfway = from.move_toward(to, 2.5);
        assert!((halfway.x - 1.5).abs() < 1e-5);
        assert!((halfway.y - 2.0).abs() < 1e-5);
    }

    #[test]
    fn zero_vector_has_no_direction() {
        assert!(Vec2::ZERO.normalized().is_none());
        let unit = Vec2::new(0.0, -2.0).normalized().unwrap();
        assert_eq!(unit, Vec2::new(0.0, -1.0));
    }

    #[test]
    fn neutral_is_hostile_to_everyone() {
        assert!(Team::Neutral.is_enemy_of(Team::Blue));
        assert!(Team::Neutral.is_enemy_of(Team::Red));
        assert!(Team::Blue.is_ally_of(Team::Blue));
    }
}
