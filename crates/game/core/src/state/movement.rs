//! Scripted displacement that overrides input-driven movement.

use std::collections::BTreeSet;

use crate::catalogue::AbilityKind;

use super::{AbilitySlot, EntityId, Vec2};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum MovementKind {
    Dash,
}

/// Routes contact with other entities to the handler that started the
/// movement. Movements without a tag never collide.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContactTag {
    pub ability: AbilityKind,
    pub slot: AbilitySlot,
    pub rank: u8,
    pub radius: f32,
}

/// At most one per entity. Cleared once `elapsed >= duration_ticks` or when a
/// per-tick guard (stun, root, death) stops it.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ForcedMovement {
    /// Unit vector.
    pub direction: Vec2,
    pub distance: f32,
    pub duration_ticks: u64,
    pub elapsed: u64,
    pub kind: MovementKind,
    /// Entities already struck; each is reported at most once.
    pub struck: BTreeSet<EntityId>,
    pub contact: Option<ContactTag>,
}

impl ForcedMovement {
    /// Dash from `from` toward `to`, covering at most `max_distance`.
    /// Returns `None` when the two points coincide.
    pub fn dash(from: Vec2, to: Vec2, max_distance: f32, duration_ticks: u64) -> Option<Self> {
        let delta = to - from;
        let direction = delta.normalized()?;
        Some(Self {
            direction,
            distance: delta.length().min(max_distance),
            duration_ticks: duration_ticks.max(1),
            elapsed: 0,
            kind: MovementKind::Dash,
            struck: BTreeSet::new(),
            contact: None,
        })
    }

    pub fn with_contact(mut self, contact: ContactTag) -> Self {
        self.contact = Some(contact);
        self
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration_ticks
    }

    /// Displacement for the next tick; advances `elapsed`.
    pub fn advance(&mut self) -> Vec2 {
        if self.is_finished() {
            return Vec2::ZERO;
        }
        self.elapsed += 1;
        self.direction * (self.distance / self.duration_ticks as f32)
    }

    /// Records a strike. Returns true only the first time for each entity.
    pub fn strike(&mut self, id: EntityId) -> bool {
        self.struck.insert(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dash_covers_distance_over_duration() {
        let mut dash =
            ForcedMovement::dash(Vec2::ZERO, Vec2::new(1000.0, 0.0), 300.0, 3).unwrap();
        let mut position = Vec2::ZERO;
        while !dash.is_finished() {
            position += dash.advance();
        }
        assert!((position.x - 300.0).abs() < 1e-3);
        assert_eq!(dash.advance(), Vec2::ZERO);
    }

    #[test]
    fn strike_is_recorded_once() {
        let mut dash = ForcedMovement::dash(Vec2::ZERO, Vec2::new(0.0, 1.0), 10.0, 1).unwrap();
        assert!(dash.strike(EntityId(4)));
        assert!(!dash.strike(EntityId(4)));
    }
}
