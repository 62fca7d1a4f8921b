//! Modifier application following the layered stack.
//!
//! Modifiers are grouped per stat into a [`ModifierStack`] which is applied to
//! the base value in a fixed order:
//! 1. Override (last applied wins, replaces the base entirely)
//! 2. Flat modifiers (summed, added to base)
//! 3. Percent modifiers (summed, then multiplied once)
//! 4. Clamp at zero

use super::snapshot::StatKind;
use crate::catalogue::AbilityKind;
use crate::state::EntityId;

/// How a modifier combines with the base value.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ModifierKind {
    /// Additive bonus applied to the base value.
    Flat,
    /// Fractional increase (0.25 = +25%), summed with other percents.
    Percent,
    /// Replaces the computed value (e.g. attack range while transformed).
    Override,
}

/// Who granted a modifier. Used to strip a transformation's modifiers when it
/// completes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModifierSource {
    pub entity: EntityId,
    pub ability: Option<AbilityKind>,
}

/// A single timed (or permanent) stat modifier owned by an entity.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatModifier {
    pub stat: StatKind,
    pub kind: ModifierKind,
    pub value: f32,
    /// Remaining ticks; `None` means permanent.
    pub remaining: Option<u64>,
    pub source: ModifierSource,
}

impl StatModifier {
    pub fn timed(
        stat: StatKind,
        kind: ModifierKind,
        value: f32,
        ticks: u64,
        source: ModifierSource,
    ) -> Self {
        Self {
            stat,
            kind,
            value,
            remaining: Some(ticks),
            source,
        }
    }

    /// Counts down one tick. Returns true once the modifier has expired.
    pub fn tick(&mut self) -> bool {
        match self.remaining.as_mut() {
            Some(remaining) => {
                *remaining = remaining.saturating_sub(1);
                *remaining == 0
            }
            None => false,
        }
    }
}

/// Accumulated modifiers for one stat.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ModifierStack {
    flat: f32,
    percent: f32,
    override_value: Option<f32>,
}

impl ModifierStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, kind: ModifierKind, value: f32) {
        match kind {
            ModifierKind::Flat => self.flat += value,
            ModifierKind::Percent => self.percent += value,
            ModifierKind::Override => self.override_value = Some(value),
        }
    }

    /// Applies the stack to `base`, never returning a negative value.
    pub fn apply(&self, base: f32) -> f32 {
        let value = match self.override_value {
            Some(value) => value,
            None => (base + self.flat) * (1.0 + self.percent),
        };
        value.max(0.0)
    }
}
