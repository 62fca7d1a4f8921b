//! Timed effects held by an entity.
//!
//! Each [`ActiveEffect`] keeps a copy of its definition's category and
//! payload so that expiry, cleanse and stat queries never need the
//! catalogue. Insertion order is preserved; shield absorption walks effects
//! oldest first.

use arrayvec::ArrayVec;

use crate::catalogue::{
    CrowdControlKind, EffectCategory, EffectDefinition, EffectId, EffectPayload, OverTimeKind,
    StackBehavior,
};
use crate::config::GameConfig;
use crate::stats::{ModifierKind, StatKind};

use super::EntityId;

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActiveEffect {
    pub id: EffectId,
    pub category: EffectCategory,
    pub payload: EffectPayload,
    pub cleansable: bool,
    pub remaining: u64,
    pub stacks: u8,
    /// Remaining absorption for shield payloads.
    pub shield: Option<f32>,
    /// Entity credited with damage and healing this effect causes.
    pub source: EntityId,
    /// Ticks accumulated toward the next over-time interval.
    pub tick_progress: u64,
}

/// Result of applying an effect to an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplyOutcome {
    Added,
    Refreshed,
    Stacked(u8),
    /// Already at `max_stacks`; duration refreshed, count unchanged.
    AtCap,
    /// No room for another effect.
    Full,
}

/// One interval of an over-time effect, to be resolved by the world.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PeriodicTick {
    pub source: EntityId,
    pub kind: OverTimeKind,
    pub amount: f32,
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActiveEffects {
    effects: ArrayVec<ActiveEffect, { GameConfig::MAX_ACTIVE_EFFECTS }>,
}

impl ActiveEffects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies `def` per its stacking policy.
    pub fn apply(
        &mut self,
        def: &EffectDefinition,
        duration: u64,
        source: EntityId,
    ) -> ApplyOutcome {
        if let Some(existing) = self.effects.iter_mut().find(|e| e.id == def.id) {
            existing.remaining = duration;
            existing.source = source;
            existing.shield = shield_amount(&def.payload);
            return match def.stacking {
                StackBehavior::Refresh => ApplyOutcome::Refreshed,
                StackBehavior::Stack if existing.stacks >= def.max_stacks => ApplyOutcome::AtCap,
                StackBehavior::Stack => {
                    existing.stacks += 1;
                    ApplyOutcome::Stacked(existing.stacks)
                }
            };
        }

        if self.effects.is_full() {
            return ApplyOutcome::Full;
        }
        self.effects.push(ActiveEffect {
            id: def.id.clone(),
            category: def.category,
            payload: def.payload.clone(),
            cleansable: def.cleansable,
            remaining: duration,
            stacks: 1,
            shield: shield_amount(&def.payload),
            source,
            tick_progress: 0,
        });
        ApplyOutcome::Added
    }

    pub fn get(&self, id: &EffectId) -> Option<&ActiveEffect> {
        self.effects.iter().find(|e| &e.id == id)
    }

    pub fn has(&self, id: &EffectId) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActiveEffect> {
        self.effects.iter()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn remove(&mut self, id: &EffectId) -> bool {
        let before = self.effects.len();
        self.effects.retain(|e| &e.id != id);
        self.effects.len() != before
    }

    /// Removes every effect of `category`. When `respect_cleansable` is set,
    /// effects flagged as non-cleansable survive. Returns the removed ids.
    pub fn cleanse(&mut self, category: EffectCategory, respect_cleansable: bool) -> Vec<EffectId> {
        let mut removed = Vec::new();
        self.effects.retain(|e| {
            let strip = e.category == category && (e.cleansable || !respect_cleansable);
            if strip {
                removed.push(e.id.clone());
            }
            !strip
        });
        removed
    }

    pub fn has_crowd_control(&self, kind: CrowdControlKind) -> bool {
        self.effects.iter().any(|e| {
            matches!(e.payload, EffectPayload::CrowdControl { kind: held } if held == kind)
        })
    }

    /// Stat deltas contributed by stat payloads, multiplied by stacks.
    pub fn stat_modifiers(&self) -> impl Iterator<Item = (StatKind, ModifierKind, f32)> + '_ {
        self.effects.iter().filter_map(|e| match e.payload {
            EffectPayload::Stat { stat, kind, value } => {
                let value = match kind {
                    ModifierKind::Override => value,
                    _ => value * f32::from(e.stacks),
                };
                Some((stat, kind, value))
            }
            _ => None,
        })
    }

    /// Absorbs `amount` with shield effects, oldest first. Returns the amount
    /// left over. Depleted shield effects are removed.
    pub fn absorb(&mut self, mut amount: f32) -> f32 {
        for effect in self.effects.iter_mut() {
            if amount <= 0.0 {
                break;
            }
            if let Some(shield) = effect.shield.as_mut() {
                let taken = shield.min(amount);
                *shield -= taken;
                amount -= taken;
            }
        }
        self.effects
            .retain(|e| !matches!(e.shield, Some(left) if left <= 0.0));
        amount
    }

    /// Advances durations and over-time intervals by one tick, dropping
    /// expired effects. Intervals that complete on the expiring tick still
    /// fire.
    pub fn tick(&mut self, config: &GameConfig) -> Vec<PeriodicTick> {
        let mut periodic = Vec::new();
        for effect in self.effects.iter_mut() {
            if let EffectPayload::OverTime {
                value,
                interval_ms,
                kind,
            } = effect.payload
            {
                effect.tick_progress += 1;
                if effect.tick_progress >= config.ticks(interval_ms).max(1) {
                    effect.tick_progress = 0;
                    periodic.push(PeriodicTick {
                        source: effect.source,
                        kind,
                        amount: value * f32::from(effect.stacks),
                    });
                }
            }
            effect.remaining = effect.remaining.saturating_sub(1);
        }
        self.effects.retain(|e| e.remaining > 0);
        periodic
    }
}

fn shield_amount(payload: &EffectPayload) -> Option<f32> {
    match payload {
        EffectPayload::Shield { amount } => Some(*amount),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::DamageKind;

    fn effect(id: &str, stacking: StackBehavior, max_stacks: u8, payload: EffectPayload) -> EffectDefinition {
        EffectDefinition {
            id: EffectId::new(id),
            category: EffectCategory::Debuff,
            stacking,
            max_stacks,
            cleansable: true,
            duration_ms: 1000,
            payload,
        }
    }

    const SOURCE: EntityId = EntityId(7);

    #[test]
    fn refresh_replaces_duration() {
        let def = effect("root", StackBehavior::Refresh, 1, EffectPayload::CrowdControl {
            kind: CrowdControlKind::Root,
        });
        let mut effects = ActiveEffects::new();

        assert_eq!(effects.apply(&def, 30, SOURCE), ApplyOutcome::Added);
        effects.tick(&GameConfig::default());
        assert_eq!(effects.apply(&def, 10, SOURCE), ApplyOutcome::Refreshed);

        let held = effects.get(&def.id).unwrap();
        assert_eq!(held.remaining, 10);
        assert_eq!(held.stacks, 1);
    }

    #[test]
    fn stacks_cap_but_still_refresh() {
        let def = effect("sunder", StackBehavior::Stack, 2, EffectPayload::Stat {
            stat: StatKind::Armor,
            kind: ModifierKind::Flat,
            value: -5.0,
        });
        let mut effects = ActiveEffects::new();

        effects.apply(&def, 30, SOURCE);
        assert_eq!(effects.apply(&def, 30, SOURCE), ApplyOutcome::Stacked(2));
        effects.tick(&GameConfig::default());
        assert_eq!(effects.apply(&def, 30, SOURCE), ApplyOutcome::AtCap);

        let held = effects.get(&def.id).unwrap();
        assert_eq!(held.stacks, 2);
        assert_eq!(held.remaining, 30);
        let (_, _, value) = effects.stat_modifiers().next().unwrap();
        assert_eq!(value, -10.0);
    }

    #[test]
    fn over_time_fires_on_interval_and_expires() {
        let config = GameConfig::with_tick_rate(10);
        let def = effect("burn", StackBehavior::Refresh, 1, EffectPayload::OverTime {
            value: 4.0,
            interval_ms: 200,
            kind: OverTimeKind::Damage(DamageKind::Magic),
        });
        let mut effects = ActiveEffects::new();
        effects.apply(&def, 4, SOURCE);

        let fired: usize = (0..6).map(|_| effects.tick(&config).len()).sum();
        // Intervals complete on ticks 2 and 4; the effect is gone after tick 4.
        assert_eq!(fired, 2);
        assert!(effects.is_empty());
    }

    #[test]
    fn shields_absorb_oldest_first() {
        let small = effect("ward_a", StackBehavior::Refresh, 1, EffectPayload::Shield { amount: 30.0 });
        let large = effect("ward_b", StackBehavior::Refresh, 1, EffectPayload::Shield { amount: 100.0 });
        let mut effects = ActiveEffects::new();
        effects.apply(&small, 60, SOURCE);
        effects.apply(&large, 60, SOURCE);

        assert_eq!(effects.absorb(50.0), 0.0);
        assert!(!effects.has(&small.id));
        assert_eq!(effects.get(&large.id).unwrap().shield, Some(80.0));
        assert_eq!(effects.absorb(100.0), 20.0);
        assert!(effects.is_empty());
    }

    #[test]
    fn cleanse_can_ignore_cleansable_flag() {
        let mut pinned = effect("doom_mark", StackBehavior::Refresh, 1, EffectPayload::Marker);
        pinned.cleansable = false;
        let mut effects = ActiveEffects::new();
        effects.apply(&pinned, 60, SOURCE);

        assert!(effects.cleanse(EffectCategory::Debuff, true).is_empty());
        assert_eq!(
            effects.cleanse(EffectCategory::Debuff, false),
            vec![EffectId::new("doom_mark")]
        );
    }
}
