//! StatsSnapshot - complete stat snapshot at a point in time.
//!
//! A snapshot is computed from the stored base stats plus every active
//! modifier. Handlers take one snapshot per calculation so a buff applied
//! mid-cast never changes the numbers of the cast that applied it.

use super::bonus::{ModifierKind, ModifierStack};

/// Stats that modifiers and stat effects can target.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum StatKind {
    MaxHealth,
    MaxMana,
    AttackDamage,
    AbilityPower,
    Armor,
    MagicResist,
    MoveSpeed,
    AttackRange,
}

/// Archetype base stats (stored, SSOT).
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BaseStats {
    pub max_health: f32,
    pub max_mana: f32,
    pub attack_damage: f32,
    pub ability_power: f32,
    pub armor: f32,
    pub magic_resist: f32,
    pub move_speed: f32,
    pub attack_range: f32,
}

impl BaseStats {
    pub fn get(&self, stat: StatKind) -> f32 {
        match stat {
            StatKind::MaxHealth => self.max_health,
            StatKind::MaxMana => self.max_mana,
            StatKind::AttackDamage => self.attack_damage,
            StatKind::AbilityPower => self.ability_power,
            StatKind::Armor => self.armor,
            StatKind::MagicResist => self.magic_resist,
            StatKind::MoveSpeed => self.move_speed,
            StatKind::AttackRange => self.attack_range,
        }
    }
}

impl Default for BaseStats {
    fn default() -> Self {
        Self {
            max_health: 600.0,
            max_mana: 300.0,
            attack_damage: 60.0,
            ability_power: 0.0,
            armor: 30.0,
            magic_resist: 30.0,
            move_speed: 340.0,
            attack_range: 125.0,
        }
    }
}

/// Effective stats after all modifiers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StatsSnapshot {
    /// Base max health before modifiers; bonus health is measured against it.
    pub base_health: f32,
    pub max_health: f32,
    pub max_mana: f32,
    pub attack_damage: f32,
    pub ability_power: f32,
    pub armor: f32,
    pub magic_resist: f32,
    pub move_speed: f32,
    pub attack_range: f32,
}

impl StatsSnapshot {
    /// Computes a snapshot from base stats and `(stat, kind, value)` triples.
    pub fn compute<I>(base: &BaseStats, modifiers: I) -> Self
    where
        I: IntoIterator<Item = (StatKind, ModifierKind, f32)>,
    {
        let mut stacks = [ModifierStack::new(); 8];
        for (stat, kind, value) in modifiers {
            stacks[stat as usize].add(kind, value);
        }
        let eff = |stat: StatKind| stacks[stat as usize].apply(base.get(stat));

        Self {
            base_health: base.max_health,
            max_health: eff(StatKind::MaxHealth),
            max_mana: eff(StatKind::MaxMana),
            attack_damage: eff(StatKind::AttackDamage),
            ability_power: eff(StatKind::AbilityPower),
            armor: eff(StatKind::Armor),
            magic_resist: eff(StatKind::MagicResist),
            move_speed: eff(StatKind::MoveSpeed),
            attack_range: eff(StatKind::AttackRange),
        }
    }

    pub fn from_base(base: &BaseStats) -> Self {
        Self::compute(base, core::iter::empty())
    }

    /// Health granted by modifiers on top of the archetype base.
    pub fn bonus_health(&self) -> f32 {
        (self.max_health - self.base_health).max(0.0)
    }

    pub fn get(&self, stat: StatKind) -> f32 {
        match stat {
            StatKind::MaxHealth => self.max_health,
            StatKind::MaxMana => self.max_mana,
            StatKind::AttackDamage => self.attack_damage,
            StatKind::AbilityPower => self.ability_power,
            StatKind::Armor => self.armor,
            StatKind::MagicResist => self.magic_resist,
            StatKind::MoveSpeed => self.move_speed,
            StatKind::AttackRange => self.attack_range,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bruiser_with_health_item() {
        let base = BaseStats {
            max_health: 1000.0,
            attack_damage: 80.0,
            ..BaseStats::default()
        };

        let snapshot = StatsSnapshot::compute(
            &base,
            [
                (StatKind::MaxHealth, ModifierKind::Flat, 400.0),
                (StatKind::AttackDamage, ModifierKind::Percent, 0.5),
            ],
        );

        assert_eq!(snapshot.max_health, 1400.0);
        assert_eq!(snapshot.bonus_health(), 400.0);
        // 80 × 1.5
        assert_eq!(snapshot.attack_damage, 120.0);
        assert_eq!(snapshot.armor, base.armor);
    }

    #[test]
    fn health_reduction_yields_no_negative_bonus() {
        let base = BaseStats::default();
        let snapshot = StatsSnapshot::compute(
            &base,
            [(StatKind::MaxHealth, ModifierKind::Percent, -0.2)],
        );
        assert_eq!(snapshot.bonus_health(), 0.0);
    }
}
