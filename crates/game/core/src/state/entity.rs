//! Entities and their public mutation surface.
//!
//! Handlers never touch another entity's fields directly; they go through
//! [`Entity::apply_effect`], [`Entity::take_damage`], [`Entity::heal`],
//! [`Entity::add_modifier`] and [`Entity::open_recast`] (usually via the
//! [`World`](super::World) wrappers that also credit the source).

use arrayvec::ArrayVec;

use crate::catalogue::{
    AbilityDefinition, AbilityKind, ChampionArchetype, CrowdControlKind, DamageKind,
    EffectCategory, EffectDefinition, EffectId,
};
use crate::config::GameConfig;
use crate::stats::{BaseStats, StatModifier, StatsSnapshot};

use super::{
    AbilitySlot, AbilityState, AbilityTick, ActiveEffects, ApplyOutcome, CompanionState,
    EntityId, ForcedMovement, PeriodicTick, RecastWindow, Team, TrapState, Vec2,
};

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
pub enum EntityKind {
    Champion,
    Minion,
    Monster,
    Structure,
    Companion,
    Trap,
}

/// Running totals for attribution.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatTally {
    pub damage_dealt: f32,
    pub damage_taken: f32,
    pub healing_done: f32,
    pub healing_received: f32,
}

/// A flat shield granted by an ability.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShieldInstance {
    pub amount: f32,
    pub remaining: u64,
    pub source: EntityId,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DamageOutcome {
    /// Amount requested after mitigation.
    pub mitigated: f32,
    /// Portion soaked by shields.
    pub absorbed: f32,
    /// Health actually lost.
    pub dealt: f32,
    pub killed: bool,
}

/// Everything that ticks on an entity, gathered for the world to resolve.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EntityTick {
    pub periodic: Vec<PeriodicTick>,
    pub abilities: [AbilityTick; GameConfig::ABILITY_SLOTS],
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub team: Team,
    pub position: Vec2,
    /// Unit vector the entity last faced.
    pub facing: Vec2,
    pub radius: f32,
    pub owner: Option<EntityId>,
    base: BaseStats,
    health: f32,
    mana: f32,
    /// Generic resource stacks (granted by transformations, spent by kits).
    stacks: u32,
    effects: ActiveEffects,
    shields: Vec<ShieldInstance>,
    modifiers: Vec<StatModifier>,
    abilities: ArrayVec<AbilityState, { GameConfig::ABILITY_SLOTS }>,
    pub movement: Option<ForcedMovement>,
    pub companion: Option<CompanionState>,
    pub trap: Option<TrapState>,
    pub tally: CombatTally,
}

impl Entity {
    pub const DEFAULT_RADIUS: f32 = 35.0;

    /// A unit without abilities. The id is assigned on world insertion.
    pub fn new(kind: EntityKind, team: Team, position: Vec2, base: BaseStats) -> Self {
        Self {
            id: EntityId(0),
            kind,
            team,
            position,
            facing: Vec2::new(1.0, 0.0),
            radius: Self::DEFAULT_RADIUS,
            owner: None,
            health: base.max_health,
            mana: base.max_mana,
            base,
            stacks: 0,
            effects: ActiveEffects::new(),
            shields: Vec::new(),
            modifiers: Vec::new(),
            abilities: ArrayVec::new(),
            movement: None,
            companion: None,
            trap: None,
            tally: CombatTally::default(),
        }
    }

    /// A champion with every slot bound and unlearned.
    pub fn champion(archetype: &ChampionArchetype, team: Team, position: Vec2) -> Self {
        let mut entity = Self::new(EntityKind::Champion, team, position, archetype.stats);
        entity.radius = archetype.radius;
        entity.abilities = archetype
            .loadout
            .iter()
            .map(|(_, kind)| AbilityState::new(kind))
            .collect();
        entity
    }

    pub fn with_owner(mut self, owner: EntityId) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    // ===== queries =====

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    pub fn health(&self) -> f32 {
        self.health
    }

    pub fn mana(&self) -> f32 {
        self.mana
    }

    pub fn stacks(&self) -> u32 {
        self.stacks
    }

    pub fn base_stats(&self) -> &BaseStats {
        &self.base
    }

    pub fn effects(&self) -> &ActiveEffects {
        &self.effects
    }

    pub fn shields(&self) -> &[ShieldInstance] {
        &self.shields
    }

    pub fn modifiers(&self) -> &[StatModifier] {
        &self.modifiers
    }

    /// Total absorption currently available.
    pub fn shield_total(&self) -> f32 {
        let granted: f32 = self.shields.iter().map(|s| s.amount).sum();
        let effects: f32 = self.effects.iter().filter_map(|e| e.shield).sum();
        granted + effects
    }

    /// Current effective stats: base, timed modifiers and stat effects.
    pub fn snapshot(&self) -> StatsSnapshot {
        let modifiers = self.modifiers.iter().map(|m| (m.stat, m.kind, m.value));
        StatsSnapshot::compute(&self.base, modifiers.chain(self.effects.stat_modifiers()))
    }

    pub fn is_stunned(&self) -> bool {
        self.effects.has_crowd_control(CrowdControlKind::Stun)
    }

    pub fn is_silenced(&self) -> bool {
        self.effects.has_crowd_control(CrowdControlKind::Silence)
    }

    pub fn is_rooted(&self) -> bool {
        self.effects.has_crowd_control(CrowdControlKind::Root)
    }

    pub fn has_effect(&self, id: &EffectId) -> bool {
        self.effects.has(id)
    }

    pub fn ability(&self, slot: AbilitySlot) -> Option<&AbilityState> {
        self.abilities.get(slot.index())
    }

    pub fn ability_mut(&mut self, slot: AbilitySlot) -> Option<&mut AbilityState> {
        self.abilities.get_mut(slot.index())
    }

    pub fn slot_of(&self, kind: AbilityKind) -> Option<AbilitySlot> {
        AbilitySlot::ALL
            .into_iter()
            .find(|slot| self.ability(*slot).is_some_and(|state| state.kind == kind))
    }

    pub fn abilities(&self) -> impl Iterator<Item = (AbilitySlot, &AbilityState)> {
        AbilitySlot::ALL.into_iter().zip(self.abilities.iter())
    }

    // ===== mutation surface =====

    pub fn apply_effect(
        &mut self,
        def: &EffectDefinition,
        duration: u64,
        source: EntityId,
    ) -> ApplyOutcome {
        self.effects.apply(def, duration, source)
    }

    /// Mitigates, absorbs with shields (granted shields first, then shield
    /// effects, each oldest first) and subtracts health.
    pub fn take_damage(&mut self, amount: f32, kind: DamageKind) -> DamageOutcome {
        if !self.is_alive() || amount <= 0.0 {
            return DamageOutcome::default();
        }
        let snapshot = self.snapshot();
        let mitigated = match kind {
            DamageKind::Physical => amount * mitigation(snapshot.armor),
            DamageKind::Magic => amount * mitigation(snapshot.magic_resist),
            DamageKind::True => amount,
        };

        let mut left = mitigated;
        for shield in self.shields.iter_mut() {
            let taken = shield.amount.min(left);
            shield.amount -= taken;
            left -= taken;
        }
        self.shields.retain(|s| s.amount > 0.0);
        left = self.effects.absorb(left);

        let dealt = left.min(self.health);
        self.health -= dealt;
        self.tally.damage_taken += dealt;
        DamageOutcome {
            mitigated,
            absorbed: mitigated - left,
            dealt,
            killed: self.health <= 0.0,
        }
    }

    /// Restores health up to the current max. Dead entities cannot be healed.
    /// Returns the amount actually restored.
    pub fn heal(&mut self, amount: f32) -> f32 {
        if !self.is_alive() || amount <= 0.0 {
            return 0.0;
        }
        let max = self.snapshot().max_health;
        let healed = amount.min((max - self.health).max(0.0));
        self.health += healed;
        self.tally.healing_received += healed;
        healed
    }

    pub fn add_modifier(&mut self, modifier: StatModifier) {
        self.modifiers.push(modifier);
    }

    /// Removes every modifier granted by `ability`.
    pub fn remove_modifiers_from(&mut self, ability: AbilityKind) -> usize {
        let before = self.modifiers.len();
        self.modifiers
            .retain(|m| m.source.ability != Some(ability));
        self.clamp_pools();
        before - self.modifiers.len()
    }

    pub fn grant_shield(&mut self, amount: f32, duration: u64, source: EntityId) {
        if amount > 0.0 && duration > 0 {
            self.shields.push(ShieldInstance {
                amount,
                remaining: duration,
                source,
            });
        }
    }

    pub fn open_recast(&mut self, slot: AbilitySlot, window: RecastWindow) -> bool {
        match self.ability_mut(slot) {
            Some(state) => {
                state.recast = Some(window);
                true
            }
            None => false,
        }
    }

    /// Removes effects of `category`; see [`ActiveEffects::cleanse`].
    pub fn cleanse(&mut self, category: EffectCategory, respect_cleansable: bool) -> Vec<EffectId> {
        self.effects.cleanse(category, respect_cleansable)
    }

    pub fn add_stacks(&mut self, amount: u32) {
        self.stacks = self.stacks.saturating_add(amount);
    }

    /// Deducts mana. Returns false, leaving mana untouched, if short.
    pub fn spend_mana(&mut self, amount: f32) -> bool {
        if amount <= 0.0 {
            return true;
        }
        if self.mana + f32::EPSILON < amount {
            return false;
        }
        self.mana = (self.mana - amount).max(0.0);
        true
    }

    pub fn restore_mana(&mut self, amount: f32) {
        let max = self.snapshot().max_mana;
        self.mana = (self.mana + amount.max(0.0)).min(max);
    }

    /// Raises a slot's rank by one; see [`AbilityState::level_up`].
    pub fn level_up(
        &mut self,
        slot: AbilitySlot,
        def: &AbilityDefinition,
        config: &GameConfig,
    ) -> Option<u8> {
        self.ability_mut(slot)?.level_up(def, config)
    }

    /// Stops any forced movement and channel; used on death and hard CC.
    pub fn interrupt(&mut self) {
        self.movement = None;
        for state in self.abilities.iter_mut() {
            state.channel = None;
            state.charging_since = None;
        }
    }

    /// Advances effects, shields, modifiers and ability timers by one tick.
    pub fn tick(&mut self, config: &GameConfig) -> EntityTick {
        let mut report = EntityTick {
            periodic: self.effects.tick(config),
            ..EntityTick::default()
        };

        for shield in self.shields.iter_mut() {
            shield.remaining = shield.remaining.saturating_sub(1);
        }
        self.shields.retain(|s| s.remaining > 0);

        self.modifiers.retain_mut(|m| !m.tick());

        for (idx, state) in self.abilities.iter_mut().enumerate() {
            report.abilities[idx] = state.tick();
        }
        self.clamp_pools();
        report
    }

    fn clamp_pools(&mut self) {
        let snapshot = self.snapshot();
        self.health = self.health.min(snapshot.max_health);
        self.mana = self.mana.min(snapshot.max_mana);
    }
}

/// Fraction of damage that gets through `resist` points of mitigation.
fn mitigation(resist: f32) -> f32 {
    100.0 / (100.0 + resist.max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::{EffectPayload, StackBehavior};
    use crate::stats::{ModifierKind, ModifierSource, StatKind};

    fn dummy() -> Entity {
        let base = BaseStats {
            max_health: 500.0,
            armor: 100.0,
            magic_resist: 0.0,
            ..BaseStats::default()
        };
        Entity::new(EntityKind::Champion, Team::Red, Vec2::ZERO, base)
    }

    #[test]
    fn armor_halves_physical_damage_at_one_hundred() {
        let mut target = dummy();
        let outcome = target.take_damage(100.0, DamageKind::Physical);
        assert_eq!(outcome.dealt, 50.0);
        assert_eq!(target.health(), 450.0);

        let outcome = target.take_damage(100.0, DamageKind::True);
        assert_eq!(outcome.dealt, 100.0);
    }

    #[test]
    fn granted_shield_soaks_before_health() {
        let mut target = dummy();
        target.grant_shield(30.0, 60, EntityId(2));
        let outcome = target.take_damage(50.0, DamageKind::Magic);

        assert_eq!(outcome.absorbed, 30.0);
        assert_eq!(outcome.dealt, 20.0);
        assert!(target.shields().is_empty());
    }

    #[test]
    fn heal_is_capped_and_skips_the_dead() {
        let mut target = dummy();
        target.take_damage(40.0, DamageKind::True);
        assert_eq!(target.heal(100.0), 40.0);

        target.take_damage(1000.0, DamageKind::True);
        assert!(!target.is_alive());
        assert_eq!(target.heal(100.0), 0.0);
    }

    #[test]
    fn timed_modifiers_lapse_after_their_duration() {
        let mut target = dummy();
        let source = ModifierSource {
            entity: target.id,
            ability: Some(AbilityKind::Ascension),
        };
        target.add_modifier(StatModifier::timed(
            StatKind::AttackDamage,
            ModifierKind::Flat,
            25.0,
            2,
            source,
        ));
        assert_eq!(target.snapshot().attack_damage, 85.0);

        target.tick(&GameConfig::default());
        assert_eq!(target.snapshot().attack_damage, 85.0);
        target.tick(&GameConfig::default());
        assert_eq!(target.snapshot().attack_damage, 60.0);
    }

    #[test]
    fn stun_effect_is_visible_as_crowd_control() {
        let mut target = dummy();
        let stun = EffectDefinition {
            id: EffectId::new("stun"),
            category: EffectCategory::Debuff,
            stacking: StackBehavior::Refresh,
            max_stacks: 1,
            cleansable: true,
            duration_ms: 500,
            payload: EffectPayload::CrowdControl {
                kind: CrowdControlKind::Stun,
            },
        };
        target.apply_effect(&stun, 15, EntityId(3));
        assert!(target.is_stunned());
        assert!(!target.is_silenced());
    }
}
