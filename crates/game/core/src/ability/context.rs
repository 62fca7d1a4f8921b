//! Everything a handler sees while resolving one cast or callback.

use crate::catalogue::{
    AbilityDefinition, AbilityKind, Catalogue, EffectApplication, EffectCategory,
    EffectDefinition, EffectId, TargetSide,
};
use crate::config::GameConfig;
use crate::engine::{DeferredQueue, DeferredTask, TaskKind};
use crate::scaling::{ScalingContext, compute_magnitude};
use crate::state::{
    AbilitySlot, AbilityState, DamageOutcome, Entity, EntityId, Team, Tick, Vec2, World,
};
use crate::targeting::TargetFilter;

/// Player input for one activation, plus the resolved rank.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CastParams {
    pub caster: EntityId,
    pub slot: AbilitySlot,
    pub ability: AbilityKind,
    pub rank: u8,
    pub target_point: Option<Vec2>,
    pub target_entity: Option<EntityId>,
    /// Ticks the cast was held before release.
    pub charge_ticks: u64,
}

impl CastParams {
    pub fn new(caster: EntityId, slot: AbilitySlot, ability: AbilityKind, rank: u8) -> Self {
        Self {
            caster,
            slot,
            ability,
            rank,
            target_point: None,
            target_entity: None,
            charge_ticks: 0,
        }
    }
}

pub struct CastContext<'a> {
    pub world: &'a mut World,
    pub catalogue: &'a Catalogue,
    pub config: &'a GameConfig,
    pub deferred: &'a mut DeferredQueue,
    pub definition: &'a AbilityDefinition,
    pub params: CastParams,
}

impl<'a> CastContext<'a> {
    pub fn caster(&self) -> Option<&Entity> {
        self.world.get(self.params.caster)
    }

    pub fn caster_mut(&mut self) -> Option<&mut Entity> {
        self.world.get_mut(self.params.caster)
    }

    pub fn caster_team(&self) -> Team {
        self.caster().map(|c| c.team).unwrap_or_default()
    }

    pub fn caster_position(&self) -> Option<Vec2> {
        self.caster().map(|c| c.position)
    }

    /// State of the slot this cast was issued from.
    pub fn slot_state(&self) -> Option<&AbilityState> {
        self.caster()?.ability(self.params.slot)
    }

    pub fn slot_state_mut(&mut self) -> Option<&mut AbilityState> {
        let slot = self.params.slot;
        self.caster_mut()?.ability_mut(slot)
    }

    pub fn now(&self) -> Tick {
        self.world.tick
    }

    pub fn ticks(&self, millis: u32) -> u64 {
        self.config.ticks(millis)
    }

    // ===== targets =====

    /// The explicit target point, or the target entity's position.
    pub fn target_position(&self) -> Option<Vec2> {
        self.params.target_point.or_else(|| {
            self.params
                .target_entity
                .and_then(|id| self.world.get(id))
                .map(|e| e.position)
        })
    }

    /// Unit vector from the caster toward the target, falling back to the
    /// caster's facing.
    pub fn aim_direction(&self) -> Option<Vec2> {
        let caster = self.caster()?;
        self.target_position()
            .and_then(|target| (target - caster.position).normalized())
            .or(Some(caster.facing))
    }

    pub fn filter(&self, side: TargetSide) -> TargetFilter {
        TargetFilter::new(self.caster_team(), side, self.definition.mask)
    }

    pub fn enemies_around(&self, center: Vec2, radius: f32) -> Vec<EntityId> {
        self.filter(TargetSide::Enemy)
            .in_radius(self.world, center, radius)
    }

    pub fn allies_around(&self, center: Vec2, radius: f32) -> Vec<EntityId> {
        self.filter(TargetSide::Ally)
            .in_radius(self.world, center, radius)
    }

    // ===== magnitudes =====

    /// Scaling inputs from the caster's current snapshot.
    pub fn scaling(&self) -> ScalingContext {
        self.caster()
            .map(|c| ScalingContext::from_snapshot(&c.snapshot()))
            .unwrap_or_default()
    }

    pub fn damage(&self, multiplier: f32) -> f32 {
        compute_magnitude(
            self.definition.damage.as_ref(),
            self.params.rank,
            &self.scaling(),
            multiplier,
        )
    }

    pub fn heal_amount(&self, multiplier: f32) -> f32 {
        compute_magnitude(
            self.definition.heal.as_ref(),
            self.params.rank,
            &self.scaling(),
            multiplier,
        )
    }

    pub fn shield_amount(&self, multiplier: f32) -> f32 {
        compute_magnitude(
            self.definition.shield.as_ref(),
            self.params.rank,
            &self.scaling(),
            multiplier,
        )
    }

    // ===== mutations =====

    /// Deals `amount` of the ability's damage kind, credited to the caster.
    pub fn strike(&mut self, target: EntityId, amount: f32) -> Option<DamageOutcome> {
        if amount <= 0.0 {
            return None;
        }
        self.world
            .deal_damage(self.params.caster, target, amount, self.definition.damage_kind)
    }

    pub fn restore(&mut self, target: EntityId, amount: f32) -> f32 {
        self.world.heal(self.params.caster, target, amount)
    }

    pub fn effect(&self, id: &EffectId) -> Option<&'a EffectDefinition> {
        self.catalogue.effect(id)
    }

    /// Applies one configured effect, honoring its duration override.
    pub fn apply(&mut self, target: EntityId, application: &EffectApplication) -> bool {
        let Some(def) = self.effect(&application.effect) else {
            return false;
        };
        let duration = self.ticks(application.duration_ms.unwrap_or(def.duration_ms));
        self.world
            .apply_effect(target, def, duration, self.params.caster)
            .is_some()
    }

    /// Applies the ability's configured effects to `target`, optionally only
    /// those of one category. Returns how many were applied.
    pub fn apply_effects(&mut self, target: EntityId, only: Option<EffectCategory>) -> usize {
        let definition = self.definition;
        let mut applied = 0;
        for application in &definition.effects {
            if let Some(category) = only {
                if self.catalogue.effects().category_of(&application.effect) != category {
                    continue;
                }
            }
            if self.apply(target, application) {
                applied += 1;
            }
        }
        applied
    }

    // ===== scheduling =====

    /// A task for this ability, caster and rank.
    pub fn task(&self, kind: TaskKind) -> DeferredTask {
        DeferredTask::new(
            self.params.ability,
            self.params.slot,
            self.params.caster,
            self.params.rank,
            kind,
        )
    }

    /// Queues `task` to run `delay` ticks from now. A zero delay runs later
    /// in the current step.
    pub fn schedule(&mut self, delay: u64, task: DeferredTask) -> u64 {
        let due = self.world.tick + delay;
        self.deferred.schedule(due, task)
    }
}
