//! The authoritative world: every entity, projectile and obstacle.
//!
//! Entities live in a `BTreeMap` keyed by id so iteration, and therefore
//! multi-target application, is always in ascending id order.

use std::collections::BTreeMap;

use crate::catalogue::{ChampionArchetype, DamageKind, EffectDefinition};

use super::{
    ApplyOutcome, DamageOutcome, Entity, EntityId, Obstacle, Projectile, ProjectileId, Team,
    Tick, Vec2,
};

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct World {
    pub tick: Tick,
    /// Next entity id. Monotonic, never reused.
    next_entity: u32,
    next_projectile: u32,
    entities: BTreeMap<EntityId, Entity>,
    projectiles: BTreeMap<ProjectileId, Projectile>,
    obstacles: Vec<Obstacle>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    // ===== entities =====

    /// Inserts `entity`, assigning it the next id.
    pub fn insert(&mut self, mut entity: Entity) -> EntityId {
        let id = EntityId(self.next_entity);
        self.next_entity += 1;
        entity.id = id;
        self.entities.insert(id, entity);
        id
    }

    pub fn spawn_champion(
        &mut self,
        archetype: &ChampionArchetype,
        team: Team,
        position: Vec2,
    ) -> EntityId {
        self.insert(Entity::champion(archetype, team, position))
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        self.entities.remove(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    pub fn is_alive(&self, id: EntityId) -> bool {
        self.get(id).is_some_and(Entity::is_alive)
    }

    /// All entities in ascending id order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn ids(&self) -> Vec<EntityId> {
        self.entities.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Ids of entities whose body overlaps the circle, ascending.
    pub fn entities_in_radius(&self, center: Vec2, radius: f32) -> Vec<EntityId> {
        self.entities
            .values()
            .filter(|e| e.position.distance(center) <= radius + e.radius)
            .map(|e| e.id)
            .collect()
    }

    /// Ids of every entity owned by `owner`, ascending.
    pub fn owned_by(&self, owner: EntityId) -> Vec<EntityId> {
        self.entities
            .values()
            .filter(|e| e.owner == Some(owner))
            .map(|e| e.id)
            .collect()
    }

    // ===== attributed mutations =====

    /// Damages `target` and credits `source`. `None` if the target is gone.
    pub fn deal_damage(
        &mut self,
        source: EntityId,
        target: EntityId,
        amount: f32,
        kind: DamageKind,
    ) -> Option<DamageOutcome> {
        let outcome = self.get_mut(target)?.take_damage(amount, kind);
        if outcome.killed {
            if let Some(victim) = self.get_mut(target) {
                victim.interrupt();
            }
        }
        if let Some(attacker) = self.get_mut(source) {
            attacker.tally.damage_dealt += outcome.dealt;
        }
        Some(outcome)
    }

    /// Heals `target` and credits `source`. Returns the amount restored.
    pub fn heal(&mut self, source: EntityId, target: EntityId, amount: f32) -> f32 {
        let healed = self
            .get_mut(target)
            .map(|entity| entity.heal(amount))
            .unwrap_or(0.0);
        if let Some(healer) = self.get_mut(source) {
            healer.tally.healing_done += healed;
        }
        healed
    }

    /// Applies an effect to a living target.
    pub fn apply_effect(
        &mut self,
        target: EntityId,
        def: &EffectDefinition,
        duration: u64,
        source: EntityId,
    ) -> Option<ApplyOutcome> {
        let entity = self.get_mut(target)?;
        if !entity.is_alive() {
            return None;
        }
        Some(entity.apply_effect(def, duration, source))
    }

    // ===== projectiles =====

    pub fn spawn_projectile(&mut self, projectile: Projectile) -> ProjectileId {
        let id = ProjectileId(self.next_projectile);
        self.next_projectile += 1;
        self.projectiles.insert(id, projectile);
        id
    }

    pub fn projectile(&self, id: ProjectileId) -> Option<&Projectile> {
        self.projectiles.get(&id)
    }

    pub fn projectile_mut(&mut self, id: ProjectileId) -> Option<&mut Projectile> {
        self.projectiles.get_mut(&id)
    }

    pub fn remove_projectile(&mut self, id: ProjectileId) -> Option<Projectile> {
        self.projectiles.remove(&id)
    }

    pub fn projectile_ids(&self) -> Vec<ProjectileId> {
        self.projectiles.keys().copied().collect()
    }

    pub fn projectiles(&self) -> impl Iterator<Item = (&ProjectileId, &Projectile)> {
        self.projectiles.iter()
    }

    // ===== obstacles =====

    pub fn add_obstacle(&mut self, obstacle: Obstacle) {
        self.obstacles.push(obstacle);
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn blocked(&self, point: Vec2) -> bool {
        self.obstacles.iter().any(|o| o.contains(point))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::EntityKind;
    use crate::stats::BaseStats;

    fn unit(world: &mut World, team: Team, x: f32) -> EntityId {
        world.insert(Entity::new(
            EntityKind::Minion,
            team,
            Vec2::new(x, 0.0),
            BaseStats::default(),
        ))
    }

    #[test]
    fn ids_are_monotonic_and_never_reused() {
        let mut world = World::new();
        let a = unit(&mut world, Team::Blue, 0.0);
        let b = unit(&mut world, Team::Blue, 0.0);
        world.remove(a);
        let c = unit(&mut world, Team::Blue, 0.0);
        assert!(a < b && b < c);
    }

    #[test]
    fn radius_query_is_sorted_and_counts_body_radius() {
        let mut world = World::new();
        let far = unit(&mut world, Team::Red, 230.0);
        let near = unit(&mut world, Team::Red, 50.0);
        let _outside = unit(&mut world, Team::Red, 400.0);

        // 230 - 35 body radius is inside a 200 radius.
        assert_eq!(world.entities_in_radius(Vec2::ZERO, 200.0), vec![far, near]);
    }

    #[test]
    fn damage_is_credited_to_source() {
        let mut world = World::new();
        let attacker = unit(&mut world, Team::Blue, 0.0);
        let victim = unit(&mut world, Team::Red, 10.0);

        let outcome = world
            .deal_damage(attacker, victim, 100.0, DamageKind::True)
            .unwrap();
        assert_eq!(outcome.dealt, 100.0);
        assert_eq!(world.get(attacker).unwrap().tally.damage_dealt, 100.0);
        assert!(world.deal_damage(attacker, EntityId(99), 1.0, DamageKind::True).is_none());
    }
}
