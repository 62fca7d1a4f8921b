//! One fixed-rate simulation step.
//!
//! Phases run in a fixed order every tick:
//!
//! 1. interruption guards (stun, root, silence, death)
//! 2. entity timers, over-time effects and channel completions
//! 3. forced movement and contact callbacks
//! 4. companion movement
//! 5. projectiles and hit callbacks
//! 6. trap expiry and triggering
//! 7. deferred tasks due this tick
//! 8. death bookkeeping

use crate::ability::handlers::trap;
use crate::ability::{
    AbilityHandler, CastContext, CastParams, CollisionContext, HandlerCapabilities, HitContext,
};
use crate::catalogue::{AbilityKind, OverTimeKind, TargetMask};
use crate::state::{
    AbilitySlot, CompanionOrder, ContactTag, EntityId, EntityKind, Vec2,
};
use crate::targeting::{TargetFilter, in_skillshot, segment_circle_entry};

use super::{GameEngine, GameState, Rules, StepEvent, StepReport, TaskKind, context};

impl<'a> GameEngine<'a> {
    /// Advances the world by one tick.
    pub fn step(&mut self, rules: Rules<'_>) -> StepReport {
        self.state.world.tick = self.state.world.tick + 1;
        let mut report = StepReport::new(self.state.world.tick);

        guard_interruptions(self.state, &mut report);
        tick_entities(self.state, rules, &mut report);
        advance_movement(self.state, rules, &mut report);
        advance_companions(self.state);
        advance_projectiles(self.state, rules, &mut report);
        resolve_traps(self.state, rules, &mut report);
        let tasks = self.run_due(rules);
        report.events.extend(tasks);
        reap(self.state, &mut report);

        report
    }

    /// Runs every deferred task due at or before the current tick, requeueing
    /// repeating tasks.
    pub(super) fn run_due(&mut self, rules: Rules<'_>) -> Vec<StepEvent> {
        let now = self.state.world.tick;
        let mut events = Vec::new();
        while let Some(task) = self.state.deferred.pop_due(now) {
            if let Some(next) = task.next_repeat() {
                self.state.deferred.schedule(next.due, next);
            }

            let mut params = CastParams::new(task.caster, task.slot, task.ability, task.rank);
            params.target_entity = task.anchor;
            params.target_point = task.point;

            let ran = if task.kind == TaskKind::Complete {
                dispatch(self.state, rules, params, HandlerCapabilities::COMPLETION, |h, ctx| {
                    h.on_complete(ctx)
                })
            } else {
                dispatch(self.state, rules, params, HandlerCapabilities::DEFERRED, |h, ctx| {
                    h.on_deferred(&task, ctx)
                })
            };
            if ran {
                events.push(StepEvent::TaskRun {
                    ability: task.ability,
                    kind: task.kind,
                    caster: task.caster,
                });
            }
        }
        events
    }
}

/// Routes a callback to the handler of `params.ability` if it declared
/// `capability`. Returns whether the handler ran.
fn dispatch(
    state: &mut GameState,
    rules: Rules<'_>,
    params: CastParams,
    capability: HandlerCapabilities,
    call: impl FnOnce(&dyn AbilityHandler, &mut CastContext<'_>),
) -> bool {
    if !rules.registry.supports(params.ability, capability) {
        return false;
    }
    let (Some(handler), Some(definition)) = (
        rules.registry.handler(params.ability),
        rules.catalogue.ability(params.ability),
    ) else {
        return false;
    };
    let mut ctx = context(state, rules, definition, params);
    call(handler, &mut ctx);
    true
}

fn guard_interruptions(state: &mut GameState, report: &mut StepReport) {
    let world = &mut state.world;
    for id in world.ids() {
        let Some(entity) = world.get(id) else {
            continue;
        };
        let disabled = !entity.is_alive() || entity.is_stunned();
        let stop_movement = entity.movement.is_some() && (disabled || entity.is_rooted());
        let silenced = entity.is_silenced();
        let broken: Vec<AbilitySlot> = entity
            .abilities()
            .filter_map(|(slot, state)| {
                let channel = state.channel?;
                let target_lost = channel.target_entity.is_some_and(|t| !world.is_alive(t));
                (disabled || silenced || target_lost).then_some(slot)
            })
            .collect();
        if !stop_movement && broken.is_empty() {
            continue;
        }

        let Some(entity) = world.get_mut(id) else {
            continue;
        };
        if stop_movement {
            entity.movement = None;
            report.push(StepEvent::MovementStopped { entity: id });
        }
        for slot in broken {
            if let Some(state) = entity.ability_mut(slot) {
                state.channel = None;
                report.push(StepEvent::ChannelInterrupted {
                    entity: id,
                    ability: state.kind,
                });
            }
        }
    }
}

fn tick_entities(state: &mut GameState, rules: Rules<'_>, report: &mut StepReport) {
    let mut periodic = Vec::new();
    let mut completions = Vec::new();

    for id in state.world.ids() {
        let Some(entity) = state.world.get_mut(id) else {
            continue;
        };
        let tick = entity.tick(rules.config);
        for (slot, ability) in AbilitySlot::ALL.into_iter().zip(tick.abilities) {
            if ability.recast_expired {
                report.push(StepEvent::RecastExpired { entity: id, slot });
            }
            if let Some(channel) = ability.channel_completed {
                let kind = entity.ability(slot).map(|s| s.kind);
                completions.push((id, slot, kind, channel));
            }
        }
        periodic.extend(tick.periodic.into_iter().map(|p| (id, p)));
    }

    for (target, tick) in periodic {
        match tick.kind {
            OverTimeKind::Damage(kind) => {
                state.world.deal_damage(tick.source, target, tick.amount, kind);
            }
            OverTimeKind::Heal => {
                state.world.heal(tick.source, target, tick.amount);
            }
        }
    }

    for (caster, slot, kind, channel) in completions {
        let Some(ability) = kind else {
            continue;
        };
        report.push(StepEvent::ChannelCompleted {
            entity: caster,
            ability,
        });
        let mut params = CastParams::new(caster, slot, ability, channel.rank);
        params.target_entity = channel.target_entity;
        params.target_point = channel.target_point;
        dispatch(state, rules, params, HandlerCapabilities::COMPLETION, |h, ctx| {
            h.on_complete(ctx)
        });
    }
}

fn advance_movement(state: &mut GameState, rules: Rules<'_>, report: &mut StepReport) {
    let mut contacts: Vec<(EntityId, EntityId, ContactTag, Vec2)> = Vec::new();

    for id in state.world.ids() {
        let Some(entity) = state.world.get_mut(id) else {
            continue;
        };
        let Some(mut movement) = entity.movement.take() else {
            continue;
        };
        let next = entity.position + movement.advance();
        if state.world.blocked(next) {
            report.push(StepEvent::MovementStopped { entity: id });
            continue;
        }

        if let Some(tag) = movement.contact {
            for other in state.world.entities_in_radius(next, tag.radius) {
                if other != id && movement.strike(other) {
                    contacts.push((id, other, tag, next));
                }
            }
        }
        let Some(entity) = state.world.get_mut(id) else {
            continue;
        };
        entity.position = next;
        entity.facing = movement.direction;
        if !movement.is_finished() {
            entity.movement = Some(movement);
        }
    }

    for (mover, target, tag, position) in contacts {
        report.push(StepEvent::DashCollision {
            mover,
            target,
            ability: tag.ability,
        });
        let collision = CollisionContext {
            mover,
            target,
            position,
        };
        let params = CastParams::new(mover, tag.slot, tag.ability, tag.rank);
        dispatch(state, rules, params, HandlerCapabilities::DASH_COLLISION, |h, ctx| {
            h.on_dash_collision(&collision, ctx)
        });
    }
}

fn advance_companions(state: &mut GameState) {
    let world = &mut state.world;
    for id in world.ids() {
        let Some(entity) = world.get(id) else {
            continue;
        };
        let Some(companion) = entity.companion else {
            continue;
        };
        if !entity.is_alive() {
            continue;
        }
        let home = entity.owner.and_then(|o| world.get(o)).map(|o| o.position);

        let Some(entity) = world.get_mut(id) else {
            continue;
        };
        match (companion.order, home) {
            (CompanionOrder::Travelling { target }, _) => {
                entity.position = entity.position.move_toward(target, companion.speed);
            }
            (CompanionOrder::Returning, Some(home)) => {
                entity.position = entity.position.move_toward(home, companion.speed);
                if entity.position.distance(home) <= companion.leash {
                    if let Some(state) = entity.companion.as_mut() {
                        state.command(CompanionOrder::Idle);
                    }
                }
            }
            (CompanionOrder::Returning, None) | (CompanionOrder::Idle, _) => {}
        }
    }
}

struct PendingHit {
    owner: EntityId,
    slot: AbilitySlot,
    ability: AbilityKind,
    rank: u8,
    hit: HitContext,
}

fn advance_projectiles(state: &mut GameState, rules: Rules<'_>, report: &mut StepReport) {
    let mut pending = Vec::new();

    for pid in state.world.projectile_ids() {
        let Some(projectile) = state.world.projectile(pid) else {
            continue;
        };
        let start = projectile.position;
        let direction = projectile.direction;
        let step = projectile.next_step();
        let end = start + direction * step;

        let wall = state
            .world
            .obstacles()
            .iter()
            .filter_map(|o| segment_circle_entry(start, direction, step, o.center, o.radius))
            .min_by(f32::total_cmp);

        let mask = rules
            .catalogue
            .ability(projectile.ability)
            .map(|d| d.mask)
            .unwrap_or(TargetMask::UNITS);
        let filter = TargetFilter::enemies(projectile.team, mask);
        let mut struck: Vec<(f32, EntityId)> = state
            .world
            .entities()
            .filter(|e| e.id != projectile.owner && !projectile.hits.contains(&e.id))
            .filter(|e| filter.eligible(e))
            .filter(|e| in_skillshot(start, end, projectile.width / 2.0, e.radius, e.position))
            .map(|e| ((e.position - start).dot(direction).clamp(0.0, step), e.id))
            .filter(|(along, _)| wall.is_none_or(|w| *along <= w))
            .collect();
        struck.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        if !projectile.piercing {
            struck.truncate(1);
        }

        let hit_at = |target: Option<EntityId>, along: f32| PendingHit {
            owner: projectile.owner,
            slot: projectile.slot,
            ability: projectile.ability,
            rank: projectile.rank,
            hit: HitContext {
                projectile: pid,
                position: start + direction * along,
                target,
            },
        };
        let stopped = !projectile.piercing && !struck.is_empty();
        pending.extend(struck.iter().map(|(along, id)| hit_at(Some(*id), *along)));
        let blocked = match wall {
            Some(w) if !stopped => {
                pending.push(hit_at(None, w));
                true
            }
            _ => false,
        };

        let finished = stopped || blocked;
        let Some(projectile) = state.world.projectile_mut(pid) else {
            continue;
        };
        projectile.position = end;
        projectile.traveled += step;
        projectile.hits.extend(struck.iter().map(|(_, id)| *id));
        if finished || projectile.is_spent() {
            state.world.remove_projectile(pid);
        }
    }

    for PendingHit {
        owner,
        slot,
        ability,
        rank,
        hit,
    } in pending
    {
        report.push(StepEvent::ProjectileHit {
            owner,
            ability,
            target: hit.target,
            position: hit.position,
        });
        let params = CastParams::new(owner, slot, ability, rank);
        dispatch(state, rules, params, HandlerCapabilities::PROJECTILE_HIT, |h, ctx| {
            h.on_projectile_hit(&hit, ctx)
        });
    }
}

fn resolve_traps(state: &mut GameState, rules: Rules<'_>, report: &mut StepReport) {
    let now = state.world.tick;
    let mut expired = Vec::new();
    let mut sprung = Vec::new();

    for entity in state.world.entities() {
        let Some(placed) = entity.trap else {
            continue;
        };
        if now >= placed.expires_at || !entity.is_alive() {
            expired.push(entity.id);
            continue;
        }
        if !placed.armed {
            continue;
        }
        let mask = rules
            .catalogue
            .ability(placed.ability)
            .map(|d| d.mask)
            .unwrap_or(TargetMask::UNITS);
        let victims = TargetFilter::enemies(entity.team, mask).in_radius(
            &state.world,
            entity.position,
            placed.trigger_radius,
        );
        if !victims.is_empty() {
            sprung.push((entity.id, entity.owner, placed));
        }
    }

    for id in expired {
        state.world.remove(id);
        report.push(StepEvent::TrapExpired { trap: id });
    }
    for (id, owner, placed) in sprung {
        let (Some(owner), Some(definition)) = (owner, rules.catalogue.ability(placed.ability))
        else {
            state.world.remove(id);
            continue;
        };
        report.push(StepEvent::TrapTriggered { trap: id, owner });
        let params = CastParams::new(owner, placed.slot, placed.ability, placed.rank);
        let mut ctx = context(state, rules, definition, params);
        trap::detonate(&mut ctx, id);
    }
}

/// Reports each death once. Champions stay in the world; everything else
/// is removed.
fn reap(state: &mut GameState, report: &mut StepReport) {
    let dead: Vec<(EntityId, EntityKind)> = state
        .world
        .entities()
        .filter(|e| !e.is_alive())
        .map(|e| (e.id, e.kind))
        .collect();
    for (id, kind) in dead {
        if state.fallen.insert(id) {
            report.push(StepEvent::Died { entity: id });
        }
        if kind != EntityKind::Champion {
            state.world.remove(id);
            state.fallen.remove(&id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ability::HandlerRegistry;
    use crate::catalogue::{
        AbilityDefinition, Catalogue, ChampionArchetype, DashConfig, ProjectileConfig,
        ScalingTable, Shape,
    };
    use crate::config::GameConfig;
    use crate::engine::{CastCommand, CastInput};
    use crate::state::{Entity, Loadout, Obstacle, Team, World};
    use crate::stats::BaseStats;

    fn flat(amount: f32) -> ScalingTable {
        ScalingTable {
            base: vec![amount],
            ..ScalingTable::default()
        }
    }

    fn catalogue() -> Catalogue {
        let mut dash = AbilityDefinition::new(AbilityKind::BlitzDash, 1);
        dash.dash = Some(DashConfig {
            distance: 400.0,
            duration_ms: 400,
            collision_radius: 60.0,
        });
        dash.damage = Some(flat(50.0));
        dash.damage_kind = crate::catalogue::DamageKind::True;

        let mut bolt = AbilityDefinition::new(AbilityKind::PiercingBolt, 1);
        bolt.range = 1000.0;
        bolt.shape = Shape::Line { width: 60.0 };
        bolt.damage = Some(flat(80.0));
        bolt.damage_kind = crate::catalogue::DamageKind::True;
        bolt.projectile = Some(ProjectileConfig {
            speed: 3000.0,
            width: 60.0,
            piercing: false,
        });

        Catalogue::new([dash, bolt], [])
    }

    fn champion(world: &mut World, team: Team, x: f32, kind: AbilityKind) -> EntityId {
        let archetype = ChampionArchetype {
            name: "dummy".into(),
            stats: BaseStats::default(),
            loadout: Loadout::new([kind; 4]),
            radius: Entity::DEFAULT_RADIUS,
        };
        world.insert(Entity::champion(&archetype, team, Vec2::new(x, 0.0)))
    }

    fn learn(engine: &mut GameEngine<'_>, rules: Rules<'_>, caster: EntityId) {
        engine
            .execute(
                rules,
                &CastCommand::LevelUp {
                    caster,
                    slot: AbilitySlot::Q,
                },
            )
            .unwrap();
    }

    #[test]
    fn dash_strikes_each_overlapped_entity_once() {
        let catalogue = catalogue();
        let registry = HandlerRegistry::builtin();
        let config = GameConfig::with_tick_rate(10);
        let rules = Rules::new(&catalogue, &registry, &config);

        let mut world = World::new();
        let mover = champion(&mut world, Team::Blue, 0.0, AbilityKind::BlitzDash);
        // Sits on the dash path for several ticks.
        let target = champion(&mut world, Team::Red, 120.0, AbilityKind::BlitzDash);
        let mut state = GameState::new(world);
        let mut engine = GameEngine::new(&mut state);
        learn(&mut engine, rules, mover);

        let input = CastInput::new(mover, AbilitySlot::Q).at(Vec2::new(400.0, 0.0));
        engine.execute(rules, &CastCommand::Activate(input)).unwrap();

        let mut collisions = 0;
        for _ in 0..6 {
            let report = engine.step(rules);
            collisions += report.count(|e| matches!(e, StepEvent::DashCollision { .. }));
        }

        assert_eq!(collisions, 1);
        let target = engine.state().world.get(target).unwrap();
        assert_eq!(target.health(), BaseStats::default().max_health - 50.0);
        let mover = engine.state().world.get(mover).unwrap();
        assert!(mover.movement.is_none());
        assert!((mover.position.x - 400.0).abs() < 1e-3);
    }

    #[test]
    fn projectile_stops_at_first_enemy_unless_piercing() {
        let catalogue = catalogue();
        let registry = HandlerRegistry::builtin();
        let config = GameConfig::with_tick_rate(10);
        let rules = Rules::new(&catalogue, &registry, &config);

        let mut world = World::new();
        let caster = champion(&mut world, Team::Blue, 0.0, AbilityKind::PiercingBolt);
        let near = champion(&mut world, Team::Red, 300.0, AbilityKind::PiercingBolt);
        let far = champion(&mut world, Team::Red, 600.0, AbilityKind::PiercingBolt);
        let mut state = GameState::new(world);
        let mut engine = GameEngine::new(&mut state);
        learn(&mut engine, rules, caster);

        let input = CastInput::new(caster, AbilitySlot::Q).at(Vec2::new(1000.0, 0.0));
        engine.execute(rules, &CastCommand::Activate(input)).unwrap();
        for _ in 0..5 {
            engine.step(rules);
        }

        let full = BaseStats::default().max_health;
        let world = &engine.state().world;
        assert_eq!(world.get(near).unwrap().health(), full - 80.0);
        assert_eq!(world.get(far).unwrap().health(), full);
        assert_eq!(world.projectiles().count(), 0);
    }

    #[test]
    fn obstacles_absorb_projectiles() {
        let catalogue = catalogue();
        let registry = HandlerRegistry::builtin();
        let config = GameConfig::with_tick_rate(10);
        let rules = Rules::new(&catalogue, &registry, &config);

        let mut world = World::new();
        let caster = champion(&mut world, Team::Blue, 0.0, AbilityKind::PiercingBolt);
        let behind = champion(&mut world, Team::Red, 500.0, AbilityKind::PiercingBolt);
        world.add_obstacle(Obstacle::new(Vec2::new(250.0, 0.0), 40.0));
        let mut state = GameState::new(world);
        let mut engine = GameEngine::new(&mut state);
        learn(&mut engine, rules, caster);

        let input = CastInput::new(caster, AbilitySlot::Q).at(Vec2::new(1000.0, 0.0));
        engine.execute(rules, &CastCommand::Activate(input)).unwrap();
        let report = engine.step(rules);

        assert!(report.events.iter().any(|e| matches!(
            e,
            StepEvent::ProjectileHit { target: None, .. }
        )));
        let world = &engine.state().world;
        assert_eq!(world.get(behind).unwrap().health(), BaseStats::default().max_health);
        assert_eq!(world.projectiles().count(), 0);
    }

    #[test]
    fn deaths_are_reported_once() {
        let catalogue = catalogue();
        let registry = HandlerRegistry::builtin();
        let config = GameConfig::default();
        let rules = Rules::new(&catalogue, &registry, &config);

        let mut world = World::new();
        let victim = champion(&mut world, Team::Red, 0.0, AbilityKind::BlitzDash);
        world.deal_damage(EntityId::SYSTEM, victim, 10_000.0, crate::catalogue::DamageKind::True);
        let mut state = GameState::new(world);
        let mut engine = GameEngine::new(&mut state);

        let died = |r: &StepReport| r.count(|e| matches!(e, StepEvent::Died { .. }));
        assert_eq!(died(&engine.step(rules)), 1);
        assert_eq!(died(&engine.step(rules)), 0);
        assert!(engine.state().world.contains(victim));
    }
}
