//! End-to-end ability scenarios against the shipped catalogue.

use arena_content::ContentBundle;
use arena_core::catalogue::{DamageKind, EffectId};
use arena_core::state::CompanionOrder;
use arena_core::{
    AbilityKind, AbilitySlot, CastCommand, CastContext, CastError, CastInput, CastOutcome,
    CastParams, Entity, EntityId, FailureReason, GameEngine, GameState, HandlerRegistry, Rules,
    StepEvent, TaskKind, Team, Vec2, World,
};

struct Arena {
    bundle: ContentBundle,
}

impl Arena {
    fn new() -> Self {
        Self {
            bundle: ContentBundle::embedded().expect("shipped content"),
        }
    }

    fn rules(&self) -> Rules<'_> {
        Rules::new(
            &self.bundle.catalogue,
            HandlerRegistry::global(),
            &self.bundle.config,
        )
    }

    fn spawn(&self, world: &mut World, champion: &str, team: Team, x: f32) -> EntityId {
        let archetype = self
            .bundle
            .catalogue
            .champion(champion)
            .expect("champion in roster");
        world.insert(Entity::champion(archetype, team, Vec2::new(x, 0.0)))
    }

    fn effect(&self, id: &str) -> &arena_core::EffectDefinition {
        self.bundle
            .catalogue
            .effect(&EffectId::new(id))
            .expect("effect in catalogue")
    }

    /// Asks the slot's handler whether a press right now would be a recast.
    fn can_recast(&self, state: &mut GameState, caster: EntityId, slot: AbilitySlot) -> bool {
        let catalogue = &self.bundle.catalogue;
        let slot_state = state.world.get(caster).and_then(|c| c.ability(slot)).cloned();
        let slot_state = slot_state.expect("bound slot");
        let definition = catalogue.ability(slot_state.kind).expect("ability in catalogue");
        let handler = HandlerRegistry::global()
            .handler(slot_state.kind)
            .expect("registered handler");
        let ctx = CastContext {
            world: &mut state.world,
            catalogue,
            config: &self.bundle.config,
            deferred: &mut state.deferred,
            definition,
            params: CastParams::new(caster, slot, slot_state.kind, slot_state.rank),
        };
        handler.can_recast(&ctx)
    }
}

fn learn(engine: &mut GameEngine<'_>, rules: Rules<'_>, caster: EntityId, slot: AbilitySlot) {
    engine
        .execute(rules, &CastCommand::LevelUp { caster, slot })
        .expect("level up");
}

/// Steps `ticks` times and collects every event.
fn run(engine: &mut GameEngine<'_>, rules: Rules<'_>, ticks: usize) -> Vec<StepEvent> {
    (0..ticks)
        .flat_map(|_| engine.step(rules).events)
        .collect()
}

fn health(engine: &GameEngine<'_>, id: EntityId) -> f32 {
    engine.state().world.get(id).map_or(0.0, Entity::health)
}

#[test]
fn companion_orb_strikes_on_arrival_and_returns_on_recall() {
    let arena = Arena::new();
    let rules = arena.rules();
    let mut world = World::new();
    let lumen = arena.spawn(&mut world, "lumen", Team::Blue, 0.0);
    let target = arena.spawn(&mut world, "vesk", Team::Red, 600.0);
    let mut state = GameState::new(world);
    let mut engine = GameEngine::new(&mut state);
    learn(&mut engine, rules, lumen, AbilitySlot::Q);

    let send = CastCommand::Activate(CastInput::new(lumen, AbilitySlot::Q).at(Vec2::new(600.0, 0.0)));
    let report = engine.execute(rules, &send).unwrap();
    assert_eq!(report.outcome, CastOutcome::Cast);
    assert_eq!(report.mana_spent, 50.0);

    let full = health(&engine, target);
    let events = run(&mut engine, rules, 16);
    let arrivals = events
        .iter()
        .filter(|e| matches!(e, StepEvent::TaskRun { kind: TaskKind::Arrival, .. }))
        .count();
    assert_eq!(arrivals, 1);
    assert!(health(&engine, target) < full);

    let owned = engine.state().world.owned_by(lumen);
    assert_eq!(owned.len(), 1);
    let orb = owned[0];
    let recall = CastCommand::Activate(CastInput::new(lumen, AbilitySlot::Q));
    let report = engine.execute(rules, &recall).unwrap();
    assert_eq!(report.outcome, CastOutcome::Recast);
    assert_eq!(report.mana_spent, 0.0);
    assert_eq!(report.cooldown, None);

    run(&mut engine, rules, 20);
    let orb = engine.state().world.get(orb).unwrap();
    assert!(orb.position.distance(Vec2::ZERO) <= 100.0);
    assert!(matches!(
        orb.companion.map(|c| c.order),
        Some(CompanionOrder::Idle)
    ));
}

#[test]
fn companion_window_lasts_ten_seconds_and_keeps_the_orb() {
    let arena = Arena::new();
    let rules = arena.rules();
    let mut world = World::new();
    let lumen = arena.spawn(&mut world, "lumen", Team::Blue, 0.0);
    let mut state = GameState::new(world);
    assert!(!arena.can_recast(&mut state, lumen, AbilitySlot::Q));

    learn(&mut GameEngine::new(&mut state), rules, lumen, AbilitySlot::Q);
    assert!(!arena.can_recast(&mut state, lumen, AbilitySlot::Q));

    let send = CastCommand::Activate(CastInput::new(lumen, AbilitySlot::Q).at(Vec2::new(600.0, 0.0)));
    let report = GameEngine::new(&mut state).execute(rules, &send).unwrap();
    assert_eq!(report.outcome, CastOutcome::Cast);
    assert!(arena.can_recast(&mut state, lumen, AbilitySlot::Q));
    let owned = state.world.owned_by(lumen);
    assert_eq!(owned.len(), 1);
    let orb = owned[0];

    let mut engine = GameEngine::new(&mut state);
    let expired_after = (1..=400u64).find(|_| {
        engine.step(rules).events.iter().any(|e| {
            matches!(e, StepEvent::RecastExpired { entity, slot }
                if *entity == lumen && *slot == AbilitySlot::Q)
        })
    });
    assert_eq!(expired_after, Some(arena.bundle.config.ticks(10_000)));
    assert!(!arena.can_recast(&mut state, lumen, AbilitySlot::Q));

    // The orb settled at its destination and stays there once the window lapses.
    let settled = state.world.get(orb).unwrap();
    assert!(matches!(
        settled.companion.map(|c| c.order),
        Some(CompanionOrder::Idle)
    ));
    assert!(settled.position.distance(Vec2::new(600.0, 0.0)) < 1.0);

    // A press after expiry is an ordinary cast that commands the same orb.
    let again = CastCommand::Activate(CastInput::new(lumen, AbilitySlot::Q).at(Vec2::new(0.0, 400.0)));
    let report = GameEngine::new(&mut state).execute(rules, &again).unwrap();
    assert_eq!(report.outcome, CastOutcome::Cast);
    assert_eq!(report.mana_spent, 50.0);
    assert_eq!(state.world.owned_by(lumen), vec![orb]);
}

#[test]
fn siphon_without_a_target_is_a_no_op() {
    let arena = Arena::new();
    let rules = arena.rules();
    let mut world = World::new();
    let thorne = arena.spawn(&mut world, "thorne", Team::Blue, 0.0);
    let mut state = GameState::new(world);
    let mut engine = GameEngine::new(&mut state);
    learn(&mut engine, rules, thorne, AbilitySlot::E);

    let bare = CastCommand::Activate(CastInput::new(thorne, AbilitySlot::E));
    assert_eq!(
        engine.execute(rules, &bare),
        Err(CastError::NoOp {
            ability: AbilityKind::Siphon
        })
    );

    let caster = engine.state().world.get(thorne).unwrap();
    assert_eq!(caster.mana(), caster.snapshot().max_mana);
    let slot = caster.ability(AbilitySlot::E).unwrap();
    assert!(slot.is_ready());
    assert!(!slot.is_channeling());
}

#[test]
fn empty_trap_pool_reports_no_ammo() {
    let arena = Arena::new();
    let rules = arena.rules();
    let mut world = World::new();
    let thorne = arena.spawn(&mut world, "thorne", Team::Blue, 0.0);
    let mut state = GameState::new(world);
    let mut engine = GameEngine::new(&mut state);
    learn(&mut engine, rules, thorne, AbilitySlot::W);

    let place = |x: f32| {
        CastCommand::Activate(CastInput::new(thorne, AbilitySlot::W).at(Vec2::new(x, 300.0)))
    };
    for x in [100.0, 200.0, 300.0] {
        engine.execute(rules, &place(x)).unwrap();
        run(&mut engine, rules, 31);
    }
    assert_eq!(engine.state().world.owned_by(thorne).len(), 3);

    let err = engine.execute(rules, &place(400.0)).unwrap_err();
    assert_eq!(err.reason(), Some(FailureReason::NoAmmo));
}

#[test]
fn armed_trap_roots_the_first_enemy_inside() {
    let arena = Arena::new();
    let rules = arena.rules();
    let mut world = World::new();
    let thorne = arena.spawn(&mut world, "thorne", Team::Blue, 0.0);
    let prey = arena.spawn(&mut world, "vesk", Team::Red, 400.0);
    let mut state = GameState::new(world);
    let mut engine = GameEngine::new(&mut state);
    learn(&mut engine, rules, thorne, AbilitySlot::W);

    let place = CastCommand::Activate(CastInput::new(thorne, AbilitySlot::W).at(Vec2::new(400.0, 0.0)));
    engine.execute(rules, &place).unwrap();

    // Unarmed traps ignore enemies standing on them.
    let early = run(&mut engine, rules, 20);
    assert!(!early.iter().any(|e| matches!(e, StepEvent::TrapTriggered { .. })));

    let events = run(&mut engine, rules, 20);
    let triggered = events
        .iter()
        .filter(|e| matches!(e, StepEvent::TrapTriggered { owner, .. } if *owner == thorne))
        .count();
    assert_eq!(triggered, 1);
    assert!(engine.state().world.get(prey).unwrap().is_rooted());
    assert!(engine.state().world.owned_by(thorne).is_empty());
}

#[test]
fn sanctuary_heals_and_strips_every_debuff() {
    let arena = Arena::new();
    let rules = arena.rules();
    let mut world = World::new();
    let lumen = arena.spawn(&mut world, "lumen", Team::Blue, 0.0);
    let ally = arena.spawn(&mut world, "vesk", Team::Blue, 200.0);
    let fallen = arena.spawn(&mut world, "brakka", Team::Blue, -200.0);

    world.deal_damage(ally, lumen, 100.0, DamageKind::True);
    world.deal_damage(lumen, ally, 200.0, DamageKind::True);
    world.deal_damage(lumen, fallen, 10_000.0, DamageKind::True);
    assert!(!world.get(fallen).unwrap().is_alive());
    let caster_health = world.get(lumen).unwrap().health();
    let wounded_health = world.get(ally).unwrap().health();

    let stun = arena.effect("stun").clone();
    let mark = arena.effect("piercing_mark").clone();
    let haste = arena.effect("blitz_haste").clone();
    let ally_entity = world.get_mut(ally).unwrap();
    ally_entity.apply_effect(&stun, 30, lumen);
    ally_entity.apply_effect(&mark, 30, lumen);
    ally_entity.apply_effect(&haste, 30, ally);
    assert!(ally_entity.is_stunned());

    let mut state = GameState::new(world);
    let mut engine = GameEngine::new(&mut state);
    learn(&mut engine, rules, lumen, AbilitySlot::E);
    engine
        .execute(rules, &CastCommand::Activate(CastInput::new(lumen, AbilitySlot::E)))
        .unwrap();
    let world = &engine.state().world;

    // 60 base + 0.35 of lumen's 40 ability power, caster included.
    let caster = world.get(lumen).unwrap();
    assert!((caster.health() - (caster_health + 74.0)).abs() < 0.01);

    let ally = world.get(ally).unwrap();
    assert!((ally.health() - (wounded_health + 74.0)).abs() < 0.01);
    assert!(!ally.is_stunned());
    assert!(!ally.has_effect(&EffectId::new("piercing_mark")));
    assert!(ally.has_effect(&EffectId::new("blitz_haste")));
    assert!(ally.has_effect(&EffectId::new("sanctuary_renewal")));

    let fallen = world.get(fallen).unwrap();
    assert_eq!(fallen.health(), 0.0);
    assert_eq!(fallen.tally.healing_received, 0.0);
    assert!(!fallen.has_effect(&EffectId::new("sanctuary_renewal")));
}

#[test]
fn blitz_refunds_near_a_marked_enemy_and_debuffs_on_contact() {
    let arena = Arena::new();
    let rules = arena.rules();
    let mut world = World::new();
    let vesk = arena.spawn(&mut world, "vesk", Team::Blue, 0.0);
    let marked = arena.spawn(&mut world, "thorne", Team::Red, 300.0);
    let mark = arena.effect("piercing_mark").clone();
    world.get_mut(marked).unwrap().apply_effect(&mark, 120, marked);

    let mut state = GameState::new(world);
    let mut engine = GameEngine::new(&mut state);
    learn(&mut engine, rules, vesk, AbilitySlot::E);

    let dash = CastCommand::Activate(CastInput::new(vesk, AbilitySlot::E).at(Vec2::new(450.0, 0.0)));
    let report = engine.execute(rules, &dash).unwrap();
    assert_eq!(report.cooldown, Some(0));
    assert!(
        engine
            .state()
            .world
            .get(vesk)
            .unwrap()
            .has_effect(&EffectId::new("blitz_haste"))
    );

    let events = run(&mut engine, rules, 10);
    let contacts = events
        .iter()
        .filter(|e| matches!(e, StepEvent::DashCollision { target, .. } if *target == marked))
        .count();
    assert_eq!(contacts, 1);
    let target = engine.state().world.get(marked).unwrap();
    assert!(target.has_effect(&EffectId::new("blitz_cripple")));
}

#[test]
fn blitz_without_a_mark_pays_full_cooldown() {
    let arena = Arena::new();
    let rules = arena.rules();
    let mut world = World::new();
    let vesk = arena.spawn(&mut world, "vesk", Team::Blue, 0.0);
    arena.spawn(&mut world, "thorne", Team::Red, 300.0);
    let mut state = GameState::new(world);
    let mut engine = GameEngine::new(&mut state);
    learn(&mut engine, rules, vesk, AbilitySlot::E);

    let dash = CastCommand::Activate(CastInput::new(vesk, AbilitySlot::E).at(Vec2::new(450.0, 0.0)));
    let report = engine.execute(rules, &dash).unwrap();
    // 14 s at 30 ticks per second.
    assert_eq!(report.cooldown, Some(420));
}

#[test]
fn ascension_detonates_the_orb_and_reverts_when_it_ends() {
    let arena = Arena::new();
    let rules = arena.rules();
    let mut world = World::new();
    let lumen = arena.spawn(&mut world, "lumen", Team::Blue, 0.0);
    let bystander = arena.spawn(&mut world, "vesk", Team::Red, 200.0);
    let mut state = GameState::new(world);
    let mut engine = GameEngine::new(&mut state);
    learn(&mut engine, rules, lumen, AbilitySlot::Q);
    learn(&mut engine, rules, lumen, AbilitySlot::R);

    let send = CastCommand::Activate(CastInput::new(lumen, AbilitySlot::Q).at(Vec2::new(800.0, 0.0)));
    engine.execute(rules, &send).unwrap();
    run(&mut engine, rules, 5);
    let full = health(&engine, bystander);

    engine
        .execute(rules, &CastCommand::Activate(CastInput::new(lumen, AbilitySlot::R)))
        .unwrap();
    // The orb, mid-flight at x = 200, resolved within the same command.
    assert!(health(&engine, bystander) < full);
    let caster = engine.state().world.get(lumen).unwrap();
    assert_eq!(caster.snapshot().attack_range, 650.0);
    assert_eq!(caster.stacks(), 3);

    run(&mut engine, rules, 241);
    let caster = engine.state().world.get(lumen).unwrap();
    assert_eq!(caster.snapshot().attack_range, 550.0);
}
