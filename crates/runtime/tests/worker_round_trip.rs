use std::time::Duration;

use arena_content::ContentBundle;
use arena_core::{
    AbilitySlot, CastCommand, CastError, CastInput, CastOutcome, Entity, EntityId, ErrorSeverity,
    FailureReason, GameError, GameState, Team, Vec2, World,
};
use arena_runtime::{CastEvent, Event, Runtime, RuntimeConfig, RuntimeError, Topic};

/// Lumen at the origin, an enemy vesk at x = 600.
fn duel(content: &ContentBundle) -> (GameState, EntityId, EntityId) {
    let mut world = World::new();
    let lumen = world.insert(Entity::champion(
        content.catalogue.champion("lumen").unwrap(),
        Team::Blue,
        Vec2::ZERO,
    ));
    let vesk = world.insert(Entity::champion(
        content.catalogue.champion("vesk").unwrap(),
        Team::Red,
        Vec2::new(600.0, 0.0),
    ));
    (GameState::new(world), lumen, vesk)
}

async fn start(config: RuntimeConfig) -> (Runtime, EntityId, EntityId) {
    let content = ContentBundle::embedded().expect("shipped content");
    let (state, lumen, vesk) = duel(&content);
    let runtime = Runtime::builder()
        .config(config)
        .content(content)
        .initial_state(state)
        .build()
        .await
        .expect("Runtime should start successfully");
    (runtime, lumen, vesk)
}

#[tokio::test]
async fn casts_resolve_and_publish_events() {
    let (runtime, lumen, vesk) = start(RuntimeConfig::default()).await;
    let handle = runtime.handle();
    let mut casts = handle.subscribe(Topic::Cast);

    let learned = handle
        .cast(CastCommand::LevelUp {
            caster: lumen,
            slot: AbilitySlot::Q,
        })
        .await
        .unwrap();
    assert_eq!(learned.outcome, CastOutcome::Learned);
    assert!(matches!(
        casts.recv().await,
        Ok(Event::Cast(CastEvent::Resolved { .. }))
    ));

    let send = CastCommand::Activate(CastInput::new(lumen, AbilitySlot::Q).at(Vec2::new(600.0, 0.0)));
    let report = handle.cast(send).await.unwrap();
    assert_eq!(report.outcome, CastOutcome::Cast);
    assert_eq!(report.mana_spent, 50.0);

    let reports = handle.advance(16).await.unwrap();
    assert_eq!(reports.len(), 16);

    let state = handle.query_state().await.unwrap();
    let target = state.world.get(vesk).unwrap();
    assert!(target.health() < target.snapshot().max_health);

    drop(handle);
    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn state_snapshots_survive_json_with_pending_tasks() {
    let (runtime, lumen, _) = start(RuntimeConfig::default()).await;
    let handle = runtime.handle();
    handle
        .cast(CastCommand::LevelUp {
            caster: lumen,
            slot: AbilitySlot::Q,
        })
        .await
        .unwrap();
    let send = CastCommand::Activate(CastInput::new(lumen, AbilitySlot::Q).at(Vec2::new(600.0, 0.0)));
    handle.cast(send).await.unwrap();

    let state = handle.query_state().await.unwrap();
    assert!(!state.deferred.is_empty());

    let json = serde_json::to_string(&state).expect("state serializes to JSON");
    let restored: GameState = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.deferred, state.deferred);
    assert_eq!(restored.deferred.len(), state.deferred.len());
    assert_eq!(restored.world.tick, state.world.tick);

    drop(handle);
    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn rejected_casts_surface_typed_errors() {
    let (runtime, lumen, _) = start(RuntimeConfig::default()).await;
    let handle = runtime.handle();
    let mut casts = handle.subscribe(Topic::Cast);

    let err = handle
        .cast(CastCommand::Activate(CastInput::new(lumen, AbilitySlot::W)))
        .await
        .unwrap_err();
    match &err {
        RuntimeError::Cast(cast) => assert_eq!(cast.reason(), Some(FailureReason::NotLearned)),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(err.severity(), ErrorSeverity::Validation);
    assert_eq!(err.error_code(), "CAST_REJECTED");

    match casts.recv().await {
        Ok(Event::Cast(CastEvent::Rejected { code, command, .. })) => {
            assert_eq!(code, "CAST_REJECTED");
            assert_eq!(command.caster(), lumen);
        }
        other => panic!("unexpected event: {other:?}"),
    }

    let err = handle
        .cast(CastCommand::LevelUp {
            caster: EntityId(99),
            slot: AbilitySlot::Q,
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::Cast(CastError::UnknownCaster { .. })
    ));

    drop(handle);
    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn paced_runtime_steps_on_its_own() {
    let config = RuntimeConfig::default().with_tick_interval(Duration::from_millis(1));
    let (runtime, _, _) = start(config).await;
    let mut ticks = runtime.subscribe(Topic::Tick);

    let mut seen = 0;
    while seen < 3 {
        let event = tokio::time::timeout(Duration::from_secs(5), ticks.recv())
            .await
            .expect("pacer should step")
            .unwrap();
        assert!(matches!(event, Event::Tick(_)));
        seen += 1;
    }

    let state = runtime.handle().query_state().await.unwrap();
    assert!(state.world.tick.0 >= 3);

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn building_without_content_fails() {
    let result = Runtime::builder().build().await;
    assert!(matches!(result, Err(RuntimeError::MissingContent)));
}

#[test]
fn tick_events_serialize_for_clients() {
    let event = Event::Tick(arena_runtime::TickEvent {
        report: arena_core::StepReport::default(),
    });
    let json = serde_json::to_string(&event).unwrap();
    assert!(json.contains("Tick"));
}
