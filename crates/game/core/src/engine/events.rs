use crate::catalogue::AbilityKind;
use crate::state::{AbilitySlot, EntityId, Tick, Vec2};

use super::TaskKind;

/// Something observable that happened during a simulation step.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StepEvent {
    RecastExpired {
        entity: EntityId,
        slot: AbilitySlot,
    },
    ChannelCompleted {
        entity: EntityId,
        ability: AbilityKind,
    },
    ChannelInterrupted {
        entity: EntityId,
        ability: AbilityKind,
    },
    MovementStopped {
        entity: EntityId,
    },
    DashCollision {
        mover: EntityId,
        target: EntityId,
        ability: AbilityKind,
    },
    ProjectileHit {
        owner: EntityId,
        ability: AbilityKind,
        target: Option<EntityId>,
        position: Vec2,
    },
    TrapTriggered {
        trap: EntityId,
        owner: EntityId,
    },
    TrapExpired {
        trap: EntityId,
    },
    TaskRun {
        ability: AbilityKind,
        kind: TaskKind,
        caster: EntityId,
    },
    Died {
        entity: EntityId,
    },
}

/// Everything one call to [`GameEngine::step`](super::GameEngine::step)
/// produced.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StepReport {
    pub tick: Tick,
    pub events: Vec<StepEvent>,
}

impl StepReport {
    pub fn new(tick: Tick) -> Self {
        Self {
            tick,
            events: Vec::new(),
        }
    }

    pub fn push(&mut self, event: StepEvent) {
        self.events.push(event);
    }

    pub fn count(&self, predicate: impl Fn(&StepEvent) -> bool) -> usize {
        self.events.iter().filter(|e| predicate(e)).count()
    }
}
