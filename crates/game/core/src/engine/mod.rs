//! Cast execution and the fixed-rate simulation step.
//!
//! The [`GameEngine`] is the authoritative reducer for [`GameState`]. Player
//! commands go through [`GameEngine::execute`]; time advances only through
//! [`GameEngine::step`]. Both take the immutable [`Rules`] (catalogue,
//! handler registry, tunables) so one state can be replayed under the same
//! rules and reach the same result.

mod cast;
mod events;
mod schedule;
mod step;

pub use cast::{CastCommand, CastError, CastInput, CastOutcome, CastReport};
pub use events::{StepEvent, StepReport};
pub use schedule::{DeferredQueue, DeferredTask, TaskKind};

use std::collections::BTreeSet;

use crate::ability::{CastContext, CastParams, HandlerRegistry};
use crate::catalogue::{AbilityDefinition, Catalogue};
use crate::config::GameConfig;
use crate::state::{EntityId, World};

/// Mutable simulation state: the world plus pending deferred work.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameState {
    pub world: World,
    pub deferred: DeferredQueue,
    /// Deaths already reported by a step.
    #[cfg_attr(feature = "serde", serde(default))]
    fallen: BTreeSet<EntityId>,
}

impl GameState {
    pub fn new(world: World) -> Self {
        Self {
            world,
            deferred: DeferredQueue::new(),
            fallen: BTreeSet::new(),
        }
    }
}

/// Read-only rules every cast and step runs under.
#[derive(Clone, Copy, Debug)]
pub struct Rules<'a> {
    pub catalogue: &'a Catalogue,
    pub registry: &'a HandlerRegistry,
    pub config: &'a GameConfig,
}

impl<'a> Rules<'a> {
    pub fn new(
        catalogue: &'a Catalogue,
        registry: &'a HandlerRegistry,
        config: &'a GameConfig,
    ) -> Self {
        Self {
            catalogue,
            registry,
            config,
        }
    }
}

/// Applies commands and advances time on a borrowed [`GameState`].
pub struct GameEngine<'a> {
    state: &'a mut GameState,
}

impl<'a> GameEngine<'a> {
    pub fn new(state: &'a mut GameState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &GameState {
        self.state
    }
}

/// Builds the handler view of `state` for one cast or callback.
fn context<'s>(
    state: &'s mut GameState,
    rules: Rules<'s>,
    definition: &'s AbilityDefinition,
    params: CastParams,
) -> CastContext<'s> {
    CastContext {
        world: &mut state.world,
        catalogue: rules.catalogue,
        config: rules.config,
        deferred: &mut state.deferred,
        definition,
        params,
    }
}
