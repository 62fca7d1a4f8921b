//! Simulation worker that owns the authoritative [`arena_core::GameState`].
//!
//! Receives commands from [`RuntimeHandle`](crate::RuntimeHandle), applies
//! them through [`arena_core::GameEngine`], advances the fixed-rate step and
//! publishes events to the [`EventBus`].

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use arena_content::ContentBundle;
use arena_core::{
    CastCommand, CastReport, GameEngine, GameError, GameState, HandlerRegistry, Rules, StepReport,
};

use crate::api::Result;
use crate::events::{CastEvent, Event, EventBus, TickEvent};

/// Commands that can be sent to the simulation worker
pub enum Command {
    /// Apply a player command at the current tick.
    Cast {
        command: CastCommand,
        reply: oneshot::Sender<Result<CastReport>>,
    },
    /// Advance the simulation by `ticks` steps immediately.
    Advance {
        ticks: u32,
        reply: oneshot::Sender<Vec<StepReport>>,
    },
    /// Query the current game state (read-only).
    QueryState { reply: oneshot::Sender<GameState> },
}

/// Background task that processes gameplay commands and paces ticks.
///
/// The worker is the only owner of the game state; every mutation happens on
/// its task, one command or step at a time.
pub struct SimulationWorker {
    state: GameState,
    content: ContentBundle,
    registry: &'static HandlerRegistry,
    command_rx: mpsc::Receiver<Command>,
    event_bus: EventBus,
    tick_interval: Option<Duration>,
}

impl SimulationWorker {
    /// Creates a new simulation worker.
    ///
    /// With `tick_interval` unset the world only advances on
    /// [`Command::Advance`].
    pub fn new(
        state: GameState,
        content: ContentBundle,
        registry: &'static HandlerRegistry,
        command_rx: mpsc::Receiver<Command>,
        event_bus: EventBus,
        tick_interval: Option<Duration>,
    ) -> Self {
        info!(
            target: "runtime::tick",
            entities = state.world.len(),
            tick_rate = content.config.tick_rate,
            paced = tick_interval.is_some(),
            "SimulationWorker initialized"
        );

        Self {
            state,
            content,
            registry,
            command_rx,
            event_bus,
            tick_interval,
        }
    }

    /// Main worker loop. Exits once every handle is dropped.
    pub async fn run(mut self) {
        let Some(period) = self.tick_interval else {
            while let Some(cmd) = self.command_rx.recv().await {
                self.handle_command(cmd);
            }
            return;
        };

        let mut ticker = time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick of `interval` completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd),
                    None => break,
                },
                _ = ticker.tick() => {
                    self.step();
                }
            }
        }
    }

    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Cast { command, reply } => {
                let result = self.execute(command);
                if reply.send(result).is_err() {
                    debug!("Cast reply channel closed (caller dropped)");
                }
            }
            Command::Advance { ticks, reply } => {
                let reports = (0..ticks).map(|_| self.step()).collect();
                if reply.send(reports).is_err() {
                    debug!("Advance reply channel closed (caller dropped)");
                }
            }
            Command::QueryState { reply } => {
                if reply.send(self.state.clone()).is_err() {
                    debug!("QueryState reply channel closed (caller dropped)");
                }
            }
        }
    }

    /// Applies one command and publishes the outcome.
    fn execute(&mut self, command: CastCommand) -> Result<CastReport> {
        let rules = Rules::new(&self.content.catalogue, self.registry, &self.content.config);
        let tick = self.state.world.tick;
        let result = GameEngine::new(&mut self.state).execute(rules, &command);

        match &result {
            Ok(report) => {
                debug!(
                    target: "runtime::cast",
                    caster = ?report.caster,
                    ability = %report.ability,
                    outcome = ?report.outcome,
                    rank = report.rank,
                    "cast resolved"
                );
                self.event_bus.publish(Event::Cast(CastEvent::Resolved {
                    tick,
                    report: report.clone(),
                }));
            }
            Err(err) => {
                let severity = err.severity();
                if severity.is_internal() {
                    warn!(
                        target: "runtime::cast",
                        caster = ?command.caster(),
                        code = err.error_code(),
                        "cast failed: {err}"
                    );
                } else {
                    debug!(
                        target: "runtime::cast",
                        caster = ?command.caster(),
                        code = err.error_code(),
                        severity = severity.as_str(),
                        "cast rejected: {err}"
                    );
                }
                self.event_bus.publish(Event::Cast(CastEvent::Rejected {
                    tick,
                    command,
                    code: err.error_code().to_owned(),
                    reason: err.to_string(),
                }));
            }
        }
        result.map_err(Into::into)
    }

    fn step(&mut self) -> StepReport {
        let rules = Rules::new(&self.content.catalogue, self.registry, &self.content.config);
        let report = GameEngine::new(&mut self.state).step(rules);
        if !report.events.is_empty() {
            debug!(
                target: "runtime::tick",
                tick = ?report.tick,
                events = report.events.len(),
                "step produced events"
            );
        }
        self.event_bus.publish(Event::Tick(TickEvent {
            report: report.clone(),
        }));
        report
    }
}
