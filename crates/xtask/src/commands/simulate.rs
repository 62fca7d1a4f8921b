//! Scripted headless duel
//!
//! Spawns two champions facing each other, learns every slot and has both
//! sides fire their whole kit at each other on a fixed cadence. Useful for
//! smoke-testing content changes without a client.

use anyhow::{Context, Result, bail};
use clap::Parser;
use console::style;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

use arena_core::state::CombatTally;
use arena_core::{
    AbilitySlot, CastCommand, CastError, CastInput, Entity, EntityId, FailureReason, GameError,
    GameState, StepEvent, Team, Vec2, World,
};
use arena_runtime::{Runtime, RuntimeError, RuntimeHandle};

use crate::content;

/// Run a headless duel between two champions
#[derive(Parser)]
pub struct Simulate {
    /// Champion on the blue side
    #[arg(long, default_value = "lumen")]
    blue: String,

    /// Champion on the red side
    #[arg(long, default_value = "vesk")]
    red: String,

    /// Number of ticks to simulate
    #[arg(short, long, default_value_t = 900)]
    ticks: u32,

    /// Ticks between casting rounds
    #[arg(short, long, default_value_t = 15)]
    cadence: u32,

    /// Starting distance between the champions
    #[arg(long, default_value_t = 500.0)]
    distance: f32,

    /// Data directory (defaults to $ARENA_DATA_DIR, then the embedded content)
    #[arg(short, long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "summary")]
    format: OutputFormat,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    /// Human-readable summary
    Summary,
    /// Full JSON output
    Json,
}

#[derive(Serialize)]
struct DuelSummary {
    ticks: u64,
    casts_resolved: u32,
    /// Rejections keyed by error code.
    rejections: BTreeMap<String, u32>,
    /// Step events keyed by variant.
    events: BTreeMap<&'static str, u32>,
    champions: Vec<ChampionSummary>,
}

#[derive(Serialize)]
struct ChampionSummary {
    name: String,
    team: Team,
    alive: bool,
    health: f32,
    max_health: f32,
    mana: f32,
    tally: CombatTally,
}

impl Simulate {
    pub fn execute(self) -> Result<()> {
        if self.cadence == 0 {
            bail!("--cadence must be at least 1");
        }

        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Failed to start async runtime")?;
        let summary = rt.block_on(self.run())?;

        match self.format {
            OutputFormat::Summary => print_summary(&summary),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        }
        Ok(())
    }

    async fn run(&self) -> Result<DuelSummary> {
        let (bundle, source) = content::load(self.data_dir.clone())?;
        tracing::info!(source = %source, blue = %self.blue, red = %self.red, "starting duel");

        let mut world = World::new();
        let mut spawn = |name: &str, team: Team, x: f32| -> Result<EntityId> {
            let archetype = bundle
                .catalogue
                .champion(name)
                .with_context(|| format!("Unknown champion '{name}'"))?;
            Ok(world.insert(Entity::champion(archetype, team, Vec2::new(x, 0.0))))
        };
        let blue = spawn(&self.blue, Team::Blue, 0.0)?;
        let red = spawn(&self.red, Team::Red, self.distance)?;
        let names = BTreeMap::from([(blue, self.blue.clone()), (red, self.red.clone())]);

        let runtime = Runtime::builder()
            .content(bundle)
            .initial_state(GameState::new(world))
            .build()
            .await?;
        let handle = runtime.handle();

        let mut duel = Duel::new(handle.clone());
        for caster in [blue, red] {
            for slot in AbilitySlot::ALL {
                duel.cast(CastCommand::LevelUp { caster, slot }).await?;
            }
        }

        let mut elapsed = 0;
        while elapsed < self.ticks {
            duel.round(blue, red).await?;
            duel.round(red, blue).await?;

            let step = self.cadence.min(self.ticks - elapsed);
            let deaths = duel.advance(step).await?;
            elapsed += step;
            if deaths > 0 {
                tracing::info!(tick = elapsed, "a champion died, ending duel");
                break;
            }
        }

        let state = handle.query_state().await?;
        let Duel {
            handle: duel_handle,
            resolved,
            rejections,
            events,
        } = duel;
        // The worker only exits once every handle is gone.
        drop(duel_handle);
        drop(handle);
        runtime.shutdown().await?;

        let champions = names
            .into_iter()
            .filter_map(|(id, name)| {
                let entity = state.world.get(id)?;
                Some(ChampionSummary {
                    name,
                    team: entity.team,
                    alive: entity.is_alive(),
                    health: entity.health(),
                    max_health: entity.snapshot().max_health,
                    mana: entity.mana(),
                    tally: entity.tally,
                })
            })
            .collect();

        Ok(DuelSummary {
            ticks: state.world.tick.0,
            casts_resolved: resolved,
            rejections,
            events,
            champions,
        })
    }
}

/// Drives the runtime and keeps the counters.
struct Duel {
    handle: RuntimeHandle,
    resolved: u32,
    rejections: BTreeMap<String, u32>,
    events: BTreeMap<&'static str, u32>,
}

impl Duel {
    fn new(handle: RuntimeHandle) -> Self {
        Self {
            handle,
            resolved: 0,
            rejections: BTreeMap::new(),
            events: BTreeMap::new(),
        }
    }

    /// Sends one command. Gameplay rejections are counted and handed back,
    /// transport failures abort the duel.
    async fn cast(&mut self, command: CastCommand) -> Result<Option<CastError>> {
        match self.handle.cast(command).await {
            Ok(_) => {
                self.resolved += 1;
                Ok(None)
            }
            Err(RuntimeError::Cast(err)) => {
                *self.rejections.entry(err.error_code().to_owned()).or_default() += 1;
                Ok(Some(err))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// `caster` tries every slot against `target`'s current position.
    async fn round(&mut self, caster: EntityId, target: EntityId) -> Result<()> {
        let state = self.handle.query_state().await?;
        let Some(aim) = state.world.get(target).map(|e| e.position) else {
            return Ok(());
        };
        for slot in AbilitySlot::ALL {
            let input = CastInput::new(caster, slot).at(aim).on(target);
            let Some(err) = self.cast(CastCommand::Activate(input)).await? else {
                continue;
            };
            // Chargeable abilities are thrown with a zero-length hold.
            if err.reason() == Some(FailureReason::HOLD_TO_CHARGE) {
                self.cast(CastCommand::BeginCharge { caster, slot }).await?;
                self.cast(CastCommand::Release(input)).await?;
            }
        }
        Ok(())
    }

    /// Advances `ticks` steps and returns how many deaths they reported.
    async fn advance(&mut self, ticks: u32) -> Result<u32> {
        let mut deaths = 0;
        for report in self.handle.advance(ticks).await? {
            for event in &report.events {
                if matches!(event, StepEvent::Died { .. }) {
                    deaths += 1;
                }
                *self.events.entry(event_name(event)).or_default() += 1;
            }
        }
        Ok(deaths)
    }
}

fn event_name(event: &StepEvent) -> &'static str {
    match event {
        StepEvent::RecastExpired { .. } => "recast_expired",
        StepEvent::ChannelCompleted { .. } => "channel_completed",
        StepEvent::ChannelInterrupted { .. } => "channel_interrupted",
        StepEvent::MovementStopped { .. } => "movement_stopped",
        StepEvent::DashCollision { .. } => "dash_collision",
        StepEvent::ProjectileHit { .. } => "projectile_hit",
        StepEvent::TrapTriggered { .. } => "trap_triggered",
        StepEvent::TrapExpired { .. } => "trap_expired",
        StepEvent::TaskRun { .. } => "task_run",
        StepEvent::Died { .. } => "died",
    }
}

fn print_summary(summary: &DuelSummary) {
    println!("{}", style("═══ Duel Summary ═══").bold().cyan());
    println!();
    println!("  {} {}", style("Ticks:").bold(), summary.ticks);
    println!(
        "  {} {}",
        style("Casts resolved:").bold(),
        summary.casts_resolved
    );

    if !summary.rejections.is_empty() {
        println!("  {}", style("Rejections:").bold());
        for (code, count) in &summary.rejections {
            println!("    {code:<24} {count}");
        }
    }

    if !summary.events.is_empty() {
        println!("  {}", style("Events:").bold());
        for (name, count) in &summary.events {
            println!("    {name:<24} {count}");
        }
    }

    println!();
    for champion in &summary.champions {
        let status = if champion.alive {
            style("alive").green()
        } else {
            style("dead").red()
        };
        println!(
            "{} ({:?}) {}",
            style(&champion.name).bold(),
            champion.team,
            status
        );
        println!(
            "  health {:.0}/{:.0}  mana {:.0}",
            champion.health, champion.max_health, champion.mana
        );
        println!(
            "  dealt {:.0}  taken {:.0}  healed {:.0}  received {:.0}",
            champion.tally.damage_dealt,
            champion.tally.damage_taken,
            champion.tally.healing_done,
            champion.tally.healing_received
        );
    }
}
