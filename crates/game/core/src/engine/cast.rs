//! The cast pipeline: command validation, handler dispatch and charging.
//!
//! Checks run in a fixed order so the first failing check is the reported
//! reason: caster, rank, crowd control, open recast, handler validation,
//! cooldown, cost. Nothing is charged unless the handler reports success.

use crate::ability::{
    CastParams, ExecutionResult, FailureReason, HandlerCapabilities, generic,
};
use crate::catalogue::{AbilityDefinition, AbilityKind};
use crate::error::{ErrorSeverity, GameError};
use crate::state::{AbilitySlot, EntityId, Vec2};

use super::{GameEngine, GameState, Rules, context};

/// Targeting input shared by activation and release.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CastInput {
    pub caster: EntityId,
    pub slot: AbilitySlot,
    pub target_point: Option<Vec2>,
    pub target_entity: Option<EntityId>,
}

impl CastInput {
    pub fn new(caster: EntityId, slot: AbilitySlot) -> Self {
        Self {
            caster,
            slot,
            target_point: None,
            target_entity: None,
        }
    }

    pub fn at(mut self, point: Vec2) -> Self {
        self.target_point = Some(point);
        self
    }

    pub fn on(mut self, entity: EntityId) -> Self {
        self.target_entity = Some(entity);
        self
    }
}

/// A player command against one ability slot.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CastCommand {
    /// Press: cast immediately, or use an open recast window.
    Activate(CastInput),
    /// Start holding a charge ability.
    BeginCharge {
        caster: EntityId,
        slot: AbilitySlot,
    },
    /// Let go of a held charge ability.
    Release(CastInput),
    LevelUp {
        caster: EntityId,
        slot: AbilitySlot,
    },
}

impl CastCommand {
    pub fn caster(&self) -> EntityId {
        match self {
            Self::Activate(input) | Self::Release(input) => input.caster,
            Self::BeginCharge { caster, .. } | Self::LevelUp { caster, .. } => *caster,
        }
    }

    pub fn slot(&self) -> AbilitySlot {
        match self {
            Self::Activate(input) | Self::Release(input) => input.slot,
            Self::BeginCharge { slot, .. } | Self::LevelUp { slot, .. } => *slot,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum CastOutcome {
    Cast,
    Recast,
    ChargeStarted,
    Learned,
}

/// What a successful command did.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CastReport {
    pub caster: EntityId,
    pub slot: AbilitySlot,
    pub ability: AbilityKind,
    pub rank: u8,
    pub outcome: CastOutcome,
    pub mana_spent: f32,
    /// Cooldown started by this command, in ticks.
    pub cooldown: Option<u64>,
}

impl CastReport {
    fn new(params: &CastParams, outcome: CastOutcome) -> Self {
        Self {
            caster: params.caster,
            slot: params.slot,
            ability: params.ability,
            rank: params.rank,
            outcome,
            mana_spent: 0.0,
            cooldown: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum CastError {
    #[error("caster {caster} does not exist")]
    UnknownCaster { caster: EntityId },

    #[error("caster {caster} is dead")]
    CasterDead { caster: EntityId },

    #[error("caster {caster} has no ability in slot {slot}")]
    EmptySlot { caster: EntityId, slot: AbilitySlot },

    #[error("ability {ability} is missing from the catalogue")]
    UnknownAbility { ability: AbilityKind },

    #[error("{ability} rejected: {reason}")]
    Rejected {
        ability: AbilityKind,
        reason: FailureReason,
    },

    #[error("{ability} had no effect")]
    NoOp { ability: AbilityKind },

    #[error("{ability} is already at max rank")]
    MaxRank { ability: AbilityKind },

    #[error("{ability} is not being charged")]
    NotCharging { ability: AbilityKind },
}

impl CastError {
    /// The refusal reason, for rejections.
    pub fn reason(&self) -> Option<FailureReason> {
        match self {
            Self::Rejected { reason, .. } => Some(*reason),
            _ => None,
        }
    }
}

impl GameError for CastError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnknownAbility { .. } => ErrorSeverity::Internal,
            Self::Rejected { reason, .. } => match reason {
                FailureReason::OnCooldown
                | FailureReason::InsufficientResource
                | FailureReason::NoAmmo
                | FailureReason::Stunned
                | FailureReason::Silenced => ErrorSeverity::Recoverable,
                _ => ErrorSeverity::Validation,
            },
            Self::NoOp { .. } => ErrorSeverity::Recoverable,
            _ => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownCaster { .. } => "CAST_UNKNOWN_CASTER",
            Self::CasterDead { .. } => "CAST_CASTER_DEAD",
            Self::EmptySlot { .. } => "CAST_EMPTY_SLOT",
            Self::UnknownAbility { .. } => "CAST_UNKNOWN_ABILITY",
            Self::Rejected { .. } => "CAST_REJECTED",
            Self::NoOp { .. } => "CAST_NO_OP",
            Self::MaxRank { .. } => "CAST_MAX_RANK",
            Self::NotCharging { .. } => "CAST_NOT_CHARGING",
        }
    }
}

impl<'a> GameEngine<'a> {
    /// Applies one player command.
    ///
    /// A rejected or unsuccessful cast leaves mana and cooldown untouched.
    pub fn execute(
        &mut self,
        rules: Rules<'_>,
        command: &CastCommand,
    ) -> Result<CastReport, CastError> {
        match *command {
            CastCommand::Activate(input) => self.activate(rules, input, None),
            CastCommand::BeginCharge { caster, slot } => self.begin_charge(rules, caster, slot),
            CastCommand::Release(input) => {
                let held = self.take_charge(rules, input.caster, input.slot)?;
                self.activate(rules, input, Some(held))
            }
            CastCommand::LevelUp { caster, slot } => self.level_up(rules, caster, slot),
        }
    }

    /// `held` is the charge duration for a release, `None` for a plain press.
    fn activate(
        &mut self,
        rules: Rules<'_>,
        input: CastInput,
        held: Option<u64>,
    ) -> Result<CastReport, CastError> {
        let (definition, rank) = resolve(self.state, rules, input.caster, input.slot)?;
        let ability = definition.kind;
        let reject = |reason| CastError::Rejected { ability, reason };

        if rank == 0 {
            return Err(reject(FailureReason::NotLearned));
        }
        if let Some(reason) = crowd_control(self.state, input.caster) {
            return Err(reject(reason));
        }

        let mut params = CastParams::new(input.caster, input.slot, ability, rank);
        params.target_point = input.target_point;
        params.target_entity = input.target_entity;
        params.charge_ticks = held.unwrap_or(0);

        if let Some(report) = self.try_recast(rules, definition, params)? {
            return Ok(report);
        }

        let handler = rules.registry.handler(ability);
        let mut ctx = context(self.state, rules, definition, params);
        let validation = match handler {
            Some(handler) => handler.validate(&ctx),
            None => generic::validate(&ctx),
        };
        validation.into_result().map_err(reject)?;

        let (ready, mana) = ctx
            .slot_state()
            .map(|s| s.is_ready())
            .zip(ctx.caster().map(|c| c.mana()))
            .unwrap_or((false, 0.0));
        if !ready {
            return Err(reject(FailureReason::OnCooldown));
        }
        if mana + f32::EPSILON < definition.cost_for(rank) {
            return Err(reject(FailureReason::InsufficientResource));
        }
        // Chargeable abilities fire through BeginCharge/Release; only their
        // recast answers a plain press.
        if definition.charge.is_some() && held.is_none() {
            return Err(reject(FailureReason::HOLD_TO_CHARGE));
        }

        let result = match handler {
            Some(handler) => handler.execute(&mut ctx),
            None => generic::execute(&mut ctx),
        };
        if !result.success {
            return Err(CastError::NoOp { ability });
        }

        let report = settle(self.state, rules, definition, &params, result, CastOutcome::Cast);
        self.run_due(rules);
        Ok(report)
    }

    /// Uses the slot's open window when the handler accepts it. `Ok(None)`
    /// means there is no usable window and a normal cast should follow.
    fn try_recast(
        &mut self,
        rules: Rules<'_>,
        definition: &AbilityDefinition,
        mut params: CastParams,
    ) -> Result<Option<CastReport>, CastError> {
        let ability = params.ability;
        if !rules.registry.supports(ability, HandlerCapabilities::RECAST) {
            return Ok(None);
        }
        let Some(handler) = rules.registry.handler(ability) else {
            return Ok(None);
        };
        let window_rank = self
            .state
            .world
            .get(params.caster)
            .and_then(|c| c.ability(params.slot))
            .and_then(|s| s.recast.as_ref().filter(|w| w.is_open()))
            .map(|w| w.rank);
        let Some(window_rank) = window_rank else {
            return Ok(None);
        };
        params.rank = window_rank.max(1);

        let mut ctx = context(self.state, rules, definition, params);
        if !handler.can_recast(&ctx) {
            return Ok(None);
        }
        let result = handler.execute_recast(&mut ctx);
        if !result.success {
            return Err(CastError::NoOp { ability });
        }
        if let Some(state) = ctx.slot_state_mut() {
            state.consume_recast();
        }

        let report = settle(self.state, rules, definition, &params, result, CastOutcome::Recast);
        self.run_due(rules);
        Ok(Some(report))
    }

    fn begin_charge(
        &mut self,
        rules: Rules<'_>,
        caster: EntityId,
        slot: AbilitySlot,
    ) -> Result<CastReport, CastError> {
        let (definition, rank) = resolve(self.state, rules, caster, slot)?;
        let ability = definition.kind;
        let reject = |reason| CastError::Rejected { ability, reason };

        if definition.charge.is_none() {
            return Err(reject(FailureReason::Custom("not_chargeable")));
        }
        if rank == 0 {
            return Err(reject(FailureReason::NotLearned));
        }
        if let Some(reason) = crowd_control(self.state, caster) {
            return Err(reject(reason));
        }

        let now = self.state.world.tick;
        let state = self
            .state
            .world
            .get_mut(caster)
            .and_then(|c| c.ability_mut(slot))
            .ok_or(CastError::EmptySlot { caster, slot })?;
        if !state.is_ready() {
            return Err(reject(FailureReason::OnCooldown));
        }
        state.charging_since = Some(now);

        let params = CastParams::new(caster, slot, ability, rank);
        Ok(CastReport::new(&params, CastOutcome::ChargeStarted))
    }

    /// Ends a held charge, returning how many ticks it was held.
    fn take_charge(
        &mut self,
        rules: Rules<'_>,
        caster: EntityId,
        slot: AbilitySlot,
    ) -> Result<u64, CastError> {
        let (definition, _) = resolve(self.state, rules, caster, slot)?;
        let now = self.state.world.tick;
        let since = self
            .state
            .world
            .get_mut(caster)
            .and_then(|c| c.ability_mut(slot))
            .and_then(|s| s.charging_since.take());
        since
            .map(|since| now.since(since))
            .ok_or(CastError::NotCharging {
                ability: definition.kind,
            })
    }

    fn level_up(
        &mut self,
        rules: Rules<'_>,
        caster: EntityId,
        slot: AbilitySlot,
    ) -> Result<CastReport, CastError> {
        let (definition, _) = resolve(self.state, rules, caster, slot)?;
        let ability = definition.kind;
        let rank = self
            .state
            .world
            .get_mut(caster)
            .and_then(|c| c.level_up(slot, definition, rules.config))
            .ok_or(CastError::MaxRank { ability })?;

        let params = CastParams::new(caster, slot, ability, rank);
        Ok(CastReport::new(&params, CastOutcome::Learned))
    }
}

/// Looks up the caster's slot and its catalogue definition.
fn resolve<'r>(
    state: &GameState,
    rules: Rules<'r>,
    caster: EntityId,
    slot: AbilitySlot,
) -> Result<(&'r AbilityDefinition, u8), CastError> {
    let entity = state
        .world
        .get(caster)
        .ok_or(CastError::UnknownCaster { caster })?;
    if !entity.is_alive() {
        return Err(CastError::CasterDead { caster });
    }
    let ability = entity
        .ability(slot)
        .ok_or(CastError::EmptySlot { caster, slot })?;
    let definition = rules
        .catalogue
        .ability(ability.kind)
        .ok_or(CastError::UnknownAbility {
            ability: ability.kind,
        })?;
    Ok((definition, ability.rank))
}

fn crowd_control(state: &GameState, caster: EntityId) -> Option<FailureReason> {
    let entity = state.world.get(caster)?;
    if entity.is_stunned() {
        Some(FailureReason::Stunned)
    } else if entity.is_silenced() {
        Some(FailureReason::Silenced)
    } else {
        None
    }
}

/// Charges cost and cooldown as the result allows and persists the state it
/// carries onto the caster.
fn settle(
    state: &mut GameState,
    rules: Rules<'_>,
    definition: &AbilityDefinition,
    params: &CastParams,
    result: ExecutionResult,
    outcome: CastOutcome,
) -> CastReport {
    let mut report = CastReport::new(params, outcome);
    let Some(caster) = state.world.get_mut(params.caster) else {
        return report;
    };

    if !result.skip_resource_cost {
        let cost = definition.cost_for(params.rank);
        if caster.spend_mana(cost) {
            report.mana_spent = cost.max(0.0);
        }
    }
    if let Some(movement) = result.forced_movement {
        caster.movement = Some(movement);
    }

    let Some(slot) = caster.ability_mut(params.slot) else {
        return report;
    };
    if !result.skip_cooldown {
        let ticks = result
            .cooldown_override
            .unwrap_or_else(|| rules.config.ticks(definition.cooldown_for(params.rank)));
        slot.start_cooldown(ticks);
        report.cooldown = Some(ticks);
    }
    if let Some(window) = result.recast {
        slot.recast = Some(window);
    }
    if let Some(channel) = result.channel {
        slot.channel = Some(channel);
    }
    report
}
