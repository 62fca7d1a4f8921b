//! Per-slot ability state owned by a casting entity.

use crate::catalogue::{AbilityDefinition, AbilityKind};
use crate::config::GameConfig;

use super::{EntityId, Tick, Vec2};

/// One of the four bindable activation buttons.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(ascii_case_insensitive)]
pub enum AbilitySlot {
    Q,
    W,
    E,
    R,
}

impl AbilitySlot {
    pub const ALL: [AbilitySlot; GameConfig::ABILITY_SLOTS] = [Self::Q, Self::W, Self::E, Self::R];

    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Abilities bound to each slot of a champion archetype. Fixed for the
/// lifetime of the archetype.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Loadout {
    pub q: AbilityKind,
    pub w: AbilityKind,
    pub e: AbilityKind,
    pub r: AbilityKind,
}

impl Loadout {
    pub fn new([q, w, e, r]: [AbilityKind; GameConfig::ABILITY_SLOTS]) -> Self {
        Self { q, w, e, r }
    }

    pub fn get(&self, slot: AbilitySlot) -> AbilityKind {
        match slot {
            AbilitySlot::Q => self.q,
            AbilitySlot::W => self.w,
            AbilitySlot::E => self.e,
            AbilitySlot::R => self.r,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (AbilitySlot, AbilityKind)> + '_ {
        AbilitySlot::ALL.into_iter().map(|slot| (slot, self.get(slot)))
    }
}

/// Ammo-style charges that replenish independently of the cooldown.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChargePool {
    pub current: u8,
    pub max: u8,
    pub recharge_ticks: u64,
    /// Ticks accumulated toward the next charge.
    pub progress: u64,
}

impl ChargePool {
    pub fn full(max: u8, recharge_ticks: u64) -> Self {
        Self {
            current: max,
            max,
            recharge_ticks,
            progress: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.current == 0
    }

    /// Takes one charge. Returns false when the pool is empty.
    pub fn consume(&mut self) -> bool {
        if self.current == 0 {
            return false;
        }
        self.current -= 1;
        true
    }

    pub fn tick(&mut self) {
        if self.current >= self.max {
            self.progress = 0;
            return;
        }
        self.progress += 1;
        if self.progress >= self.recharge_ticks {
            self.current += 1;
            self.progress = 0;
        }
    }
}

/// A time-boxed follow-up activation of the same ability.
///
/// The window closes when `consumed` reaches `uses` or `remaining` runs out.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RecastWindow {
    pub remaining: u64,
    pub total: u64,
    /// Rank of the cast that opened the window.
    pub rank: u8,
    pub anchor_point: Option<Vec2>,
    pub anchor_entity: Option<EntityId>,
    pub targets: Vec<EntityId>,
    pub consumed: u8,
    pub uses: u8,
}

impl RecastWindow {
    pub fn new(total: u64, rank: u8) -> Self {
        Self {
            remaining: total,
            total,
            rank,
            anchor_point: None,
            anchor_entity: None,
            targets: Vec::new(),
            consumed: 0,
            uses: 1,
        }
    }

    pub fn anchored_at(mut self, point: Vec2) -> Self {
        self.anchor_point = Some(point);
        self
    }

    pub fn anchored_to(mut self, entity: EntityId) -> Self {
        self.anchor_entity = Some(entity);
        self
    }

    pub fn with_targets(mut self, targets: Vec<EntityId>) -> Self {
        self.targets = targets;
        self
    }

    pub fn is_open(&self) -> bool {
        self.remaining > 0 && self.consumed < self.uses
    }
}

/// An in-progress channel. Completion fires only if it runs out undisturbed.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Channel {
    pub remaining: u64,
    pub rank: u8,
    pub target_entity: Option<EntityId>,
    pub target_point: Option<Vec2>,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilityState {
    pub kind: AbilityKind,
    /// 0 = unlearned.
    pub rank: u8,
    pub cooldown_remaining: u64,
    pub cooldown_total: u64,
    /// Tick the caster started holding a charge cast.
    pub charging_since: Option<Tick>,
    pub channel: Option<Channel>,
    pub pool: Option<ChargePool>,
    pub recast: Option<RecastWindow>,
}

/// What happened to an ability's timers during one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AbilityTick {
    pub recast_expired: bool,
    pub channel_completed: Option<Channel>,
}

impl AbilityState {
    pub fn new(kind: AbilityKind) -> Self {
        Self {
            kind,
            rank: 0,
            cooldown_remaining: 0,
            cooldown_total: 0,
            charging_since: None,
            channel: None,
            pool: None,
            recast: None,
        }
    }

    pub fn is_learned(&self) -> bool {
        self.rank > 0
    }

    pub fn is_ready(&self) -> bool {
        self.cooldown_remaining == 0
    }

    pub fn is_channeling(&self) -> bool {
        self.channel.is_some()
    }

    pub fn is_charging(&self) -> bool {
        self.charging_since.is_some()
    }

    pub fn recast_open(&self) -> bool {
        self.recast.as_ref().is_some_and(RecastWindow::is_open)
    }

    /// Raises the rank by one. Learning rank 1 of a pooled ability fills the
    /// pool. Returns the new rank, or `None` at max rank.
    pub fn level_up(&mut self, def: &AbilityDefinition, config: &GameConfig) -> Option<u8> {
        if self.rank >= def.max_rank {
            return None;
        }
        self.rank += 1;
        if let (None, Some(pool)) = (self.pool, def.pool) {
            self.pool = Some(ChargePool::full(
                pool.max_charges,
                config.ticks(pool.recharge_ms).max(1),
            ));
        }
        Some(self.rank)
    }

    pub fn start_cooldown(&mut self, ticks: u64) {
        self.cooldown_remaining = ticks;
        self.cooldown_total = ticks;
    }

    /// Marks one recast use. Drops the window once it is spent.
    pub fn consume_recast(&mut self) {
        if let Some(window) = self.recast.as_mut() {
            window.consumed = window.consumed.saturating_add(1);
            if !window.is_open() {
                self.recast = None;
            }
        }
    }

    /// Advances every timer by one tick.
    pub fn tick(&mut self) -> AbilityTick {
        let mut report = AbilityTick::default();

        self.cooldown_remaining = self.cooldown_remaining.saturating_sub(1);
        if let Some(pool) = self.pool.as_mut() {
            pool.tick();
        }
        if let Some(window) = self.recast.as_mut() {
            window.remaining = window.remaining.saturating_sub(1);
            if !window.is_open() {
                self.recast = None;
                report.recast_expired = true;
            }
        }
        if let Some(channel) = self.channel.as_mut() {
            channel.remaining = channel.remaining.saturating_sub(1);
            if channel.remaining == 0 {
                report.channel_completed = self.channel.take();
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_replenishes_while_not_full() {
        let mut pool = ChargePool::full(2, 3);
        assert!(pool.consume());
        assert!(pool.consume());
        assert!(!pool.consume());

        for _ in 0..3 {
            pool.tick();
        }
        assert_eq!(pool.current, 1);
        for _ in 0..3 {
            pool.tick();
        }
        assert_eq!(pool.current, 2);

        // Full pools do not bank progress.
        pool.tick();
        assert_eq!(pool.progress, 0);
    }

    #[test]
    fn recast_window_expires_after_duration() {
        let mut state = AbilityState::new(AbilityKind::CompanionOrb);
        state.rank = 1;
        state.recast = Some(RecastWindow::new(3, 1));

        assert!(state.recast_open());
        assert!(!state.tick().recast_expired);
        assert!(!state.tick().recast_expired);
        assert!(state.tick().recast_expired);
        assert!(!state.recast_open());
    }

    #[test]
    fn single_use_window_closes_on_consume() {
        let mut state = AbilityState::new(AbilityKind::ChargedSpear);
        state.recast = Some(RecastWindow::new(90, 1));
        state.consume_recast();
        assert!(state.recast.is_none());
    }

    #[test]
    fn slot_letters_parse() {
        assert_eq!("q".parse::<AbilitySlot>().unwrap(), AbilitySlot::Q);
        assert_eq!(AbilitySlot::R.index(), 3);
    }
}
