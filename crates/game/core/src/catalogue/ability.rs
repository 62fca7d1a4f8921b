//! Ability definitions and their optional mechanic sub-configurations.

use bitflags::bitflags;

use super::effect::{DamageKind, EffectId};
use super::kind::AbilityKind;
use crate::state::EntityKind;
use crate::stats::{ModifierKind, StatKind};

/// Per-rank scaling table for one magnitude (damage, heal or shield).
///
/// `base` is indexed by `rank - 1`; the ratios apply to the caster's
/// snapshot at cast time.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScalingTable {
    pub base: Vec<f32>,
    pub ad_ratio: f32,
    pub ap_ratio: f32,
    pub bonus_health_ratio: f32,
    pub max_health_ratio: f32,
}

/// Geometric footprint of an ability.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Shape {
    /// Affects the caster only.
    #[default]
    SelfCast,
    /// A single target entity or location.
    Point,
    /// Circle around the cast centre.
    Circle { radius: f32 },
    /// Cone in front of the caster; `angle` is the full opening in radians.
    Cone { angle: f32 },
    /// Straight line from the caster, `width` wide.
    Line { width: f32 },
}

/// Which side an ability affects relative to the caster.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum TargetSide {
    #[default]
    Enemy,
    Ally,
}

bitflags! {
    /// Entity kinds an ability may affect.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct TargetMask: u8 {
        const CHAMPION  = 1 << 0;
        const MINION    = 1 << 1;
        const MONSTER   = 1 << 2;
        const STRUCTURE = 1 << 3;
        const COMPANION = 1 << 4;
        const TRAP      = 1 << 5;

        const UNITS = Self::CHAMPION.bits() | Self::MINION.bits() | Self::MONSTER.bits();
    }
}

impl TargetMask {
    pub fn of(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Champion => Self::CHAMPION,
            EntityKind::Minion => Self::MINION,
            EntityKind::Monster => Self::MONSTER,
            EntityKind::Structure => Self::STRUCTURE,
            EntityKind::Companion => Self::COMPANION,
            EntityKind::Trap => Self::TRAP,
        }
    }

    pub fn allows(self, kind: EntityKind) -> bool {
        self.intersects(Self::of(kind))
    }
}

impl Default for TargetMask {
    fn default() -> Self {
        Self::UNITS
    }
}

/// An effect an ability applies, with an optional duration override.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectApplication {
    pub effect: EffectId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub duration_ms: Option<u32>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DashConfig {
    pub distance: f32,
    pub duration_ms: u32,
    /// Contact radius around the dashing entity.
    pub collision_radius: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChargeConfig {
    pub min_charge_ms: u32,
    pub max_charge_ms: u32,
    pub min_range: f32,
    pub max_range: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProjectileConfig {
    /// Units per second.
    pub speed: f32,
    pub width: f32,
    /// Keeps flying after the first hit.
    #[cfg_attr(feature = "serde", serde(default))]
    pub piercing: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RecastConfig {
    pub window_ms: u32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrapConfig {
    pub arm_delay_ms: u32,
    pub trigger_radius: f32,
    pub lifetime_ms: u32,
    pub max_active: u8,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoolConfig {
    pub max_charges: u8,
    pub recharge_ms: u32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimedModifier {
    pub stat: StatKind,
    pub kind: ModifierKind,
    pub value: f32,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransformConfig {
    pub duration_ms: u32,
    pub modifiers: Vec<TimedModifier>,
    /// Replaces the attack range while transformed.
    #[cfg_attr(feature = "serde", serde(default))]
    pub attack_range: Option<f32>,
    /// One-time resource stacks granted on cast.
    #[cfg_attr(feature = "serde", serde(default))]
    pub stack_bonus: u32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AuraConfig {
    pub radius: f32,
    pub interval_ms: u32,
    /// Fraction of the ability's damage dealt per pulse.
    pub damage_ratio: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CompanionConfig {
    /// Units per second.
    pub speed: f32,
    pub impact_radius: f32,
    /// Distance from the owner at which a recalled companion stops.
    pub leash: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChannelConfig {
    pub duration_ms: u32,
}

/// Conditional cooldown refund: if any enemy within `radius` carries
/// `marker`, the cast costs no cooldown.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RefundConfig {
    pub marker: EffectId,
    /// Falls back to `GameConfig::refund_scan_radius` when absent.
    #[cfg_attr(feature = "serde", serde(default))]
    pub radius: Option<f32>,
}

/// Static configuration of one ability.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilityDefinition {
    pub kind: AbilityKind,
    pub name: String,
    pub max_rank: u8,
    /// Cooldown per rank, `rank - 1` indexed.
    pub cooldown_ms: Vec<u32>,
    /// Mana cost per rank, `rank - 1` indexed.
    #[cfg_attr(feature = "serde", serde(default))]
    pub cost: Vec<f32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub range: f32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub shape: Shape,
    #[cfg_attr(feature = "serde", serde(default))]
    pub side: TargetSide,
    #[cfg_attr(feature = "serde", serde(default))]
    pub mask: TargetMask,

    #[cfg_attr(feature = "serde", serde(default))]
    pub damage: Option<ScalingTable>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub damage_kind: DamageKind,
    #[cfg_attr(feature = "serde", serde(default))]
    pub heal: Option<ScalingTable>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub shield: Option<ScalingTable>,
    /// How long granted shields last.
    #[cfg_attr(feature = "serde", serde(default))]
    pub shield_duration_ms: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub effects: Vec<EffectApplication>,

    #[cfg_attr(feature = "serde", serde(default))]
    pub dash: Option<DashConfig>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub charge: Option<ChargeConfig>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub projectile: Option<ProjectileConfig>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub recast: Option<RecastConfig>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub trap: Option<TrapConfig>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub pool: Option<PoolConfig>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub transform: Option<TransformConfig>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub aura: Option<AuraConfig>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub companion: Option<CompanionConfig>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub channel: Option<ChannelConfig>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub refund: Option<RefundConfig>,
}

impl AbilityDefinition {
    /// Minimal definition with every optional component absent.
    pub fn new(kind: AbilityKind, max_rank: u8) -> Self {
        Self {
            kind,
            name: kind.to_string(),
            max_rank,
            cooldown_ms: vec![0; usize::from(max_rank)],
            cost: Vec::new(),
            range: 0.0,
            shape: Shape::SelfCast,
            side: TargetSide::Enemy,
            mask: TargetMask::UNITS,
            damage: None,
            damage_kind: DamageKind::Physical,
            heal: None,
            shield: None,
            shield_duration_ms: 0,
            effects: Vec::new(),
            dash: None,
            charge: None,
            projectile: None,
            recast: None,
            trap: None,
            pool: None,
            transform: None,
            aura: None,
            companion: None,
            channel: None,
            refund: None,
        }
    }

    /// Cooldown for `rank` in milliseconds; out-of-table ranks read as zero.
    pub fn cooldown_for(&self, rank: u8) -> u32 {
        rank_index(rank)
            .and_then(|idx| self.cooldown_ms.get(idx))
            .copied()
            .unwrap_or(0)
    }

    /// Mana cost for `rank`; abilities without a cost table are free.
    pub fn cost_for(&self, rank: u8) -> f32 {
        rank_index(rank)
            .and_then(|idx| self.cost.get(idx))
            .copied()
            .unwrap_or(0.0)
    }

    /// Every scaling table this ability carries, labelled for diagnostics.
    pub fn scaling_tables(&self) -> impl Iterator<Item = (&'static str, &ScalingTable)> {
        [
            ("damage", self.damage.as_ref()),
            ("heal", self.heal.as_ref()),
            ("shield", self.shield.as_ref()),
        ]
        .into_iter()
        .filter_map(|(label, table)| table.map(|t| (label, t)))
    }

    /// Effect ids this ability can apply, including its refund marker.
    pub fn referenced_effects(&self) -> impl Iterator<Item = &EffectId> {
        self.effects
            .iter()
            .map(|app| &app.effect)
            .chain(self.refund.as_ref().map(|refund| &refund.marker))
    }
}

pub(crate) fn rank_index(rank: u8) -> Option<usize> {
    usize::from(rank).checked_sub(1)
}
