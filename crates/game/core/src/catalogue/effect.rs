//! Effect catalogue: static definitions of every timed effect and the
//! classification helpers the engine and handlers use.
//!
//! Classification always reads the definition's explicit [`EffectPayload`]
//! discriminant and [`EffectCategory`]. The only string-based logic is
//! [`fallback_category`], used for ids the catalogue does not know.

use std::collections::BTreeMap;
use std::fmt;

use crate::stats::{ModifierKind, StatKind};

/// Identifier of an effect definition (e.g. `"blitz_haste"`).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct EffectId(pub String);

impl EffectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EffectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EffectId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum EffectCategory {
    Buff,
    Debuff,
}

/// What happens when an entity already holding an effect receives it again.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum StackBehavior {
    /// Replace the remaining duration.
    Refresh,
    /// Add one stack up to `max_stacks` and refresh the duration.
    Stack,
}

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum CrowdControlKind {
    /// No movement, no casting.
    Stun,
    /// No casting.
    Silence,
    /// No movement.
    Root,
}

/// Damage channel used for mitigation.
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
pub enum DamageKind {
    /// Mitigated by armor.
    #[default]
    Physical,
    /// Mitigated by magic resist.
    Magic,
    /// Ignores mitigation.
    True,
}

/// Per-interval behavior of an over-time effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OverTimeKind {
    Damage(DamageKind),
    Heal,
}

/// Explicit discriminant of what an effect does while active.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectPayload {
    CrowdControl {
        kind: CrowdControlKind,
    },
    /// Stat delta applied once per stack.
    Stat {
        stat: StatKind,
        kind: ModifierKind,
        value: f32,
    },
    /// Value applied every `interval_ms`, multiplied by stacks.
    OverTime {
        value: f32,
        interval_ms: u32,
        kind: OverTimeKind,
    },
    Shield {
        amount: f32,
    },
    /// No behavior of its own; other abilities look for it.
    Marker,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectDefinition {
    pub id: EffectId,
    pub category: EffectCategory,
    pub stacking: StackBehavior,
    #[cfg_attr(feature = "serde", serde(default = "one_stack"))]
    pub max_stacks: u8,
    #[cfg_attr(feature = "serde", serde(default))]
    pub cleansable: bool,
    /// Default duration, used when the applying ability does not override it.
    pub duration_ms: u32,
    pub payload: EffectPayload,
}

#[cfg(feature = "serde")]
fn one_stack() -> u8 {
    1
}

impl EffectDefinition {
    pub fn is_crowd_control(&self) -> bool {
        matches!(self.payload, EffectPayload::CrowdControl { .. })
    }

    pub fn is_stat(&self) -> bool {
        matches!(self.payload, EffectPayload::Stat { .. })
    }

    pub fn is_over_time(&self) -> bool {
        matches!(self.payload, EffectPayload::OverTime { .. })
    }

    pub fn is_shield(&self) -> bool {
        matches!(self.payload, EffectPayload::Shield { .. })
    }

    pub fn crowd_control(&self) -> Option<CrowdControlKind> {
        match self.payload {
            EffectPayload::CrowdControl { kind } => Some(kind),
            _ => None,
        }
    }
}

/// Substrings that mark an unknown effect id as a debuff.
const DEBUFF_HINTS: [&str; 10] = [
    "stun", "slow", "root", "silence", "snare", "burn", "poison", "bleed", "mark", "weaken",
];

/// Category guess for ids absent from the catalogue.
///
/// Matches the id against [`DEBUFF_HINTS`]; anything else is a buff. Never
/// consulted for catalogued ids.
pub fn fallback_category(id: &str) -> EffectCategory {
    let lower = id.to_ascii_lowercase();
    if DEBUFF_HINTS.iter().any(|hint| lower.contains(hint)) {
        EffectCategory::Debuff
    } else {
        EffectCategory::Buff
    }
}

/// All effect definitions, keyed by id.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EffectCatalogue {
    effects: BTreeMap<EffectId, EffectDefinition>,
}

impl EffectCatalogue {
    pub fn new(definitions: impl IntoIterator<Item = EffectDefinition>) -> Self {
        Self {
            effects: definitions
                .into_iter()
                .map(|def| (def.id.clone(), def))
                .collect(),
        }
    }

    pub fn get(&self, id: &EffectId) -> Option<&EffectDefinition> {
        self.effects.get(id)
    }

    pub fn contains(&self, id: &EffectId) -> bool {
        self.effects.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EffectDefinition> {
        self.effects.values()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Category of `id`: the catalogue entry when present, otherwise
    /// [`fallback_category`].
    pub fn category_of(&self, id: &EffectId) -> EffectCategory {
        self.effects
            .get(id)
            .map(|def| def.category)
            .unwrap_or_else(|| fallback_category(id.as_str()))
    }

    /// Splits `ids` into `(buffs, debuffs)`, preserving input order. Every id
    /// lands in exactly one side.
    pub fn partition<'a, I>(&self, ids: I) -> (Vec<EffectId>, Vec<EffectId>)
    where
        I: IntoIterator<Item = &'a EffectId>,
    {
        ids.into_iter()
            .cloned()
            .partition(|id| self.category_of(id) == EffectCategory::Buff)
    }

    pub fn is_crowd_control(&self, id: &EffectId) -> bool {
        self.get(id).is_some_and(EffectDefinition::is_crowd_control)
    }

    pub fn is_stat(&self, id: &EffectId) -> bool {
        self.get(id).is_some_and(EffectDefinition::is_stat)
    }

    pub fn is_over_time(&self, id: &EffectId) -> bool {
        self.get(id).is_some_and(EffectDefinition::is_over_time)
    }

    pub fn is_shield(&self, id: &EffectId) -> bool {
        self.get(id).is_some_and(EffectDefinition::is_shield)
    }
}
