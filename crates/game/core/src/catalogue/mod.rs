//! Static game data: abilities, effects and champion archetypes.
//!
//! The catalogue is immutable at runtime. [`Catalogue::validate`] must pass
//! before a world is simulated against it; every configuration mistake that
//! could otherwise surface mid-cast (a rank past the end of a scaling table,
//! an effect id nobody defined) is reported there instead.

pub mod ability;
pub mod effect;
pub mod kind;

use std::collections::BTreeMap;

pub use ability::{
    AbilityDefinition, AuraConfig, ChannelConfig, ChargeConfig, CompanionConfig, DashConfig,
    EffectApplication, PoolConfig, ProjectileConfig, RecastConfig, RefundConfig, ScalingTable,
    Shape, TargetMask, TargetSide, TimedModifier, TransformConfig, TrapConfig,
};
pub use effect::{
    CrowdControlKind, DamageKind, EffectCatalogue, EffectCategory, EffectDefinition, EffectId,
    EffectPayload, OverTimeKind, StackBehavior, fallback_category,
};
pub use kind::AbilityKind;

use crate::error::{ErrorSeverity, GameError};
use crate::state::Loadout;
use crate::stats::BaseStats;

/// Spawn template for a playable character.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChampionArchetype {
    pub name: String,
    pub stats: BaseStats,
    pub loadout: Loadout,
    #[cfg_attr(feature = "serde", serde(default = "default_radius"))]
    pub radius: f32,
}

#[cfg(feature = "serde")]
fn default_radius() -> f32 {
    crate::state::Entity::DEFAULT_RADIUS
}

/// Configuration invariant violations, reported at startup.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{ability}: max rank {max_rank} exceeds {table} scaling table of length {len}")]
    RankExceedsScaling {
        ability: AbilityKind,
        table: &'static str,
        max_rank: u8,
        len: usize,
    },

    #[error("{ability}: max rank {max_rank} exceeds {table} table of length {len}")]
    RankExceedsTable {
        ability: AbilityKind,
        table: &'static str,
        max_rank: u8,
        len: usize,
    },

    #[error("{ability}: max rank must be at least 1")]
    ZeroMaxRank { ability: AbilityKind },

    #[error("{ability} references unknown effect '{effect}'")]
    UnknownEffect {
        ability: AbilityKind,
        effect: EffectId,
    },

    #[error("effect '{effect}' is invalid: {reason}")]
    InvalidEffect {
        effect: EffectId,
        reason: &'static str,
    },

    #[error("{ability}: {reason}")]
    InvalidMechanic {
        ability: AbilityKind,
        reason: &'static str,
    },

    #[error("{ability} requires a '{component}' configuration")]
    MissingComponent {
        ability: AbilityKind,
        component: &'static str,
    },

    #[error("handler registered for {ability}, which has no catalogue entry")]
    UnknownAbility { ability: AbilityKind },

    #[error("champion '{champion}' binds {ability}, which has no catalogue entry")]
    UnboundLoadout {
        champion: String,
        ability: AbilityKind,
    },
}

impl GameError for ConfigError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::RankExceedsScaling { .. } => "CONFIG_RANK_EXCEEDS_SCALING",
            Self::RankExceedsTable { .. } => "CONFIG_RANK_EXCEEDS_TABLE",
            Self::ZeroMaxRank { .. } => "CONFIG_ZERO_MAX_RANK",
            Self::UnknownEffect { .. } => "CONFIG_UNKNOWN_EFFECT",
            Self::InvalidEffect { .. } => "CONFIG_INVALID_EFFECT",
            Self::InvalidMechanic { .. } => "CONFIG_INVALID_MECHANIC",
            Self::MissingComponent { .. } => "CONFIG_MISSING_COMPONENT",
            Self::UnknownAbility { .. } => "CONFIG_UNKNOWN_ABILITY",
            Self::UnboundLoadout { .. } => "CONFIG_UNBOUND_LOADOUT",
        }
    }
}

/// Every static definition the engine reads.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Catalogue {
    abilities: BTreeMap<AbilityKind, AbilityDefinition>,
    effects: EffectCatalogue,
    champions: BTreeMap<String, ChampionArchetype>,
}

impl Catalogue {
    pub fn new(
        abilities: impl IntoIterator<Item = AbilityDefinition>,
        effects: impl IntoIterator<Item = EffectDefinition>,
    ) -> Self {
        Self {
            abilities: abilities.into_iter().map(|def| (def.kind, def)).collect(),
            effects: EffectCatalogue::new(effects),
            champions: BTreeMap::new(),
        }
    }

    pub fn with_champions(
        mut self,
        champions: impl IntoIterator<Item = ChampionArchetype>,
    ) -> Self {
        self.champions
            .extend(champions.into_iter().map(|c| (c.name.clone(), c)));
        self
    }

    pub fn ability(&self, kind: AbilityKind) -> Option<&AbilityDefinition> {
        self.abilities.get(&kind)
    }

    pub fn abilities(&self) -> impl Iterator<Item = &AbilityDefinition> {
        self.abilities.values()
    }

    pub fn effects(&self) -> &EffectCatalogue {
        &self.effects
    }

    pub fn effect(&self, id: &EffectId) -> Option<&EffectDefinition> {
        self.effects.get(id)
    }

    pub fn champion(&self, name: &str) -> Option<&ChampionArchetype> {
        self.champions.get(name)
    }

    pub fn champions(&self) -> impl Iterator<Item = &ChampionArchetype> {
        self.champions.values()
    }

    /// Checks every cross-reference and table length. Stops at the first
    /// violation; abilities are visited in `AbilityKind` order.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for effect in self.effects.iter() {
            validate_effect(effect)?;
        }
        for ability in self.abilities.values() {
            self.validate_ability(ability)?;
        }
        for champion in self.champions.values() {
            for (_, ability) in champion.loadout.iter() {
                if !self.abilities.contains_key(&ability) {
                    return Err(ConfigError::UnboundLoadout {
                        champion: champion.name.clone(),
                        ability,
                    });
                }
            }
        }
        Ok(())
    }

    fn validate_ability(&self, def: &AbilityDefinition) -> Result<(), ConfigError> {
        let ability = def.kind;
        let max_rank = def.max_rank;
        if max_rank == 0 {
            return Err(ConfigError::ZeroMaxRank { ability });
        }
        let ranks = usize::from(max_rank);

        for (table, scaling) in def.scaling_tables() {
            if scaling.base.len() < ranks {
                return Err(ConfigError::RankExceedsScaling {
                    ability,
                    table,
                    max_rank,
                    len: scaling.base.len(),
                });
            }
        }
        if def.cooldown_ms.len() < ranks {
            return Err(ConfigError::RankExceedsTable {
                ability,
                table: "cooldown",
                max_rank,
                len: def.cooldown_ms.len(),
            });
        }
        if !def.cost.is_empty() && def.cost.len() < ranks {
            return Err(ConfigError::RankExceedsTable {
                ability,
                table: "cost",
                max_rank,
                len: def.cost.len(),
            });
        }

        for effect in def.referenced_effects() {
            if !self.effects.contains(effect) {
                return Err(ConfigError::UnknownEffect {
                    ability,
                    effect: effect.clone(),
                });
            }
        }

        let mechanic = |reason| ConfigError::InvalidMechanic { ability, reason };
        if def
            .charge
            .is_some_and(|c| c.max_charge_ms < c.min_charge_ms || c.max_range < c.min_range)
        {
            return Err(mechanic("charge maximum below minimum"));
        }
        if def.pool.is_some_and(|pool| pool.max_charges == 0) {
            return Err(mechanic("charge pool holds no charges"));
        }
        if def.trap.is_some_and(|trap| trap.max_active == 0) {
            return Err(mechanic("trap limit is zero"));
        }
        if def.shield.is_some() && def.shield_duration_ms == 0 {
            return Err(mechanic("shield without a duration"));
        }
        if def.aura.is_some_and(|aura| aura.interval_ms == 0) {
            return Err(mechanic("aura interval is zero"));
        }
        Ok(())
    }
}

fn validate_effect(def: &EffectDefinition) -> Result<(), ConfigError> {
    let invalid = |reason| ConfigError::InvalidEffect {
        effect: def.id.clone(),
        reason,
    };
    if def.max_stacks == 0 {
        return Err(invalid("max_stacks must be at least 1"));
    }
    if def.stacking == StackBehavior::Refresh && def.max_stacks != 1 {
        return Err(invalid("refresh effects cannot stack"));
    }
    match def.payload {
        EffectPayload::OverTime { interval_ms: 0, .. } => Err(invalid("over-time interval is zero")),
        EffectPayload::Shield { amount } if amount <= 0.0 => Err(invalid("shield amount must be positive")),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stun() -> EffectDefinition {
        EffectDefinition {
            id: EffectId::new("stun"),
            category: EffectCategory::Debuff,
            stacking: StackBehavior::Refresh,
            max_stacks: 1,
            cleansable: true,
            duration_ms: 1000,
            payload: EffectPayload::CrowdControl {
                kind: CrowdControlKind::Stun,
            },
        }
    }

    fn slam(ranks: usize) -> AbilityDefinition {
        let mut def = AbilityDefinition::new(AbilityKind::GroundSlam, 3);
        def.damage = Some(ScalingTable {
            base: vec![80.0; ranks],
            ad_ratio: 0.6,
            ..ScalingTable::default()
        });
        def.effects.push(EffectApplication {
            effect: EffectId::new("stun"),
            duration_ms: None,
        });
        def
    }

    #[test]
    fn accepts_consistent_catalogue() {
        let catalogue = Catalogue::new([slam(3)], [stun()]);
        assert_eq!(catalogue.validate(), Ok(()));
    }

    #[test]
    fn rejects_rank_past_scaling_table() {
        let catalogue = Catalogue::new([slam(2)], [stun()]);
        let err = catalogue.validate().unwrap_err();
        assert_eq!(
            err,
            ConfigError::RankExceedsScaling {
                ability: AbilityKind::GroundSlam,
                table: "damage",
                max_rank: 3,
                len: 2,
            }
        );
        assert_eq!(err.severity(), ErrorSeverity::Fatal);
        assert_eq!(err.error_code(), "CONFIG_RANK_EXCEEDS_SCALING");
    }

    #[test]
    fn rejects_unknown_effect_reference() {
        let catalogue = Catalogue::new([slam(3)], []);
        assert!(matches!(
            catalogue.validate(),
            Err(ConfigError::UnknownEffect { ability: AbilityKind::GroundSlam, .. })
        ));
    }

    #[test]
    fn rejects_champion_bound_to_missing_ability() {
        let champion = ChampionArchetype {
            name: "warden".into(),
            stats: BaseStats::default(),
            loadout: Loadout::new([
                AbilityKind::GroundSlam,
                AbilityKind::Sanctuary,
                AbilityKind::GroundSlam,
                AbilityKind::GroundSlam,
            ]),
            radius: 35.0,
        };
        let catalogue = Catalogue::new([slam(3)], [stun()]).with_champions([champion]);
        assert!(matches!(
            catalogue.validate(),
            Err(ConfigError::UnboundLoadout { ability: AbilityKind::Sanctuary, .. })
        ));
    }
}
