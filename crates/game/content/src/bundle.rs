//! Validated content ready to hand to the engine.

use std::path::Path;

use arena_core::{Catalogue, GameConfig, HandlerRegistry};

use crate::loaders::{
    AbilityLoader, ChampionLoader, ConfigLoader, ContentFactory, EffectLoader, LoadResult,
};

const EMBEDDED_CONFIG: &str = include_str!("../data/config.toml");
const EMBEDDED_EFFECTS: &str = include_str!("../data/effects.ron");
const EMBEDDED_ABILITIES: &str = include_str!("../data/abilities.ron");
const EMBEDDED_CHAMPIONS: &str = include_str!("../data/champions.ron");

/// Catalogue and configuration that passed startup validation.
#[derive(Clone, Debug)]
pub struct ContentBundle {
    pub catalogue: Catalogue,
    pub config: GameConfig,
}

impl ContentBundle {
    /// The data shipped with this crate.
    pub fn embedded() -> LoadResult<Self> {
        let config = ConfigLoader::parse(EMBEDDED_CONFIG)?;
        let effects = EffectLoader::parse(EMBEDDED_EFFECTS)?;
        let abilities = AbilityLoader::parse(EMBEDDED_ABILITIES)?;
        let champions = ChampionLoader::parse(EMBEDDED_CHAMPIONS)?;
        let catalogue = Catalogue::new(abilities, effects).with_champions(champions);
        Self::validated(catalogue, config, HandlerRegistry::global())
    }

    /// Loads every file under `data_dir`.
    pub fn from_dir(data_dir: &Path) -> LoadResult<Self> {
        let factory = ContentFactory::new(data_dir);
        let config = factory.load_config()?;
        let catalogue = factory.load_catalogue()?;
        Self::validated(catalogue, config, HandlerRegistry::global())
    }

    /// Runs the catalogue checks and then the handler requirements against
    /// `registry`. Any violation is fatal.
    pub fn validated(
        catalogue: Catalogue,
        config: GameConfig,
        registry: &HandlerRegistry,
    ) -> LoadResult<Self> {
        catalogue
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid catalogue: {}", e))?;
        registry
            .validate_against(&catalogue)
            .map_err(|e| anyhow::anyhow!("Handler requirements not met: {}", e))?;
        Ok(Self { catalogue, config })
    }
}
