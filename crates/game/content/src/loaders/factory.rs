//! Content factory for building the catalogue from data files.

use std::path::{Path, PathBuf};

use arena_core::{AbilityDefinition, Catalogue, ChampionArchetype, EffectDefinition, GameConfig};

use crate::loaders::{AbilityLoader, ChampionLoader, ConfigLoader, EffectLoader, LoadResult};

/// Content factory that loads all game content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// ├── effects.ron
/// ├── abilities.ron
/// └── champions.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load game configuration from `config.toml`.
    pub fn load_config(&self) -> LoadResult<GameConfig> {
        let path = self.data_dir.join("config.toml");
        ConfigLoader::load(&path)
    }

    /// Load effect definitions from `effects.ron`.
    pub fn load_effects(&self) -> LoadResult<Vec<EffectDefinition>> {
        let path = self.data_dir.join("effects.ron");
        EffectLoader::load(&path)
    }

    /// Load ability definitions from `abilities.ron`.
    pub fn load_abilities(&self) -> LoadResult<Vec<AbilityDefinition>> {
        let path = self.data_dir.join("abilities.ron");
        AbilityLoader::load(&path)
    }

    /// Load champion archetypes from `champions.ron`.
    pub fn load_champions(&self) -> LoadResult<Vec<ChampionArchetype>> {
        let path = self.data_dir.join("champions.ron");
        ChampionLoader::load(&path)
    }

    /// Load and assemble the full catalogue. No validation is performed
    /// here; see [`crate::ContentBundle`].
    pub fn load_catalogue(&self) -> LoadResult<Catalogue> {
        let effects = self.load_effects()?;
        let abilities = self.load_abilities()?;
        let champions = self.load_champions()?;
        Ok(Catalogue::new(abilities, effects).with_champions(champions))
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_paths() {
        let factory = ContentFactory::new("/tmp/data");
        assert_eq!(factory.data_dir(), Path::new("/tmp/data"));
    }

    #[test]
    fn missing_files_name_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = ContentFactory::new(dir.path()).load_config().unwrap_err();
        assert!(err.to_string().contains("config.toml"));
    }
}
