//! Champion roster loader.

use std::path::Path;

use arena_core::ChampionArchetype;
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Champion roster structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChampionRoster {
    pub champions: Vec<ChampionArchetype>,
}

/// Loader for champion archetypes from RON files.
pub struct ChampionLoader;

impl ChampionLoader {
    /// Load champion roster from a RON file.
    pub fn load(path: &Path) -> LoadResult<Vec<ChampionArchetype>> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<Vec<ChampionArchetype>> {
        let roster: ChampionRoster = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse champion roster RON: {}", e))?;

        Ok(roster.champions)
    }
}
