//! Ability catalog loader.

use std::path::Path;

use arena_core::AbilityDefinition;
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Ability catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbilityCatalog {
    pub abilities: Vec<AbilityDefinition>,
}

/// Loader for ability definitions from RON files.
pub struct AbilityLoader;

impl AbilityLoader {
    /// Load ability catalog from a RON file.
    pub fn load(path: &Path) -> LoadResult<Vec<AbilityDefinition>> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    /// Parses an ability catalog, rejecting duplicate kinds.
    pub fn parse(content: &str) -> LoadResult<Vec<AbilityDefinition>> {
        let catalog: AbilityCatalog = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse ability catalog RON: {}", e))?;

        let mut seen = std::collections::BTreeSet::new();
        for ability in &catalog.abilities {
            if !seen.insert(ability.kind) {
                anyhow::bail!("Ability {} is defined more than once", ability.kind);
            }
        }
        Ok(catalog.abilities)
    }
}
