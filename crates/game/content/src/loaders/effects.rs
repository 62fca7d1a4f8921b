//! Effect catalog loader.

use std::path::Path;

use arena_core::EffectDefinition;
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Effect catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectCatalog {
    pub effects: Vec<EffectDefinition>,
}

/// Loader for effect definitions from RON files.
pub struct EffectLoader;

impl EffectLoader {
    /// Load effect catalog from a RON file.
    pub fn load(path: &Path) -> LoadResult<Vec<EffectDefinition>> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<Vec<EffectDefinition>> {
        let catalog: EffectCatalog = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse effect catalog RON: {}", e))?;

        let mut seen = std::collections::BTreeSet::new();
        for effect in &catalog.effects {
            if !seen.insert(effect.id.clone()) {
                anyhow::bail!("Effect {} is defined more than once", effect.id);
            }
        }
        Ok(catalog.effects)
    }
}

#[cfg(test)]
mod tests {
    use arena_core::catalogue::{CrowdControlKind, EffectPayload};

    use super::*;

    #[test]
    fn max_stacks_defaults_to_one() {
        let effects = EffectLoader::parse(
            r#"(effects: [(
                id: "stun",
                category: Debuff,
                stacking: Refresh,
                duration_ms: 1000,
                payload: CrowdControl(kind: Stun),
            )])"#,
        )
        .unwrap();

        assert_eq!(effects[0].max_stacks, 1);
        assert!(!effects[0].cleansable);
        assert_eq!(
            effects[0].payload,
            EffectPayload::CrowdControl {
                kind: CrowdControlKind::Stun
            }
        );
    }
}
