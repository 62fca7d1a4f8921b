//! Content loaders for reading catalogue data from files.
//!
//! Each loader turns one RON/TOML file into arena-core types. Parsing and
//! reading are split so the same code serves files on disk and data
//! embedded in the binary.

pub mod abilities;
pub mod champions;
pub mod config;
pub mod effects;
pub mod factory;

pub use abilities::{AbilityCatalog, AbilityLoader};
pub use champions::{ChampionLoader, ChampionRoster};
pub use config::ConfigLoader;
pub use effects::{EffectCatalog, EffectLoader};
pub use factory::ContentFactory;

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
