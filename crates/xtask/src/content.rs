//! Content location shared by every command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use arena_content::ContentBundle;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "ARENA_DATA_DIR";

/// Loads content from `explicit`, then `$ARENA_DATA_DIR`, then the copy
/// embedded in the binary.
pub fn load(explicit: Option<PathBuf>) -> Result<(ContentBundle, String)> {
    let dir = explicit.or_else(|| std::env::var_os(DATA_DIR_ENV).map(PathBuf::from));
    match dir {
        Some(dir) => {
            let bundle = ContentBundle::from_dir(&dir)
                .with_context(|| format!("Failed to load content from {}", dir.display()))?;
            Ok((bundle, dir.display().to_string()))
        }
        None => {
            let bundle = ContentBundle::embedded().context("Embedded content is invalid")?;
            Ok((bundle, "embedded".to_owned()))
        }
    }
}
