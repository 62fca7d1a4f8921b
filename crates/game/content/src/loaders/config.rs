//! Game configuration loader.

use std::path::Path;

use arena_core::GameConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for game configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    ///
    /// Missing keys fall back to [`GameConfig::default`].
    pub fn load(path: &Path) -> LoadResult<GameConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<GameConfig> {
        let config: GameConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;
        if config.tick_rate == 0 {
            anyhow::bail!("tick_rate must be positive");
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_use_defaults() {
        let config = ConfigLoader::parse("tick_rate = 20").unwrap();
        assert_eq!(config.tick_rate, 20);
        assert_eq!(
            config.refund_scan_radius,
            GameConfig::DEFAULT_REFUND_SCAN_RADIUS
        );
    }

    #[test]
    fn zero_tick_rate_is_rejected() {
        assert!(ConfigLoader::parse("tick_rate = 0").is_err());
    }
}
