//! Data-driven content definitions and loaders.
//!
//! This crate houses the shipped catalogue and provides loaders for RON/TOML
//! data files:
//! - Effect definitions (`effects.ron`)
//! - Ability definitions (`abilities.ron`)
//! - Champion archetypes and loadouts (`champions.ron`)
//! - Game configuration (`config.toml`)
//!
//! All loaders use arena-core types directly with serde for RON/TOML
//! deserialization. Content is validated once at startup and is read-only
//! afterwards.

#[cfg(feature = "loaders")]
pub mod bundle;
#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use bundle::ContentBundle;
#[cfg(feature = "loaders")]
pub use loaders::{
    AbilityLoader, ChampionLoader, ConfigLoader, ContentFactory, EffectLoader, LoadResult,
};

/// Directory holding the shipped data files.
pub const DATA_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data");
