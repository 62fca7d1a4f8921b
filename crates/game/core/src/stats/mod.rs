//! Stat system.
//!
//! # Architecture
//!
//! ```text
//! [ BaseStats (per archetype, stored) ]
//!      ↓  + timed StatModifiers (abilities, transformations)
//!      ↓  + stat payloads of active effects (× stacks)
//! [ StatsSnapshot (computed, never stored) ]
//! ```
//!
//! ## Principles
//!
//! 1. **SSOT**: Only base stats, current health/mana and modifiers are stored
//! 2. **Snapshot Consistency**: Scaling reads one snapshot per calculation
//! 3. **Deterministic**: Pure functions, no I/O or randomness
//!
//! ## Bonus Stack
//!
//! Every stat uses the same calculation order:
//! `Override → (Base + Flat) × (1 + ΣPercent) → Clamp`

pub mod bonus;
pub mod snapshot;

pub use bonus::{ModifierKind, ModifierSource, ModifierStack, StatModifier};
pub use snapshot::{BaseStats, StatKind, StatsSnapshot};
