//! Event types for different topics.

use arena_core::{CastCommand, CastReport, StepReport, Tick};
use serde::{Deserialize, Serialize};

/// Events related to player commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CastEvent {
    /// A command was accepted and applied.
    Resolved { tick: Tick, report: CastReport },

    /// A command was refused; nothing was charged.
    Rejected {
        tick: Tick,
        command: CastCommand,
        code: String,
        reason: String,
    },
}

/// One simulation step and everything it produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickEvent {
    pub report: StepReport,
}
