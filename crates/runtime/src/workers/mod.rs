//! Worker tasks that back the runtime orchestration.
//!
//! The simulation worker owns the world; it applies commands and advances
//! the fixed-rate step.

mod simulation;

pub use simulation::{Command, SimulationWorker};
