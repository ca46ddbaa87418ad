//! Worker tasks that back the runtime orchestration.
//!
//! The simulation worker owns the shard and resolves combat through the
//! combat host; the aura-log worker keeps file I/O off the simulation task.

mod aura_log;
mod combat;
mod simulation;

pub use aura_log::{AuraLogEntry, AuraLogWorker};
pub use combat::{CombatHost, default_damage_flags};
pub use simulation::{Command, SimulationWorker};
