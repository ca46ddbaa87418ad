//! Runtime orchestration for one deterministic aura world shard.
//!
//! This crate wires the aura engine, a combat host, and worker tasks into a
//! cohesive runtime API. Consumers embed [`Runtime`] to drive the shard,
//! subscribe to events, and interact with units through [`RuntimeHandle`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`config`] holds runtime settings and their environment overrides
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides topic-based event bus for flexible event routing
//! - `workers` keeps background tasks internal to the crate
pub mod api;
pub mod config;
pub mod events;
pub mod runtime;

mod workers;

pub use api::{DamageReport, Result, RuntimeError, RuntimeHandle, UnitSnapshot};
pub use config::RuntimeConfig;
pub use events::{CombatEvent, Event, EventBus, Topic, UnitEvent};
pub use runtime::{Runtime, RuntimeBuilder};
pub use workers::AuraLogEntry;
