//! Authoritative aura state.
//!
//! This module owns the data structures describing applied auras and their
//! effects. Hosts query this state but mutate it exclusively through the
//! [`crate::AuraEngine`].
mod aura;
mod container;
mod effect;
mod world;

pub use aura::{Aura, AuraEffects, AuraState, CastContext, Difficulty};
pub use container::AuraContainer;
pub use effect::{AuraEffect, PeriodicTimer, ScriptData};
pub use world::World;
