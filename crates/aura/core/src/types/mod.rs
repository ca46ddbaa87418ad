//! Plain data types shared by the engine, oracles, and hooks.

mod aura_type;
mod flags;
mod ids;
mod remove;

pub use aura_type::AuraType;
pub use flags::{HandleMode, HitMask, ProcFlags, SchoolMask, SpellAttributes};
pub use ids::{AuraId, EffectIndex, ItemId, ProcEventId, SpellId, UnitId};
pub use remove::{RemoveMode, RemoveModes};
