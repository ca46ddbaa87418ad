//! Data-driven spell content and the bundled aura scripts.
//!
//! This crate provides:
//! - Spell catalog loading (RON) into [`aura_core::SpellCatalog`]
//! - Engine configuration loading (TOML) into [`aura_core::EngineConfig`]
//! - Content scripts implementing [`aura_core::AuraScript`], registered into a
//!   [`aura_core::HookRegistry`] with [`scripts::register_all`]
//!
//! Scripts only touch engine state through the commands they queue on their
//! hook context, so they are safe to load into any host.

pub mod scripts;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use scripts::{ScriptReport, all_scripts, register_all};

#[cfg(feature = "loaders")]
pub use loaders::{ConfigLoader, ContentFactory, LoadResult, SpellCatalogLoader};
