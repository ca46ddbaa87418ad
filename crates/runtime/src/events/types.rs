//! Event types for different topics.

use serde::{Deserialize, Serialize};

use aura_core::{AuraId, SchoolMask, SpellId, UnitId};

/// Combat outcomes resolved by the shard's combat host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatEvent {
    /// Damage landed after absorb shields soaked their share.
    Damage {
        source: UnitId,
        target: UnitId,
        spell: Option<SpellId>,
        school: SchoolMask,
        /// Damage before absorption.
        amount: u32,
        absorbed: u32,
        /// Health actually removed.
        dealt: u32,
        periodic: bool,
    },

    Heal {
        source: UnitId,
        target: UnitId,
        spell: Option<SpellId>,
        amount: u32,
        /// Healing that landed (excludes overheal).
        effective: u32,
        periodic: bool,
    },

    /// A spell landed on a target. `aura` is set when it applied or refreshed an aura.
    SpellCast {
        caster: UnitId,
        target: UnitId,
        spell: SpellId,
        aura: Option<AuraId>,
    },

    Visual {
        unit: UnitId,
        spell: SpellId,
        visual: u32,
    },
}

/// Unit lifecycle changes inside the shard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitEvent {
    Spawned { unit: UnitId },
    Died { unit: UnitId, killer: Option<UnitId> },
    /// Simulation clock after an `advance` step.
    ClockAdvanced { now: u64 },
}
