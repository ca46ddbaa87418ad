//! Read-only views handed back to runtime clients.

use serde::{Deserialize, Serialize};

use aura_core::{Aura, AuraId, SpellId, UnitRecord};

/// A unit and the auras it currently carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitSnapshot {
    pub unit: UnitRecord,
    /// Active auras in application order.
    pub auras: Vec<Aura>,
    /// Simulation clock when the snapshot was taken.
    pub now: u64,
}

impl UnitSnapshot {
    pub fn health(&self) -> u32 {
        self.unit.health
    }

    pub fn is_alive(&self) -> bool {
        self.unit.is_alive()
    }

    /// First aura of `spell`, regardless of caster.
    pub fn aura(&self, spell: SpellId) -> Option<&Aura> {
        self.auras.iter().find(|aura| aura.spell() == spell)
    }

    pub fn aura_by_id(&self, id: AuraId) -> Option<&Aura> {
        self.auras.iter().find(|aura| aura.id() == id)
    }

    pub fn has_aura(&self, spell: SpellId) -> bool {
        self.aura(spell).is_some()
    }
}

/// How one damage request played out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageReport {
    /// Damage before absorption.
    pub amount: u32,
    pub absorbed: u32,
    /// Health actually removed.
    pub dealt: u32,
    pub killed: bool,
}
