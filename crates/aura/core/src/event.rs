//! Combat and cast occurrences fed to the engine.

use crate::types::{AuraId, HitMask, ProcEventId, ProcFlags, SchoolMask, SpellId, UnitId};

/// Damage payload supplied by the combat-math subsystem.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageInfo {
    pub attacker: UnitId,
    pub victim: UnitId,
    pub spell: Option<SpellId>,
    pub school: SchoolMask,
    /// Damage before absorption.
    pub amount: u32,
    /// Portion soaked by absorb shields so far.
    pub absorbed: u32,
    pub periodic: bool,
}

impl DamageInfo {
    pub fn new(attacker: UnitId, victim: UnitId, amount: u32, school: SchoolMask) -> Self {
        Self {
            attacker,
            victim,
            spell: None,
            school,
            amount,
            absorbed: 0,
            periodic: false,
        }
    }

    pub fn with_spell(mut self, spell: SpellId) -> Self {
        self.spell = Some(spell);
        self
    }

    pub fn periodic(mut self) -> Self {
        self.periodic = true;
        self
    }

    /// Damage still to be applied after absorption.
    pub fn remaining(&self) -> u32 {
        self.amount.saturating_sub(self.absorbed)
    }
}

/// Heal payload supplied by the combat-math subsystem.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HealInfo {
    pub healer: UnitId,
    pub target: UnitId,
    pub spell: Option<SpellId>,
    pub amount: u32,
    /// Healing that actually landed (excludes overheal).
    pub effective: u32,
    pub periodic: bool,
}

impl HealInfo {
    pub fn new(healer: UnitId, target: UnitId, amount: u32) -> Self {
        Self {
            healer,
            target,
            spell: None,
            amount,
            effective: amount,
            periodic: false,
        }
    }
}

/// Immutable snapshot of one combat/cast occurrence.
///
/// Build one with [`crate::AuraEngine::new_event`] so it carries a fresh id.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProcEventInfo {
    pub id: ProcEventId,
    pub actor: UnitId,
    pub action_target: Option<UnitId>,
    pub spell: Option<SpellId>,
    pub flags: ProcFlags,
    pub hit: HitMask,
    pub school: SchoolMask,
    pub damage: Option<DamageInfo>,
    pub heal: Option<HealInfo>,
    /// Aura whose hook or default action caused this event.
    pub triggered_by: Option<AuraId>,
}

impl ProcEventInfo {
    pub fn new(id: ProcEventId, actor: UnitId, flags: ProcFlags) -> Self {
        Self {
            id,
            actor,
            action_target: None,
            spell: None,
            flags,
            hit: HitMask::NORMAL,
            school: SchoolMask::empty(),
            damage: None,
            heal: None,
            triggered_by: None,
        }
    }

    pub fn with_target(mut self, target: UnitId) -> Self {
        self.action_target = Some(target);
        self
    }

    pub fn with_spell(mut self, spell: SpellId) -> Self {
        self.spell = Some(spell);
        self
    }

    pub fn with_hit(mut self, hit: HitMask) -> Self {
        self.hit = hit;
        self
    }

    pub fn with_school(mut self, school: SchoolMask) -> Self {
        self.school = school;
        self
    }

    pub fn with_damage(mut self, damage: DamageInfo) -> Self {
        self.school = damage.school;
        self.damage = Some(damage);
        self
    }

    pub fn with_heal(mut self, heal: HealInfo) -> Self {
        self.heal = Some(heal);
        self
    }

    pub fn triggered_by(mut self, aura: Option<AuraId>) -> Self {
        self.triggered_by = aura;
        self
    }

    /// The participant on the other side of `unit` in this event.
    pub fn counterpart(&self, unit: UnitId) -> Option<UnitId> {
        if unit == self.actor {
            self.action_target
        } else if self.action_target == Some(unit) {
            Some(self.actor)
        } else {
            None
        }
    }
}
