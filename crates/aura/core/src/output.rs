//! Outbound work the engine hands to its host.
//!
//! The engine never mutates health or talks to clients. It records
//! structural notifications for the packet layer and combat requests for
//! the combat-math subsystem; the host drains both after each call.

use crate::types::{AuraId, EffectIndex, RemoveMode, SchoolMask, SpellId, UnitId};

/// Structural aura change for the notification layer.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum AuraNotification {
    Applied {
        aura: AuraId,
        unit: UnitId,
        spell: SpellId,
        caster: UnitId,
        stacks: u8,
        duration: Option<u32>,
    },
    Refreshed {
        aura: AuraId,
        unit: UnitId,
        spell: SpellId,
        duration: Option<u32>,
    },
    StackChanged {
        aura: AuraId,
        unit: UnitId,
        spell: SpellId,
        previous: u8,
        current: u8,
    },
    AmountChanged {
        aura: AuraId,
        unit: UnitId,
        effect: EffectIndex,
        previous: i32,
        current: i32,
    },
    ChargesChanged {
        aura: AuraId,
        unit: UnitId,
        previous: u8,
        current: u8,
    },
    Removed {
        aura: AuraId,
        unit: UnitId,
        spell: SpellId,
        mode: RemoveMode,
    },
}

impl AuraNotification {
    pub fn aura(&self) -> AuraId {
        match self {
            Self::Applied { aura, .. }
            | Self::Refreshed { aura, .. }
            | Self::StackChanged { aura, .. }
            | Self::AmountChanged { aura, .. }
            | Self::ChargesChanged { aura, .. }
            | Self::Removed { aura, .. } => *aura,
        }
    }

    pub fn unit(&self) -> UnitId {
        match self {
            Self::Applied { unit, .. }
            | Self::Refreshed { unit, .. }
            | Self::StackChanged { unit, .. }
            | Self::AmountChanged { unit, .. }
            | Self::ChargesChanged { unit, .. }
            | Self::Removed { unit, .. } => *unit,
        }
    }
}

/// Work for the combat-math subsystem.
///
/// `triggered_by` names the aura whose hook or default action produced the
/// request; the host copies it onto the resulting proc event so that aura is
/// never re-evaluated against its own output.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum CombatRequest {
    Damage {
        source: UnitId,
        target: UnitId,
        spell: SpellId,
        amount: u32,
        school: SchoolMask,
        periodic: bool,
        triggered_by: Option<AuraId>,
    },
    Heal {
        source: UnitId,
        target: UnitId,
        spell: SpellId,
        amount: u32,
        periodic: bool,
        triggered_by: Option<AuraId>,
    },
    CastSpell {
        caster: UnitId,
        target: UnitId,
        spell: SpellId,
        triggered_by: Option<AuraId>,
    },
    PlayVisual {
        unit: UnitId,
        spell: SpellId,
        visual: u32,
    },
}

impl CombatRequest {
    pub fn triggered_by(&self) -> Option<AuraId> {
        match self {
            Self::Damage { triggered_by, .. }
            | Self::Heal { triggered_by, .. }
            | Self::CastSpell { triggered_by, .. } => *triggered_by,
            Self::PlayVisual { .. } => None,
        }
    }
}

/// Everything queued since the host last drained the engine.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EngineOutput {
    pub notifications: Vec<AuraNotification>,
    pub requests: Vec<CombatRequest>,
}

impl EngineOutput {
    pub fn is_empty(&self) -> bool {
        self.notifications.is_empty() && self.requests.is_empty()
    }

    pub(crate) fn notify(&mut self, notification: AuraNotification) {
        self.notifications.push(notification);
    }

    pub(crate) fn request(&mut self, request: CombatRequest) {
        self.requests.push(request);
    }
}
