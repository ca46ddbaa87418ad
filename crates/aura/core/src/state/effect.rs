//! One numbered effect inside an aura.

use crate::config::EngineConfig;
use crate::types::{AuraType, EffectIndex, SchoolMask, SpellId};

/// Tick bookkeeping of a periodic effect.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PeriodicTimer {
    /// Cleared by hooks (or after a one-shot tick) to stop ticking without removing the aura.
    pub enabled: bool,
    /// Tick period in milliseconds. 0 fires a single tick.
    pub amplitude: u32,
    /// Time accumulated since the last tick.
    pub accumulated: u32,
    /// Ticks fired so far.
    pub tick_number: u32,
}

impl PeriodicTimer {
    pub fn new(amplitude: u32) -> Self {
        Self {
            enabled: true,
            amplitude,
            accumulated: 0,
            tick_number: 0,
        }
    }

    pub fn is_one_shot(&self) -> bool {
        self.amplitude == 0
    }
}

/// Per-effect integer slots that scripts use instead of captured state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScriptData {
    slots: [i64; EngineConfig::MAX_SCRIPT_SLOTS],
}

impl Default for ScriptData {
    fn default() -> Self {
        Self {
            slots: [0; EngineConfig::MAX_SCRIPT_SLOTS],
        }
    }
}

impl ScriptData {
    /// Reads a slot. Out-of-range slots read as 0.
    pub fn get(&self, slot: usize) -> i64 {
        self.slots.get(slot).copied().unwrap_or(0)
    }

    /// Returns false if the slot is out of range.
    pub fn set(&mut self, slot: usize, value: i64) -> bool {
        match self.slots.get_mut(slot) {
            Some(entry) => {
                *entry = value;
                true
            }
            None => false,
        }
    }

    pub fn add(&mut self, slot: usize, delta: i64) -> bool {
        match self.slots.get_mut(slot) {
            Some(entry) => {
                *entry = entry.saturating_add(delta);
                true
            }
            None => false,
        }
    }

    /// Shifts `value` into the ring `start..start + len`, dropping the oldest entry.
    ///
    /// Slot `start` always holds the newest value.
    pub fn push_ring(&mut self, start: usize, len: usize, value: i64) -> bool {
        let Some(end) = start.checked_add(len) else {
            return false;
        };
        if len == 0 || end > self.slots.len() {
            return false;
        }
        let ring = &mut self.slots[start..end];
        ring.rotate_right(1);
        ring[0] = value;
        true
    }

    /// Sum of the ring `start..start + len`. Out-of-range slots contribute 0.
    pub fn sum(&self, start: usize, len: usize) -> i64 {
        (start..start.saturating_add(len))
            .map(|slot| self.get(slot))
            .fold(0i64, i64::saturating_add)
    }
}

/// Live state of one aura effect.
///
/// The amount is private: it only changes through the engine's resolver
/// commit path so recalculation, stacking, and notifications stay consistent.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AuraEffect {
    pub(crate) index: EffectIndex,
    pub(crate) aura_type: AuraType,
    amount: i32,
    pub(crate) can_be_recalculated: bool,
    pub(crate) volatile: bool,
    pub(crate) school: SchoolMask,
    pub(crate) trigger_spell: Option<SpellId>,
    pub(crate) periodic: Option<PeriodicTimer>,
    pub(crate) script_data: ScriptData,
}

impl AuraEffect {
    pub(crate) fn new(index: EffectIndex, aura_type: AuraType) -> Self {
        Self {
            index,
            aura_type,
            amount: 0,
            can_be_recalculated: true,
            volatile: false,
            school: SchoolMask::empty(),
            trigger_spell: None,
            periodic: None,
            script_data: ScriptData::default(),
        }
    }

    pub fn index(&self) -> EffectIndex {
        self.index
    }

    pub fn aura_type(&self) -> AuraType {
        self.aura_type
    }

    pub fn amount(&self) -> i32 {
        self.amount
    }

    pub fn can_be_recalculated(&self) -> bool {
        self.can_be_recalculated
    }

    pub fn is_volatile(&self) -> bool {
        self.volatile
    }

    pub fn school(&self) -> SchoolMask {
        self.school
    }

    pub fn trigger_spell(&self) -> Option<SpellId> {
        self.trigger_spell
    }

    pub fn periodic(&self) -> Option<&PeriodicTimer> {
        self.periodic.as_ref()
    }

    /// Returns true if the scheduler will still tick this effect.
    pub fn is_ticking(&self) -> bool {
        self.periodic.is_some_and(|timer| timer.enabled)
    }

    pub fn tick_number(&self) -> u32 {
        self.periodic.map_or(0, |timer| timer.tick_number)
    }

    pub fn script_data(&self) -> &ScriptData {
        &self.script_data
    }

    /// Only the engine's amount commit path writes here.
    pub(crate) fn commit_amount(&mut self, amount: i32) -> i32 {
        std::mem::replace(&mut self.amount, amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_push_keeps_newest_first() {
        let mut data = ScriptData::default();
        for value in 1..=7 {
            assert!(data.push_ring(2, 5, value));
        }
        // ring holds 7,6,5,4,3
        assert_eq!(data.get(2), 7);
        assert_eq!(data.get(6), 3);
        assert_eq!(data.sum(2, 5), 25);
        assert_eq!(data.get(7), 0);
    }

    #[test]
    fn out_of_range_slots_are_rejected() {
        let mut data = ScriptData::default();
        assert!(!data.set(EngineConfig::MAX_SCRIPT_SLOTS, 1));
        assert!(!data.push_ring(EngineConfig::MAX_SCRIPT_SLOTS - 1, 2, 1));
        assert!(!data.push_ring(0, 0, 1));
        assert_eq!(data.get(usize::MAX), 0);
    }
}
