//! Read-only view of units owned by the host.
//!
//! The engine never mutates unit data. Health and stats change in the host's
//! combat layer, which then reports deaths and stat changes back through the
//! engine's unit lifecycle entry points.

use std::collections::BTreeMap;

use crate::types::UnitId;

/// Primary and derived unit attributes that effect amounts can scale with.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Stat {
    Strength,
    Agility,
    Stamina,
    Intellect,
    Spirit,
    AttackPower,
    SpellPower,
}

/// Coarse unit classification exposed to content predicates.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum UnitClass {
    #[default]
    Warrior,
    Paladin,
    Priest,
    Mage,
    Warlock,
    DeathKnight,
    Creature,
}

/// Oracle giving read access to unit state.
pub trait UnitOracle: Send + Sync {
    fn exists(&self, unit: UnitId) -> bool;

    fn is_alive(&self, unit: UnitId) -> bool;

    fn health(&self, unit: UnitId) -> Option<u32>;

    fn max_health(&self, unit: UnitId) -> Option<u32>;

    /// Current value of a stat. Unknown units and unset stats read as 0.
    fn stat(&self, unit: UnitId, stat: Stat) -> i32;

    fn class(&self, unit: UnitId) -> Option<UnitClass>;

    /// Current health as a percentage of maximum health.
    fn health_pct(&self, unit: UnitId) -> Option<f32> {
        let health = self.health(unit)?;
        let max = self.max_health(unit)?;
        if max == 0 {
            return Some(0.0);
        }
        Some(health as f32 * 100.0 / max as f32)
    }
}

/// Snapshot of one unit as tracked by [`UnitTable`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitRecord {
    pub id: UnitId,
    pub name: String,
    pub class: UnitClass,
    pub health: u32,
    pub max_health: u32,
    pub stats: BTreeMap<Stat, i32>,
}

impl UnitRecord {
    pub fn new(id: UnitId, name: impl Into<String>, max_health: u32) -> Self {
        Self {
            id,
            name: name.into(),
            class: UnitClass::default(),
            health: max_health,
            max_health,
            stats: BTreeMap::new(),
        }
    }

    pub fn with_class(mut self, class: UnitClass) -> Self {
        self.class = class;
        self
    }

    pub fn with_stat(mut self, stat: Stat, value: i32) -> Self {
        self.stats.insert(stat, value);
        self
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Applies damage, saturating at zero. Returns the damage actually dealt.
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        let dealt = amount.min(self.health);
        self.health -= dealt;
        dealt
    }

    /// Applies healing, capped at max health. Returns the healing actually done.
    pub fn heal(&mut self, amount: u32) -> u32 {
        if !self.is_alive() {
            return 0;
        }
        let healed = amount.min(self.max_health - self.health);
        self.health += healed;
        healed
    }
}

/// Reference unit store used by the runtime and tests.
#[derive(Clone, Debug, Default)]
pub struct UnitTable {
    units: BTreeMap<UnitId, UnitRecord>,
}

impl UnitTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, unit: UnitRecord) {
        self.units.insert(unit.id, unit);
    }

    pub fn with_unit(mut self, unit: UnitRecord) -> Self {
        self.insert(unit);
        self
    }

    pub fn get(&self, unit: UnitId) -> Option<&UnitRecord> {
        self.units.get(&unit)
    }

    pub fn get_mut(&mut self, unit: UnitId) -> Option<&mut UnitRecord> {
        self.units.get_mut(&unit)
    }

    pub fn remove(&mut self, unit: UnitId) -> Option<UnitRecord> {
        self.units.remove(&unit)
    }

    /// Overwrites one stat. Returns false if the unit is unknown.
    pub fn set_stat(&mut self, unit: UnitId, stat: Stat, value: i32) -> bool {
        match self.units.get_mut(&unit) {
            Some(record) => {
                record.stats.insert(stat, value);
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &UnitRecord> {
        self.units.values()
    }
}

impl UnitOracle for UnitTable {
    fn exists(&self, unit: UnitId) -> bool {
        self.units.contains_key(&unit)
    }

    fn is_alive(&self, unit: UnitId) -> bool {
        self.units.get(&unit).is_some_and(UnitRecord::is_alive)
    }

    fn health(&self, unit: UnitId) -> Option<u32> {
        self.units.get(&unit).map(|u| u.health)
    }

    fn max_health(&self, unit: UnitId) -> Option<u32> {
        self.units.get(&unit).map(|u| u.max_health)
    }

    fn stat(&self, unit: UnitId, stat: Stat) -> i32 {
        self.units
            .get(&unit)
            .and_then(|u| u.stats.get(&stat).copied())
            .unwrap_or(0)
    }

    fn class(&self, unit: UnitId) -> Option<UnitClass> {
        self.units.get(&unit).map(|u| u.class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_pct_tracks_damage() {
        let mut table = UnitTable::new().with_unit(UnitRecord::new(UnitId(1), "dummy", 200));
        assert_eq!(table.health_pct(UnitId(1)), Some(100.0));

        let dealt = table.get_mut(UnitId(1)).map(|u| u.take_damage(150));
        assert_eq!(dealt, Some(150));
        assert_eq!(table.health_pct(UnitId(1)), Some(25.0));
        assert_eq!(table.health_pct(UnitId(9)), None);
    }

    #[test]
    fn dead_units_are_not_healed() {
        let mut unit = UnitRecord::new(UnitId(1), "dummy", 50);
        assert_eq!(unit.take_damage(80), 50);
        assert!(!unit.is_alive());
        assert_eq!(unit.heal(10), 0);
    }

    #[test]
    fn missing_stats_read_as_zero() {
        let table = UnitTable::new()
            .with_unit(UnitRecord::new(UnitId(1), "caster", 10).with_stat(Stat::SpellPower, 300));
        assert_eq!(table.stat(UnitId(1), Stat::SpellPower), 300);
        assert_eq!(table.stat(UnitId(1), Stat::Agility), 0);
        assert_eq!(table.stat(UnitId(2), Stat::SpellPower), 0);
    }
}
