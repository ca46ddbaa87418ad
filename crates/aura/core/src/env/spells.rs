//! Read-only spell catalog data.
//!
//! The catalog is an immutable snapshot per spell version: the engine reads
//! base amounts, durations, stack limits, proc entries, and effect
//! definitions from it and never writes back.

use std::collections::HashMap;

use crate::env::units::Stat;
use crate::types::{
    AuraType, EffectIndex, HitMask, ProcFlags, SchoolMask, SpellAttributes, SpellId,
};

/// Oracle providing static spell definitions by identity.
pub trait SpellOracle: Send + Sync {
    fn spell(&self, id: SpellId) -> Option<&SpellInfo>;

    fn contains(&self, id: SpellId) -> bool {
        self.spell(id).is_some()
    }
}

/// Static definition of one spell.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpellInfo {
    pub id: SpellId,
    pub name: String,
    /// Aura duration in milliseconds. `None` means the aura never expires.
    #[cfg_attr(feature = "serde", serde(default))]
    pub duration: Option<u32>,
    /// Maximum stack count. 0 and 1 both mean "does not stack".
    #[cfg_attr(feature = "serde", serde(default))]
    pub max_stacks: u8,
    #[cfg_attr(feature = "serde", serde(default))]
    pub attributes: SpellAttributes,
    #[cfg_attr(feature = "serde", serde(default))]
    pub proc: Option<ProcEntry>,
    pub effects: Vec<SpellEffectInfo>,
}

impl SpellInfo {
    pub fn new(id: SpellId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            duration: None,
            max_stacks: 1,
            attributes: SpellAttributes::empty(),
            proc: None,
            effects: Vec::new(),
        }
    }

    pub fn with_duration(mut self, duration_ms: u32) -> Self {
        self.duration = Some(duration_ms);
        self
    }

    pub fn with_max_stacks(mut self, max_stacks: u8) -> Self {
        self.max_stacks = max_stacks;
        self
    }

    pub fn with_attributes(mut self, attributes: SpellAttributes) -> Self {
        self.attributes |= attributes;
        self
    }

    pub fn with_proc(mut self, proc: ProcEntry) -> Self {
        self.proc = Some(proc);
        self
    }

    /// Appends an effect; its index becomes its position in the list.
    pub fn with_effect(mut self, mut effect: SpellEffectInfo) -> Self {
        effect.index = self.effects.len() as EffectIndex;
        self.effects.push(effect);
        self
    }

    /// Stack ceiling with the "0 means 1" convention folded in.
    pub fn stack_limit(&self) -> u8 {
        self.max_stacks.max(1)
    }

    pub fn effect(&self, index: EffectIndex) -> Option<&SpellEffectInfo> {
        self.effects.iter().find(|effect| effect.index == index)
    }

    /// Effects that create aura effects when the spell is applied as an aura.
    pub fn aura_effects(&self) -> impl Iterator<Item = (&SpellEffectInfo, AuraType)> {
        self.effects
            .iter()
            .filter_map(|effect| effect.aura_type().map(|aura_type| (effect, aura_type)))
    }

    pub fn has_aura_effects(&self) -> bool {
        self.aura_effects().next().is_some()
    }

    pub fn has_attribute(&self, attribute: SpellAttributes) -> bool {
        self.attributes.contains(attribute)
    }
}

/// What a spell effect does when the spell lands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpellEffectKind {
    /// Applies (or refreshes) an aura effect of the given type.
    ApplyAura(AuraType),
    /// Instant damage resolved by the combat host.
    SchoolDamage,
    /// Instant heal resolved by the combat host.
    Heal,
    /// Content-defined, no engine or host behaviour.
    Dummy,
}

/// Static definition of one spell effect.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpellEffectInfo {
    #[cfg_attr(feature = "serde", serde(default))]
    pub index: EffectIndex,
    pub kind: SpellEffectKind,
    #[cfg_attr(feature = "serde", serde(default))]
    pub base_points: i32,
    /// Adds `percent`% of one caster stat to the base amount.
    #[cfg_attr(feature = "serde", serde(default))]
    pub scaling: Option<StatScaling>,
    /// Tick period in milliseconds for periodic aura types. `Some(0)` is a one-shot tick.
    #[cfg_attr(feature = "serde", serde(default))]
    pub amplitude: Option<u32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub school: SchoolMask,
    #[cfg_attr(feature = "serde", serde(default))]
    pub trigger_spell: Option<SpellId>,
    /// Recompute the amount right before every tick.
    #[cfg_attr(feature = "serde", serde(default))]
    pub volatile: bool,
    /// Let the proc dispatcher evaluate this effect even if its aura type is not proc-capable.
    #[cfg_attr(feature = "serde", serde(default))]
    pub proc_enabled: bool,
}

impl SpellEffectInfo {
    pub fn new(kind: SpellEffectKind) -> Self {
        Self {
            index: 0,
            kind,
            base_points: 0,
            scaling: None,
            amplitude: None,
            school: SchoolMask::empty(),
            trigger_spell: None,
            volatile: false,
            proc_enabled: false,
        }
    }

    pub fn aura(aura_type: AuraType) -> Self {
        Self::new(SpellEffectKind::ApplyAura(aura_type))
    }

    pub fn with_base_points(mut self, base_points: i32) -> Self {
        self.base_points = base_points;
        self
    }

    pub fn with_scaling(mut self, stat: Stat, percent: i32) -> Self {
        self.scaling = Some(StatScaling { stat, percent });
        self
    }

    pub fn with_amplitude(mut self, amplitude_ms: u32) -> Self {
        self.amplitude = Some(amplitude_ms);
        self
    }

    pub fn with_school(mut self, school: SchoolMask) -> Self {
        self.school = school;
        self
    }

    pub fn with_trigger_spell(mut self, spell: SpellId) -> Self {
        self.trigger_spell = Some(spell);
        self
    }

    pub fn volatile(mut self) -> Self {
        self.volatile = true;
        self
    }

    pub fn proc_enabled(mut self) -> Self {
        self.proc_enabled = true;
        self
    }

    pub fn aura_type(&self) -> Option<AuraType> {
        match self.kind {
            SpellEffectKind::ApplyAura(aura_type) => Some(aura_type),
            _ => None,
        }
    }

    /// Returns true if the proc dispatcher should look at this effect.
    pub fn is_proc_capable(&self) -> bool {
        self.proc_enabled || self.aura_type().is_some_and(|t| t.is_proc_capable())
    }
}

/// Contribution of a caster stat to an effect's base amount.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatScaling {
    pub stat: Stat,
    pub percent: i32,
}

/// Proc trigger definition for an aura.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProcEntry {
    /// Event classes that can trigger this aura.
    pub flags: ProcFlags,
    /// Required hit outcome. Empty accepts any outcome.
    #[cfg_attr(feature = "serde", serde(default))]
    pub hit_mask: HitMask,
    /// Required damage school. Empty accepts any school.
    #[cfg_attr(feature = "serde", serde(default))]
    pub school_mask: SchoolMask,
    /// Proc chance in percent. `None` falls back to the engine default.
    #[cfg_attr(feature = "serde", serde(default))]
    pub chance: Option<f32>,
    /// Internal cooldown in milliseconds between successful procs.
    #[cfg_attr(feature = "serde", serde(default))]
    pub cooldown_ms: u32,
    /// Charges granted on application. 0 means the aura does not use charges.
    #[cfg_attr(feature = "serde", serde(default))]
    pub charges: u8,
}

impl ProcEntry {
    pub fn new(flags: ProcFlags) -> Self {
        Self {
            flags,
            hit_mask: HitMask::empty(),
            school_mask: SchoolMask::empty(),
            chance: None,
            cooldown_ms: 0,
            charges: 0,
        }
    }

    pub fn with_chance(mut self, chance: f32) -> Self {
        self.chance = Some(chance);
        self
    }

    pub fn with_cooldown(mut self, cooldown_ms: u32) -> Self {
        self.cooldown_ms = cooldown_ms;
        self
    }

    pub fn with_charges(mut self, charges: u8) -> Self {
        self.charges = charges;
        self
    }

    pub fn with_hit_mask(mut self, hit_mask: HitMask) -> Self {
        self.hit_mask = hit_mask;
        self
    }

    pub fn with_school_mask(mut self, school_mask: SchoolMask) -> Self {
        self.school_mask = school_mask;
        self
    }
}

/// In-memory catalog backed by a hash map.
#[derive(Clone, Debug, Default)]
pub struct SpellCatalog {
    spells: HashMap<SpellId, SpellInfo>,
}

impl SpellCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a spell definition.
    pub fn insert(&mut self, spell: SpellInfo) {
        self.spells.insert(spell.id, spell);
    }

    pub fn with_spell(mut self, spell: SpellInfo) -> Self {
        self.insert(spell);
        self
    }

    pub fn len(&self) -> usize {
        self.spells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SpellInfo> {
        self.spells.values()
    }
}

impl FromIterator<SpellInfo> for SpellCatalog {
    fn from_iter<T: IntoIterator<Item = SpellInfo>>(iter: T) -> Self {
        let mut catalog = Self::new();
        for spell in iter {
            catalog.insert(spell);
        }
        catalog
    }
}

impl SpellOracle for SpellCatalog {
    fn spell(&self, id: SpellId) -> Option<&SpellInfo> {
        self.spells.get(&id)
    }
}
