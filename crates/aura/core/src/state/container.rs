//! Per-unit aura storage.

use crate::state::Aura;
use crate::types::{AuraId, ItemId, SpellId, UnitId};

/// All auras currently applied to one unit, in insertion order.
///
/// Iteration order is load-bearing: hooks on the same unit fire in the
/// order auras were applied.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AuraContainer {
    auras: Vec<Aura>,
}

impl AuraContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.auras.len()
    }

    pub fn is_empty(&self) -> bool {
        self.auras.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Aura> {
        self.auras.iter()
    }

    pub fn get(&self, id: AuraId) -> Option<&Aura> {
        self.auras.iter().find(|aura| aura.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: AuraId) -> Option<&mut Aura> {
        self.auras.iter_mut().find(|aura| aura.id == id)
    }

    /// Auras of one spell, in insertion order.
    pub fn by_spell(&self, spell: SpellId) -> impl Iterator<Item = &Aura> {
        self.auras.iter().filter(move |aura| aura.spell == spell)
    }

    /// Finds the aura an application with this identity would refresh.
    ///
    /// Multi-caster spells key on (spell, caster, item); every other spell
    /// keeps a single aura per target.
    pub fn find_existing(
        &self,
        spell: SpellId,
        caster: UnitId,
        cast_item: Option<ItemId>,
        multi_caster: bool,
    ) -> Option<&Aura> {
        self.auras.iter().find(|aura| {
            aura.spell == spell
                && !aura.is_removed()
                && (!multi_caster || (aura.caster == caster && aura.cast_item == cast_item))
        })
    }

    /// First live aura matching (spell, optional caster).
    pub fn find(&self, spell: SpellId, caster: Option<UnitId>) -> Option<&Aura> {
        self.auras
            .iter()
            .find(|aura| !aura.is_removed() && aura.matches(spell, caster))
    }

    /// Snapshot of aura ids for iteration that may mutate the container.
    pub fn ids(&self) -> Vec<AuraId> {
        self.auras.iter().map(|aura| aura.id).collect()
    }

    pub(crate) fn push(&mut self, aura: Aura) {
        self.auras.push(aura);
    }

    pub(crate) fn take(&mut self, id: AuraId) -> Option<Aura> {
        let position = self.auras.iter().position(|aura| aura.id == id)?;
        Some(self.auras.remove(position))
    }
}
