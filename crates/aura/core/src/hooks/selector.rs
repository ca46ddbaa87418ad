//! Selectors deciding which auras and effects a hook observes.

use crate::types::{AuraType, EffectIndex, HandleMode, RemoveModes, SpellId};

/// Spell half of a selector key.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SpellFilter {
    /// Every spell. Inside a script this is narrowed to the script's spells.
    #[default]
    Any,
    Only(Vec<SpellId>),
}

impl SpellFilter {
    pub fn accepts(&self, spell: SpellId) -> bool {
        match self {
            Self::Any => true,
            Self::Only(spells) => spells.contains(&spell),
        }
    }

    pub fn is_any(&self) -> bool {
        matches!(self, Self::Any)
    }
}

/// Effect half of a selector key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EffectFilter {
    #[default]
    Any,
    Index(EffectIndex),
}

impl EffectFilter {
    pub fn accepts(self, index: EffectIndex) -> bool {
        match self {
            Self::Any => true,
            Self::Index(expected) => expected == index,
        }
    }
}

/// Full selector: (spell, effect index, aura type, handle mode, remove modes).
///
/// `modes` only matters for apply hooks and `remove_modes` only for remove
/// hooks; the other extension points ignore them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HookSelector {
    pub spells: SpellFilter,
    pub effect: EffectFilter,
    pub aura_type: Option<AuraType>,
    pub modes: HandleMode,
    pub remove_modes: RemoveModes,
}

impl Default for HookSelector {
    fn default() -> Self {
        Self {
            spells: SpellFilter::Any,
            effect: EffectFilter::Any,
            aura_type: None,
            modes: HandleMode::REAL,
            remove_modes: RemoveModes::all(),
        }
    }
}

impl HookSelector {
    /// Matches every spell and effect.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn spell(spell: SpellId) -> Self {
        Self {
            spells: SpellFilter::Only(vec![spell]),
            ..Self::default()
        }
    }

    pub fn spells(spells: impl IntoIterator<Item = SpellId>) -> Self {
        Self {
            spells: SpellFilter::Only(spells.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Any spell (the script's spells when registered from a script), one effect.
    pub fn effect(index: EffectIndex) -> Self {
        Self::default().on_effect(index)
    }

    pub fn on_effect(mut self, index: EffectIndex) -> Self {
        self.effect = EffectFilter::Index(index);
        self
    }

    pub fn with_aura_type(mut self, aura_type: AuraType) -> Self {
        self.aura_type = Some(aura_type);
        self
    }

    pub fn with_modes(mut self, modes: HandleMode) -> Self {
        self.modes = modes;
        self
    }

    pub fn with_remove_modes(mut self, remove_modes: RemoveModes) -> Self {
        self.remove_modes = remove_modes;
        self
    }

    /// Effect-level match (spell is handled by the table lookup).
    pub fn accepts_effect(&self, index: EffectIndex, aura_type: AuraType) -> bool {
        self.effect.accepts(index) && self.aura_type.is_none_or(|expected| expected == aura_type)
    }

    pub fn accepts_mode(&self, mode: HandleMode) -> bool {
        self.modes.intersects(mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_selector_is_real_apply_any_removal() {
        let selector = HookSelector::any();
        assert!(selector.accepts_mode(HandleMode::REAL));
        assert!(!selector.accepts_mode(HandleMode::STACK));
        assert!(selector.remove_modes.is_all());
        assert!(selector.accepts_effect(3, AuraType::Dummy));
    }

    #[test]
    fn effect_and_type_filters_combine() {
        let selector = HookSelector::spell(SpellId(1))
            .on_effect(1)
            .with_aura_type(AuraType::PeriodicDummy);
        assert!(selector.accepts_effect(1, AuraType::PeriodicDummy));
        assert!(!selector.accepts_effect(0, AuraType::PeriodicDummy));
        assert!(!selector.accepts_effect(1, AuraType::PeriodicDamage));
        assert!(selector.spells.accepts(SpellId(1)));
        assert!(!selector.spells.accepts(SpellId(2)));
    }
}
