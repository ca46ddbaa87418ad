//! Aura instances and their lifecycle state.

use arrayvec::ArrayVec;

use crate::config::EngineConfig;
use crate::state::AuraEffect;
use crate::types::{AuraId, EffectIndex, ItemId, SpellId, UnitId};

/// Lifecycle position of an aura.
///
/// `Pending` only exists while the engine attaches and resolves effects;
/// hooks never observe it. `Removed` is terminal.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum AuraState {
    #[default]
    Pending,
    Active,
    Removed,
}

/// Encounter difficulty the aura was cast under.
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
pub enum Difficulty {
    #[default]
    Normal,
    Heroic,
    Mythic,
}

/// Context the aura was cast in, visible to resolvers and hooks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CastContext {
    pub difficulty: Difficulty,
}

/// Effects of one aura, bounded by [`EngineConfig::MAX_EFFECTS_PER_AURA`].
pub type AuraEffects = ArrayVec<AuraEffect, { EngineConfig::MAX_EFFECTS_PER_AURA }>;

/// A status effect instance applied to one unit by one spell.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Aura {
    pub(crate) id: AuraId,
    pub(crate) spell: SpellId,
    pub(crate) caster: UnitId,
    pub(crate) owner: UnitId,
    pub(crate) cast_item: Option<ItemId>,
    pub(crate) state: AuraState,
    pub(crate) context: CastContext,
    /// Remaining duration in milliseconds, `None` for permanent auras.
    pub(crate) duration: Option<u32>,
    pub(crate) max_duration: Option<u32>,
    pub(crate) stacks: u8,
    pub(crate) max_stacks: u8,
    pub(crate) charges: u8,
    pub(crate) applied_at: u64,
    pub(crate) proc_cooldown_until: u64,
    pub(crate) effects: AuraEffects,
}

impl Aura {
    pub fn id(&self) -> AuraId {
        self.id
    }

    pub fn spell(&self) -> SpellId {
        self.spell
    }

    pub fn caster(&self) -> UnitId {
        self.caster
    }

    pub fn owner(&self) -> UnitId {
        self.owner
    }

    pub fn cast_item(&self) -> Option<ItemId> {
        self.cast_item
    }

    pub fn state(&self) -> AuraState {
        self.state
    }

    pub fn context(&self) -> CastContext {
        self.context
    }

    pub fn is_active(&self) -> bool {
        self.state == AuraState::Active
    }

    pub fn is_removed(&self) -> bool {
        self.state == AuraState::Removed
    }

    pub fn duration(&self) -> Option<u32> {
        self.duration
    }

    pub fn max_duration(&self) -> Option<u32> {
        self.max_duration
    }

    pub fn is_permanent(&self) -> bool {
        self.max_duration.is_none()
    }

    pub fn is_expired(&self) -> bool {
        self.duration == Some(0)
    }

    pub fn stacks(&self) -> u8 {
        self.stacks
    }

    pub fn max_stacks(&self) -> u8 {
        self.max_stacks
    }

    pub fn charges(&self) -> u8 {
        self.charges
    }

    pub fn uses_charges(&self) -> bool {
        self.charges > 0
    }

    pub fn applied_at(&self) -> u64 {
        self.applied_at
    }

    pub fn proc_cooldown_until(&self) -> u64 {
        self.proc_cooldown_until
    }

    pub fn effects(&self) -> &[AuraEffect] {
        &self.effects
    }

    pub fn effect(&self, index: EffectIndex) -> Option<&AuraEffect> {
        self.effects.iter().find(|effect| effect.index == index)
    }

    pub(crate) fn effect_mut(&mut self, index: EffectIndex) -> Option<&mut AuraEffect> {
        self.effects.iter_mut().find(|effect| effect.index == index)
    }

    pub fn has_effect(&self, index: EffectIndex) -> bool {
        self.effect(index).is_some()
    }

    /// Effect indices in ascending order (hook firing order).
    pub fn effect_indices(&self) -> ArrayVec<EffectIndex, { EngineConfig::MAX_EFFECTS_PER_AURA }> {
        let mut indices: ArrayVec<EffectIndex, { EngineConfig::MAX_EFFECTS_PER_AURA }> =
            self.effects.iter().map(|effect| effect.index).collect();
        indices.sort_unstable();
        indices
    }

    /// Returns true if this aura matches an identity key.
    ///
    /// `caster = None` matches any caster.
    pub fn matches(&self, spell: SpellId, caster: Option<UnitId>) -> bool {
        self.spell == spell && caster.is_none_or(|caster| self.caster == caster)
    }
}
