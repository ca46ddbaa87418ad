//! Content scripts and their registration-time validation.

use crate::env::SpellOracle;
use crate::error::{AuraError, ErrorSeverity};
use crate::hooks::{
    AbsorbHandler, ApplyHandler, CalcAmountHandler, CalcPeriodicHandler, CheckEffectProcPredicate,
    CheckProcPredicate, EffectFilter, HookSelector, PeriodicHandler, ProcHandler, RemoveHandler,
    SpellFilter,
};
use crate::types::{AuraType, EffectIndex, SpellId};

/// One content unit: a named bundle of hooks bound to a set of spells.
///
/// Hooks registered with [`SpellFilter::Any`] are narrowed to [`spells`].
///
/// [`spells`]: AuraScript::spells
pub trait AuraScript: Send + Sync {
    fn name(&self) -> &'static str;

    /// Spells whose auras this script binds to.
    fn spells(&self) -> &[SpellId];

    /// Other spells the script casts or inspects. Validated like [`AuraScript::spells`].
    fn referenced_spells(&self) -> &[SpellId] {
        &[]
    }

    fn register(&self, hooks: &mut ScriptHooks);
}

pub(crate) enum Registration {
    Apply(HookSelector, Box<dyn ApplyHandler>),
    Remove(HookSelector, Box<dyn RemoveHandler>),
    Periodic(HookSelector, Box<dyn PeriodicHandler>),
    Proc(HookSelector, Box<dyn ProcHandler>),
    CheckProc(HookSelector, Box<dyn CheckProcPredicate>),
    CheckEffectProc(HookSelector, Box<dyn CheckEffectProcPredicate>),
    CalcAmount(HookSelector, Box<dyn CalcAmountHandler>),
    CalcPeriodic(HookSelector, Box<dyn CalcPeriodicHandler>),
    Absorb(HookSelector, Box<dyn AbsorbHandler>),
}

impl Registration {
    fn selector(&self) -> &HookSelector {
        match self {
            Self::Apply(selector, _)
            | Self::Remove(selector, _)
            | Self::Periodic(selector, _)
            | Self::Proc(selector, _)
            | Self::CheckProc(selector, _)
            | Self::CheckEffectProc(selector, _)
            | Self::CalcAmount(selector, _)
            | Self::CalcPeriodic(selector, _)
            | Self::Absorb(selector, _) => selector,
        }
    }
}

/// Staging area a script registers into. Nothing is live until validation passes.
pub struct ScriptHooks {
    script: &'static str,
    spells: Vec<SpellId>,
    pending: Vec<Registration>,
}

impl ScriptHooks {
    pub(crate) fn new(script: &'static str, spells: &[SpellId]) -> Self {
        Self {
            script,
            spells: spells.to_vec(),
            pending: Vec::new(),
        }
    }

    pub fn script(&self) -> &'static str {
        self.script
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    fn bind(&self, mut selector: HookSelector) -> HookSelector {
        if selector.spells.is_any() && !self.spells.is_empty() {
            selector.spells = SpellFilter::Only(self.spells.clone());
        }
        selector
    }

    pub fn on_apply(&mut self, selector: HookSelector, handler: impl ApplyHandler + 'static) {
        let selector = self.bind(selector);
        self.pending
            .push(Registration::Apply(selector, Box::new(handler)));
    }

    pub fn on_remove(&mut self, selector: HookSelector, handler: impl RemoveHandler + 'static) {
        let selector = self.bind(selector);
        self.pending
            .push(Registration::Remove(selector, Box::new(handler)));
    }

    pub fn on_periodic(&mut self, selector: HookSelector, handler: impl PeriodicHandler + 'static) {
        let selector = self.bind(selector);
        self.pending
            .push(Registration::Periodic(selector, Box::new(handler)));
    }

    pub fn on_proc(&mut self, selector: HookSelector, handler: impl ProcHandler + 'static) {
        let selector = self.bind(selector);
        self.pending
            .push(Registration::Proc(selector, Box::new(handler)));
    }

    pub fn check_proc(
        &mut self,
        selector: HookSelector,
        predicate: impl CheckProcPredicate + 'static,
    ) {
        let selector = self.bind(selector);
        self.pending
            .push(Registration::CheckProc(selector, Box::new(predicate)));
    }

    pub fn check_effect_proc(
        &mut self,
        selector: HookSelector,
        predicate: impl CheckEffectProcPredicate + 'static,
    ) {
        let selector = self.bind(selector);
        self.pending
            .push(Registration::CheckEffectProc(selector, Box::new(predicate)));
    }

    pub fn calc_amount(
        &mut self,
        selector: HookSelector,
        handler: impl CalcAmountHandler + 'static,
    ) {
        let selector = self.bind(selector);
        self.pending
            .push(Registration::CalcAmount(selector, Box::new(handler)));
    }

    pub fn calc_periodic(
        &mut self,
        selector: HookSelector,
        handler: impl CalcPeriodicHandler + 'static,
    ) {
        let selector = self.bind(selector);
        self.pending
            .push(Registration::CalcPeriodic(selector, Box::new(handler)));
    }

    pub fn on_absorb(&mut self, selector: HookSelector, handler: impl AbsorbHandler + 'static) {
        let selector = self.bind(selector);
        self.pending
            .push(Registration::Absorb(selector, Box::new(handler)));
    }

    pub(crate) fn into_registrations(self) -> Vec<Registration> {
        self.pending
    }

    /// Checks every spell, effect index, and aura type the script names.
    pub(crate) fn validate(
        &self,
        script: &dyn AuraScript,
        catalog: &dyn SpellOracle,
    ) -> Result<(), ScriptLoadError> {
        let name = self.script;
        for spell in script.spells().iter().chain(script.referenced_spells()) {
            if !catalog.contains(*spell) {
                return Err(ScriptLoadError::UnknownSpell {
                    script: name,
                    spell: *spell,
                });
            }
        }

        for registration in &self.pending {
            let selector = registration.selector();
            let SpellFilter::Only(spells) = &selector.spells else {
                continue;
            };
            for spell_id in spells {
                let Some(spell) = catalog.spell(*spell_id) else {
                    return Err(ScriptLoadError::UnknownSpell {
                        script: name,
                        spell: *spell_id,
                    });
                };
                let EffectFilter::Index(index) = selector.effect else {
                    continue;
                };
                let Some(effect) = spell.effect(index) else {
                    return Err(ScriptLoadError::UnknownEffect {
                        script: name,
                        spell: *spell_id,
                        effect: index,
                    });
                };
                if let Some(expected) = selector.aura_type
                    && effect.aura_type() != Some(expected)
                {
                    return Err(ScriptLoadError::AuraTypeMismatch {
                        script: name,
                        spell: *spell_id,
                        effect: index,
                        expected,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Why a script was disabled at load.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ScriptLoadError {
    #[error("script '{script}' references unknown spell {spell}")]
    UnknownSpell {
        script: &'static str,
        spell: SpellId,
    },

    #[error("script '{script}' binds effect #{effect} which {spell} does not have")]
    UnknownEffect {
        script: &'static str,
        spell: SpellId,
        effect: EffectIndex,
    },

    #[error("script '{script}' expects {expected} on {spell} effect #{effect}")]
    AuraTypeMismatch {
        script: &'static str,
        spell: SpellId,
        effect: EffectIndex,
        expected: AuraType,
    },

    #[error("script '{script}' is already registered")]
    Duplicate { script: &'static str },
}

impl AuraError for ScriptLoadError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownSpell { .. } => "SCRIPT_UNKNOWN_SPELL",
            Self::UnknownEffect { .. } => "SCRIPT_UNKNOWN_EFFECT",
            Self::AuraTypeMismatch { .. } => "SCRIPT_AURA_TYPE_MISMATCH",
            Self::Duplicate { .. } => "SCRIPT_DUPLICATE",
        }
    }
}
