//! Registration-time hook tables.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::env::SpellOracle;
use crate::hooks::script::{AuraScript, Registration, ScriptHooks, ScriptLoadError};
use crate::hooks::{
    AbsorbHandler, ApplyHandler, CalcAmountHandler, CalcPeriodicHandler, CheckEffectProcPredicate,
    CheckProcPredicate, HookSelector, PeriodicHandler, ProcHandler, RemoveHandler, SpellFilter,
};
use crate::types::SpellId;

/// One registered handler with its selector.
pub struct HookEntry<H: ?Sized> {
    /// Name of the script that registered the hook (`"<direct>"` otherwise).
    pub owner: &'static str,
    pub selector: HookSelector,
    pub handler: Box<H>,
}

/// Handlers of one extension point.
///
/// Entries keep registration order. Lookups by spell merge the spell-keyed
/// entries with the wildcard entries without losing that order.
pub struct HookTable<H: ?Sized> {
    entries: Vec<HookEntry<H>>,
    by_spell: HashMap<SpellId, Vec<usize>>,
    wildcard: Vec<usize>,
}

impl<H: ?Sized> Default for HookTable<H> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            by_spell: HashMap::new(),
            wildcard: Vec::new(),
        }
    }
}

impl<H: ?Sized> HookTable<H> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn push(&mut self, owner: &'static str, selector: HookSelector, handler: Box<H>) {
        let position = self.entries.len();
        match &selector.spells {
            SpellFilter::Any => self.wildcard.push(position),
            SpellFilter::Only(spells) => {
                for spell in spells {
                    let slots = self.by_spell.entry(*spell).or_default();
                    if slots.last() != Some(&position) {
                        slots.push(position);
                    }
                }
            }
        }
        self.entries.push(HookEntry {
            owner,
            selector,
            handler,
        });
    }

    /// Entries that may apply to `spell`, in registration order.
    pub fn matching(&self, spell: SpellId) -> Vec<&HookEntry<H>> {
        let keyed = self.by_spell.get(&spell).map(Vec::as_slice).unwrap_or(&[]);
        if keyed.is_empty() && self.wildcard.is_empty() {
            return Vec::new();
        }

        let mut merged = Vec::with_capacity(keyed.len() + self.wildcard.len());
        let (mut i, mut j) = (0, 0);
        while i < keyed.len() || j < self.wildcard.len() {
            let take_keyed = match (keyed.get(i), self.wildcard.get(j)) {
                (Some(a), Some(b)) => a < b,
                (Some(_), None) => true,
                _ => false,
            };
            let position = if take_keyed {
                i += 1;
                keyed[i - 1]
            } else {
                j += 1;
                self.wildcard[j - 1]
            };
            merged.push(&self.entries[position]);
        }
        merged
    }
}

/// Every extension point's hook table, plus the scripts that were loaded.
#[derive(Default)]
pub struct HookRegistry {
    pub(crate) apply: HookTable<dyn ApplyHandler>,
    pub(crate) remove: HookTable<dyn RemoveHandler>,
    pub(crate) periodic: HookTable<dyn PeriodicHandler>,
    pub(crate) proc: HookTable<dyn ProcHandler>,
    pub(crate) check_proc: HookTable<dyn CheckProcPredicate>,
    pub(crate) check_effect_proc: HookTable<dyn CheckEffectProcPredicate>,
    pub(crate) calc_amount: HookTable<dyn CalcAmountHandler>,
    pub(crate) calc_periodic: HookTable<dyn CalcPeriodicHandler>,
    pub(crate) absorb: HookTable<dyn AbsorbHandler>,
    scripts: Vec<&'static str>,
}

const DIRECT_OWNER: &str = "<direct>";

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates a script against the catalog and commits all of its hooks.
    ///
    /// Fails closed: if any referenced spell or effect is unknown, nothing
    /// from the script is registered.
    pub fn register_script(
        &mut self,
        script: &dyn AuraScript,
        spells: &dyn SpellOracle,
    ) -> Result<(), ScriptLoadError> {
        let name = script.name();
        if self.scripts.contains(&name) {
            warn!(target: "aura_core::hooks", script = name, "script registered twice, ignoring");
            return Err(ScriptLoadError::Duplicate { script: name });
        }

        let mut hooks = ScriptHooks::new(name, script.spells());
        script.register(&mut hooks);

        if let Err(error) = hooks.validate(script, spells) {
            warn!(
                target: "aura_core::hooks",
                script = name,
                error = %error,
                "script disabled at load"
            );
            return Err(error);
        }

        let count = hooks.len();
        for registration in hooks.into_registrations() {
            self.commit(name, registration);
        }
        self.scripts.push(name);

        debug!(target: "aura_core::hooks", script = name, hooks = count, "script registered");
        Ok(())
    }

    fn commit(&mut self, owner: &'static str, registration: Registration) {
        match registration {
            Registration::Apply(selector, handler) => self.apply.push(owner, selector, handler),
            Registration::Remove(selector, handler) => self.remove.push(owner, selector, handler),
            Registration::Periodic(selector, handler) => {
                self.periodic.push(owner, selector, handler)
            }
            Registration::Proc(selector, handler) => self.proc.push(owner, selector, handler),
            Registration::CheckProc(selector, handler) => {
                self.check_proc.push(owner, selector, handler)
            }
            Registration::CheckEffectProc(selector, handler) => {
                self.check_effect_proc.push(owner, selector, handler)
            }
            Registration::CalcAmount(selector, handler) => {
                self.calc_amount.push(owner, selector, handler)
            }
            Registration::CalcPeriodic(selector, handler) => {
                self.calc_periodic.push(owner, selector, handler)
            }
            Registration::Absorb(selector, handler) => self.absorb.push(owner, selector, handler),
        }
    }

    /// Names of successfully loaded scripts, in load order.
    pub fn scripts(&self) -> &[&'static str] {
        &self.scripts
    }

    pub fn is_loaded(&self, script: &str) -> bool {
        self.scripts.contains(&script)
    }

    /// Total number of registered handlers across all extension points.
    pub fn len(&self) -> usize {
        self.apply.len()
            + self.remove.len()
            + self.periodic.len()
            + self.proc.len()
            + self.check_proc.len()
            + self.check_effect_proc.len()
            + self.calc_amount.len()
            + self.calc_periodic.len()
            + self.absorb.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ===== direct registration (no catalog validation) =====

    pub fn on_apply(&mut self, selector: HookSelector, handler: impl ApplyHandler + 'static) {
        self.apply.push(DIRECT_OWNER, selector, Box::new(handler));
    }

    pub fn on_remove(&mut self, selector: HookSelector, handler: impl RemoveHandler + 'static) {
        self.remove.push(DIRECT_OWNER, selector, Box::new(handler));
    }

    pub fn on_periodic(&mut self, selector: HookSelector, handler: impl PeriodicHandler + 'static) {
        self.periodic.push(DIRECT_OWNER, selector, Box::new(handler));
    }

    pub fn on_proc(&mut self, selector: HookSelector, handler: impl ProcHandler + 'static) {
        self.proc.push(DIRECT_OWNER, selector, Box::new(handler));
    }

    pub fn check_proc(
        &mut self,
        selector: HookSelector,
        predicate: impl CheckProcPredicate + 'static,
    ) {
        self.check_proc
            .push(DIRECT_OWNER, selector, Box::new(predicate));
    }

    pub fn check_effect_proc(
        &mut self,
        selector: HookSelector,
        predicate: impl CheckEffectProcPredicate + 'static,
    ) {
        self.check_effect_proc
            .push(DIRECT_OWNER, selector, Box::new(predicate));
    }

    pub fn calc_amount(
        &mut self,
        selector: HookSelector,
        handler: impl CalcAmountHandler + 'static,
    ) {
        self.calc_amount
            .push(DIRECT_OWNER, selector, Box::new(handler));
    }

    pub fn calc_periodic(
        &mut self,
        selector: HookSelector,
        handler: impl CalcPeriodicHandler + 'static,
    ) {
        self.calc_periodic
            .push(DIRECT_OWNER, selector, Box::new(handler));
    }

    pub fn on_absorb(&mut self, selector: HookSelector, handler: impl AbsorbHandler + 'static) {
        self.absorb.push(DIRECT_OWNER, selector, Box::new(handler));
    }
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookRegistry")
            .field("scripts", &self.scripts)
            .field("hooks", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::{HookContext, HookResult};

    fn noop(_: &mut HookContext<'_>) -> HookResult {
        Ok(())
    }

    #[test]
    fn matching_merges_in_registration_order() {
        let mut registry = HookRegistry::new();
        registry.on_apply(HookSelector::spell(SpellId(7)), noop);
        registry.on_apply(HookSelector::any(), noop);
        registry.on_apply(HookSelector::spell(SpellId(8)), noop);
        registry.on_apply(HookSelector::spells([SpellId(7), SpellId(8)]), noop);

        let positions: Vec<usize> = registry
            .apply
            .matching(SpellId(7))
            .into_iter()
            .map(|entry| {
                registry
                    .apply
                    .entries
                    .iter()
                    .position(|candidate| std::ptr::eq(candidate, entry))
                    .unwrap()
            })
            .collect();
        assert_eq!(positions, vec![0, 1, 3]);
        assert_eq!(registry.apply.matching(SpellId(99)).len(), 1);
    }
}
