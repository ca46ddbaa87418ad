//! Hook invocation: builds contexts, runs matching entries in registration
//! order, and settles each result.

use tracing::error;

use super::AuraEngine;
use crate::error::AuraError;
use crate::event::{DamageInfo, ProcEventInfo};
use crate::hooks::{AbsorbCalc, AuraCommand, HookContext, HookKind, HookOutcome, HookResult, StackChange};
use crate::state::Aura;
use crate::types::{AuraId, EffectIndex, HandleMode, RemoveMode, SpellId};

/// Where a hook ran, for logs.
#[derive(Clone, Copy, Debug)]
pub(crate) struct HookSite {
    pub aura: AuraId,
    pub spell: SpellId,
    pub effect: Option<EffectIndex>,
}

impl HookSite {
    pub(crate) fn new(aura: AuraId, spell: SpellId, effect: Option<EffectIndex>) -> Self {
        Self {
            aura,
            spell,
            effect,
        }
    }
}

pub(crate) fn log_hook_failure(
    kind: HookKind,
    owner: &'static str,
    site: HookSite,
    error: &dyn AuraError,
) {
    error!(
        target: "aura_core::hooks",
        hook = %kind,
        script = owner,
        aura = %site.aura,
        spell = %site.spell,
        effect = ?site.effect,
        code = error.error_code(),
        severity = error.severity().as_str(),
        error = %error,
        "hook failed, discarding its commands"
    );
}

impl AuraEngine<'_> {
    /// Commits a hook's commands on success; logs and drops them on failure.
    ///
    /// Handler panics are not caught here.
    fn settle<T>(
        &mut self,
        kind: HookKind,
        owner: &'static str,
        site: HookSite,
        result: HookResult<T>,
        commands: Vec<AuraCommand>,
    ) -> Option<T> {
        match result {
            Ok(value) => {
                self.run_commands(owner, commands);
                Some(value)
            }
            Err(error) => {
                log_hook_failure(kind, owner, site, &error);
                None
            }
        }
    }

    /// OnApply hooks for every effect in ascending index order, or for one effect.
    pub(crate) fn fire_apply_hooks(
        &mut self,
        aura_id: AuraId,
        mode: HandleMode,
        stack_change: Option<StackChange>,
        only: Option<EffectIndex>,
    ) {
        let hooks = self.hooks;
        let Some(aura) = self.world.aura(aura_id) else {
            return;
        };
        let spell = aura.spell();
        let entries = hooks.apply.matching(spell);
        if entries.is_empty() {
            return;
        }
        let indices = aura.effect_indices();

        for index in indices {
            if only.is_some_and(|only| only != index) {
                continue;
            }
            for entry in &entries {
                if !entry.selector.accepts_mode(mode) {
                    continue;
                }
                // Earlier hooks may have removed the aura or changed its effects.
                let Some(aura) = self.world.aura(aura_id) else {
                    return;
                };
                if !aura.is_active() {
                    return;
                }
                let Some(effect) = aura.effect(index) else {
                    break;
                };
                if !entry.selector.accepts_effect(index, effect.aura_type()) {
                    continue;
                }

                let mut ctx = HookContext::new(&*self.world, self.env, aura, Some(index))
                    .with_mode(mode, stack_change);
                let result = entry.handler.on_apply(&mut ctx);
                let commands = ctx.into_commands();
                self.settle(
                    HookKind::Apply,
                    entry.owner,
                    HookSite::new(aura_id, spell, Some(index)),
                    result,
                    commands,
                );
            }
        }
    }

    /// OnRemove hooks filtered by removal reason. The aura is already marked removed.
    pub(crate) fn fire_remove_hooks(&mut self, aura_id: AuraId, mode: RemoveMode) {
        let hooks = self.hooks;
        let Some(aura) = self.world.aura(aura_id) else {
            return;
        };
        let spell = aura.spell();
        let entries = hooks.remove.matching(spell);
        if entries.is_empty() {
            return;
        }
        let indices = aura.effect_indices();

        for index in indices {
            for entry in &entries {
                if !entry.selector.remove_modes.accepts(mode) {
                    continue;
                }
                let Some(aura) = self.world.aura(aura_id) else {
                    return;
                };
                let Some(effect) = aura.effect(index) else {
                    break;
                };
                if !entry.selector.accepts_effect(index, effect.aura_type()) {
                    continue;
                }

                let mut ctx = HookContext::new(&*self.world, self.env, aura, Some(index));
                let result = entry.handler.on_remove(&mut ctx, mode);
                let commands = ctx.into_commands();
                self.settle(
                    HookKind::Remove,
                    entry.owner,
                    HookSite::new(aura_id, spell, Some(index)),
                    result,
                    commands,
                );
            }
        }
    }

    /// OnEffectPeriodic hooks for one tick. Any `PreventDefault` suppresses the default action.
    pub(crate) fn fire_periodic_hooks(&mut self, aura_id: AuraId, index: EffectIndex) -> HookOutcome {
        let hooks = self.hooks;
        let Some(spell) = self.world.aura(aura_id).map(Aura::spell) else {
            return HookOutcome::PreventDefault;
        };
        let mut outcome = HookOutcome::Continue;

        for entry in hooks.periodic.matching(spell) {
            let Some(aura) = self.world.aura(aura_id) else {
                return HookOutcome::PreventDefault;
            };
            if !aura.is_active() {
                return HookOutcome::PreventDefault;
            }
            let Some(effect) = aura.effect(index) else {
                return HookOutcome::PreventDefault;
            };
            if !entry.selector.accepts_effect(index, effect.aura_type()) {
                continue;
            }

            let mut ctx = HookContext::new(&*self.world, self.env, aura, Some(index));
            let result = entry.handler.on_tick(&mut ctx);
            let commands = ctx.into_commands();
            if let Some(hook_outcome) = self.settle(
                HookKind::Periodic,
                entry.owner,
                HookSite::new(aura_id, spell, Some(index)),
                result,
                commands,
            ) {
                outcome = outcome.merge(hook_outcome);
            }
        }
        outcome
    }

    /// OnEffectProc hooks for one effect that passed every gate.
    pub(crate) fn fire_proc_hooks(
        &mut self,
        aura_id: AuraId,
        index: EffectIndex,
        event: &ProcEventInfo,
    ) -> HookOutcome {
        let hooks = self.hooks;
        let Some(spell) = self.world.aura(aura_id).map(Aura::spell) else {
            return HookOutcome::PreventDefault;
        };
        let mut outcome = HookOutcome::Continue;

        for entry in hooks.proc.matching(spell) {
            let Some(aura) = self.world.aura(aura_id) else {
                return HookOutcome::PreventDefault;
            };
            if !aura.is_active() {
                return HookOutcome::PreventDefault;
            }
            let Some(effect) = aura.effect(index) else {
                return HookOutcome::PreventDefault;
            };
            if !entry.selector.accepts_effect(index, effect.aura_type()) {
                continue;
            }

            let mut ctx = HookContext::new(&*self.world, self.env, aura, Some(index));
            let result = entry.handler.on_proc(&mut ctx, event);
            let commands = ctx.into_commands();
            if let Some(hook_outcome) = self.settle(
                HookKind::Proc,
                entry.owner,
                HookSite::new(aura_id, spell, Some(index)),
                result,
                commands,
            ) {
                outcome = outcome.merge(hook_outcome);
            }
        }
        outcome
    }

    /// DoCheckProc: every aura-level predicate must pass. A failing predicate vetoes.
    pub(crate) fn check_proc_predicates(&self, aura: &Aura, event: &ProcEventInfo) -> bool {
        for entry in self.hooks.check_proc.matching(aura.spell()) {
            let ctx = HookContext::new(&*self.world, self.env, aura, None);
            match entry.handler.check_proc(&ctx, event) {
                Ok(true) => {}
                Ok(false) => return false,
                Err(error) => {
                    log_hook_failure(
                        HookKind::CheckProc,
                        entry.owner,
                        HookSite::new(aura.id(), aura.spell(), None),
                        &error,
                    );
                    return false;
                }
            }
        }
        true
    }

    /// DoCheckEffectProc for one effect.
    pub(crate) fn check_effect_proc_predicates(
        &self,
        aura: &Aura,
        index: EffectIndex,
        event: &ProcEventInfo,
    ) -> bool {
        let Some(effect) = aura.effect(index) else {
            return false;
        };
        for entry in self.hooks.check_effect_proc.matching(aura.spell()) {
            if !entry.selector.accepts_effect(index, effect.aura_type()) {
                continue;
            }
            let ctx = HookContext::new(&*self.world, self.env, aura, Some(index));
            match entry.handler.check_effect_proc(&ctx, event) {
                Ok(true) => {}
                Ok(false) => return false,
                Err(error) => {
                    log_hook_failure(
                        HookKind::CheckEffectProc,
                        entry.owner,
                        HookSite::new(aura.id(), aura.spell(), Some(index)),
                        &error,
                    );
                    return false;
                }
            }
        }
        true
    }

    /// OnEffectAbsorb hooks for one shield effect.
    pub(crate) fn fire_absorb_hooks(
        &mut self,
        aura_id: AuraId,
        index: EffectIndex,
        damage: &DamageInfo,
        absorb: &mut AbsorbCalc,
    ) -> HookOutcome {
        let hooks = self.hooks;
        let Some(spell) = self.world.aura(aura_id).map(Aura::spell) else {
            return HookOutcome::PreventDefault;
        };
        let mut outcome = HookOutcome::Continue;

        for entry in hooks.absorb.matching(spell) {
            let Some(aura) = self.world.aura(aura_id) else {
                return HookOutcome::PreventDefault;
            };
            if !aura.is_active() {
                return HookOutcome::PreventDefault;
            }
            let Some(effect) = aura.effect(index) else {
                return HookOutcome::PreventDefault;
            };
            if !entry.selector.accepts_effect(index, effect.aura_type()) {
                continue;
            }

            let mut trial = *absorb;
            let mut ctx = HookContext::new(&*self.world, self.env, aura, Some(index));
            let result = entry.handler.on_absorb(&mut ctx, damage, &mut trial);
            let commands = ctx.into_commands();
            if let Some(hook_outcome) = self.settle(
                HookKind::Absorb,
                entry.owner,
                HookSite::new(aura_id, spell, Some(index)),
                result,
                commands,
            ) {
                *absorb = trial;
                outcome = outcome.merge(hook_outcome);
            }
        }
        outcome
    }
}
