//! Effect amount resolution and the single amount commit path.
//!
//! `resolve_*` are pure with respect to engine state: they read the caster,
//! the catalog and the calc hooks and return a value. Only
//! [`AuraEngine::change_amount`] writes an effect amount.

use tracing::warn;

use super::AuraEngine;
use super::dispatch::{HookSite, log_hook_failure};
use crate::env::SpellEffectInfo;
use crate::hooks::{AmountCalc, HookContext, HookKind, PeriodicCalc};
use crate::hooks::clamp_i32;
use crate::output::AuraNotification;
use crate::state::Aura;
use crate::types::{AuraId, EffectIndex, HandleMode, SpellAttributes, UnitId};

impl AuraEngine<'_> {
    /// Computes an effect's amount: base points, caster stat scaling, stack
    /// scaling, then every matching calc hook in registration order.
    pub(crate) fn resolve_amount(&self, aura: &Aura, info: &SpellEffectInfo) -> AmountCalc {
        let mut amount = i64::from(info.base_points);

        if let Some(scaling) = info.scaling {
            match self.env.units() {
                Ok(units) => {
                    let stat = i64::from(units.stat(aura.caster(), scaling.stat));
                    amount += stat * i64::from(scaling.percent) / 100;
                }
                Err(error) => warn!(
                    target: "aura_core::engine",
                    aura = %aura.id(),
                    error = %error,
                    "stat scaling skipped"
                ),
            }
        }

        let scales_with_stacks = self
            .env
            .spell(aura.spell())
            .is_ok_and(|spell| spell.has_attribute(SpellAttributes::STACK_SCALES_AMOUNT));
        if scales_with_stacks {
            amount *= i64::from(aura.stacks());
        }

        let mut calc = AmountCalc {
            amount: clamp_i32(amount),
            can_be_recalculated: true,
        };
        let Some(aura_type) = info.aura_type() else {
            return calc;
        };

        for entry in self.hooks.calc_amount.matching(aura.spell()) {
            if !entry.selector.accepts_effect(info.index, aura_type) {
                continue;
            }
            let ctx = HookContext::new(&*self.world, self.env, aura, Some(info.index));
            let mut trial = calc;
            match entry.handler.calc_amount(&ctx, &mut trial) {
                Ok(()) => calc = trial,
                Err(error) => log_hook_failure(
                    HookKind::CalcAmount,
                    entry.owner,
                    HookSite::new(aura.id(), aura.spell(), Some(info.index)),
                    &error,
                ),
            }
        }
        calc
    }

    /// Decides whether an effect ticks and how often.
    pub(crate) fn resolve_periodic(&self, aura: &Aura, info: &SpellEffectInfo) -> PeriodicCalc {
        let mut calc = PeriodicCalc {
            is_periodic: info.aura_type().is_some_and(|t| t.is_periodic()),
            amplitude: info.amplitude.unwrap_or(0),
        };
        let Some(aura_type) = info.aura_type() else {
            return calc;
        };

        for entry in self.hooks.calc_periodic.matching(aura.spell()) {
            if !entry.selector.accepts_effect(info.index, aura_type) {
                continue;
            }
            let ctx = HookContext::new(&*self.world, self.env, aura, Some(info.index));
            let mut trial = calc;
            match entry.handler.calc_periodic(&ctx, &mut trial) {
                Ok(()) => calc = trial,
                Err(error) => log_hook_failure(
                    HookKind::CalcPeriodic,
                    entry.owner,
                    HookSite::new(aura.id(), aura.spell(), Some(info.index)),
                    &error,
                ),
            }
        }
        calc
    }

    /// Commits a new amount. Returns true if the value changed.
    ///
    /// A change queues an `AmountChanged` notification and fires the
    /// effect's `CHANGE_AMOUNT` apply hooks.
    pub fn change_amount(&mut self, aura_id: AuraId, index: EffectIndex, amount: i32) -> bool {
        let Some(aura) = self.world.aura_mut(aura_id) else {
            return false;
        };
        if !aura.is_active() {
            return false;
        }
        let owner = aura.owner;
        let Some(effect) = aura.effect_mut(index) else {
            return false;
        };
        let previous = effect.commit_amount(amount);
        if previous == amount {
            return false;
        }

        self.world.output.notify(AuraNotification::AmountChanged {
            aura: aura_id,
            unit: owner,
            effect: index,
            previous,
            current: amount,
        });
        self.fire_apply_hooks(aura_id, HandleMode::CHANGE_AMOUNT, None, Some(index));
        true
    }

    /// Re-runs the resolver for one effect if it allows recalculation.
    pub fn recalculate_amount(&mut self, aura_id: AuraId, index: EffectIndex) -> bool {
        let Some(aura) = self.world.aura(aura_id) else {
            return false;
        };
        if !aura.is_active() || !aura.effect(index).is_some_and(|e| e.can_be_recalculated()) {
            return false;
        }
        let Ok(spell) = self.env.spell(aura.spell()) else {
            return false;
        };
        let Some(info) = spell.effect(index) else {
            return false;
        };

        let calc = self.resolve_amount(aura, info);
        if let Some(effect) = self
            .world
            .aura_mut(aura_id)
            .and_then(|aura| aura.effect_mut(index))
        {
            effect.can_be_recalculated = calc.can_be_recalculated;
        }
        self.change_amount(aura_id, index, calc.amount)
    }

    /// Reapplication re-resolves every effect, including ones locked against
    /// stat recalculation. Returns the number of changed amounts.
    pub(crate) fn reresolve_aura(&mut self, aura_id: AuraId) -> usize {
        let Some(aura) = self.world.aura(aura_id) else {
            return 0;
        };
        let indices = aura.effect_indices();
        let Ok(spell) = self.env.spell(aura.spell()) else {
            return 0;
        };

        let mut changed = 0;
        for index in indices {
            let Some(info) = spell.effect(index) else {
                continue;
            };
            let Some(aura) = self.world.aura(aura_id).filter(|aura| aura.is_active()) else {
                break;
            };
            let calc = self.resolve_amount(aura, info);
            if let Some(effect) = self
                .world
                .aura_mut(aura_id)
                .and_then(|aura| aura.effect_mut(index))
            {
                effect.can_be_recalculated = calc.can_be_recalculated;
            }
            if self.change_amount(aura_id, index, calc.amount) {
                changed += 1;
            }
        }
        changed
    }

    /// Recalculates every effect of one aura. Returns the number of changed amounts.
    pub fn recalculate_aura(&mut self, aura_id: AuraId) -> usize {
        let Some(indices) = self.world.aura(aura_id).map(Aura::effect_indices) else {
            return 0;
        };
        indices
            .into_iter()
            .filter(|index| self.recalculate_amount(aura_id, *index))
            .count()
    }

    /// A unit's stats changed: recalculate auras it owns or cast.
    pub fn notify_stat_changed(&mut self, unit: UnitId) -> usize {
        let mut auras = self.world.aura_ids_on(unit);
        for aura in self.world.auras_cast_by(unit) {
            if !auras.contains(&aura) {
                auras.push(aura);
            }
        }
        auras
            .into_iter()
            .map(|aura| self.recalculate_aura(aura))
            .sum()
    }
}
