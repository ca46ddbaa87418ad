//! Aura lifecycle: Pending → Active → (Refreshed) → Removed.

use arrayvec::ArrayVec;
use tracing::{debug, trace};

use super::{ApplyOutcome, AuraApplication, AuraEngine, EngineError, RejectReason};
use crate::config::EngineConfig;
use crate::env::SpellInfo;
use crate::hooks::StackChange;
use crate::output::AuraNotification;
use crate::state::{Aura, AuraEffect, AuraEffects, AuraState, PeriodicTimer};
use crate::types::{AuraId, HandleMode, RemoveMode, SpellAttributes, SpellId, UnitId};

impl AuraEngine<'_> {
    /// Applies a spell's aura to its target, or refreshes/stacks the existing one.
    ///
    /// Invalid applications fizzle with [`ApplyOutcome::Rejected`]; only a
    /// missing oracle is an error.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Oracle`] if the spell or unit oracle is not available.
    pub fn apply_aura(&mut self, application: AuraApplication) -> Result<ApplyOutcome, EngineError> {
        let spells = self.env.spells()?;
        let units = self.env.units()?;

        let Some(spell) = spells.spell(application.spell) else {
            return Ok(self.reject(&application, RejectReason::UnknownSpell(application.spell)));
        };
        let aura_effect_count = spell.aura_effects().count();
        if aura_effect_count == 0 {
            return Ok(self.reject(&application, RejectReason::NoAuraEffects(spell.id)));
        }
        if aura_effect_count > EngineConfig::MAX_EFFECTS_PER_AURA {
            return Ok(self.reject(&application, RejectReason::TooManyEffects(spell.id)));
        }
        if !units.exists(application.target) {
            return Ok(self.reject(&application, RejectReason::TargetMissing(application.target)));
        }
        if !units.is_alive(application.target)
            && !spell.has_attribute(SpellAttributes::PERSIST_THROUGH_DEATH)
        {
            return Ok(self.reject(&application, RejectReason::TargetDead(application.target)));
        }

        let existing = self
            .world
            .container(application.target)
            .and_then(|container| {
                container.find_existing(
                    spell.id,
                    application.caster,
                    application.cast_item,
                    spell.has_attribute(SpellAttributes::MULTI_CASTER),
                )
            })
            .map(Aura::id);

        match existing {
            Some(aura_id) => Ok(self.refresh_aura(aura_id, spell, &application)),
            None => Ok(self.create_aura(spell, &application)),
        }
    }

    fn reject(&self, application: &AuraApplication, reason: RejectReason) -> ApplyOutcome {
        debug!(
            target: "aura_core::engine",
            spell = %application.spell,
            caster = %application.caster,
            target = %application.target,
            reason = reason.as_ref(),
            "aura application rejected"
        );
        ApplyOutcome::Rejected(reason)
    }

    fn create_aura(&mut self, spell: &SpellInfo, application: &AuraApplication) -> ApplyOutcome {
        let id = self.world.allocate_aura_id();
        let duration = application.duration.or(spell.duration);
        let stacks = application.stacks.clamp(1, spell.stack_limit());

        let mut effects = AuraEffects::new();
        for (info, aura_type) in spell.aura_effects() {
            let mut effect = AuraEffect::new(info.index, aura_type);
            effect.volatile = info.volatile;
            effect.school = info.school;
            effect.trigger_spell = info.trigger_spell;
            effects.push(effect);
        }

        let mut aura = Aura {
            id,
            spell: spell.id,
            caster: application.caster,
            owner: application.target,
            cast_item: application.cast_item,
            state: AuraState::Pending,
            context: application.context,
            duration,
            max_duration: duration,
            stacks,
            max_stacks: spell.stack_limit(),
            charges: spell.proc.as_ref().map_or(0, |entry| entry.charges),
            applied_at: self.world.now(),
            proc_cooldown_until: 0,
            effects,
        };

        // Resolve periodicity and amounts while the aura is still pending.
        let indices: ArrayVec<_, { EngineConfig::MAX_EFFECTS_PER_AURA }> =
            aura.effects.iter().map(|effect| effect.index).collect();
        for index in indices {
            let Some(info) = spell.effect(index) else {
                continue;
            };
            let periodic = self.resolve_periodic(&aura, info);
            let calc = self.resolve_amount(&aura, info);
            if let Some(effect) = aura.effect_mut(index) {
                if periodic.is_periodic {
                    effect.periodic = Some(PeriodicTimer::new(periodic.amplitude));
                }
                effect.commit_amount(calc.amount);
                effect.can_be_recalculated = calc.can_be_recalculated;
            }
        }

        aura.state = AuraState::Active;
        let notification = AuraNotification::Applied {
            aura: id,
            unit: aura.owner,
            spell: aura.spell,
            caster: aura.caster,
            stacks: aura.stacks,
            duration: aura.duration,
        };
        trace!(
            target: "aura_core::engine",
            aura = %id,
            spell = %aura.spell,
            owner = %aura.owner,
            "aura applied"
        );
        self.world.insert_aura(aura);
        self.world.output.notify(notification);

        self.fire_apply_hooks(id, HandleMode::REAL, None, None);
        ApplyOutcome::Applied(id)
    }

    fn refresh_aura(
        &mut self,
        aura_id: AuraId,
        spell: &SpellInfo,
        application: &AuraApplication,
    ) -> ApplyOutcome {
        let no_refresh = spell.has_attribute(SpellAttributes::NO_REFRESH);
        let new_duration = application.duration.or(spell.duration);
        let limit = spell.stack_limit();
        let charges = spell.proc.as_ref().map_or(0, |entry| entry.charges);

        let Some(aura) = self.world.aura_mut(aura_id) else {
            return ApplyOutcome::Rejected(RejectReason::TargetMissing(application.target));
        };

        let previous_stacks = aura.stacks;
        let added = application.stacks.max(1);
        let current_stacks = previous_stacks.saturating_add(added).min(limit);
        aura.stacks = current_stacks;

        let mut refreshed = None;
        if !no_refresh {
            // Keep the longer of remaining and new duration.
            if let (Some(remaining), Some(new)) = (aura.duration, new_duration)
                && new > remaining
            {
                aura.duration = Some(new);
                aura.max_duration = Some(new);
            }
            let previous_charges = aura.charges;
            aura.charges = charges;
            refreshed = Some((aura.duration, previous_charges));
        }

        let owner = aura.owner;
        let spell_id = aura.spell;
        let aura_charges = aura.charges;

        if let Some((duration, previous_charges)) = refreshed {
            self.world.output.notify(AuraNotification::Refreshed {
                aura: aura_id,
                unit: owner,
                spell: spell_id,
                duration,
            });
            if previous_charges != aura_charges {
                self.world.output.notify(AuraNotification::ChargesChanged {
                    aura: aura_id,
                    unit: owner,
                    previous: previous_charges,
                    current: aura_charges,
                });
            }
        }

        let mut mode = HandleMode::empty();
        let mut stack_change = None;
        if refreshed.is_some() {
            mode |= HandleMode::REAPPLY;
        }
        if current_stacks != previous_stacks {
            self.world.output.notify(AuraNotification::StackChanged {
                aura: aura_id,
                unit: owner,
                spell: spell_id,
                previous: previous_stacks,
                current: current_stacks,
            });
            mode |= HandleMode::STACK;
            stack_change = Some(StackChange {
                previous: previous_stacks,
                current: current_stacks,
            });
        } else {
            debug!(
                target: "aura_core::engine",
                aura = %aura_id,
                stacks = current_stacks,
                "stack count already at cap"
            );
        }

        if refreshed.is_some() {
            self.reresolve_aura(aura_id);
        } else if stack_change.is_some()
            && spell.has_attribute(SpellAttributes::STACK_SCALES_AMOUNT)
        {
            self.recalculate_aura(aura_id);
        }

        if !mode.is_empty() {
            self.fire_apply_hooks(aura_id, mode, stack_change, None);
        }
        ApplyOutcome::Refreshed(aura_id)
    }

    /// Removes an aura with a reason. Returns false if it was already gone.
    ///
    /// Periodic timers stop before any hook runs; OnRemove hooks then fire in
    /// effect index order, filtered by `mode`.
    pub fn remove_aura(&mut self, aura_id: AuraId, mode: RemoveMode) -> bool {
        let Some(aura) = self.world.aura_mut(aura_id) else {
            return false;
        };
        if aura.is_removed() {
            return false;
        }
        aura.state = AuraState::Removed;
        for effect in aura.effects.iter_mut() {
            if let Some(timer) = effect.periodic.as_mut() {
                timer.enabled = false;
            }
        }

        self.fire_remove_hooks(aura_id, mode);

        if let Some(aura) = self.world.take_aura(aura_id) {
            trace!(
                target: "aura_core::engine",
                aura = %aura_id,
                spell = %aura.spell,
                owner = %aura.owner,
                mode = %mode,
                "aura removed"
            );
            self.world.output.notify(AuraNotification::Removed {
                aura: aura_id,
                unit: aura.owner,
                spell: aura.spell,
                mode,
            });
        }
        true
    }

    /// Removes every aura of `spell` on `owner`, optionally only one caster's.
    pub fn remove_auras_by_spell(
        &mut self,
        owner: UnitId,
        spell: SpellId,
        caster: Option<UnitId>,
        mode: RemoveMode,
    ) -> usize {
        let targets: Vec<AuraId> = self
            .world
            .auras_on(owner)
            .filter(|aura| aura.matches(spell, caster))
            .map(Aura::id)
            .collect();
        targets
            .into_iter()
            .filter(|aura| self.remove_aura(*aura, mode))
            .count()
    }

    /// Owner died: drops every aura not flagged to persist through death.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Oracle`] if the spell oracle is not available.
    pub fn handle_unit_death(&mut self, unit: UnitId) -> Result<usize, EngineError> {
        let spells = self.env.spells()?;
        let mut removed = 0;
        for aura_id in self.world.aura_ids_on(unit) {
            let Some(aura) = self.world.aura(aura_id) else {
                continue;
            };
            let persists = spells
                .spell(aura.spell())
                .is_some_and(|spell| spell.has_attribute(SpellAttributes::PERSIST_THROUGH_DEATH));
            if !persists && self.remove_aura(aura_id, RemoveMode::Death) {
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Unit left the world: drops its auras and the caster-bound auras it cast elsewhere.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Oracle`] if the spell oracle is not available.
    pub fn despawn_unit(&mut self, unit: UnitId) -> Result<usize, EngineError> {
        let spells = self.env.spells()?;
        let mut removed = 0;
        for aura_id in self.world.aura_ids_on(unit) {
            if self.remove_aura(aura_id, RemoveMode::Default) {
                removed += 1;
            }
        }
        for aura_id in self.world.auras_cast_by(unit) {
            let Some(aura) = self.world.aura(aura_id) else {
                continue;
            };
            let bound = spells
                .spell(aura.spell())
                .is_some_and(|spell| spell.has_attribute(SpellAttributes::CASTER_BOUND));
            if bound && self.remove_aura(aura_id, RemoveMode::Default) {
                removed += 1;
            }
        }
        Ok(removed)
    }
}
