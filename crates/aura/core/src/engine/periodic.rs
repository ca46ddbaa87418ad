//! Periodic scheduler and duration expiry.

use tracing::warn;

use super::AuraEngine;
use crate::output::CombatRequest;
use crate::state::Aura;
use crate::types::{AuraId, AuraType, EffectIndex, RemoveMode};

impl AuraEngine<'_> {
    /// Advances the clock by `elapsed_ms`, fires due ticks, and expires auras.
    ///
    /// Units are visited in id order, auras in insertion order, effects in
    /// ascending index order. Auras applied by a hook during this step start
    /// ticking on the next step.
    pub fn update(&mut self, elapsed_ms: u32) {
        self.world.advance_clock(elapsed_ms);
        for aura_id in self.world.all_aura_ids() {
            self.update_aura(aura_id, elapsed_ms);
        }
    }

    fn update_aura(&mut self, aura_id: AuraId, elapsed_ms: u32) {
        let Some(aura) = self.world.aura(aura_id) else {
            return;
        };
        if !aura.is_active() {
            return;
        }
        // Periodic time never runs past the aura's remaining duration.
        let step = aura.duration().map_or(elapsed_ms, |remaining| elapsed_ms.min(remaining));

        for index in aura.effect_indices() {
            self.advance_effect(aura_id, index, step);
        }

        let Some(aura) = self.world.aura_mut(aura_id) else {
            return;
        };
        if !aura.is_active() {
            return;
        }
        if let Some(remaining) = aura.duration {
            let remaining = remaining.saturating_sub(elapsed_ms);
            aura.duration = Some(remaining);
            if remaining == 0 {
                self.remove_aura(aura_id, RemoveMode::Expire);
            }
        }
    }

    fn advance_effect(&mut self, aura_id: AuraId, index: EffectIndex, step: u32) {
        let max_ticks = self.world.config().max_ticks_per_update;
        match self.timer_of(aura_id, index) {
            Some(timer) if timer.enabled => {
                timer.accumulated = timer.accumulated.saturating_add(step);
            }
            _ => return,
        }

        let mut fired = 0u32;
        loop {
            // Re-read every iteration: hooks may rewrite the amplitude or stop the timer.
            let Some(timer) = self.timer_of(aura_id, index) else {
                return;
            };
            if !timer.enabled {
                return;
            }
            if timer.amplitude == 0 {
                timer.enabled = false;
                timer.tick_number += 1;
                self.tick(aura_id, index);
                return;
            }
            if timer.accumulated < timer.amplitude {
                return;
            }
            if fired >= max_ticks {
                let dropped = timer.accumulated / timer.amplitude;
                timer.accumulated %= timer.amplitude;
                warn!(
                    target: "aura_core::engine",
                    aura = %aura_id,
                    effect = index,
                    dropped,
                    "tick limit reached for this update"
                );
                return;
            }
            timer.accumulated -= timer.amplitude;
            timer.tick_number += 1;
            fired += 1;
            self.tick(aura_id, index);
        }
    }

    fn timer_of(
        &mut self,
        aura_id: AuraId,
        index: EffectIndex,
    ) -> Option<&mut crate::state::PeriodicTimer> {
        let aura = self.world.aura_mut(aura_id)?;
        if !aura.is_active() {
            return None;
        }
        aura.effect_mut(index)?.periodic.as_mut()
    }

    /// One tick: optional volatile recalculation, hooks, then the default action.
    fn tick(&mut self, aura_id: AuraId, index: EffectIndex) {
        let volatile = self
            .world
            .aura(aura_id)
            .and_then(|aura| aura.effect(index))
            .is_some_and(|effect| effect.is_volatile());
        if volatile {
            self.recalculate_amount(aura_id, index);
        }

        if self.fire_periodic_hooks(aura_id, index).is_prevented() {
            return;
        }

        let Some(aura) = self.world.aura(aura_id) else {
            return;
        };
        if !aura.is_active() {
            return;
        }
        if let Some(request) = default_tick_request(aura, index) {
            self.world.output.request(request);
        }
    }
}

fn default_tick_request(aura: &Aura, index: EffectIndex) -> Option<CombatRequest> {
    let effect = aura.effect(index)?;
    let amount = effect.amount().max(0) as u32;
    match effect.aura_type() {
        AuraType::PeriodicDamage => Some(CombatRequest::Damage {
            source: aura.caster(),
            target: aura.owner(),
            spell: aura.spell(),
            amount,
            school: effect.school(),
            periodic: true,
            triggered_by: Some(aura.id()),
        }),
        AuraType::PeriodicHeal => Some(CombatRequest::Heal {
            source: aura.caster(),
            target: aura.owner(),
            spell: aura.spell(),
            amount,
            periodic: true,
            triggered_by: Some(aura.id()),
        }),
        AuraType::PeriodicTriggerSpell => Some(CombatRequest::CastSpell {
            caster: aura.caster(),
            target: aura.owner(),
            spell: effect.trigger_spell()?,
            triggered_by: Some(aura.id()),
        }),
        _ => None,
    }
}
