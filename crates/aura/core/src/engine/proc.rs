//! Proc dispatcher.
//!
//! For each unit implicated by an event (actor with the actor-side flags,
//! action target with the target-side flags) the dispatcher walks a snapshot
//! of the unit's auras in insertion order and runs every gate:
//!
//! 1. proc entry flag mask, hit mask, and school mask
//! 2. internal cooldown
//! 3. self-reproc guard (`triggered_by`)
//! 4. DoCheckProc and DoCheckEffectProc predicates
//! 5. chance roll
//!
//! Passing auras run OnEffectProc hooks per proc-capable effect, then the
//! default action unless a hook prevented it, then consume a charge and
//! start the cooldown.

use arrayvec::ArrayVec;
use tracing::{debug, trace};

use super::AuraEngine;
use crate::config::EngineConfig;
use crate::env::{SpellInfo, compute_seed};
use crate::event::ProcEventInfo;
use crate::output::CombatRequest;
use crate::types::{AuraId, AuraType, EffectIndex, ProcFlags, RemoveMode, SpellAttributes, UnitId};

type EffectList = ArrayVec<EffectIndex, { EngineConfig::MAX_EFFECTS_PER_AURA }>;

impl AuraEngine<'_> {
    /// Dispatches one event to the actor's and the action target's auras.
    ///
    /// Returns the number of auras that procced. An event that is already
    /// being dispatched is ignored.
    pub fn dispatch_proc(&mut self, event: &ProcEventInfo) -> usize {
        if self.in_flight.contains(&event.id) {
            debug!(target: "aura_core::proc", event = %event.id, "event already in flight");
            return 0;
        }
        self.in_flight.push(event.id);

        let mut procced = 0;
        let sides = [
            (Some(event.actor), event.flags & ProcFlags::ACTOR_MASK),
            (event.action_target, event.flags & ProcFlags::TARGET_MASK),
        ];
        for (unit, flags) in sides {
            let Some(unit) = unit else {
                continue;
            };
            if flags.is_empty() {
                continue;
            }
            // Auras added while dispatching are not evaluated against this event.
            for aura_id in self.world.aura_ids_on(unit) {
                if self.try_proc(aura_id, unit, flags, event) {
                    procced += 1;
                }
            }
        }

        self.in_flight.retain(|id| *id != event.id);
        procced
    }

    fn try_proc(
        &mut self,
        aura_id: AuraId,
        unit: UnitId,
        flags: ProcFlags,
        event: &ProcEventInfo,
    ) -> bool {
        if event.triggered_by == Some(aura_id) {
            return false;
        }
        let Some(aura) = self.world.aura(aura_id) else {
            return false;
        };
        if !aura.is_active() {
            return false;
        }
        let Ok(spell) = self.env.spell(aura.spell()) else {
            return false;
        };
        let Some(entry) = spell.proc.as_ref() else {
            return false;
        };

        if !entry.flags.intersects(flags) {
            return false;
        }
        if !entry.hit_mask.is_empty() && !entry.hit_mask.intersects(event.hit) {
            return false;
        }
        if !entry.school_mask.accepts(event.school) {
            return false;
        }
        if self.world.now() < aura.proc_cooldown_until() {
            trace!(target: "aura_core::proc", aura = %aura_id, "proc on cooldown");
            return false;
        }

        if !self.check_proc_predicates(aura, event) {
            return false;
        }
        let candidates: EffectList = aura
            .effect_indices()
            .into_iter()
            .filter(|index| spell.effect(*index).is_some_and(|info| info.is_proc_capable()))
            .filter(|index| self.check_effect_proc_predicates(aura, *index, event))
            .collect();
        if candidates.is_empty() {
            return false;
        }

        let chance = entry
            .chance
            .unwrap_or(self.world.config().default_proc_chance);
        let seed = compute_seed(self.world.game_seed(), event.id.0, aura_id.0, 0);
        let rolled = match self.env.rng() {
            Ok(rng) => rng.roll_chance(seed, chance),
            Err(error) => {
                debug!(target: "aura_core::proc", error = %error, "no rng, proc skipped");
                false
            }
        };
        if !rolled {
            return false;
        }

        trace!(
            target: "aura_core::proc",
            aura = %aura_id,
            event = %event.id,
            effects = candidates.len(),
            "aura procced"
        );
        let cooldown_ms = entry.cooldown_ms;
        for index in candidates {
            let outcome = self.fire_proc_hooks(aura_id, index, event);
            if outcome.is_prevented() {
                continue;
            }
            if let Some(request) = self.default_proc_request(aura_id, index, unit, event) {
                self.world.output.request(request);
            }
        }

        if cooldown_ms > 0 {
            let until = self.world.now().saturating_add(u64::from(cooldown_ms));
            if let Some(aura) = self.world.aura_mut(aura_id)
                && aura.is_active()
            {
                aura.proc_cooldown_until = until;
            }
        }
        let uses_charges = self
            .world
            .aura(aura_id)
            .is_some_and(|aura| aura.is_active() && aura.uses_charges());
        if uses_charges {
            self.consume_charge(aura_id, RemoveMode::Expire);
        }
        true
    }

    fn default_proc_request(
        &self,
        aura_id: AuraId,
        index: EffectIndex,
        unit: UnitId,
        event: &ProcEventInfo,
    ) -> Option<CombatRequest> {
        let aura = self.world.aura(aura_id)?;
        if !aura.is_active() {
            return None;
        }
        let effect = aura.effect(index)?;
        let counterpart = event.counterpart(unit);
        match effect.aura_type() {
            AuraType::ProcTriggerSpell => {
                let spell = effect.trigger_spell()?;
                let harmful = self
                    .env
                    .spell(spell)
                    .is_ok_and(|info: &SpellInfo| info.has_attribute(SpellAttributes::NEGATIVE));
                let target = if harmful {
                    counterpart.unwrap_or(aura.owner())
                } else {
                    aura.owner()
                };
                Some(CombatRequest::CastSpell {
                    caster: aura.owner(),
                    target,
                    spell,
                    triggered_by: Some(aura_id),
                })
            }
            AuraType::ProcTriggerDamage => Some(CombatRequest::Damage {
                source: aura.owner(),
                target: counterpart?,
                spell: aura.spell(),
                amount: effect.amount().max(0) as u32,
                school: effect.school(),
                periodic: false,
                triggered_by: Some(aura_id),
            }),
            _ => None,
        }
    }
}
