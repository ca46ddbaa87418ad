//! Absorb shields.

use tracing::trace;

use super::AuraEngine;
use crate::event::DamageInfo;
use crate::hooks::AbsorbCalc;
use crate::state::Aura;
use crate::types::{AuraType, RemoveMode};

impl AuraEngine<'_> {
    /// Lets the victim's `SchoolAbsorb` effects soak `damage`, in container order.
    ///
    /// Adds to `damage.absorbed` and returns the amount absorbed by this call.
    /// Default bookkeeping drains the shield amount and removes a depleted
    /// aura with `EnemySpell`; an absorb hook returning `PreventDefault`
    /// keeps the shield untouched.
    pub fn absorb_damage(&mut self, damage: &mut DamageInfo) -> u32 {
        let before = damage.absorbed;
        for aura_id in self.world.aura_ids_on(damage.victim) {
            let Some(indices) = self
                .world
                .aura(aura_id)
                .filter(|aura| aura.is_active())
                .map(Aura::effect_indices)
            else {
                continue;
            };

            for index in indices {
                let remaining = damage.remaining();
                if remaining == 0 {
                    return damage.absorbed - before;
                }
                let Some(effect) = self
                    .world
                    .aura(aura_id)
                    .filter(|aura| aura.is_active())
                    .and_then(|aura| aura.effect(index))
                else {
                    break;
                };
                if effect.aura_type() != AuraType::SchoolAbsorb
                    || !effect.school().accepts(damage.school)
                {
                    continue;
                }

                let shield = effect.amount().max(0) as u32;
                let mut calc = AbsorbCalc {
                    absorb: remaining.min(shield),
                };
                let snapshot = *damage;
                let outcome = self.fire_absorb_hooks(aura_id, index, &snapshot, &mut calc);
                let absorbed = calc.absorb.min(remaining);
                damage.absorbed += absorbed;
                trace!(
                    target: "aura_core::engine",
                    aura = %aura_id,
                    effect = index,
                    absorbed,
                    "damage absorbed"
                );

                if outcome.is_prevented() {
                    continue;
                }
                let left = shield.saturating_sub(absorbed);
                self.change_amount(aura_id, index, left as i32);
                if left == 0 {
                    self.remove_aura(aura_id, RemoveMode::EnemySpell);
                    break;
                }
            }
        }
        damage.absorbed - before
    }
}
