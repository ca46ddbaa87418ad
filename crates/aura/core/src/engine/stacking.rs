//! Stack and charge arithmetic.

use tracing::debug;

use super::AuraEngine;
use crate::hooks::StackChange;
use crate::output::AuraNotification;
use crate::types::{AuraId, HandleMode, RemoveMode, SpellAttributes, SpellId, UnitId};

impl AuraEngine<'_> {
    /// Adds `delta` stacks, clamped to `[0, max_stacks]`.
    ///
    /// Reaching 0 removes the aura with `mode`. Any other change fires the
    /// apply hooks with `HandleMode::STACK`. Duration is left untouched.
    /// Returns true if the aura changed.
    pub fn mod_stack_amount(&mut self, aura_id: AuraId, delta: i32, mode: RemoveMode) -> bool {
        let Some(aura) = self.world.aura_mut(aura_id) else {
            return false;
        };
        if !aura.is_active() {
            return false;
        }

        let previous = aura.stacks;
        let requested = i32::from(previous).saturating_add(delta);
        let current = requested.clamp(0, i32::from(aura.max_stacks)) as u8;
        if requested != i32::from(current) {
            debug!(
                target: "aura_core::engine",
                aura = %aura_id,
                requested,
                clamped = current,
                "stack count clamped"
            );
        }

        if current == 0 {
            return self.remove_aura(aura_id, mode);
        }
        if current == previous {
            return false;
        }

        aura.stacks = current;
        let owner = aura.owner;
        let spell = aura.spell;
        self.world.output.notify(AuraNotification::StackChanged {
            aura: aura_id,
            unit: owner,
            spell,
            previous,
            current,
        });

        let scales = self
            .env
            .spell(spell)
            .is_ok_and(|info| info.has_attribute(SpellAttributes::STACK_SCALES_AMOUNT));
        if scales {
            self.recalculate_aura(aura_id);
        }

        self.fire_apply_hooks(
            aura_id,
            HandleMode::STACK,
            Some(StackChange { previous, current }),
            None,
        );
        true
    }

    /// Single decrement of the first matching aura on `owner`.
    ///
    /// Charge-based auras lose one charge, every other aura loses one stack.
    /// Unlike `mod_stack_amount(-1)` this addresses the aura by identity and
    /// prefers charges over stacks.
    pub fn remove_aura_from_stack(
        &mut self,
        owner: UnitId,
        spell: SpellId,
        caster: Option<UnitId>,
        mode: RemoveMode,
    ) -> bool {
        let Some(aura) = self.world.find_aura(owner, spell, caster) else {
            return false;
        };
        let aura_id = aura.id();
        if aura.uses_charges() {
            self.consume_charge(aura_id, mode)
        } else {
            self.mod_stack_amount(aura_id, -1, mode)
        }
    }

    /// Drops one charge. The last charge removes the aura with `mode`.
    pub fn consume_charge(&mut self, aura_id: AuraId, mode: RemoveMode) -> bool {
        let Some(aura) = self.world.aura_mut(aura_id) else {
            return false;
        };
        if !aura.is_active() || aura.charges == 0 {
            return false;
        }
        let previous = aura.charges;
        aura.charges -= 1;
        let current = aura.charges;
        let owner = aura.owner;

        self.world.output.notify(AuraNotification::ChargesChanged {
            aura: aura_id,
            unit: owner,
            previous,
            current,
        });
        if current == 0 {
            self.remove_aura(aura_id, mode);
        }
        true
    }
}
