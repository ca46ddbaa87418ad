use aura_core::{AmountCalc, AuraScript, AuraType, HookContext, HookResult, HookSelector, ScriptHooks, SpellId};

use super::blood_presence::{BLOOD_PRESENCE, tracked_damage};

pub const DEATH_STRIKE_HEAL: SpellId = SpellId(45470);

const HEAL_PCT_OF_DAMAGE: i64 = 25;

/// Death Strike heals for a share of the damage the caster took recently,
/// never less than the spell's base heal.
pub struct DeathStrikeHeal;

fn heal_from_recent_damage(ctx: &HookContext<'_>, calc: &mut AmountCalc) -> HookResult {
    let Some(tracker) = ctx.world().find_aura(ctx.caster(), BLOOD_PRESENCE, None) else {
        return Ok(());
    };
    let share = tracked_damage(tracker) * HEAL_PCT_OF_DAMAGE / 100;
    let share = i32::try_from(share).unwrap_or(i32::MAX);
    calc.amount = calc.amount.max(share);
    calc.can_be_recalculated = false;
    Ok(())
}

impl AuraScript for DeathStrikeHeal {
    fn name(&self) -> &'static str {
        "spell_dk_death_strike_heal"
    }

    fn spells(&self) -> &[SpellId] {
        &[DEATH_STRIKE_HEAL]
    }

    fn referenced_spells(&self) -> &[SpellId] {
        &[BLOOD_PRESENCE]
    }

    fn register(&self, hooks: &mut ScriptHooks) {
        hooks.calc_amount(
            HookSelector::effect(0).with_aura_type(AuraType::PeriodicHeal),
            heal_from_recent_damage,
        );
    }
}
