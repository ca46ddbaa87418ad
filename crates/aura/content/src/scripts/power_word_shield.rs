use aura_core::{
    AmountCalc, AuraApplication, AuraScript, AuraType, HandleMode, HookContext, HookResult,
    HookSelector, ScriptHooks, SpellId, Stat,
};

pub const POWER_WORD_SHIELD: SpellId = SpellId(17);
pub const WEAKENED_SOUL: SpellId = SpellId(6788);

const SPELL_POWER_COEFFICIENT_PCT: i64 = 80;

/// Absorb shield sized from the caster's spell power at cast time. Also
/// leaves Weakened Soul on the target.
pub struct PowerWordShield;

fn shield_amount(ctx: &HookContext<'_>, calc: &mut AmountCalc) -> HookResult {
    let spell_power = i64::from(ctx.env().units()?.stat(ctx.caster(), Stat::SpellPower));
    let bonus = spell_power * SPELL_POWER_COEFFICIENT_PCT / 100;
    calc.amount = i32::try_from(i64::from(calc.amount) + bonus).unwrap_or(i32::MAX);
    // A partly drained shield must not refill when the priest's stats change.
    calc.can_be_recalculated = false;
    Ok(())
}

fn weaken_soul(ctx: &mut HookContext<'_>) -> HookResult {
    let (caster, owner) = (ctx.caster(), ctx.owner());
    ctx.apply_aura(AuraApplication::new(WEAKENED_SOUL, caster, owner));
    Ok(())
}

impl AuraScript for PowerWordShield {
    fn name(&self) -> &'static str {
        "spell_pri_power_word_shield"
    }

    fn spells(&self) -> &[SpellId] {
        &[POWER_WORD_SHIELD]
    }

    fn referenced_spells(&self) -> &[SpellId] {
        &[WEAKENED_SOUL]
    }

    fn register(&self, hooks: &mut ScriptHooks) {
        hooks.calc_amount(
            HookSelector::effect(0).with_aura_type(AuraType::SchoolAbsorb),
            shield_amount,
        );
        hooks.on_apply(
            HookSelector::effect(0).with_modes(HandleMode::REAL),
            weaken_soul,
        );
    }
}
