use aura_core::{
    AuraScript, AuraType, HookContext, HookError, HookOutcome, HookResult, HookSelector,
    ScriptHooks, SpellId,
};

pub const CHAINS_OF_ICE: SpellId = SpellId(45524);

const SLOW_EFFECT: u8 = 0;
const THAW_EFFECT: u8 = 1;

/// Slow on effect 0 wears off by the thaw effect's amount every tick.
pub struct ChainsOfIce;

fn thaw(ctx: &mut HookContext<'_>) -> HookResult<HookOutcome> {
    let aura = ctx.aura_id();
    let step = ctx
        .effect()
        .ok_or(HookError::EffectMissing {
            aura,
            index: THAW_EFFECT,
        })?
        .amount();
    let slow = ctx
        .effect_at(SLOW_EFFECT)
        .ok_or(HookError::EffectMissing {
            aura,
            index: SLOW_EFFECT,
        })?
        .amount();

    // A thawed slow stops at zero instead of turning into a speed bonus.
    ctx.change_amount(SLOW_EFFECT, slow.saturating_add(step).min(0));
    Ok(HookOutcome::Continue)
}

impl AuraScript for ChainsOfIce {
    fn name(&self) -> &'static str {
        "spell_gen_chains_of_ice"
    }

    fn spells(&self) -> &[SpellId] {
        &[CHAINS_OF_ICE]
    }

    fn register(&self, hooks: &mut ScriptHooks) {
        hooks.on_periodic(
            HookSelector::effect(THAW_EFFECT).with_aura_type(AuraType::PeriodicDummy),
            thaw,
        );
    }
}
