use aura_core::{
    AuraScript, AuraType, HookContext, HookError, HookResult, HookSelector, RemoveMode,
    RemoveModes, SchoolMask, ScriptHooks, SpellId,
};

pub const UNSTABLE_AFFLICTION: SpellId = SpellId(30108);

const BACKLASH_MULTIPLIER: u32 = 9;

/// Dispelling the affliction unleashes nine ticks' worth of shadow damage at once.
pub struct UnstableAffliction;

fn backlash(ctx: &mut HookContext<'_>, _mode: RemoveMode) -> HookResult {
    let tick = ctx
        .effect()
        .ok_or(HookError::EffectMissing {
            aura: ctx.aura_id(),
            index: 0,
        })?
        .amount()
        .max(0) as u32;
    let (caster, owner) = (ctx.caster(), ctx.owner());
    ctx.deal_damage(
        caster,
        owner,
        tick.saturating_mul(BACKLASH_MULTIPLIER),
        SchoolMask::SHADOW,
    );
    Ok(())
}

impl AuraScript for UnstableAffliction {
    fn name(&self) -> &'static str {
        "spell_wl_unstable_affliction"
    }

    fn spells(&self) -> &[SpellId] {
        &[UNSTABLE_AFFLICTION]
    }

    fn register(&self, hooks: &mut ScriptHooks) {
        hooks.on_remove(
            HookSelector::effect(0)
                .with_aura_type(AuraType::PeriodicDamage)
                .with_remove_modes(RemoveModes::DISPEL),
            backlash,
        );
    }
}
