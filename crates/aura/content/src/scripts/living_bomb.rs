use aura_core::{
    AuraScript, HookContext, HookResult, HookSelector, RemoveMode, RemoveModes, ScriptHooks,
    SpellId,
};

pub const LIVING_BOMB: SpellId = SpellId(44457);
pub const LIVING_BOMB_EXPLOSION: SpellId = SpellId(44461);

/// Explodes when the bomb runs its full duration. Dispels defuse it.
pub struct LivingBomb;

fn explode(ctx: &mut HookContext<'_>, _mode: RemoveMode) -> HookResult {
    let (caster, owner) = (ctx.caster(), ctx.owner());
    ctx.cast_spell(caster, owner, LIVING_BOMB_EXPLOSION);
    Ok(())
}

impl AuraScript for LivingBomb {
    fn name(&self) -> &'static str {
        "spell_mage_living_bomb"
    }

    fn spells(&self) -> &[SpellId] {
        &[LIVING_BOMB]
    }

    fn referenced_spells(&self) -> &[SpellId] {
        &[LIVING_BOMB_EXPLOSION]
    }

    fn register(&self, hooks: &mut ScriptHooks) {
        hooks.on_remove(
            HookSelector::effect(0).with_remove_modes(RemoveModes::EXPIRE),
            explode,
        );
    }
}
