use aura_core::{
    AuraScript, HandleMode, HookContext, HookResult, HookSelector, ScriptHooks, SpellId,
    StackChange,
};

pub const MAELSTROM_WEAPON: SpellId = SpellId(53817);

/// Stack counts that swap the owner's visual, paired with the visual id.
pub const STACK_THRESHOLDS: [(u8, u32); 3] = [(1, 12_001), (6, 12_006), (10, 12_010)];

/// Plays a visual each time the stack count climbs past a threshold.
pub struct StackVisual;

fn on_stack_change(ctx: &mut HookContext<'_>) -> HookResult {
    // Fresh application counts from zero.
    let change = ctx.stack_change().unwrap_or(StackChange {
        previous: 0,
        current: ctx.aura().stacks(),
    });
    let owner = ctx.owner();
    for (threshold, visual) in STACK_THRESHOLDS {
        if change.reached(threshold) {
            ctx.play_visual(owner, visual);
        }
    }
    Ok(())
}

impl AuraScript for StackVisual {
    fn name(&self) -> &'static str {
        "spell_gen_stack_visual"
    }

    fn spells(&self) -> &[SpellId] {
        &[MAELSTROM_WEAPON]
    }

    fn register(&self, hooks: &mut ScriptHooks) {
        hooks.on_apply(
            HookSelector::effect(0).with_modes(HandleMode::REAL | HandleMode::STACK),
            on_stack_change,
        );
    }
}
