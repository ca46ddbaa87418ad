use aura_core::{AuraScript, HookContext, HookResult, HookSelector, ProcEventInfo, ScriptHooks, SpellId};

pub const EXECUTE_SENSE: SpellId = SpellId(29723);
pub const EXECUTE_SENSE_BUFF: SpellId = SpellId(52437);

/// Target health (percent) below which the aura may proc.
pub const EXECUTE_THRESHOLD_PCT: f32 = 35.0;

/// Procs only on hits against targets in execute range.
pub struct ExecuteSense;

fn target_in_execute_range(ctx: &HookContext<'_>, event: &ProcEventInfo) -> HookResult<bool> {
    let Some(target) = event.action_target else {
        return Ok(false);
    };
    let units = ctx.env().units()?;
    Ok(units
        .health_pct(target)
        .is_some_and(|pct| pct < EXECUTE_THRESHOLD_PCT))
}

impl AuraScript for ExecuteSense {
    fn name(&self) -> &'static str {
        "spell_gen_execute_sense"
    }

    fn spells(&self) -> &[SpellId] {
        &[EXECUTE_SENSE]
    }

    fn referenced_spells(&self) -> &[SpellId] {
        &[EXECUTE_SENSE_BUFF]
    }

    fn register(&self, hooks: &mut ScriptHooks) {
        hooks.check_proc(HookSelector::any(), target_in_execute_range);
    }
}
