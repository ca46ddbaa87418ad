use aura_core::{
    AuraScript, AuraType, HookContext, HookOutcome, HookResult, HookSelector, ProcEventInfo,
    ScriptHooks, SpellId,
};

pub const BLOOD_PRESENCE: SpellId = SpellId(48263);

/// Width of the damage-taken window, one script slot per second.
pub const TRACKED_SECONDS: usize = 5;

const TRACKER_EFFECT: u8 = 0;
const ROTATE_EFFECT: u8 = 1;

/// Records damage taken per second into a ring of script slots on effect 0.
///
/// Slot 0 accumulates the current second; the once-per-second tick of
/// effect 1 pushes a fresh zero and drops the oldest second.
pub struct BloodPresenceTracker;

fn record_damage(ctx: &mut HookContext<'_>, event: &ProcEventInfo) -> HookResult<HookOutcome> {
    let taken = event.damage.map_or(0, |damage| damage.remaining());
    if taken > 0 {
        ctx.add_script_value(TRACKER_EFFECT, 0, i64::from(taken));
    }
    Ok(HookOutcome::Continue)
}

fn rotate_window(ctx: &mut HookContext<'_>) -> HookResult<HookOutcome> {
    ctx.push_script_value(TRACKER_EFFECT, 0, TRACKED_SECONDS, 0);
    Ok(HookOutcome::Continue)
}

/// Damage taken by `aura`'s owner over the tracked window.
pub fn tracked_damage(aura: &aura_core::Aura) -> i64 {
    aura.effect(TRACKER_EFFECT)
        .map_or(0, |effect| effect.script_data().sum(0, TRACKED_SECONDS))
}

impl AuraScript for BloodPresenceTracker {
    fn name(&self) -> &'static str {
        "spell_dk_blood_presence_tracker"
    }

    fn spells(&self) -> &[SpellId] {
        &[BLOOD_PRESENCE]
    }

    fn register(&self, hooks: &mut ScriptHooks) {
        hooks.on_proc(HookSelector::effect(TRACKER_EFFECT), record_damage);
        hooks.on_periodic(
            HookSelector::effect(ROTATE_EFFECT).with_aura_type(AuraType::PeriodicDummy),
            rotate_window,
        );
    }
}
