//! Bundled aura scripts.
//!
//! Each script is a stateless [`AuraScript`]: per-aura state lives in the
//! effect's script slots, never in the script value.

mod blood_presence;
mod chains_of_ice;
mod death_strike;
mod execute_sense;
mod living_bomb;
mod power_word_shield;
mod stack_visual;
mod unstable_affliction;

pub use blood_presence::{BLOOD_PRESENCE, BloodPresenceTracker, TRACKED_SECONDS};
pub use chains_of_ice::{CHAINS_OF_ICE, ChainsOfIce};
pub use death_strike::{DEATH_STRIKE_HEAL, DeathStrikeHeal};
pub use execute_sense::{EXECUTE_SENSE, EXECUTE_SENSE_BUFF, EXECUTE_THRESHOLD_PCT, ExecuteSense};
pub use living_bomb::{LIVING_BOMB, LIVING_BOMB_EXPLOSION, LivingBomb};
pub use power_word_shield::{POWER_WORD_SHIELD, PowerWordShield, WEAKENED_SOUL};
pub use stack_visual::{MAELSTROM_WEAPON, STACK_THRESHOLDS, StackVisual};
pub use unstable_affliction::{UNSTABLE_AFFLICTION, UnstableAffliction};

use aura_core::{AuraScript, HookRegistry, ScriptLoadError, SpellOracle};
use tracing::info;

/// Outcome of loading the bundled scripts.
#[derive(Debug, Default)]
pub struct ScriptReport {
    pub loaded: Vec<&'static str>,
    pub disabled: Vec<ScriptLoadError>,
}

/// Every bundled script, in load order.
pub fn all_scripts() -> Vec<Box<dyn AuraScript>> {
    vec![
        Box::new(ChainsOfIce),
        Box::new(BloodPresenceTracker),
        Box::new(DeathStrikeHeal),
        Box::new(StackVisual),
        Box::new(UnstableAffliction),
        Box::new(LivingBomb),
        Box::new(ExecuteSense),
        Box::new(PowerWordShield),
    ]
}

/// Registers every bundled script. A script that fails validation is
/// disabled on its own; the rest still load.
pub fn register_all(hooks: &mut HookRegistry, spells: &dyn SpellOracle) -> ScriptReport {
    let mut report = ScriptReport::default();
    for script in all_scripts() {
        match hooks.register_script(script.as_ref(), spells) {
            Ok(()) => report.loaded.push(script.name()),
            Err(error) => report.disabled.push(error),
        }
    }
    info!(
        target: "aura_content::scripts",
        loaded = report.loaded.len(),
        disabled = report.disabled.len(),
        "content scripts registered"
    );
    report
}
