//! Commits commands queued by hooks.

use tracing::{debug, error};

use super::{AuraEngine, EngineError};
use crate::error::AuraError;
use crate::hooks::AuraCommand;
use crate::output::AuraNotification;
use crate::types::{AuraId, EffectIndex};

impl AuraEngine<'_> {
    /// Commits one hook's commands in queue order, one nesting level deeper.
    pub(crate) fn run_commands(&mut self, owner: &'static str, commands: Vec<AuraCommand>) {
        if commands.is_empty() {
            return;
        }
        let max_depth = self.world.config().max_hook_depth;
        if self.depth >= max_depth {
            let error = EngineError::HookChainTooDeep {
                hook: owner,
                depth: self.depth,
            };
            error!(
                target: "aura_core::engine",
                code = error.error_code(),
                dropped = commands.len(),
                error = %error,
                "dropping hook commands"
            );
            return;
        }

        self.depth += 1;
        for command in commands {
            self.apply_command(command);
        }
        self.depth -= 1;
    }

    /// Executes a single command. Commands aimed at auras that are gone are no-ops.
    pub fn apply_command(&mut self, command: AuraCommand) {
        match command {
            AuraCommand::ChangeAmount {
                aura,
                effect,
                amount,
            } => {
                self.change_amount(aura, effect, amount);
            }
            AuraCommand::RecalculateAmount { aura, effect } => {
                self.recalculate_amount(aura, effect);
            }
            AuraCommand::SetAmplitude {
                aura,
                effect,
                amplitude,
            } => {
                if let Some(timer) = self.timer_mut(aura, effect) {
                    timer.amplitude = amplitude;
                }
            }
            AuraCommand::SetPeriodicEnabled {
                aura,
                effect,
                enabled,
            } => {
                if let Some(timer) = self.timer_mut(aura, effect) {
                    timer.enabled = enabled;
                }
            }
            AuraCommand::SetDuration { aura, duration } => {
                self.set_duration(aura, duration);
            }
            AuraCommand::ModStackAmount { aura, delta, mode } => {
                self.mod_stack_amount(aura, delta, mode);
            }
            AuraCommand::RemoveAuraFromStack {
                owner,
                spell,
                caster,
                mode,
            } => {
                self.remove_aura_from_stack(owner, spell, caster, mode);
            }
            AuraCommand::RemoveAura { aura, mode } => {
                self.remove_aura(aura, mode);
            }
            AuraCommand::RemoveAurasBySpell {
                owner,
                spell,
                caster,
                mode,
            } => {
                self.remove_auras_by_spell(owner, spell, caster, mode);
            }
            AuraCommand::SetScriptValue {
                aura,
                effect,
                slot,
                value,
            } => {
                self.with_script_data(aura, effect, |data| data.set(slot, value));
            }
            AuraCommand::AddScriptValue {
                aura,
                effect,
                slot,
                delta,
            } => {
                self.with_script_data(aura, effect, |data| data.add(slot, delta));
            }
            AuraCommand::PushScriptValue {
                aura,
                effect,
                start,
                len,
                value,
            } => {
                self.with_script_data(aura, effect, |data| data.push_ring(start, len, value));
            }
            AuraCommand::Request(request) => self.world.output.request(request),
            AuraCommand::ApplyAura(application) => match self.apply_aura(application) {
                Ok(outcome) if outcome.is_rejected() => {
                    debug!(target: "aura_core::engine", ?outcome, "hook application rejected");
                }
                Ok(_) => {}
                Err(error) => {
                    error!(
                        target: "aura_core::engine",
                        code = error.error_code(),
                        error = %error,
                        "hook application failed"
                    );
                }
            },
        }
    }

    fn timer_mut(
        &mut self,
        aura: AuraId,
        effect: EffectIndex,
    ) -> Option<&mut crate::state::PeriodicTimer> {
        let aura = self.world.aura_mut(aura)?;
        if !aura.is_active() {
            return None;
        }
        aura.effect_mut(effect)?.periodic.as_mut()
    }

    fn set_duration(&mut self, aura_id: AuraId, duration: Option<u32>) {
        let Some(aura) = self.world.aura_mut(aura_id) else {
            return;
        };
        if !aura.is_active() {
            return;
        }
        aura.duration = duration;
        match (duration, aura.max_duration) {
            (None, _) => aura.max_duration = None,
            (Some(new), Some(max)) if new > max => aura.max_duration = Some(new),
            (Some(new), None) => aura.max_duration = Some(new),
            _ => {}
        }
        let notification = AuraNotification::Refreshed {
            aura: aura.id,
            unit: aura.owner,
            spell: aura.spell,
            duration,
        };
        self.world.output.notify(notification);
    }

    fn with_script_data(
        &mut self,
        aura: AuraId,
        effect: EffectIndex,
        write: impl FnOnce(&mut crate::state::ScriptData) -> bool,
    ) {
        let Some(target) = self
            .world
            .aura_mut(aura)
            .filter(|aura| aura.is_active())
            .and_then(|aura| aura.effect_mut(effect))
        else {
            return;
        };
        if !write(&mut target.script_data) {
            debug!(
                target: "aura_core::engine",
                aura = %aura,
                effect,
                "script data slot out of range"
            );
        }
    }
}
