//! Data handed to hook handlers and the commands they queue.

use crate::engine::AuraApplication;
use crate::env::AuraEnv;
use crate::output::CombatRequest;
use crate::state::{Aura, AuraEffect, World};
use crate::types::{AuraId, EffectIndex, HandleMode, RemoveMode, SchoolMask, SpellId, UnitId};

/// Stack transition that caused a `STACK` apply hook.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StackChange {
    pub previous: u8,
    pub current: u8,
}

impl StackChange {
    /// Returns true if this change moved the count from below `threshold` to
    /// at or above it, including multi-stack jumps past it.
    pub fn reached(&self, threshold: u8) -> bool {
        self.previous < threshold && self.current >= threshold
    }

    pub fn is_increase(&self) -> bool {
        self.current > self.previous
    }
}

/// Amount being resolved for one effect. Calc handlers mutate it in place.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AmountCalc {
    pub amount: i32,
    pub can_be_recalculated: bool,
}

impl AmountCalc {
    /// Adds a percentage of the current amount (negative percentages reduce it).
    pub fn add_pct(&mut self, pct: i32) {
        let delta = i64::from(self.amount) * i64::from(pct) / 100;
        self.amount = clamp_i32(i64::from(self.amount) + delta);
    }
}

/// Periodicity being resolved for one effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PeriodicCalc {
    pub is_periodic: bool,
    pub amplitude: u32,
}

/// Amount a shield is about to soak. Starts at `min(shield, remaining damage)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AbsorbCalc {
    pub absorb: u32,
}

pub(crate) fn clamp_i32(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Deferred mutation queued by a hook.
///
/// Commands are committed in queue order after the hook returns `Ok`.
#[derive(Clone, Debug, PartialEq)]
pub enum AuraCommand {
    /// Commit a new amount through the resolver commit path.
    ChangeAmount {
        aura: AuraId,
        effect: EffectIndex,
        amount: i32,
    },
    /// Re-run the resolver for a recalculable effect.
    RecalculateAmount { aura: AuraId, effect: EffectIndex },
    /// New tick period; applies from the next tick check.
    SetAmplitude {
        aura: AuraId,
        effect: EffectIndex,
        amplitude: u32,
    },
    SetPeriodicEnabled {
        aura: AuraId,
        effect: EffectIndex,
        enabled: bool,
    },
    SetDuration { aura: AuraId, duration: Option<u32> },
    ModStackAmount {
        aura: AuraId,
        delta: i32,
        mode: RemoveMode,
    },
    /// Single-stack (or single-charge) decrement by identity.
    RemoveAuraFromStack {
        owner: UnitId,
        spell: SpellId,
        caster: Option<UnitId>,
        mode: RemoveMode,
    },
    RemoveAura { aura: AuraId, mode: RemoveMode },
    RemoveAurasBySpell {
        owner: UnitId,
        spell: SpellId,
        caster: Option<UnitId>,
        mode: RemoveMode,
    },
    SetScriptValue {
        aura: AuraId,
        effect: EffectIndex,
        slot: usize,
        value: i64,
    },
    AddScriptValue {
        aura: AuraId,
        effect: EffectIndex,
        slot: usize,
        delta: i64,
    },
    PushScriptValue {
        aura: AuraId,
        effect: EffectIndex,
        start: usize,
        len: usize,
        value: i64,
    },
    Request(CombatRequest),
    ApplyAura(AuraApplication),
}

/// View of the world handed to one hook invocation.
pub struct HookContext<'a> {
    world: &'a World,
    env: AuraEnv<'a>,
    aura: &'a Aura,
    effect: Option<EffectIndex>,
    mode: HandleMode,
    stack_change: Option<StackChange>,
    commands: Vec<AuraCommand>,
}

impl<'a> HookContext<'a> {
    pub(crate) fn new(
        world: &'a World,
        env: AuraEnv<'a>,
        aura: &'a Aura,
        effect: Option<EffectIndex>,
    ) -> Self {
        Self {
            world,
            env,
            aura,
            effect,
            mode: HandleMode::REAL,
            stack_change: None,
            commands: Vec::new(),
        }
    }

    pub(crate) fn with_mode(mut self, mode: HandleMode, stack_change: Option<StackChange>) -> Self {
        self.mode = mode;
        self.stack_change = stack_change;
        self
    }

    pub(crate) fn into_commands(self) -> Vec<AuraCommand> {
        self.commands
    }

    // ===== read access =====

    pub fn world(&self) -> &'a World {
        self.world
    }

    pub fn env(&self) -> AuraEnv<'a> {
        self.env
    }

    pub fn now(&self) -> u64 {
        self.world.now()
    }

    pub fn aura(&self) -> &'a Aura {
        self.aura
    }

    pub fn aura_id(&self) -> AuraId {
        self.aura.id()
    }

    pub fn spell(&self) -> SpellId {
        self.aura.spell()
    }

    pub fn caster(&self) -> UnitId {
        self.aura.caster()
    }

    pub fn owner(&self) -> UnitId {
        self.aura.owner()
    }

    pub fn effect_index(&self) -> Option<EffectIndex> {
        self.effect
    }

    /// The effect this hook was invoked for. `None` for aura-level hooks.
    pub fn effect(&self) -> Option<&'a AuraEffect> {
        self.aura.effect(self.effect?)
    }

    /// A companion effect of the same aura.
    pub fn effect_at(&self, index: EffectIndex) -> Option<&'a AuraEffect> {
        self.aura.effect(index)
    }

    pub fn mode(&self) -> HandleMode {
        self.mode
    }

    pub fn stack_change(&self) -> Option<StackChange> {
        self.stack_change
    }

    /// Ticks fired so far by this hook's effect (the current tick included).
    pub fn tick_number(&self) -> u32 {
        self.effect().map_or(0, AuraEffect::tick_number)
    }

    pub fn commands(&self) -> &[AuraCommand] {
        &self.commands
    }

    fn current_effect(&self) -> EffectIndex {
        self.effect.unwrap_or(0)
    }

    // ===== queued mutations =====

    pub fn push(&mut self, command: AuraCommand) {
        self.commands.push(command);
    }

    pub fn change_amount(&mut self, effect: EffectIndex, amount: i32) {
        self.push(AuraCommand::ChangeAmount {
            aura: self.aura.id(),
            effect,
            amount,
        });
    }

    pub fn recalculate_amount(&mut self, effect: EffectIndex) {
        self.push(AuraCommand::RecalculateAmount {
            aura: self.aura.id(),
            effect,
        });
    }

    pub fn set_amplitude(&mut self, amplitude: u32) {
        self.push(AuraCommand::SetAmplitude {
            aura: self.aura.id(),
            effect: self.current_effect(),
            amplitude,
        });
    }

    /// Stops (or resumes) ticking of this hook's effect without removing the aura.
    pub fn set_periodic_enabled(&mut self, enabled: bool) {
        self.push(AuraCommand::SetPeriodicEnabled {
            aura: self.aura.id(),
            effect: self.current_effect(),
            enabled,
        });
    }

    pub fn set_duration(&mut self, duration: Option<u32>) {
        self.push(AuraCommand::SetDuration {
            aura: self.aura.id(),
            duration,
        });
    }

    pub fn mod_stack_amount(&mut self, delta: i32, mode: RemoveMode) {
        self.push(AuraCommand::ModStackAmount {
            aura: self.aura.id(),
            delta,
            mode,
        });
    }

    pub fn remove_aura_from_stack(
        &mut self,
        owner: UnitId,
        spell: SpellId,
        caster: Option<UnitId>,
        mode: RemoveMode,
    ) {
        self.push(AuraCommand::RemoveAuraFromStack {
            owner,
            spell,
            caster,
            mode,
        });
    }

    /// Removes the aura this hook belongs to.
    pub fn remove_self(&mut self, mode: RemoveMode) {
        self.push(AuraCommand::RemoveAura {
            aura: self.aura.id(),
            mode,
        });
    }

    pub fn remove_aura(&mut self, aura: AuraId, mode: RemoveMode) {
        self.push(AuraCommand::RemoveAura { aura, mode });
    }

    pub fn remove_auras_by_spell(
        &mut self,
        owner: UnitId,
        spell: SpellId,
        caster: Option<UnitId>,
        mode: RemoveMode,
    ) {
        self.push(AuraCommand::RemoveAurasBySpell {
            owner,
            spell,
            caster,
            mode,
        });
    }

    pub fn set_script_value(&mut self, effect: EffectIndex, slot: usize, value: i64) {
        self.push(AuraCommand::SetScriptValue {
            aura: self.aura.id(),
            effect,
            slot,
            value,
        });
    }

    pub fn add_script_value(&mut self, effect: EffectIndex, slot: usize, delta: i64) {
        self.push(AuraCommand::AddScriptValue {
            aura: self.aura.id(),
            effect,
            slot,
            delta,
        });
    }

    pub fn push_script_value(&mut self, effect: EffectIndex, start: usize, len: usize, value: i64) {
        self.push(AuraCommand::PushScriptValue {
            aura: self.aura.id(),
            effect,
            start,
            len,
            value,
        });
    }

    pub fn request(&mut self, request: CombatRequest) {
        self.push(AuraCommand::Request(request));
    }

    /// Casts a spell as a new, independently dispatched event.
    pub fn cast_spell(&mut self, caster: UnitId, target: UnitId, spell: SpellId) {
        self.request(CombatRequest::CastSpell {
            caster,
            target,
            spell,
            triggered_by: Some(self.aura.id()),
        });
    }

    pub fn deal_damage(&mut self, source: UnitId, target: UnitId, amount: u32, school: SchoolMask) {
        self.request(CombatRequest::Damage {
            source,
            target,
            spell: self.aura.spell(),
            amount,
            school,
            periodic: false,
            triggered_by: Some(self.aura.id()),
        });
    }

    pub fn heal(&mut self, source: UnitId, target: UnitId, amount: u32) {
        self.request(CombatRequest::Heal {
            source,
            target,
            spell: self.aura.spell(),
            amount,
            periodic: false,
            triggered_by: Some(self.aura.id()),
        });
    }

    pub fn play_visual(&mut self, unit: UnitId, visual: u32) {
        self.request(CombatRequest::PlayVisual {
            unit,
            spell: self.aura.spell(),
            visual,
        });
    }

    pub fn apply_aura(&mut self, application: AuraApplication) {
        self.push(AuraCommand::ApplyAura(application));
    }
}
