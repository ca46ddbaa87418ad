//! Extension points content scripts plug into.
//!
//! Every extension point is a small handler trait. A content unit implements
//! only the traits it needs and registers them through [`ScriptHooks`]; plain
//! closures work too through the blanket impls below.
//!
//! # Execution model
//!
//! - Handlers receive a [`HookContext`] with read access to the world and
//!   queue [`AuraCommand`]s instead of mutating state directly.
//! - The engine commits the queued commands after a handler returns `Ok`.
//!   A failing handler is logged and its commands are discarded, so the
//!   aura keeps the state of the last committed mutation.
//! - Every matching entry fires, in registration order.
//! - Handlers must not panic. Isolation covers `Err` results only; a panic
//!   unwinds through the engine call that fired the hook and can leave an
//!   aura marked removed but still in its container. Report lookup misses
//!   and bad state as [`HookError`] instead.

mod context;
mod registry;
mod script;
mod selector;

pub(crate) use context::clamp_i32;
pub use context::{AbsorbCalc, AmountCalc, AuraCommand, HookContext, PeriodicCalc, StackChange};
pub use registry::{HookEntry, HookRegistry, HookTable};
pub use script::{AuraScript, ScriptHooks, ScriptLoadError};
pub use selector::{EffectFilter, HookSelector, SpellFilter};

use crate::env::OracleError;
use crate::error::{AuraError, ErrorSeverity};
use crate::event::{DamageInfo, ProcEventInfo};
use crate::types::{AuraId, EffectIndex, RemoveMode, UnitId};

/// Whether the engine's built-in reaction still runs after a hook.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum HookOutcome {
    #[default]
    Continue,
    /// Suppress the default action (periodic damage, proc trigger, absorb bookkeeping).
    PreventDefault,
}

impl HookOutcome {
    pub fn is_prevented(self) -> bool {
        self == Self::PreventDefault
    }

    /// Combines outcomes of several hooks: any prevention wins.
    pub fn merge(self, other: Self) -> Self {
        if self.is_prevented() || other.is_prevented() {
            Self::PreventDefault
        } else {
            Self::Continue
        }
    }
}

/// Extension point a hook was registered for. Used in logs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum HookKind {
    Apply,
    Remove,
    Periodic,
    Proc,
    CheckProc,
    CheckEffectProc,
    CalcAmount,
    CalcPeriodic,
    Absorb,
}

/// Errors returned by hook handlers.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum HookError {
    #[error("aura {0} no longer exists")]
    AuraMissing(AuraId),

    #[error("aura {aura} has no effect #{index}")]
    EffectMissing { aura: AuraId, index: EffectIndex },

    #[error("unit {0} no longer exists")]
    UnitMissing(UnitId),

    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error("script failure: {0}")]
    Script(String),
}

impl HookError {
    pub fn script(message: impl Into<String>) -> Self {
        Self::Script(message.into())
    }
}

impl AuraError for HookError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::AuraMissing(_) | Self::EffectMissing { .. } | Self::UnitMissing(_) => {
                ErrorSeverity::Recoverable
            }
            Self::Oracle(error) => error.severity(),
            Self::Script(_) => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::AuraMissing(_) => "HOOK_AURA_MISSING",
            Self::EffectMissing { .. } => "HOOK_EFFECT_MISSING",
            Self::UnitMissing(_) => "HOOK_UNIT_MISSING",
            Self::Oracle(error) => error.error_code(),
            Self::Script(_) => "HOOK_SCRIPT_FAILURE",
        }
    }
}

pub type HookResult<T = ()> = Result<T, HookError>;

// ============================================================================
// Handler traits
// ============================================================================

/// OnApply: fresh application, reapplication, stack change, or amount change.
///
/// `ctx.mode()` tells which one; `ctx.stack_change()` carries the stack delta.
pub trait ApplyHandler: Send + Sync {
    fn on_apply(&self, ctx: &mut HookContext<'_>) -> HookResult;
}

/// OnRemove: the aura is leaving its container.
pub trait RemoveHandler: Send + Sync {
    fn on_remove(&self, ctx: &mut HookContext<'_>, mode: RemoveMode) -> HookResult;
}

/// OnEffectPeriodic: one tick of a periodic effect.
pub trait PeriodicHandler: Send + Sync {
    fn on_tick(&self, ctx: &mut HookContext<'_>) -> HookResult<HookOutcome>;
}

/// OnEffectProc: an effect passed every proc gate.
pub trait ProcHandler: Send + Sync {
    fn on_proc(&self, ctx: &mut HookContext<'_>, event: &ProcEventInfo)
    -> HookResult<HookOutcome>;
}

/// DoCheckProc: aura-level veto evaluated before the chance roll.
pub trait CheckProcPredicate: Send + Sync {
    fn check_proc(&self, ctx: &HookContext<'_>, event: &ProcEventInfo) -> HookResult<bool>;
}

/// DoCheckEffectProc: per-effect veto evaluated before the chance roll.
pub trait CheckEffectProcPredicate: Send + Sync {
    fn check_effect_proc(&self, ctx: &HookContext<'_>, event: &ProcEventInfo)
    -> HookResult<bool>;
}

/// DoEffectCalcAmount: adjusts a freshly resolved amount before it is committed.
pub trait CalcAmountHandler: Send + Sync {
    fn calc_amount(&self, ctx: &HookContext<'_>, calc: &mut AmountCalc) -> HookResult;
}

/// DoEffectCalcPeriodic: decides periodicity and amplitude at construction.
pub trait CalcPeriodicHandler: Send + Sync {
    fn calc_periodic(&self, ctx: &HookContext<'_>, calc: &mut PeriodicCalc) -> HookResult;
}

/// OnEffectAbsorb: a shield is about to soak damage.
pub trait AbsorbHandler: Send + Sync {
    fn on_absorb(
        &self,
        ctx: &mut HookContext<'_>,
        damage: &DamageInfo,
        absorb: &mut AbsorbCalc,
    ) -> HookResult<HookOutcome>;
}

impl<F> ApplyHandler for F
where
    F: Fn(&mut HookContext<'_>) -> HookResult + Send + Sync,
{
    fn on_apply(&self, ctx: &mut HookContext<'_>) -> HookResult {
        self(ctx)
    }
}

impl<F> RemoveHandler for F
where
    F: Fn(&mut HookContext<'_>, RemoveMode) -> HookResult + Send + Sync,
{
    fn on_remove(&self, ctx: &mut HookContext<'_>, mode: RemoveMode) -> HookResult {
        self(ctx, mode)
    }
}

impl<F> PeriodicHandler for F
where
    F: Fn(&mut HookContext<'_>) -> HookResult<HookOutcome> + Send + Sync,
{
    fn on_tick(&self, ctx: &mut HookContext<'_>) -> HookResult<HookOutcome> {
        self(ctx)
    }
}

impl<F> ProcHandler for F
where
    F: Fn(&mut HookContext<'_>, &ProcEventInfo) -> HookResult<HookOutcome> + Send + Sync,
{
    fn on_proc(
        &self,
        ctx: &mut HookContext<'_>,
        event: &ProcEventInfo,
    ) -> HookResult<HookOutcome> {
        self(ctx, event)
    }
}

impl<F> CheckProcPredicate for F
where
    F: Fn(&HookContext<'_>, &ProcEventInfo) -> HookResult<bool> + Send + Sync,
{
    fn check_proc(&self, ctx: &HookContext<'_>, event: &ProcEventInfo) -> HookResult<bool> {
        self(ctx, event)
    }
}

impl<F> CheckEffectProcPredicate for F
where
    F: Fn(&HookContext<'_>, &ProcEventInfo) -> HookResult<bool> + Send + Sync,
{
    fn check_effect_proc(
        &self,
        ctx: &HookContext<'_>,
        event: &ProcEventInfo,
    ) -> HookResult<bool> {
        self(ctx, event)
    }
}

impl<F> CalcAmountHandler for F
where
    F: Fn(&HookContext<'_>, &mut AmountCalc) -> HookResult + Send + Sync,
{
    fn calc_amount(&self, ctx: &HookContext<'_>, calc: &mut AmountCalc) -> HookResult {
        self(ctx, calc)
    }
}

impl<F> CalcPeriodicHandler for F
where
    F: Fn(&HookContext<'_>, &mut PeriodicCalc) -> HookResult + Send + Sync,
{
    fn calc_periodic(&self, ctx: &HookContext<'_>, calc: &mut PeriodicCalc) -> HookResult {
        self(ctx, calc)
    }
}

impl<F> AbsorbHandler for F
where
    F: Fn(&mut HookContext<'_>, &DamageInfo, &mut AbsorbCalc) -> HookResult<HookOutcome>
        + Send
        + Sync,
{
    fn on_absorb(
        &self,
        ctx: &mut HookContext<'_>,
        damage: &DamageInfo,
        absorb: &mut AbsorbCalc,
    ) -> HookResult<HookOutcome> {
        self(ctx, damage, absorb)
    }
}
