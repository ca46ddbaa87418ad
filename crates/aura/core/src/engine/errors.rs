//! Error and outcome types for engine operations.

use crate::env::OracleError;
use crate::error::{AuraError, ErrorSeverity};
use crate::types::{AuraId, SpellId, UnitId};

/// Why an application produced no aura change ("the spell fizzled").
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum RejectReason {
    /// Spell is not in the catalog.
    UnknownSpell(SpellId),
    /// Spell has no aura-applying effects.
    NoAuraEffects(SpellId),
    /// Spell defines more aura effects than an aura can hold.
    TooManyEffects(SpellId),
    TargetMissing(UnitId),
    TargetDead(UnitId),
}

/// Result of [`crate::AuraEngine::apply_aura`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// A new aura entered the target's container.
    Applied(AuraId),
    /// An existing aura was refreshed and/or stacked.
    Refreshed(AuraId),
    Rejected(RejectReason),
}

impl ApplyOutcome {
    pub fn aura(&self) -> Option<AuraId> {
        match self {
            Self::Applied(id) | Self::Refreshed(id) => Some(*id),
            Self::Rejected(_) => None,
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }
}

/// Errors surfaced by engine operations.
///
/// Rejected applications and hook failures are not errors; only missing
/// collaborators and broken invariants end up here.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error("aura {0} not found")]
    AuraNotFound(AuraId),

    #[error("hook chain too deep: {hook} reached depth {depth}")]
    HookChainTooDeep { hook: &'static str, depth: usize },
}

impl AuraError for EngineError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Oracle(error) => error.severity(),
            Self::AuraNotFound(_) => ErrorSeverity::Recoverable,
            Self::HookChainTooDeep { .. } => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Oracle(error) => error.error_code(),
            Self::AuraNotFound(_) => "ENGINE_AURA_NOT_FOUND",
            Self::HookChainTooDeep { .. } => "ENGINE_HOOK_CHAIN_TOO_DEEP",
        }
    }
}
