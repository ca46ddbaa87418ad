//! Common error infrastructure for aura-core.
//!
//! Domain-specific errors (`EngineError`, `HookError`, `OracleError`,
//! `ScriptLoadError`) live next to the code that produces them and share the
//! classification defined here.

/// Severity level of an error, used for categorization and logging priority.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Transient condition; the same request may succeed later.
    ///
    /// Examples: referenced aura already gone, caster despawned mid-hook
    Recoverable,

    /// Invalid input, rejected without retry.
    ///
    /// Examples: unknown spell id, effect index outside the spell
    Validation,

    /// Unexpected state inconsistency; indicates a bug worth investigating.
    ///
    /// Examples: hook recursion past the configured depth
    Internal,

    /// The engine cannot proceed.
    ///
    /// Examples: required oracle not provided
    Fatal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all aura-core errors.
///
/// - All error enums implement this trait
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait AuraError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
