//! Oracle access errors.

use crate::error::{AuraError, ErrorSeverity};
use crate::types::{SpellId, UnitId};

/// Errors that occur when accessing oracle data.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OracleError {
    /// SpellOracle is not available in the environment.
    #[error("SpellOracle not available")]
    SpellsNotAvailable,

    /// UnitOracle is not available in the environment.
    #[error("UnitOracle not available")]
    UnitsNotAvailable,

    /// RngOracle is not available in the environment.
    #[error("RngOracle not available")]
    RngNotAvailable,

    /// Spell is not present in the catalog.
    #[error("spell {0} not found in catalog")]
    SpellNotFound(SpellId),

    /// Unit is unknown to the unit oracle.
    #[error("unit {0} not found")]
    UnitNotFound(UnitId),
}

impl AuraError for OracleError {
    fn severity(&self) -> ErrorSeverity {
        use OracleError::*;
        match self {
            SpellsNotAvailable | UnitsNotAvailable | RngNotAvailable => ErrorSeverity::Fatal,
            SpellNotFound(_) => ErrorSeverity::Validation,
            UnitNotFound(_) => ErrorSeverity::Recoverable,
        }
    }

    fn error_code(&self) -> &'static str {
        use OracleError::*;
        match self {
            SpellsNotAvailable => "ORACLE_SPELLS_NOT_AVAILABLE",
            UnitsNotAvailable => "ORACLE_UNITS_NOT_AVAILABLE",
            RngNotAvailable => "ORACLE_RNG_NOT_AVAILABLE",
            SpellNotFound(_) => "ORACLE_SPELL_NOT_FOUND",
            UnitNotFound(_) => "ORACLE_UNIT_NOT_FOUND",
        }
    }
}
