//! Traits describing read-only world data.
//!
//! Oracles expose the spell catalog, unit state, and the roll source. The
//! [`Env`] aggregate bundles them so the engine can access everything it
//! needs without hard coupling to concrete implementations.
mod error;
mod rng;
mod spells;
mod units;

pub use error::OracleError;
pub use rng::{FixedRng, PcgRng, RngOracle, compute_seed};
pub use spells::{
    ProcEntry, SpellCatalog, SpellEffectInfo, SpellEffectKind, SpellInfo, SpellOracle,
    StatScaling,
};
pub use units::{Stat, UnitClass, UnitOracle, UnitRecord, UnitTable};

use crate::types::SpellId;

/// Aggregates the read-only oracles required by the engine and by hooks.
pub struct Env<'a, S, U, R>
where
    S: SpellOracle + ?Sized,
    U: UnitOracle + ?Sized,
    R: RngOracle + ?Sized,
{
    spells: Option<&'a S>,
    units: Option<&'a U>,
    rng: Option<&'a R>,
}

// Manual impls: a derive would require `S: Clone` etc. even though only references are stored.
impl<S, U, R> Clone for Env<'_, S, U, R>
where
    S: SpellOracle + ?Sized,
    U: UnitOracle + ?Sized,
    R: RngOracle + ?Sized,
{
    fn clone(&self) -> Self {
        *self
    }
}

impl<S, U, R> Copy for Env<'_, S, U, R>
where
    S: SpellOracle + ?Sized,
    U: UnitOracle + ?Sized,
    R: RngOracle + ?Sized,
{
}

pub type AuraEnv<'a> = Env<'a, dyn SpellOracle + 'a, dyn UnitOracle + 'a, dyn RngOracle + 'a>;

impl<'a, S, U, R> Env<'a, S, U, R>
where
    S: SpellOracle + ?Sized,
    U: UnitOracle + ?Sized,
    R: RngOracle + ?Sized,
{
    pub fn new(spells: Option<&'a S>, units: Option<&'a U>, rng: Option<&'a R>) -> Self {
        Self { spells, units, rng }
    }

    pub fn with_all(spells: &'a S, units: &'a U, rng: &'a R) -> Self {
        Self::new(Some(spells), Some(units), Some(rng))
    }

    pub fn empty() -> Self {
        Self {
            spells: None,
            units: None,
            rng: None,
        }
    }

    /// Returns the SpellOracle, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::SpellsNotAvailable` if no spell oracle was provided.
    pub fn spells(&self) -> Result<&'a S, OracleError> {
        self.spells.ok_or(OracleError::SpellsNotAvailable)
    }

    /// Returns the UnitOracle, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::UnitsNotAvailable` if no unit oracle was provided.
    pub fn units(&self) -> Result<&'a U, OracleError> {
        self.units.ok_or(OracleError::UnitsNotAvailable)
    }

    /// Returns the RngOracle, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::RngNotAvailable` if no rng oracle was provided.
    pub fn rng(&self) -> Result<&'a R, OracleError> {
        self.rng.ok_or(OracleError::RngNotAvailable)
    }

    /// Looks up a spell, failing if either the oracle or the spell is missing.
    pub fn spell(&self, id: SpellId) -> Result<&'a SpellInfo, OracleError> {
        self.spells()?.spell(id).ok_or(OracleError::SpellNotFound(id))
    }
}

impl<'a, S, U, R> Env<'a, S, U, R>
where
    S: SpellOracle + 'a,
    U: UnitOracle + 'a,
    R: RngOracle + 'a,
{
    /// Converts this environment into the trait-object based `AuraEnv`.
    pub fn as_aura_env(&self) -> AuraEnv<'a> {
        let spells: Option<&'a dyn SpellOracle> = self.spells.map(|spells| spells as _);
        let units: Option<&'a dyn UnitOracle> = self.units.map(|units| units as _);
        let rng: Option<&'a dyn RngOracle> = self.rng.map(|rng| rng as _);
        Env::new(spells, units, rng)
    }
}
