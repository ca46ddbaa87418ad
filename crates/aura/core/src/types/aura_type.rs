//! Closed set of aura effect kinds understood by the engine.

/// What an aura effect does while it is applied.
///
/// The engine only attaches built-in behaviour to a handful of variants
/// (periodic damage/heal/trigger, proc triggers, absorb shields). Every
/// other variant is a passive tag whose meaning lives in content hooks or in
/// the host's stat layer.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum AuraType {
    /// No built-in behaviour; scripts decide.
    Dummy,

    // ========================================================================
    // Periodic
    // ========================================================================
    /// Deals `amount` damage to the owner each tick.
    PeriodicDamage,
    /// Heals the owner for `amount` each tick.
    PeriodicHeal,
    /// Casts the effect's trigger spell on the owner each tick.
    PeriodicTriggerSpell,
    /// Ticks without built-in behaviour.
    PeriodicDummy,

    // ========================================================================
    // Proc
    // ========================================================================
    /// Casts the effect's trigger spell when the aura procs.
    ProcTriggerSpell,
    /// Deals `amount` damage to the other side of the event when the aura procs.
    ProcTriggerDamage,

    // ========================================================================
    // Passive modifiers
    // ========================================================================
    /// Absorbs incoming damage of the effect's school until `amount` is spent.
    SchoolAbsorb,
    /// Modifies one stat by `amount`.
    ModStat,
    /// Modifies movement speed by `amount` percent (negative slows).
    ModDecreaseSpeed,
    /// Modifies damage done by `amount` percent.
    ModDamagePercentDone,
    /// Modifies damage taken by `amount` percent.
    ModDamagePercentTaken,
    /// Modifies healing received by `amount` percent.
    ModHealingPct,
    /// Prevents the owner from acting.
    ModStun,
}

impl AuraType {
    /// Returns true if the scheduler should tick effects of this type.
    pub const fn is_periodic(&self) -> bool {
        matches!(
            self,
            Self::PeriodicDamage
                | Self::PeriodicHeal
                | Self::PeriodicTriggerSpell
                | Self::PeriodicDummy
        )
    }

    /// Returns true if the proc dispatcher evaluates effects of this type.
    pub const fn is_proc_capable(&self) -> bool {
        matches!(
            self,
            Self::Dummy | Self::ProcTriggerSpell | Self::ProcTriggerDamage
        )
    }
}
