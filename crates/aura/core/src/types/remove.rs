//! Removal reasons and the mask used to filter remove hooks.

use bitflags::bitflags;

/// Why an aura left its container.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum RemoveMode {
    /// Script or engine removal without a more specific reason.
    #[default]
    Default,
    /// Duration ran out, or the last charge was consumed.
    Expire,
    /// Removed by a dispel.
    Dispel,
    /// Owner died.
    Death,
    /// Removed by a hostile spell (including a depleted absorb shield).
    EnemySpell,
    /// Cancelled by the owner.
    Cancel,
}

impl RemoveMode {
    /// Returns the single-bit mask for this mode.
    pub const fn as_mask(self) -> RemoveModes {
        match self {
            Self::Default => RemoveModes::DEFAULT,
            Self::Expire => RemoveModes::EXPIRE,
            Self::Dispel => RemoveModes::DISPEL,
            Self::Death => RemoveModes::DEATH,
            Self::EnemySpell => RemoveModes::ENEMY_SPELL,
            Self::Cancel => RemoveModes::CANCEL,
        }
    }
}

bitflags! {
    /// Set of removal reasons a remove hook wants to observe.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct RemoveModes: u8 {
        const DEFAULT     = 1 << 0;
        const EXPIRE      = 1 << 1;
        const DISPEL      = 1 << 2;
        const DEATH       = 1 << 3;
        const ENEMY_SPELL = 1 << 4;
        const CANCEL      = 1 << 5;
    }
}

impl Default for RemoveModes {
    fn default() -> Self {
        Self::all()
    }
}

impl RemoveModes {
    #[inline]
    pub fn accepts(self, mode: RemoveMode) -> bool {
        self.contains(mode.as_mask())
    }
}
