use bitflags::bitflags;

bitflags! {
    /// Classification of one combat/cast occurrence.
    ///
    /// `DEAL_*`/`KILL` bits describe the actor side of the event, `TAKE_*`,
    /// `DEATH` and `DISPELLED` describe the action target. The dispatcher
    /// walks each side's auras only with that side's bits.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct ProcFlags: u32 {
        const DEAL_MELEE           = 1 << 0;
        const TAKE_MELEE           = 1 << 1;
        const DEAL_RANGED          = 1 << 2;
        const TAKE_RANGED          = 1 << 3;
        const DEAL_HELPFUL_SPELL   = 1 << 4;
        const TAKE_HELPFUL_SPELL   = 1 << 5;
        const DEAL_HARMFUL_SPELL   = 1 << 6;
        const TAKE_HARMFUL_SPELL   = 1 << 7;
        const DEAL_PERIODIC        = 1 << 8;
        const TAKE_PERIODIC        = 1 << 9;
        const KILL                 = 1 << 10;
        const DEATH                = 1 << 11;
        const DISPEL               = 1 << 12;
        const DISPELLED            = 1 << 13;
        const TAKE_ANY_DAMAGE      = 1 << 14;

        const ACTOR_MASK = Self::DEAL_MELEE.bits()
            | Self::DEAL_RANGED.bits()
            | Self::DEAL_HELPFUL_SPELL.bits()
            | Self::DEAL_HARMFUL_SPELL.bits()
            | Self::DEAL_PERIODIC.bits()
            | Self::KILL.bits()
            | Self::DISPEL.bits();

        const TARGET_MASK = Self::TAKE_MELEE.bits()
            | Self::TAKE_RANGED.bits()
            | Self::TAKE_HELPFUL_SPELL.bits()
            | Self::TAKE_HARMFUL_SPELL.bits()
            | Self::TAKE_PERIODIC.bits()
            | Self::DEATH.bits()
            | Self::DISPELLED.bits()
            | Self::TAKE_ANY_DAMAGE.bits();
    }
}

bitflags! {
    /// Outcome of the hit that produced an event.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct HitMask: u16 {
        const NORMAL   = 1 << 0;
        const CRITICAL = 1 << 1;
        const MISS     = 1 << 2;
        const DODGE    = 1 << 3;
        const PARRY    = 1 << 4;
        const ABSORB   = 1 << 5;
        const IMMUNE   = 1 << 6;
    }
}

bitflags! {
    /// Damage schools. An empty mask on a filter means "any school".
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct SchoolMask: u8 {
        const PHYSICAL = 1 << 0;
        const HOLY     = 1 << 1;
        const FIRE     = 1 << 2;
        const NATURE   = 1 << 3;
        const FROST    = 1 << 4;
        const SHADOW   = 1 << 5;
        const ARCANE   = 1 << 6;

        const MAGIC = Self::HOLY.bits()
            | Self::FIRE.bits()
            | Self::NATURE.bits()
            | Self::FROST.bits()
            | Self::SHADOW.bits()
            | Self::ARCANE.bits();
    }
}

impl SchoolMask {
    /// Filter semantics: an empty filter accepts every school.
    #[inline]
    pub fn accepts(self, school: SchoolMask) -> bool {
        self.is_empty() || self.intersects(school)
    }
}

bitflags! {
    /// Static per-spell behaviour switches read from the catalog.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct SpellAttributes: u16 {
        /// Reapplication never touches remaining duration (stacks still change).
        const NO_REFRESH            = 1 << 0;
        /// One aura per (spell, caster) instead of one per spell.
        const MULTI_CASTER          = 1 << 1;
        /// Survives the owner's death.
        const PERSIST_THROUGH_DEATH = 1 << 2;
        /// Removed from every target when its caster despawns.
        const CASTER_BOUND          = 1 << 3;
        /// Effect amounts are multiplied by the stack count.
        const STACK_SCALES_AMOUNT   = 1 << 4;
        /// Harmful aura (dispellable by friendly dispels).
        const NEGATIVE              = 1 << 5;
    }
}

bitflags! {
    /// Why an apply hook is running.
    ///
    /// Selectors carry a mask of accepted modes; a hook fires when the mask
    /// intersects the current mode.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct HandleMode: u8 {
        /// Fresh application.
        const REAL          = 1 << 0;
        /// Reapplication of an existing aura.
        const REAPPLY       = 1 << 1;
        /// Stack count changed.
        const STACK         = 1 << 2;
        /// Committed amount changed.
        const CHANGE_AMOUNT = 1 << 3;
    }
}

impl Default for HandleMode {
    fn default() -> Self {
        Self::REAL
    }
}
