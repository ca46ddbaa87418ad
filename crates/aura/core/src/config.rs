/// Engine configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Base seed mixed into every proc roll (replays reproduce the same rolls).
    pub game_seed: u64,
    /// Maximum nesting of hook-triggered engine work (command → hook → command ...).
    pub max_hook_depth: usize,
    /// Upper bound on request → event rounds a host resolves for one command.
    pub max_cascade_depth: usize,
    /// Upper bound on ticks a single effect may fire in one update step.
    pub max_ticks_per_update: u32,
    /// Proc chance (percent) used when a proc entry does not specify one.
    pub default_proc_chance: f32,
}

impl EngineConfig {
    // ===== compile-time constants used as type parameters =====
    pub const MAX_EFFECTS_PER_AURA: usize = 8;
    pub const MAX_SCRIPT_SLOTS: usize = 16;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_GAME_SEED: u64 = 0x5eed;
    pub const DEFAULT_MAX_HOOK_DEPTH: usize = 8;
    pub const DEFAULT_MAX_CASCADE_DEPTH: usize = 16;
    pub const DEFAULT_MAX_TICKS_PER_UPDATE: u32 = 1_000;
    pub const DEFAULT_PROC_CHANCE: f32 = 100.0;

    pub fn new() -> Self {
        Self {
            game_seed: Self::DEFAULT_GAME_SEED,
            max_hook_depth: Self::DEFAULT_MAX_HOOK_DEPTH,
            max_cascade_depth: Self::DEFAULT_MAX_CASCADE_DEPTH,
            max_ticks_per_update: Self::DEFAULT_MAX_TICKS_PER_UPDATE,
            default_proc_chance: Self::DEFAULT_PROC_CHANCE,
        }
    }

    pub fn with_seed(game_seed: u64) -> Self {
        Self {
            game_seed,
            ..Self::new()
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}
