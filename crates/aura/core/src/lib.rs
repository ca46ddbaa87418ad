//! Deterministic status-effect (aura) engine.
//!
//! `aura-core` tracks time-limited, stacking, periodically ticking effects on
//! simulated units and dispatches combat events to interested effects. It
//! performs no I/O: spell data, unit stats and randomness come in through the
//! oracles in [`env`], content plugs in through [`hooks`], and every state
//! change flows through [`engine::AuraEngine`]. Hosts drain the resulting
//! notifications and combat requests after each call.
pub mod config;
pub mod engine;
pub mod env;
pub mod error;
pub mod event;
pub mod hooks;
pub mod output;
pub mod state;
pub mod types;

pub use config::EngineConfig;
pub use engine::{ApplyOutcome, AuraApplication, AuraEngine, EngineError, RejectReason};
pub use env::{
    AuraEnv, Env, FixedRng, OracleError, PcgRng, ProcEntry, RngOracle, SpellCatalog,
    SpellEffectInfo, SpellEffectKind, SpellInfo, SpellOracle, Stat, StatScaling, UnitClass,
    UnitOracle, UnitRecord, UnitTable, compute_seed,
};
pub use error::{AuraError, ErrorSeverity};
pub use event::{DamageInfo, HealInfo, ProcEventInfo};
pub use hooks::{
    AbsorbCalc, AmountCalc, AuraCommand, AuraScript, EffectFilter, HookContext, HookError,
    HookOutcome, HookRegistry, HookResult, HookSelector, PeriodicCalc, ScriptHooks,
    ScriptLoadError, SpellFilter, StackChange,
};
pub use output::{AuraNotification, CombatRequest, EngineOutput};
pub use state::{
    Aura, AuraContainer, AuraEffect, AuraState, CastContext, Difficulty, PeriodicTimer,
    ScriptData, World,
};
pub use types::{
    AuraId, AuraType, EffectIndex, HandleMode, HitMask, ItemId, ProcEventId, ProcFlags,
    RemoveMode, RemoveModes, SchoolMask, SpellAttributes, SpellId, UnitId,
};
