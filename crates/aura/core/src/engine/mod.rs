//! Aura lifecycle, stacking, amount resolution, periodic scheduling, and
//! proc dispatch.
//!
//! The [`AuraEngine`] is the only writer of [`World`]. Hosts construct one
//! per simulation step around their world, oracles, and hook registry, call
//! into it, then drain the queued notifications and combat requests.

mod absorb;
mod amount;
mod commands;
mod dispatch;
mod errors;
mod lifecycle;
mod periodic;
mod proc;
mod stacking;

pub use errors::{ApplyOutcome, EngineError, RejectReason};

use crate::env::AuraEnv;
use crate::event::ProcEventInfo;
use crate::hooks::HookRegistry;
use crate::output::EngineOutput;
use crate::state::{CastContext, World};
use crate::types::{ItemId, ProcEventId, ProcFlags, SpellId, UnitId};

/// Request to put a spell's aura on a target.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AuraApplication {
    pub spell: SpellId,
    pub caster: UnitId,
    pub target: UnitId,
    pub cast_item: Option<ItemId>,
    pub context: CastContext,
    /// Stacks added by this application (at least 1).
    pub stacks: u8,
    /// Overrides the catalog duration.
    pub duration: Option<u32>,
}

impl AuraApplication {
    pub fn new(spell: SpellId, caster: UnitId, target: UnitId) -> Self {
        Self {
            spell,
            caster,
            target,
            cast_item: None,
            context: CastContext::default(),
            stacks: 1,
            duration: None,
        }
    }

    pub fn with_item(mut self, item: ItemId) -> Self {
        self.cast_item = Some(item);
        self
    }

    pub fn with_context(mut self, context: CastContext) -> Self {
        self.context = context;
        self
    }

    pub fn with_stacks(mut self, stacks: u8) -> Self {
        self.stacks = stacks;
        self
    }

    pub fn with_duration(mut self, duration_ms: u32) -> Self {
        self.duration = Some(duration_ms);
        self
    }
}

/// Authoritative reducer for aura state.
///
/// All structural changes (application, refresh, stacking, amount commits,
/// ticks, procs, removal) go through this type so hook ordering and
/// notifications stay consistent.
pub struct AuraEngine<'a> {
    world: &'a mut World,
    env: AuraEnv<'a>,
    hooks: &'a HookRegistry,
    /// Nesting of hook-triggered command batches.
    depth: usize,
    /// Events currently being dispatched.
    in_flight: Vec<ProcEventId>,
}

impl<'a> AuraEngine<'a> {
    pub fn new(world: &'a mut World, env: AuraEnv<'a>, hooks: &'a HookRegistry) -> Self {
        Self {
            world,
            env,
            hooks,
            depth: 0,
            in_flight: Vec::new(),
        }
    }

    pub fn world(&self) -> &World {
        self.world
    }

    pub fn env(&self) -> AuraEnv<'a> {
        self.env
    }

    pub fn hooks(&self) -> &'a HookRegistry {
        self.hooks
    }

    pub fn now(&self) -> u64 {
        self.world.now()
    }

    /// Starts a new combat/cast event with a fresh id.
    pub fn new_event(&mut self, actor: UnitId, flags: ProcFlags) -> ProcEventInfo {
        ProcEventInfo::new(self.world.allocate_event_id(), actor, flags)
    }

    /// Hands queued notifications and combat requests to the host.
    pub fn drain_output(&mut self) -> EngineOutput {
        self.world.drain_output()
    }
}
