//! Cloneable façade for issuing commands to the runtime.
//!
//! [`RuntimeHandle`] hides channel plumbing and offers async helpers for
//! driving the shard or streaming events from specific topics.
use tokio::sync::{broadcast, mpsc, oneshot};

use aura_core::{
    ApplyOutcome, AuraApplication, AuraId, DamageInfo, HealInfo, HitMask, ProcFlags, RemoveMode,
    SpellId, Stat, UnitId, UnitRecord,
};

use super::errors::{Result, RuntimeError};
use super::snapshot::{DamageReport, UnitSnapshot};
use crate::events::{Event, EventBus, Topic};
use crate::workers::Command;

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct RuntimeHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl RuntimeHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, event_bus: EventBus) -> Self {
        Self {
            command_tx,
            event_bus,
        }
    }

    async fn request<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(command(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Add a unit to the shard. Fails if the id is taken.
    pub async fn spawn_unit(&self, unit: UnitRecord) -> Result<()> {
        self.request(|reply| Command::SpawnUnit { unit, reply }).await?
    }

    /// Remove a unit, its auras, and the caster-bound auras it cast on others.
    pub async fn despawn_unit(&self, unit: UnitId) -> Result<usize> {
        self.request(|reply| Command::DespawnUnit { unit, reply })
            .await?
    }

    /// Kill a unit outright. Returns the number of auras death removed.
    pub async fn kill_unit(&self, unit: UnitId, killer: Option<UnitId>) -> Result<usize> {
        self.request(|reply| Command::KillUnit {
            unit,
            killer,
            reply,
        })
        .await?
    }

    /// Overwrite a stat and recalculate the effect amounts scaling with it.
    pub async fn set_stat(&self, unit: UnitId, stat: Stat, value: i32) -> Result<usize> {
        self.request(|reply| Command::SetStat {
            unit,
            stat,
            value,
            reply,
        })
        .await?
    }

    /// Apply (or refresh/stack) a spell's aura.
    ///
    /// Invalid applications come back as [`ApplyOutcome::Rejected`], not as errors.
    pub async fn apply_aura(&self, application: AuraApplication) -> Result<ApplyOutcome> {
        self.request(|reply| Command::ApplyAura { application, reply })
            .await?
    }

    /// Cast a spell: aura effects go through [`Self::apply_aura`], instant
    /// damage and heal effects through the combat host.
    pub async fn cast_spell(
        &self,
        caster: UnitId,
        target: UnitId,
        spell: SpellId,
    ) -> Result<Option<AuraId>> {
        self.request(|reply| Command::CastSpell {
            caster,
            target,
            spell,
            reply,
        })
        .await?
    }

    /// Remove one aura. Returns false if it was already gone.
    pub async fn remove_aura(&self, aura: AuraId, mode: RemoveMode) -> Result<bool> {
        self.request(|reply| Command::RemoveAura { aura, mode, reply })
            .await
    }

    /// Dispel every aura of `spell` on `target`. Returns the number removed.
    pub async fn dispel(&self, dispeller: UnitId, target: UnitId, spell: SpellId) -> Result<usize> {
        self.request(|reply| Command::Dispel {
            dispeller,
            target,
            spell,
            reply,
        })
        .await
    }

    /// Damage a unit: absorb shields first, then health, then procs on both sides.
    ///
    /// Proc flags are derived from the payload (periodic, spell or melee).
    pub async fn deal_damage(&self, damage: DamageInfo, hit: HitMask) -> Result<DamageReport> {
        self.request(|reply| Command::DealDamage {
            damage,
            flags: None,
            hit,
            reply,
        })
        .await
    }

    /// Like [`Self::deal_damage`] with explicit proc flags.
    pub async fn deal_damage_with_flags(
        &self,
        damage: DamageInfo,
        flags: ProcFlags,
        hit: HitMask,
    ) -> Result<DamageReport> {
        self.request(|reply| Command::DealDamage {
            damage,
            flags: Some(flags),
            hit,
            reply,
        })
        .await
    }

    /// Heal a unit. Returns the healing that landed.
    pub async fn heal(&self, heal: HealInfo) -> Result<u32> {
        self.request(|reply| Command::Heal { heal, reply }).await
    }

    /// Advance the simulation clock. Returns the new clock value.
    pub async fn advance(&self, elapsed_ms: u32) -> Result<u64> {
        self.request(|reply| Command::Advance { elapsed_ms, reply })
            .await
    }

    /// Query one unit and its active auras (read-only snapshot)
    pub async fn query_unit(&self, unit: UnitId) -> Result<Option<UnitSnapshot>> {
        self.request(|reply| Command::QueryUnit { unit, reply })
            .await
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Aura` - Structural aura changes
    /// - `Topic::Combat` - Resolved damage, heals, casts and visuals
    /// - `Topic::Unit` - Spawns, deaths and clock steps
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use runtime::Topic;
    ///
    /// let mut auras = handle.subscribe(Topic::Aura);
    /// while let Ok(event) = auras.recv().await {
    ///     // Handle aura notifications
    /// }
    /// ```
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Subscribe to multiple topics at once
    ///
    /// Returns a map of topic to receiver for each requested topic.
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> std::collections::HashMap<Topic, broadcast::Receiver<Event>> {
        self.event_bus.subscribe_multiple(topics)
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}
