//! Simulation worker that owns the authoritative aura [`World`](aura_core::World).
//!
//! Receives commands from [`RuntimeHandle`](crate::RuntimeHandle), runs them
//! through the [`CombatHost`], and publishes the resulting events to the
//! EventBus. Aura notifications are also forwarded to the aura-log worker
//! when one is running.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use aura_core::{
    ApplyOutcome, AuraApplication, AuraId, DamageInfo, HealInfo, HitMask, ProcFlags, RemoveMode,
    SpellId, Stat, UnitId, UnitRecord,
};

use super::aura_log::AuraLogEntry;
use super::combat::{CombatHost, default_damage_flags};
use crate::api::{DamageReport, Result, UnitSnapshot};
use crate::events::{Event, EventBus};

/// Commands that can be sent to the simulation worker
pub enum Command {
    SpawnUnit {
        unit: UnitRecord,
        reply: oneshot::Sender<Result<()>>,
    },
    DespawnUnit {
        unit: UnitId,
        reply: oneshot::Sender<Result<usize>>,
    },
    /// Zero the unit's health and run death handling.
    KillUnit {
        unit: UnitId,
        killer: Option<UnitId>,
        reply: oneshot::Sender<Result<usize>>,
    },
    SetStat {
        unit: UnitId,
        stat: Stat,
        value: i32,
        reply: oneshot::Sender<Result<usize>>,
    },
    ApplyAura {
        application: AuraApplication,
        reply: oneshot::Sender<Result<ApplyOutcome>>,
    },
    CastSpell {
        caster: UnitId,
        target: UnitId,
        spell: SpellId,
        reply: oneshot::Sender<Result<Option<AuraId>>>,
    },
    RemoveAura {
        aura: AuraId,
        mode: RemoveMode,
        reply: oneshot::Sender<bool>,
    },
    Dispel {
        dispeller: UnitId,
        target: UnitId,
        spell: SpellId,
        reply: oneshot::Sender<usize>,
    },
    /// `flags: None` derives the proc flags from the damage payload.
    DealDamage {
        damage: DamageInfo,
        flags: Option<ProcFlags>,
        hit: HitMask,
        reply: oneshot::Sender<DamageReport>,
    },
    Heal {
        heal: HealInfo,
        reply: oneshot::Sender<u32>,
    },
    /// Advance the simulation clock.
    Advance {
        elapsed_ms: u32,
        reply: oneshot::Sender<u64>,
    },
    /// Query one unit and its auras (read-only).
    QueryUnit {
        unit: UnitId,
        reply: oneshot::Sender<Option<UnitSnapshot>>,
    },
}

/// Background task that processes simulation commands.
pub struct SimulationWorker {
    host: CombatHost,
    command_rx: mpsc::Receiver<Command>,
    event_bus: EventBus,
    log_tx: Option<mpsc::Sender<AuraLogEntry>>,
    /// Real-time step length; `None` leaves the clock to `Advance` commands.
    tick_ms: Option<u32>,
}

impl SimulationWorker {
    /// Creates a new simulation worker.
    pub fn new(
        host: CombatHost,
        command_rx: mpsc::Receiver<Command>,
        event_bus: EventBus,
        log_tx: Option<mpsc::Sender<AuraLogEntry>>,
        tick_ms: Option<u32>,
    ) -> Self {
        Self {
            host,
            command_rx,
            event_bus,
            log_tx,
            tick_ms: tick_ms.filter(|ms| *ms > 0),
        }
    }

    /// Main worker loop.
    pub async fn run(mut self) {
        info!(
            target: "runtime::worker",
            tick_ms = ?self.tick_ms,
            aura_log = self.log_tx.is_some(),
            "SimulationWorker started"
        );

        let mut ticker = self.tick_ms.map(|ms| {
            let period = Duration::from_millis(u64::from(ms));
            let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(cmd) => self.handle_command(cmd),
                        None => {
                            debug!(target: "runtime::worker", "command channel closed");
                            break;
                        }
                    }
                }
                _ = next_tick(&mut ticker) => {
                    if let Some(ms) = self.tick_ms {
                        self.host.advance(ms);
                        self.publish_pending();
                    }
                }
            }
        }

        info!(target: "runtime::worker", now = self.host.now(), "SimulationWorker stopped");
    }

    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::SpawnUnit { unit, reply } => {
                let result = self.host.spawn_unit(unit);
                self.reply(reply, result);
            }
            Command::DespawnUnit { unit, reply } => {
                let result = self.host.despawn_unit(unit);
                self.reply(reply, result);
            }
            Command::KillUnit {
                unit,
                killer,
                reply,
            } => {
                let result = self.host.kill_unit(unit, killer);
                self.reply(reply, result);
            }
            Command::SetStat {
                unit,
                stat,
                value,
                reply,
            } => {
                let result = self.host.set_stat(unit, stat, value);
                self.reply(reply, result);
            }
            Command::ApplyAura { application, reply } => {
                let result = self.host.apply_aura(application);
                self.reply(reply, result);
            }
            Command::CastSpell {
                caster,
                target,
                spell,
                reply,
            } => {
                let result = self.host.cast_spell(caster, target, spell);
                self.reply(reply, result);
            }
            Command::RemoveAura { aura, mode, reply } => {
                let removed = self.host.remove_aura(aura, mode);
                self.reply(reply, removed);
            }
            Command::Dispel {
                dispeller,
                target,
                spell,
                reply,
            } => {
                let removed = self.host.dispel(dispeller, target, spell);
                self.reply(reply, removed);
            }
            Command::DealDamage {
                damage,
                flags,
                hit,
                reply,
            } => {
                let flags = flags.unwrap_or_else(|| default_damage_flags(&damage));
                let report = self.host.deal_damage(damage, flags, hit);
                self.reply(reply, report);
            }
            Command::Heal { heal, reply } => {
                let effective = self.host.heal(heal);
                self.reply(reply, effective);
            }
            Command::Advance { elapsed_ms, reply } => {
                let now = self.host.advance(elapsed_ms);
                self.reply(reply, now);
            }
            Command::QueryUnit { unit, reply } => {
                let snapshot = self.host.snapshot(unit);
                self.reply(reply, snapshot);
            }
        }
    }

    /// Publishes what the command produced, then answers the caller.
    fn reply<T>(&mut self, reply: oneshot::Sender<T>, value: T) {
        self.publish_pending();
        if reply.send(value).is_err() {
            debug!(target: "runtime::worker", "reply channel closed (caller dropped)");
        }
    }

    fn publish_pending(&mut self) {
        let now = self.host.now();
        for event in self.host.drain_events() {
            if let Event::Aura(notification) = &event {
                self.forward_to_log(AuraLogEntry {
                    at_ms: now,
                    notification: notification.clone(),
                });
            }
            self.event_bus.publish(event);
        }
    }

    fn forward_to_log(&mut self, entry: AuraLogEntry) {
        let Some(log_tx) = &self.log_tx else {
            return;
        };
        match log_tx.try_send(entry) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(target: "runtime::worker", "aura log backlog full, entry dropped");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                warn!(target: "runtime::worker", "aura log worker gone, logging disabled");
                self.log_tx = None;
            }
        }
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
