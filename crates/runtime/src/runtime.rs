//! High-level runtime orchestrator.
//!
//! The runtime owns background workers, wires up command/event channels, and
//! exposes a builder-based API for clients to drive one world shard.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

use aura_core::{HookRegistry, PcgRng, RngOracle, SpellCatalog, UnitTable};

use crate::api::{Result, RuntimeError, RuntimeHandle};
use crate::config::RuntimeConfig;
use crate::events::EventBus;
use crate::workers::{AuraLogWorker, CombatHost, Command, SimulationWorker};

/// Main runtime that orchestrates the aura simulation
///
/// Runtime owns workers and coordinates execution.
/// [`RuntimeHandle`] provides a cloneable façade for clients.
pub struct Runtime {
    handle: RuntimeHandle,
    sim_worker_handle: JoinHandle<()>,
    aura_log_handle: Option<JoinHandle<()>>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    ///
    /// The handle can be shared across clients and async tasks.
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    /// Shutdown the runtime gracefully
    ///
    /// Waits for the simulation worker to drain its queue, then for the aura
    /// log to flush. Every cloned handle must be dropped first.
    pub async fn shutdown(self) -> Result<()> {
        drop(self.handle);

        self.sim_worker_handle
            .await
            .map_err(RuntimeError::WorkerJoin)?;

        if let Some(log_handle) = self.aura_log_handle {
            log_handle.await.map_err(RuntimeError::WorkerJoin)?;
        }

        Ok(())
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    catalog: Option<SpellCatalog>,
    units: UnitTable,
    hooks: HookRegistry,
    rng: Box<dyn RngOracle>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            catalog: None,
            units: UnitTable::new(),
            hooks: HookRegistry::new(),
            rng: Box::new(PcgRng),
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the required spell catalog
    pub fn catalog(mut self, catalog: SpellCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Units present when the shard starts (optional)
    pub fn units(mut self, units: UnitTable) -> Self {
        self.units = units;
        self
    }

    /// Content hooks (optional, defaults to an empty registry)
    pub fn hooks(mut self, hooks: HookRegistry) -> Self {
        self.hooks = hooks;
        self
    }

    /// Replace the proc roll source (defaults to [`PcgRng`])
    pub fn rng(mut self, rng: impl RngOracle + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    /// Build the runtime and spawn its workers
    pub async fn build(self) -> Result<Runtime> {
        let catalog = self.catalog.ok_or(RuntimeError::MissingCatalog)?;
        let config = self.config;

        let (aura_log_tx, aura_log_handle) = match &config.aura_log_path {
            Some(path) => {
                let (log_tx, log_rx) = mpsc::channel(config.log_buffer_size.max(1));
                let worker = AuraLogWorker::open(path, log_rx).await?;
                let handle = tokio::spawn(async move {
                    worker.run().await;
                });
                (Some(log_tx), Some(handle))
            }
            None => (None, None),
        };

        let (command_tx, command_rx) =
            mpsc::channel::<Command>(config.command_buffer_size.max(1));
        let event_bus = EventBus::with_capacity(config.event_buffer_size);
        let handle = RuntimeHandle::new(command_tx, event_bus.clone());

        info!(
            target: "runtime::worker",
            spells = catalog.len(),
            units = self.units.iter().count(),
            scripts = self.hooks.scripts().len(),
            seed = config.engine.game_seed,
            "building runtime"
        );

        let host = CombatHost::new(config.engine, catalog, self.units, self.hooks, self.rng);
        let sim_worker =
            SimulationWorker::new(host, command_rx, event_bus, aura_log_tx, config.tick_ms);

        let sim_worker_handle = tokio::spawn(async move {
            sim_worker.run().await;
        });

        Ok(Runtime {
            handle,
            sim_worker_handle,
            aura_log_handle,
        })
    }
}
