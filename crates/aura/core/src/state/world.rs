//! Engine-owned simulation state.

use std::collections::{BTreeMap, HashMap};

use crate::config::EngineConfig;
use crate::output::EngineOutput;
use crate::state::{Aura, AuraContainer};
use crate::types::{AuraId, ProcEventId, SpellId, UnitId};

/// Authoritative aura state of one world shard.
///
/// Containers are keyed in a `BTreeMap` so whole-world walks (periodic
/// updates, caster cleanup) visit units in a stable order.
#[derive(Clone, Debug)]
pub struct World {
    config: EngineConfig,
    /// Simulation clock in milliseconds.
    now: u64,
    next_aura_id: u64,
    next_event_id: u64,
    containers: BTreeMap<UnitId, AuraContainer>,
    owners: HashMap<AuraId, UnitId>,
    pub(crate) output: EngineOutput,
}

impl World {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            now: 0,
            next_aura_id: 1,
            next_event_id: 1,
            containers: BTreeMap::new(),
            owners: HashMap::new(),
            output: EngineOutput::default(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn game_seed(&self) -> u64 {
        self.config.game_seed
    }

    pub fn now(&self) -> u64 {
        self.now
    }

    pub(crate) fn advance_clock(&mut self, elapsed_ms: u32) {
        self.now = self.now.saturating_add(u64::from(elapsed_ms));
    }

    pub(crate) fn allocate_aura_id(&mut self) -> AuraId {
        let id = AuraId(self.next_aura_id);
        self.next_aura_id += 1;
        id
    }

    pub(crate) fn allocate_event_id(&mut self) -> ProcEventId {
        let id = ProcEventId(self.next_event_id);
        self.next_event_id += 1;
        id
    }

    pub fn container(&self, unit: UnitId) -> Option<&AuraContainer> {
        self.containers.get(&unit)
    }

    /// Auras on one unit in insertion order. Unknown units have none.
    pub fn auras_on(&self, unit: UnitId) -> impl Iterator<Item = &Aura> {
        self.containers
            .get(&unit)
            .into_iter()
            .flat_map(|container| container.iter())
    }

    pub fn aura(&self, id: AuraId) -> Option<&Aura> {
        let owner = self.owners.get(&id)?;
        self.containers.get(owner)?.get(id)
    }

    pub(crate) fn aura_mut(&mut self, id: AuraId) -> Option<&mut Aura> {
        let owner = self.owners.get(&id)?;
        self.containers.get_mut(owner)?.get_mut(id)
    }

    pub fn find_aura(&self, owner: UnitId, spell: SpellId, caster: Option<UnitId>) -> Option<&Aura> {
        self.containers.get(&owner)?.find(spell, caster)
    }

    pub fn has_aura(&self, owner: UnitId, spell: SpellId) -> bool {
        self.find_aura(owner, spell, None).is_some()
    }

    pub fn aura_count(&self) -> usize {
        self.owners.len()
    }

    /// Units that currently hold at least one aura.
    pub fn units(&self) -> impl Iterator<Item = UnitId> + '_ {
        self.containers
            .iter()
            .filter(|(_, container)| !container.is_empty())
            .map(|(unit, _)| *unit)
    }

    /// Aura ids on one unit, snapshotted for safe mutation during iteration.
    pub fn aura_ids_on(&self, unit: UnitId) -> Vec<AuraId> {
        self.containers
            .get(&unit)
            .map(AuraContainer::ids)
            .unwrap_or_default()
    }

    /// Every aura id in the world, unit order then insertion order.
    pub fn all_aura_ids(&self) -> Vec<AuraId> {
        self.containers
            .values()
            .flat_map(|container| container.iter().map(|aura| aura.id))
            .collect()
    }

    /// Auras this unit cast on any target (including itself).
    pub fn auras_cast_by(&self, caster: UnitId) -> Vec<AuraId> {
        self.containers
            .values()
            .flat_map(|container| container.iter())
            .filter(|aura| aura.caster == caster)
            .map(|aura| aura.id)
            .collect()
    }

    pub(crate) fn insert_aura(&mut self, aura: Aura) {
        self.owners.insert(aura.id, aura.owner);
        self.containers.entry(aura.owner).or_default().push(aura);
    }

    pub(crate) fn take_aura(&mut self, id: AuraId) -> Option<Aura> {
        let owner = self.owners.remove(&id)?;
        let container = self.containers.get_mut(&owner)?;
        let aura = container.take(id);
        if container.is_empty() {
            self.containers.remove(&owner);
        }
        aura
    }

    pub fn pending_output(&self) -> &EngineOutput {
        &self.output
    }

    /// Hands queued notifications and requests to the host.
    pub fn drain_output(&mut self) -> EngineOutput {
        std::mem::take(&mut self.output)
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
