//! Shared fixture for engine integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use aura_core::hooks::{ApplyHandler, PeriodicHandler, ProcHandler, RemoveHandler};
use aura_core::{
    AuraEngine, AuraEnv, AuraType, EngineConfig, HookContext, HookOutcome, HookRegistry,
    HookResult, PcgRng, ProcEntry, ProcEventInfo, ProcFlags, RemoveMode, SchoolMask,
    SpellAttributes, SpellCatalog, SpellEffectInfo, SpellEffectKind, SpellId, SpellInfo, Stat,
    UnitId, UnitRecord, UnitTable, World,
};

pub const CASTER: UnitId = UnitId(1);
pub const TARGET: UnitId = UnitId(2);
pub const OTHER_CASTER: UnitId = UnitId(3);

pub const FROST_FEVER: SpellId = SpellId(100);
pub const BATTLE_SHOUT: SpellId = SpellId(101);
pub const SUNDER: SpellId = SpellId(102);
pub const FROZEN_BIND: SpellId = SpellId(103);
pub const CHAINS_OF_ICE: SpellId = SpellId(104);
pub const BLADE_WARD: SpellId = SpellId(105);
pub const DULL_BLADE: SpellId = SpellId(106);
pub const REPRISAL: SpellId = SpellId(107);
pub const REPRISAL_STRIKE: SpellId = SpellId(108);
pub const ICE_BARRIER: SpellId = SpellId(109);
pub const REND: SpellId = SpellId(110);
pub const SOUL_LINK: SpellId = SpellId(111);

pub fn catalog() -> SpellCatalog {
    SpellCatalog::new()
        .with_spell(
            SpellInfo::new(FROST_FEVER, "Frost Fever")
                .with_duration(30_000)
                .with_attributes(SpellAttributes::NEGATIVE)
                .with_effect(
                    SpellEffectInfo::aura(AuraType::PeriodicDamage)
                        .with_base_points(30)
                        .with_amplitude(2_000)
                        .with_school(SchoolMask::FROST),
                ),
        )
        .with_spell(
            SpellInfo::new(BATTLE_SHOUT, "Battle Shout")
                .with_duration(10_000)
                .with_effect(
                    SpellEffectInfo::aura(AuraType::ModStat)
                        .with_base_points(10)
                        .with_scaling(Stat::AttackPower, 10),
                ),
        )
        .with_spell(
            SpellInfo::new(SUNDER, "Sunder Armor")
                .with_duration(20_000)
                .with_max_stacks(10)
                .with_attributes(SpellAttributes::STACK_SCALES_AMOUNT)
                .with_effect(
                    SpellEffectInfo::aura(AuraType::ModDamagePercentTaken).with_base_points(5),
                ),
        )
        .with_spell(
            SpellInfo::new(FROZEN_BIND, "Frozen Bind")
                .with_duration(10_000)
                .with_max_stacks(3)
                .with_attributes(SpellAttributes::NO_REFRESH)
                .with_effect(SpellEffectInfo::aura(AuraType::ModStun)),
        )
        .with_spell(
            SpellInfo::new(CHAINS_OF_ICE, "Chains of Ice")
                .with_duration(8_000)
                .with_effect(
                    SpellEffectInfo::aura(AuraType::ModDecreaseSpeed).with_base_points(-50),
                )
                .with_effect(
                    SpellEffectInfo::aura(AuraType::PeriodicDummy)
                        .with_base_points(20)
                        .with_amplitude(0),
                ),
        )
        .with_spell(
            SpellInfo::new(BLADE_WARD, "Blade Ward")
                .with_proc(ProcEntry::new(ProcFlags::TAKE_MELEE).with_chance(100.0))
                .with_effect(
                    SpellEffectInfo::aura(AuraType::ProcTriggerDamage)
                        .with_base_points(15)
                        .with_school(SchoolMask::PHYSICAL),
                ),
        )
        .with_spell(
            SpellInfo::new(DULL_BLADE, "Dull Blade")
                .with_proc(ProcEntry::new(ProcFlags::TAKE_MELEE).with_chance(0.0))
                .with_effect(SpellEffectInfo::aura(AuraType::ProcTriggerDamage).with_base_points(5)),
        )
        .with_spell(
            SpellInfo::new(REPRISAL, "Reprisal")
                .with_proc(
                    ProcEntry::new(ProcFlags::TAKE_MELEE)
                        .with_chance(100.0)
                        .with_charges(2),
                )
                .with_effect(
                    SpellEffectInfo::aura(AuraType::ProcTriggerSpell)
                        .with_trigger_spell(REPRISAL_STRIKE),
                ),
        )
        .with_spell(
            SpellInfo::new(REPRISAL_STRIKE, "Reprisal Strike")
                .with_attributes(SpellAttributes::NEGATIVE)
                .with_effect(SpellEffectInfo::new(SpellEffectKind::SchoolDamage).with_base_points(40)),
        )
        .with_spell(
            SpellInfo::new(ICE_BARRIER, "Ice Barrier")
                .with_duration(60_000)
                .with_effect(SpellEffectInfo::aura(AuraType::SchoolAbsorb).with_base_points(100)),
        )
        .with_spell(
            SpellInfo::new(REND, "Rend")
                .with_duration(15_000)
                .with_attributes(SpellAttributes::MULTI_CASTER | SpellAttributes::NEGATIVE)
                .with_effect(
                    SpellEffectInfo::aura(AuraType::PeriodicDamage)
                        .with_base_points(12)
                        .with_amplitude(3_000),
                ),
        )
        .with_spell(
            SpellInfo::new(SOUL_LINK, "Soul Link")
                .with_attributes(SpellAttributes::PERSIST_THROUGH_DEATH)
                .with_effect(SpellEffectInfo::aura(AuraType::Dummy)),
        )
}

pub fn units() -> UnitTable {
    UnitTable::new()
        .with_unit(
            UnitRecord::new(CASTER, "caster", 500)
                .with_stat(Stat::AttackPower, 300)
                .with_stat(Stat::SpellPower, 200),
        )
        .with_unit(UnitRecord::new(TARGET, "target", 1_000))
        .with_unit(UnitRecord::new(OTHER_CASTER, "second caster", 500))
}

/// World plus every collaborator the engine borrows.
pub struct Fixture {
    pub world: World,
    pub catalog: SpellCatalog,
    pub units: UnitTable,
    pub rng: PcgRng,
    pub hooks: HookRegistry,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_hooks(HookRegistry::new())
    }

    pub fn with_hooks(hooks: HookRegistry) -> Self {
        Self {
            world: World::new(EngineConfig::with_seed(42)),
            catalog: catalog(),
            units: units(),
            rng: PcgRng,
            hooks,
        }
    }

    pub fn engine(&mut self) -> AuraEngine<'_> {
        let env = AuraEnv::with_all(&self.catalog, &self.units, &self.rng);
        AuraEngine::new(&mut self.world, env, &self.hooks)
    }

    pub fn melee_hit(&mut self, attacker: UnitId, victim: UnitId) -> ProcEventInfo {
        self.engine()
            .new_event(attacker, ProcFlags::DEAL_MELEE | ProcFlags::TAKE_MELEE)
            .with_target(victim)
    }
}

/// Counts invocations of whatever extension point it is registered for.
#[derive(Clone, Default)]
pub struct Counter(Arc<AtomicUsize>);

impl Counter {
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    pub fn bump(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

impl ApplyHandler for Counter {
    fn on_apply(&self, _ctx: &mut HookContext<'_>) -> HookResult {
        self.bump();
        Ok(())
    }
}

impl RemoveHandler for Counter {
    fn on_remove(&self, _ctx: &mut HookContext<'_>, _mode: RemoveMode) -> HookResult {
        self.bump();
        Ok(())
    }
}

impl PeriodicHandler for Counter {
    fn on_tick(&self, _ctx: &mut HookContext<'_>) -> HookResult<HookOutcome> {
        self.bump();
        Ok(HookOutcome::Continue)
    }
}

impl ProcHandler for Counter {
    fn on_proc(
        &self,
        _ctx: &mut HookContext<'_>,
        _event: &ProcEventInfo,
    ) -> HookResult<HookOutcome> {
        self.bump();
        Ok(HookOutcome::Continue)
    }
}
