//! Combat host for one world shard.
//!
//! [`CombatHost`] owns the authoritative [`World`] plus the unit table the
//! engine reads through its oracle. It is the only place where health
//! changes: engine calls run in short scopes, their queued
//! [`CombatRequest`]s are resolved here (health mutation, spell casts,
//! visuals), and each resolution feeds new proc events back into the
//! engine. Cascades stop at the configured `max_cascade_depth`.

use std::collections::VecDeque;

use tracing::{debug, warn};

use aura_core::{
    ApplyOutcome, AuraApplication, AuraEngine, AuraEnv, AuraId, CombatRequest, DamageInfo,
    EngineConfig, EngineOutput, HealInfo, HitMask, HookRegistry, ProcFlags, RemoveMode,
    RngOracle, SchoolMask, SpellCatalog, SpellEffectInfo, SpellEffectKind, SpellId, SpellOracle,
    Stat, UnitId, UnitOracle, UnitRecord, UnitTable, World,
};

use crate::api::{DamageReport, Result, RuntimeError, UnitSnapshot};
use crate::events::{CombatEvent, Event, UnitEvent};

/// Proc flags used for a damage event when the caller does not pick any.
pub fn default_damage_flags(damage: &DamageInfo) -> ProcFlags {
    let kind = if damage.periodic {
        ProcFlags::DEAL_PERIODIC | ProcFlags::TAKE_PERIODIC
    } else if damage.spell.is_some() {
        ProcFlags::DEAL_HARMFUL_SPELL | ProcFlags::TAKE_HARMFUL_SPELL
    } else {
        ProcFlags::DEAL_MELEE | ProcFlags::TAKE_MELEE
    };
    kind | ProcFlags::TAKE_ANY_DAMAGE
}

fn heal_flags(heal: &HealInfo) -> ProcFlags {
    if heal.periodic {
        ProcFlags::DEAL_PERIODIC | ProcFlags::TAKE_PERIODIC
    } else {
        ProcFlags::DEAL_HELPFUL_SPELL | ProcFlags::TAKE_HELPFUL_SPELL
    }
}

pub struct CombatHost {
    world: World,
    units: UnitTable,
    catalog: SpellCatalog,
    hooks: HookRegistry,
    rng: Box<dyn RngOracle>,
    /// Requests waiting for resolution, tagged with their cascade depth.
    pending: VecDeque<(CombatRequest, usize)>,
    outbox: Vec<Event>,
}

impl CombatHost {
    pub fn new(
        config: EngineConfig,
        catalog: SpellCatalog,
        units: UnitTable,
        hooks: HookRegistry,
        rng: Box<dyn RngOracle>,
    ) -> Self {
        Self {
            world: World::new(config),
            units,
            catalog,
            hooks,
            rng,
            pending: VecDeque::new(),
            outbox: Vec::new(),
        }
    }

    pub fn now(&self) -> u64 {
        self.world.now()
    }

    #[cfg(test)]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Events produced since the last drain, in resolution order.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.outbox)
    }

    /// Runs `op` against a short-lived engine and hands back what it queued.
    fn with_engine<T>(&mut self, op: impl FnOnce(&mut AuraEngine<'_>) -> T) -> (T, EngineOutput) {
        let env = AuraEnv::with_all(&self.catalog, &self.units, &*self.rng);
        let mut engine = AuraEngine::new(&mut self.world, env, &self.hooks);
        let value = op(&mut engine);
        let output = engine.drain_output();
        (value, output)
    }

    fn collect(&mut self, output: EngineOutput, depth: usize) {
        self.outbox
            .extend(output.notifications.into_iter().map(Event::Aura));
        self.pending
            .extend(output.requests.into_iter().map(|request| (request, depth)));
    }

    /// Resolves queued requests until the cascade runs dry or hits the depth bound.
    fn settle(&mut self) {
        let limit = self.world.config().max_cascade_depth;
        while let Some((request, depth)) = self.pending.pop_front() {
            if depth >= limit {
                warn!(
                    target: "runtime::combat",
                    depth,
                    request = ?request,
                    "cascade depth exceeded, request dropped"
                );
                continue;
            }
            self.resolve(request, depth + 1);
        }
    }

    fn resolve(&mut self, request: CombatRequest, depth: usize) {
        match request {
            CombatRequest::Damage {
                source,
                target,
                spell,
                amount,
                school,
                periodic,
                triggered_by,
            } => {
                let mut damage = DamageInfo::new(source, target, amount, school).with_spell(spell);
                if periodic {
                    damage = damage.periodic();
                }
                let flags = default_damage_flags(&damage);
                self.resolve_damage(damage, flags, HitMask::NORMAL, triggered_by, depth);
            }
            CombatRequest::Heal {
                source,
                target,
                spell,
                amount,
                periodic,
                triggered_by,
            } => {
                let mut heal = HealInfo::new(source, target, amount);
                heal.spell = Some(spell);
                heal.periodic = periodic;
                self.resolve_heal(heal, triggered_by, depth);
            }
            CombatRequest::CastSpell {
                caster,
                target,
                spell,
                triggered_by,
            } => {
                self.resolve_cast(caster, target, spell, triggered_by, depth);
            }
            CombatRequest::PlayVisual {
                unit,
                spell,
                visual,
            } => {
                self.outbox.push(Event::Combat(CombatEvent::Visual {
                    unit,
                    spell,
                    visual,
                }));
            }
        }
    }

    // ===== unit lifecycle =====

    pub fn spawn_unit(&mut self, unit: UnitRecord) -> Result<()> {
        if self.units.exists(unit.id) {
            return Err(RuntimeError::DuplicateUnit(unit.id));
        }
        let id = unit.id;
        self.units.insert(unit);
        self.outbox.push(Event::Unit(UnitEvent::Spawned { unit: id }));
        Ok(())
    }

    /// Removes a unit with its auras and the caster-bound auras it cast elsewhere.
    pub fn despawn_unit(&mut self, unit: UnitId) -> Result<usize> {
        if !self.units.exists(unit) {
            return Err(RuntimeError::UnknownUnit(unit));
        }
        let (removed, output) = self.with_engine(|engine| engine.despawn_unit(unit));
        self.collect(output, 0);
        self.settle();
        self.units.remove(unit);
        Ok(removed?)
    }

    /// Drops a unit to zero health and runs death handling.
    ///
    /// Returns the number of auras removed. Killing a dead unit is a no-op.
    pub fn kill_unit(&mut self, unit: UnitId, killer: Option<UnitId>) -> Result<usize> {
        let record = self
            .units
            .get_mut(unit)
            .ok_or(RuntimeError::UnknownUnit(unit))?;
        if !record.is_alive() {
            return Ok(0);
        }
        let health = record.health;
        record.take_damage(health);

        let removed = self.resolve_death(unit, killer, 0);
        self.settle();
        Ok(removed)
    }

    /// Overwrites one stat and recalculates the amounts that scale with it.
    pub fn set_stat(&mut self, unit: UnitId, stat: Stat, value: i32) -> Result<usize> {
        if !self.units.set_stat(unit, stat, value) {
            return Err(RuntimeError::UnknownUnit(unit));
        }
        let (changed, output) = self.with_engine(|engine| engine.notify_stat_changed(unit));
        self.collect(output, 0);
        self.settle();
        Ok(changed)
    }

    // ===== aura operations =====

    pub fn apply_aura(&mut self, application: AuraApplication) -> Result<ApplyOutcome> {
        let (outcome, output) = self.with_engine(|engine| engine.apply_aura(application));
        self.collect(output, 0);
        self.settle();
        Ok(outcome?)
    }

    /// Casts `spell`: applies its aura effects and resolves its instant effects.
    pub fn cast_spell(&mut self, caster: UnitId, target: UnitId, spell: SpellId) -> Result<Option<AuraId>> {
        if self.catalog.spell(spell).is_none() {
            return Err(RuntimeError::Engine(aura_core::EngineError::Oracle(
                aura_core::OracleError::SpellNotFound(spell),
            )));
        }
        let aura = self.resolve_cast(caster, target, spell, None, 0);
        self.settle();
        Ok(aura)
    }

    pub fn remove_aura(&mut self, aura: AuraId, mode: RemoveMode) -> bool {
        let (removed, output) = self.with_engine(|engine| engine.remove_aura(aura, mode));
        self.collect(output, 0);
        self.settle();
        removed
    }

    /// Strips every aura of `spell` from `target` and reports the dispel to both sides.
    pub fn dispel(&mut self, dispeller: UnitId, target: UnitId, spell: SpellId) -> usize {
        let (removed, output) = self.with_engine(|engine| {
            let removed = engine.remove_auras_by_spell(target, spell, None, RemoveMode::Dispel);
            if removed > 0 {
                let event = engine
                    .new_event(dispeller, ProcFlags::DISPEL | ProcFlags::DISPELLED)
                    .with_target(target)
                    .with_spell(spell);
                engine.dispatch_proc(&event);
            }
            removed
        });
        self.collect(output, 0);
        self.settle();
        removed
    }

    // ===== combat =====

    pub fn deal_damage(&mut self, damage: DamageInfo, flags: ProcFlags, hit: HitMask) -> DamageReport {
        let report = self.resolve_damage(damage, flags, hit, None, 0);
        self.settle();
        report
    }

    /// Returns the healing that landed.
    pub fn heal(&mut self, heal: HealInfo) -> u32 {
        let effective = self.resolve_heal(heal, None, 0);
        self.settle();
        effective
    }

    /// Advances the simulation clock and resolves everything the ticks produced.
    pub fn advance(&mut self, elapsed_ms: u32) -> u64 {
        let (now, output) = self.with_engine(|engine| {
            engine.update(elapsed_ms);
            engine.now()
        });
        self.collect(output, 0);
        self.settle();
        self.outbox.push(Event::Unit(UnitEvent::ClockAdvanced { now }));
        now
    }

    pub fn snapshot(&self, unit: UnitId) -> Option<UnitSnapshot> {
        let record = self.units.get(unit)?;
        Some(UnitSnapshot {
            unit: record.clone(),
            auras: self
                .world
                .auras_on(unit)
                .filter(|aura| aura.is_active())
                .cloned()
                .collect(),
            now: self.world.now(),
        })
    }

    // ===== resolution =====

    fn resolve_damage(
        &mut self,
        mut damage: DamageInfo,
        flags: ProcFlags,
        hit: HitMask,
        triggered_by: Option<AuraId>,
        depth: usize,
    ) -> DamageReport {
        if !self.units.is_alive(damage.victim) {
            debug!(
                target: "runtime::combat",
                victim = %damage.victim,
                "damage on missing or dead unit ignored"
            );
            return DamageReport::default();
        }

        let (absorbed, output) = self.with_engine(|engine| engine.absorb_damage(&mut damage));
        self.collect(output, depth);

        let dealt = self
            .units
            .get_mut(damage.victim)
            .map_or(0, |victim| victim.take_damage(damage.remaining()));
        let killed = !self.units.is_alive(damage.victim);

        self.outbox.push(Event::Combat(CombatEvent::Damage {
            source: damage.attacker,
            target: damage.victim,
            spell: damage.spell,
            school: damage.school,
            amount: damage.amount,
            absorbed,
            dealt,
            periodic: damage.periodic,
        }));

        let hit = if absorbed > 0 { hit | HitMask::ABSORB } else { hit };
        let (_, output) = self.with_engine(|engine| {
            let mut event = engine
                .new_event(damage.attacker, flags)
                .with_target(damage.victim)
                .with_damage(damage)
                .with_hit(hit)
                .triggered_by(triggered_by);
            if let Some(spell) = damage.spell {
                event = event.with_spell(spell);
            }
            engine.dispatch_proc(&event)
        });
        self.collect(output, depth);

        if killed {
            self.resolve_death(damage.victim, Some(damage.attacker), depth);
        }

        DamageReport {
            amount: damage.amount,
            absorbed,
            dealt,
            killed,
        }
    }

    fn resolve_heal(&mut self, mut heal: HealInfo, triggered_by: Option<AuraId>, depth: usize) -> u32 {
        let Some(target) = self.units.get_mut(heal.target).filter(|unit| unit.is_alive()) else {
            debug!(
                target: "runtime::combat",
                target_unit = %heal.target,
                "heal on missing or dead unit ignored"
            );
            return 0;
        };
        heal.effective = target.heal(heal.amount);

        self.outbox.push(Event::Combat(CombatEvent::Heal {
            source: heal.healer,
            target: heal.target,
            spell: heal.spell,
            amount: heal.amount,
            effective: heal.effective,
            periodic: heal.periodic,
        }));

        let (_, output) = self.with_engine(|engine| {
            let mut event = engine
                .new_event(heal.healer, heal_flags(&heal))
                .with_target(heal.target)
                .with_heal(heal)
                .triggered_by(triggered_by);
            if let Some(spell) = heal.spell {
                event = event.with_spell(spell);
            }
            engine.dispatch_proc(&event)
        });
        self.collect(output, depth);
        heal.effective
    }

    /// Death handling: KILL/DEATH procs first, then the non-persistent auras go.
    fn resolve_death(&mut self, unit: UnitId, killer: Option<UnitId>, depth: usize) -> usize {
        self.outbox.push(Event::Unit(UnitEvent::Died { unit, killer }));

        let (removed, output) = self.with_engine(|engine| {
            if let Some(killer) = killer {
                let event = engine
                    .new_event(killer, ProcFlags::KILL | ProcFlags::DEATH)
                    .with_target(unit);
                engine.dispatch_proc(&event);
            }
            engine.handle_unit_death(unit)
        });
        self.collect(output, depth);

        match removed {
            Ok(removed) => removed,
            Err(error) => {
                warn!(target: "runtime::combat", unit = %unit, error = %error, "death handling failed");
                0
            }
        }
    }

    fn resolve_cast(
        &mut self,
        caster: UnitId,
        target: UnitId,
        spell: SpellId,
        triggered_by: Option<AuraId>,
        depth: usize,
    ) -> Option<AuraId> {
        let Some(info) = self.catalog.spell(spell).cloned() else {
            warn!(target: "runtime::combat", spell = %spell, "cast of unknown spell ignored");
            return None;
        };

        let mut aura = None;
        if info.has_aura_effects() {
            let application = AuraApplication::new(spell, caster, target);
            let (outcome, output) = self.with_engine(|engine| engine.apply_aura(application));
            self.collect(output, depth);
            match outcome {
                Ok(outcome) => aura = outcome.aura(),
                Err(error) => warn!(
                    target: "runtime::combat",
                    spell = %spell,
                    error = %error,
                    "aura application failed"
                ),
            }
        }

        self.outbox.push(Event::Combat(CombatEvent::SpellCast {
            caster,
            target,
            spell,
            aura,
        }));

        for effect in &info.effects {
            match effect.kind {
                SpellEffectKind::SchoolDamage => {
                    let school = if effect.school.is_empty() {
                        SchoolMask::PHYSICAL
                    } else {
                        effect.school
                    };
                    let amount = self.instant_amount(caster, effect);
                    let damage = DamageInfo::new(caster, target, amount, school).with_spell(spell);
                    let flags = default_damage_flags(&damage);
                    self.resolve_damage(damage, flags, HitMask::NORMAL, triggered_by, depth);
                }
                SpellEffectKind::Heal => {
                    let mut heal = HealInfo::new(caster, target, self.instant_amount(caster, effect));
                    heal.spell = Some(spell);
                    self.resolve_heal(heal, triggered_by, depth);
                }
                SpellEffectKind::ApplyAura(_) | SpellEffectKind::Dummy => {}
            }
        }
        aura
    }

    /// Base points plus caster stat scaling for an instant effect.
    fn instant_amount(&self, caster: UnitId, effect: &SpellEffectInfo) -> u32 {
        let mut amount = i64::from(effect.base_points);
        if let Some(scaling) = effect.scaling {
            amount += i64::from(self.units.stat(caster, scaling.stat)) * i64::from(scaling.percent) / 100;
        }
        amount.clamp(0, i64::from(u32::MAX)) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aura_core::{
        AuraType, FixedRng, HookContext, HookResult, HookSelector, RemoveModes, SpellAttributes,
        SpellInfo,
    };

    const HERO: UnitId = UnitId(1);
    const DUMMY: UnitId = UnitId(2);

    const SHIELD: SpellId = SpellId(10);
    const BLEED: SpellId = SpellId(11);
    const THORNS: SpellId = SpellId(12);
    const BOLT: SpellId = SpellId(13);
    const CURSE: SpellId = SpellId(14);

    fn catalog() -> SpellCatalog {
        SpellCatalog::new()
            .with_spell(
                SpellInfo::new(SHIELD, "Shield")
                    .with_duration(30_000)
                    .with_effect(SpellEffectInfo::aura(AuraType::SchoolAbsorb).with_base_points(50)),
            )
            .with_spell(
                SpellInfo::new(BLEED, "Bleed")
                    .with_duration(6_000)
                    .with_attributes(SpellAttributes::NEGATIVE)
                    .with_effect(
                        SpellEffectInfo::aura(AuraType::PeriodicDamage)
                            .with_base_points(100)
                            .with_amplitude(2_000),
                    ),
            )
            .with_spell(
                SpellInfo::new(THORNS, "Thorns")
                    .with_duration(60_000)
                    .with_proc(aura_core::ProcEntry::new(ProcFlags::TAKE_MELEE))
                    .with_effect(
                        SpellEffectInfo::aura(AuraType::ProcTriggerDamage)
                            .with_base_points(7)
                            .with_school(SchoolMask::NATURE),
                    ),
            )
            .with_spell(
                SpellInfo::new(BOLT, "Bolt").with_effect(
                    SpellEffectInfo::new(SpellEffectKind::SchoolDamage)
                        .with_base_points(20)
                        .with_scaling(Stat::SpellPower, 50)
                        .with_school(SchoolMask::ARCANE),
                ),
            )
            .with_spell(
                SpellInfo::new(CURSE, "Curse")
                    .with_duration(10_000)
                    .with_effect(SpellEffectInfo::aura(AuraType::Dummy)),
            )
    }

    fn host_with(hooks: HookRegistry) -> CombatHost {
        let units = UnitTable::new()
            .with_unit(UnitRecord::new(HERO, "hero", 500).with_stat(Stat::SpellPower, 100))
            .with_unit(UnitRecord::new(DUMMY, "dummy", 250));
        CombatHost::new(
            EngineConfig::with_seed(1),
            catalog(),
            units,
            hooks,
            Box::new(FixedRng(0)),
        )
    }

    fn host() -> CombatHost {
        host_with(HookRegistry::new())
    }

    fn health(host: &CombatHost, unit: UnitId) -> u32 {
        host.snapshot(unit).map_or(0, |snapshot| snapshot.health())
    }

    #[test]
    fn shield_soaks_before_health() {
        let mut host = host();
        host.apply_aura(AuraApplication::new(SHIELD, DUMMY, DUMMY))
            .expect("shield applies");

        let report = host.deal_damage(
            DamageInfo::new(HERO, DUMMY, 80, SchoolMask::PHYSICAL),
            ProcFlags::DEAL_MELEE | ProcFlags::TAKE_MELEE,
            HitMask::NORMAL,
        );

        assert_eq!(report.absorbed, 50);
        assert_eq!(report.dealt, 30);
        assert_eq!(health(&host, DUMMY), 220);
        assert!(!host.world().has_aura(DUMMY, SHIELD));
    }

    #[test]
    fn periodic_damage_lands_through_the_host() {
        let mut host = host();
        host.apply_aura(AuraApplication::new(BLEED, HERO, DUMMY))
            .expect("bleed applies");

        host.advance(6_000);

        assert_eq!(health(&host, DUMMY), 0);
        let died = host
            .drain_events()
            .into_iter()
            .any(|event| event == Event::Unit(UnitEvent::Died { unit: DUMMY, killer: Some(HERO) }));
        assert!(died);
        assert!(!host.world().has_aura(DUMMY, BLEED));
    }

    #[test]
    fn proc_damage_reflects_to_attacker() {
        let mut host = host();
        host.apply_aura(AuraApplication::new(THORNS, DUMMY, DUMMY))
            .expect("thorns applies");

        host.deal_damage(
            DamageInfo::new(HERO, DUMMY, 10, SchoolMask::PHYSICAL),
            ProcFlags::DEAL_MELEE | ProcFlags::TAKE_MELEE,
            HitMask::NORMAL,
        );

        assert_eq!(health(&host, HERO), 493);
        assert_eq!(health(&host, DUMMY), 240);
    }

    #[test]
    fn instant_cast_scales_with_caster_stat() {
        let mut host = host();
        let aura = host.cast_spell(HERO, DUMMY, BOLT).expect("bolt is known");
        assert_eq!(aura, None);
        assert_eq!(health(&host, DUMMY), 180);
    }

    #[test]
    fn runaway_cascades_stop_at_depth_limit() {
        // every removal of Curse casts Curse again on the same target
        let mut hooks = HookRegistry::new();
        hooks.on_remove(
            HookSelector::spell(CURSE).with_remove_modes(RemoveModes::all()),
            |ctx: &mut HookContext<'_>, _mode: RemoveMode| -> HookResult {
                let (caster, owner) = (ctx.caster(), ctx.owner());
                ctx.cast_spell(caster, owner, CURSE);
                Ok(())
            },
        );
        hooks.on_apply(
            HookSelector::spell(CURSE),
            |ctx: &mut HookContext<'_>| -> HookResult {
                ctx.remove_self(RemoveMode::Cancel);
                Ok(())
            },
        );
        let mut host = host_with(hooks);

        host.cast_spell(HERO, DUMMY, CURSE).expect("curse is known");

        let casts = host
            .drain_events()
            .into_iter()
            .filter(|event| matches!(event, Event::Combat(CombatEvent::SpellCast { .. })))
            .count();
        // the direct cast plus one per allowed cascade level
        assert_eq!(casts, EngineConfig::DEFAULT_MAX_CASCADE_DEPTH + 1);
    }

    #[test]
    fn dead_units_ignore_damage_and_heals() {
        let mut host = host();
        assert_eq!(host.kill_unit(DUMMY, Some(HERO)).ok(), Some(0));

        let report = host.deal_damage(
            DamageInfo::new(HERO, DUMMY, 10, SchoolMask::PHYSICAL),
            ProcFlags::DEAL_MELEE,
            HitMask::NORMAL,
        );
        assert_eq!(report, DamageReport::default());
        assert_eq!(host.heal(HealInfo::new(HERO, DUMMY, 10)), 0);
        assert!(matches!(
            host.kill_unit(UnitId(99), None),
            Err(RuntimeError::UnknownUnit(UnitId(99)))
        ));
    }
}
