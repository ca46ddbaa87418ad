//! Proc dispatch gates, charges, cooldowns and absorb shields.

mod common;

use aura_core::{
    AbsorbCalc, AuraApplication, AuraId, AuraNotification, CombatRequest, DamageInfo,
    HookContext, HookOutcome, HookRegistry, HookResult, HookSelector, ProcEntry, ProcEventInfo,
    ProcFlags, RemoveMode, SchoolMask, SpellEffectInfo, SpellId, SpellInfo, UnitId,
};
use common::*;

const GUARDED_WARD: SpellId = SpellId(120);

fn apply(fixture: &mut Fixture, spell: SpellId, caster: UnitId, target: UnitId) -> AuraId {
    fixture
        .engine()
        .apply_aura(AuraApplication::new(spell, caster, target))
        .expect("oracles are wired")
        .aura()
        .expect("applied")
}

fn hit_target(fixture: &mut Fixture) -> usize {
    let event = fixture.melee_hit(CASTER, TARGET);
    fixture.engine().dispatch_proc(&event)
}

#[test]
fn certain_proc_fires_on_every_qualifying_event() {
    let mut fixture = Fixture::new();
    let ward = apply(&mut fixture, BLADE_WARD, TARGET, TARGET);
    fixture.world.drain_output();

    for _ in 0..20 {
        assert_eq!(hit_target(&mut fixture), 1);
    }

    let requests = fixture.world.drain_output().requests;
    assert_eq!(requests.len(), 20);
    assert!(requests.iter().all(|request| matches!(
        request,
        CombatRequest::Damage { source, target, amount: 15, triggered_by, .. }
            if *source == TARGET && *target == CASTER && *triggered_by == Some(ward)
    )));
}

#[test]
fn zero_chance_proc_never_fires() {
    let mut fixture = Fixture::new();
    apply(&mut fixture, DULL_BLADE, TARGET, TARGET);

    let procced: usize = (0..50).map(|_| hit_target(&mut fixture)).sum();
    assert_eq!(procced, 0);
    assert!(fixture.world.drain_output().requests.is_empty());
}

#[test]
fn actor_side_flags_do_not_trigger_victim_auras() {
    let mut fixture = Fixture::new();
    // Blade Ward reacts to TAKE_MELEE; its owner is the attacker here.
    apply(&mut fixture, BLADE_WARD, CASTER, CASTER);

    assert_eq!(hit_target(&mut fixture), 0);
}

#[test]
fn aura_never_procs_from_its_own_output() {
    let mut fixture = Fixture::new();
    let ward = apply(&mut fixture, BLADE_WARD, TARGET, TARGET);

    let event = fixture.melee_hit(CASTER, TARGET).triggered_by(Some(ward));
    assert_eq!(fixture.engine().dispatch_proc(&event), 0);
}

#[test]
fn charges_are_consumed_and_last_charge_expires() {
    let mut fixture = Fixture::new();
    let reprisal = apply(&mut fixture, REPRISAL, TARGET, TARGET);
    fixture.world.drain_output();

    assert_eq!(hit_target(&mut fixture), 1);
    assert_eq!(fixture.world.aura(reprisal).map(|a| a.charges()), Some(1));
    assert_eq!(hit_target(&mut fixture), 1);
    assert!(fixture.world.aura(reprisal).is_none());
    assert_eq!(hit_target(&mut fixture), 0);

    let output = fixture.world.drain_output();
    let casts: Vec<_> = output
        .requests
        .iter()
        .filter_map(|request| match request {
            CombatRequest::CastSpell { caster, target, spell, .. } => Some((*caster, *target, *spell)),
            _ => None,
        })
        .collect();
    // Harmful trigger spells go to the other side of the event.
    assert_eq!(casts, vec![(TARGET, CASTER, REPRISAL_STRIKE); 2]);
    assert!(output.notifications.iter().any(|n| matches!(
        n,
        AuraNotification::Removed { mode: RemoveMode::Expire, .. }
    )));
}

#[test]
fn cooldown_blocks_until_elapsed() {
    let mut fixture = Fixture::new();
    fixture.catalog.insert(
        SpellInfo::new(GUARDED_WARD, "Guarded Ward")
            .with_proc(ProcEntry::new(ProcFlags::TAKE_MELEE).with_cooldown(1_000))
            .with_effect(SpellEffectInfo::aura(aura_core::AuraType::ProcTriggerDamage).with_base_points(3)),
    );
    apply(&mut fixture, GUARDED_WARD, TARGET, TARGET);

    assert_eq!(hit_target(&mut fixture), 1);
    assert_eq!(hit_target(&mut fixture), 0);
    fixture.engine().update(999);
    assert_eq!(hit_target(&mut fixture), 0);
    fixture.engine().update(1);
    assert_eq!(hit_target(&mut fixture), 1);
}

#[test]
fn predicates_veto_before_the_roll() {
    let mut hooks = HookRegistry::new();
    hooks.check_proc(
        HookSelector::spell(BLADE_WARD),
        |_ctx: &HookContext<'_>, event: &ProcEventInfo| -> HookResult<bool> {
            Ok(event.hit.contains(aura_core::HitMask::CRITICAL))
        },
    );
    let mut fixture = Fixture::with_hooks(hooks);
    apply(&mut fixture, BLADE_WARD, TARGET, TARGET);

    assert_eq!(hit_target(&mut fixture), 0);
    let crit = fixture
        .melee_hit(CASTER, TARGET)
        .with_hit(aura_core::HitMask::CRITICAL);
    assert_eq!(fixture.engine().dispatch_proc(&crit), 1);
}

#[test]
fn prevented_proc_still_spends_a_charge() {
    let mut hooks = HookRegistry::new();
    let seen = Counter::default();
    let counter = seen.clone();
    hooks.on_proc(
        HookSelector::spell(REPRISAL),
        move |_ctx: &mut HookContext<'_>, _event: &ProcEventInfo| -> HookResult<HookOutcome> {
            counter.bump();
            Ok(HookOutcome::PreventDefault)
        },
    );
    let mut fixture = Fixture::with_hooks(hooks);
    let reprisal = apply(&mut fixture, REPRISAL, TARGET, TARGET);
    fixture.world.drain_output();

    assert_eq!(hit_target(&mut fixture), 1);
    assert_eq!(seen.get(), 1);
    assert_eq!(fixture.world.aura(reprisal).map(|a| a.charges()), Some(1));
    assert!(fixture.world.drain_output().requests.is_empty());
}

#[test]
fn absorb_drains_shield_and_breaks_it() {
    let mut fixture = Fixture::new();
    let barrier = apply(&mut fixture, ICE_BARRIER, TARGET, TARGET);

    let mut first = DamageInfo::new(CASTER, TARGET, 60, SchoolMask::FROST);
    assert_eq!(fixture.engine().absorb_damage(&mut first), 60);
    assert_eq!(first.remaining(), 0);
    assert_eq!(
        fixture.world.aura(barrier).and_then(|a| a.effect(0)).map(|e| e.amount()),
        Some(40)
    );

    let mut second = DamageInfo::new(CASTER, TARGET, 70, SchoolMask::FIRE);
    assert_eq!(fixture.engine().absorb_damage(&mut second), 40);
    assert_eq!(second.remaining(), 30);
    assert!(fixture.world.aura(barrier).is_none());

    let output = fixture.world.drain_output();
    assert!(output.notifications.iter().any(|n| matches!(
        n,
        AuraNotification::Removed { mode: RemoveMode::EnemySpell, .. }
    )));
}

#[test]
fn absorb_hook_can_keep_the_shield_intact() {
    let mut hooks = HookRegistry::new();
    hooks.on_absorb(
        HookSelector::spell(ICE_BARRIER),
        |_ctx: &mut HookContext<'_>,
         _damage: &DamageInfo,
         calc: &mut AbsorbCalc|
         -> HookResult<HookOutcome> {
            calc.absorb /= 2;
            Ok(HookOutcome::PreventDefault)
        },
    );
    let mut fixture = Fixture::with_hooks(hooks);
    let barrier = apply(&mut fixture, ICE_BARRIER, TARGET, TARGET);

    let mut damage = DamageInfo::new(CASTER, TARGET, 80, SchoolMask::PHYSICAL);
    assert_eq!(fixture.engine().absorb_damage(&mut damage), 40);
    assert_eq!(
        fixture.world.aura(barrier).and_then(|a| a.effect(0)).map(|e| e.amount()),
        Some(100)
    );
}
