//! Aura lifecycle, stacking and removal through the public engine API.

mod common;

use aura_core::{
    AmountCalc, ApplyOutcome, AuraApplication, AuraNotification, DamageInfo, HandleMode,
    HookContext, HookError, HookRegistry, HookResult, HookSelector, RejectReason, RemoveMode,
    RemoveModes, SchoolMask, SpellId, Stat, UnitId,
};
use common::*;

fn apply(fixture: &mut Fixture, spell: SpellId, caster: UnitId, target: UnitId) -> ApplyOutcome {
    fixture
        .engine()
        .apply_aura(AuraApplication::new(spell, caster, target))
        .expect("oracles are wired")
}

#[test]
fn apply_creates_active_aura_with_resolved_amount() {
    let mut fixture = Fixture::new();
    let outcome = apply(&mut fixture, BATTLE_SHOUT, CASTER, TARGET);

    let aura_id = outcome.aura().expect("applied");
    let aura = fixture.world.aura(aura_id).expect("aura exists");
    assert!(aura.is_active());
    assert_eq!(aura.owner(), TARGET);
    assert_eq!(aura.duration(), Some(10_000));
    // 10 base + 10% of 300 attack power.
    assert_eq!(aura.effect(0).map(|e| e.amount()), Some(40));

    let output = fixture.world.drain_output();
    assert!(matches!(
        output.notifications.as_slice(),
        [AuraNotification::Applied { stacks: 1, .. }]
    ));
}

#[test]
fn invalid_applications_fizzle() {
    let mut fixture = Fixture::new();
    assert_eq!(
        apply(&mut fixture, SpellId(9_999), CASTER, TARGET),
        ApplyOutcome::Rejected(RejectReason::UnknownSpell(SpellId(9_999)))
    );
    assert_eq!(
        apply(&mut fixture, REPRISAL_STRIKE, CASTER, TARGET),
        ApplyOutcome::Rejected(RejectReason::NoAuraEffects(REPRISAL_STRIKE))
    );
    assert_eq!(
        apply(&mut fixture, BATTLE_SHOUT, CASTER, UnitId(77)),
        ApplyOutcome::Rejected(RejectReason::TargetMissing(UnitId(77)))
    );

    fixture.units.get_mut(TARGET).expect("target").take_damage(5_000);
    assert_eq!(
        apply(&mut fixture, BATTLE_SHOUT, CASTER, TARGET),
        ApplyOutcome::Rejected(RejectReason::TargetDead(TARGET))
    );
    assert!(apply(&mut fixture, SOUL_LINK, CASTER, TARGET).aura().is_some());
    assert_eq!(fixture.world.aura_count(), 1);
}

#[test]
fn stacks_stay_within_bounds_and_zero_removes() {
    let mut fixture = Fixture::new();
    let aura_id = apply(&mut fixture, FROZEN_BIND, CASTER, TARGET)
        .aura()
        .expect("applied");
    for _ in 0..6 {
        apply(&mut fixture, FROZEN_BIND, CASTER, TARGET);
        let stacks = fixture.world.aura(aura_id).map(|a| a.stacks());
        assert!(stacks.is_some_and(|s| (1..=3).contains(&s)));
    }
    assert_eq!(fixture.world.aura(aura_id).map(|a| a.stacks()), Some(3));

    assert!(!fixture.engine().mod_stack_amount(aura_id, 5, RemoveMode::Default));
    assert!(fixture.engine().mod_stack_amount(aura_id, -1, RemoveMode::Default));
    assert_eq!(fixture.world.aura(aura_id).map(|a| a.stacks()), Some(2));

    assert!(fixture.engine().mod_stack_amount(aura_id, -10, RemoveMode::Cancel));
    assert!(fixture.world.aura(aura_id).is_none());
    let output = fixture.world.drain_output();
    assert!(output.notifications.iter().any(|n| matches!(
        n,
        AuraNotification::Removed { mode: RemoveMode::Cancel, .. }
    )));
}

#[test]
fn extreme_stack_deltas_clamp_instead_of_overflowing() {
    let mut fixture = Fixture::new();
    let sunder = apply(&mut fixture, SUNDER, CASTER, TARGET)
        .aura()
        .expect("applied");

    assert!(fixture.engine().mod_stack_amount(sunder, i32::MAX, RemoveMode::Default));
    let aura = fixture.world.aura(sunder).expect("still applied");
    assert_eq!(aura.stacks(), 10);
    assert_eq!(aura.effect(0).map(|e| e.amount()), Some(50));

    assert!(fixture.engine().mod_stack_amount(sunder, i32::MIN, RemoveMode::Cancel));
    assert!(fixture.world.aura(sunder).is_none());
}

#[test]
fn refresh_never_shortens_remaining_duration() {
    let mut fixture = Fixture::new();
    let aura_id = apply(&mut fixture, BATTLE_SHOUT, CASTER, TARGET)
        .aura()
        .expect("applied");

    fixture.engine().update(4_000);
    assert_eq!(fixture.world.aura(aura_id).and_then(|a| a.duration()), Some(6_000));

    let outcome = fixture
        .engine()
        .apply_aura(AuraApplication::new(BATTLE_SHOUT, CASTER, TARGET).with_duration(2_000))
        .expect("oracles");
    assert_eq!(outcome, ApplyOutcome::Refreshed(aura_id));
    assert_eq!(fixture.world.aura(aura_id).and_then(|a| a.duration()), Some(6_000));

    apply(&mut fixture, BATTLE_SHOUT, CASTER, TARGET);
    assert_eq!(fixture.world.aura(aura_id).and_then(|a| a.duration()), Some(10_000));
}

#[test]
fn reapply_restores_a_drained_shield() {
    let mut fixture = Fixture::new();
    let barrier = apply(&mut fixture, ICE_BARRIER, TARGET, TARGET)
        .aura()
        .expect("applied");

    let mut damage = DamageInfo::new(CASTER, TARGET, 60, SchoolMask::FROST);
    assert_eq!(fixture.engine().absorb_damage(&mut damage), 60);
    assert_eq!(
        fixture.world.aura(barrier).and_then(|a| a.effect(0)).map(|e| e.amount()),
        Some(40)
    );
    fixture.world.drain_output();

    assert_eq!(
        apply(&mut fixture, ICE_BARRIER, TARGET, TARGET),
        ApplyOutcome::Refreshed(barrier)
    );
    assert_eq!(
        fixture.world.aura(barrier).and_then(|a| a.effect(0)).map(|e| e.amount()),
        Some(100)
    );
    let output = fixture.world.drain_output();
    assert!(output.notifications.iter().any(|n| matches!(
        n,
        AuraNotification::AmountChanged {
            previous: 40,
            current: 100,
            ..
        }
    )));
}

#[test]
fn reapply_resolves_amounts_locked_against_stat_changes() {
    let mut hooks = HookRegistry::new();
    hooks.calc_amount(
        HookSelector::spell(BATTLE_SHOUT),
        |_ctx: &HookContext<'_>, calc: &mut AmountCalc| -> HookResult {
            calc.can_be_recalculated = false;
            Ok(())
        },
    );
    let mut fixture = Fixture::with_hooks(hooks);
    let shout = apply(&mut fixture, BATTLE_SHOUT, CASTER, TARGET)
        .aura()
        .expect("applied");

    fixture.units.set_stat(CASTER, Stat::AttackPower, 500);
    assert_eq!(fixture.engine().notify_stat_changed(CASTER), 0);
    assert_eq!(
        fixture.world.aura(shout).and_then(|a| a.effect(0)).map(|e| e.amount()),
        Some(40)
    );

    apply(&mut fixture, BATTLE_SHOUT, CASTER, TARGET);
    // 10 base + 10% of 500 attack power.
    assert_eq!(
        fixture.world.aura(shout).and_then(|a| a.effect(0)).map(|e| e.amount()),
        Some(60)
    );
}

#[test]
fn no_refresh_keeps_duration_but_still_stacks() {
    let mut hooks = HookRegistry::new();
    let reapplied = Counter::default();
    hooks.on_apply(
        HookSelector::spell(FROZEN_BIND).with_modes(HandleMode::REAPPLY),
        reapplied.clone(),
    );
    let mut fixture = Fixture::with_hooks(hooks);

    let aura_id = apply(&mut fixture, FROZEN_BIND, CASTER, TARGET)
        .aura()
        .expect("applied");
    fixture.engine().update(4_000);
    fixture.world.drain_output();

    apply(&mut fixture, FROZEN_BIND, CASTER, TARGET);
    let aura = fixture.world.aura(aura_id).expect("aura");
    assert_eq!(aura.duration(), Some(6_000));
    assert_eq!(aura.stacks(), 2);
    assert_eq!(reapplied.get(), 0);

    let output = fixture.world.drain_output();
    assert!(
        !output
            .notifications
            .iter()
            .any(|n| matches!(n, AuraNotification::Refreshed { .. }))
    );
}

#[test]
fn stack_threshold_hook_fires_once_at_cap() {
    let mut hooks = HookRegistry::new();
    let reached = Counter::default();
    let seen = reached.clone();
    hooks.on_apply(
        HookSelector::spell(SUNDER).with_modes(HandleMode::STACK),
        move |ctx: &mut HookContext<'_>| -> HookResult {
            if ctx.stack_change().is_some_and(|change| change.reached(10)) {
                seen.bump();
            }
            Ok(())
        },
    );
    let mut fixture = Fixture::with_hooks(hooks);

    let mut aura_id = None;
    for _ in 0..11 {
        aura_id = apply(&mut fixture, SUNDER, CASTER, TARGET).aura();
    }
    for _ in 0..3 {
        apply(&mut fixture, SUNDER, CASTER, TARGET);
    }

    let aura = fixture.world.aura(aura_id.expect("applied")).expect("aura");
    assert_eq!(aura.stacks(), 10);
    // Stack scaling: 5 points per stack.
    assert_eq!(aura.effect(0).map(|e| e.amount()), Some(50));
    assert_eq!(reached.get(), 1);
}

#[test]
fn second_removal_is_a_no_op() {
    let mut hooks = HookRegistry::new();
    let removed = Counter::default();
    hooks.on_remove(HookSelector::spell(BATTLE_SHOUT), removed.clone());
    let mut fixture = Fixture::with_hooks(hooks);

    let aura_id = apply(&mut fixture, BATTLE_SHOUT, CASTER, TARGET)
        .aura()
        .expect("applied");
    assert!(fixture.engine().remove_aura(aura_id, RemoveMode::Cancel));
    assert!(!fixture.engine().remove_aura(aura_id, RemoveMode::Cancel));
    assert_eq!(removed.get(), 1);
    assert!(!fixture.world.has_aura(TARGET, BATTLE_SHOUT));
}

#[test]
fn failing_remove_hook_still_takes_the_aura_out() {
    let mut hooks = HookRegistry::new();
    hooks.on_remove(
        HookSelector::spell(BATTLE_SHOUT),
        |ctx: &mut HookContext<'_>, _mode: RemoveMode| -> HookResult {
            ctx.apply_aura(AuraApplication::new(BATTLE_SHOUT, CASTER, TARGET));
            Err(HookError::script("backlash target vanished"))
        },
    );
    let mut fixture = Fixture::with_hooks(hooks);

    let aura_id = apply(&mut fixture, BATTLE_SHOUT, CASTER, TARGET)
        .aura()
        .expect("applied");
    assert!(fixture.engine().remove_aura(aura_id, RemoveMode::Cancel));
    assert!(fixture.world.aura(aura_id).is_none());
    assert!(!fixture.world.has_aura(TARGET, BATTLE_SHOUT));

    let output = fixture.world.drain_output();
    assert!(output.notifications.iter().any(|n| matches!(
        n,
        AuraNotification::Removed { mode: RemoveMode::Cancel, .. }
    )));
}

#[test]
fn remove_hooks_are_filtered_by_reason() {
    let mut hooks = HookRegistry::new();
    let on_expire = Counter::default();
    let on_dispel = Counter::default();
    let on_any = Counter::default();
    hooks.on_remove(
        HookSelector::spell(FROST_FEVER).with_remove_modes(RemoveModes::EXPIRE),
        on_expire.clone(),
    );
    hooks.on_remove(
        HookSelector::spell(FROST_FEVER).with_remove_modes(RemoveModes::DISPEL),
        on_dispel.clone(),
    );
    hooks.on_remove(HookSelector::spell(FROST_FEVER), on_any.clone());
    let mut fixture = Fixture::with_hooks(hooks);

    let dispelled = apply(&mut fixture, FROST_FEVER, CASTER, TARGET)
        .aura()
        .expect("applied");
    fixture.engine().remove_aura(dispelled, RemoveMode::Dispel);
    assert_eq!((on_expire.get(), on_dispel.get(), on_any.get()), (0, 1, 1));

    apply(&mut fixture, FROST_FEVER, CASTER, TARGET);
    fixture.engine().update(30_000);
    assert!(!fixture.world.has_aura(TARGET, FROST_FEVER));
    assert_eq!((on_expire.get(), on_dispel.get(), on_any.get()), (1, 1, 2));
}

#[test]
fn failing_hook_leaves_state_untouched() {
    let mut hooks = HookRegistry::new();
    hooks.on_apply(
        HookSelector::spell(BATTLE_SHOUT),
        |ctx: &mut HookContext<'_>| -> HookResult {
            ctx.change_amount(0, 999);
            ctx.remove_self(RemoveMode::Default);
            Err(HookError::script("lookup failed"))
        },
    );
    let mut fixture = Fixture::with_hooks(hooks);

    let aura_id = apply(&mut fixture, BATTLE_SHOUT, CASTER, TARGET)
        .aura()
        .expect("applied");
    let aura = fixture.world.aura(aura_id).expect("aura survives");
    assert!(aura.is_active());
    assert_eq!(aura.effect(0).map(|e| e.amount()), Some(40));
}

#[test]
fn multi_caster_auras_coexist_per_caster() {
    let mut fixture = Fixture::new();
    let first = apply(&mut fixture, REND, CASTER, TARGET).aura();
    let second = apply(&mut fixture, REND, OTHER_CASTER, TARGET).aura();
    assert_ne!(first, second);
    assert_eq!(fixture.world.auras_on(TARGET).count(), 2);

    // Single-instance spells share one aura regardless of caster.
    let shout = apply(&mut fixture, BATTLE_SHOUT, CASTER, TARGET).aura();
    let again = apply(&mut fixture, BATTLE_SHOUT, OTHER_CASTER, TARGET);
    assert_eq!(again, ApplyOutcome::Refreshed(shout.expect("applied")));

    let removed =
        fixture
            .engine()
            .remove_auras_by_spell(TARGET, REND, Some(OTHER_CASTER), RemoveMode::Dispel);
    assert_eq!(removed, 1);
    assert!(fixture.world.find_aura(TARGET, REND, Some(CASTER)).is_some());
}

#[test]
fn death_keeps_only_persistent_auras() {
    let mut fixture = Fixture::new();
    apply(&mut fixture, BATTLE_SHOUT, CASTER, TARGET);
    apply(&mut fixture, FROST_FEVER, CASTER, TARGET);
    apply(&mut fixture, SOUL_LINK, CASTER, TARGET);

    let removed = fixture.engine().handle_unit_death(TARGET).expect("oracles");
    assert_eq!(removed, 2);
    assert!(fixture.world.has_aura(TARGET, SOUL_LINK));
    assert_eq!(fixture.world.aura_count(), 1);
}

#[test]
fn stat_change_recalculates_scaled_amounts() {
    let mut fixture = Fixture::new();
    let aura_id = apply(&mut fixture, BATTLE_SHOUT, CASTER, TARGET)
        .aura()
        .expect("applied");

    fixture
        .units
        .set_stat(CASTER, aura_core::Stat::AttackPower, 500);
    assert_eq!(fixture.engine().notify_stat_changed(CASTER), 1);
    assert_eq!(
        fixture.world.aura(aura_id).and_then(|a| a.effect(0)).map(|e| e.amount()),
        Some(60)
    );
}

#[test]
fn remove_from_stack_prefers_charges() {
    let mut fixture = Fixture::new();
    let ward = apply(&mut fixture, REPRISAL, TARGET, TARGET)
        .aura()
        .expect("applied");
    assert!(
        fixture
            .engine()
            .remove_aura_from_stack(TARGET, REPRISAL, None, RemoveMode::Default)
    );
    let aura = fixture.world.aura(ward).expect("one charge left");
    assert_eq!((aura.charges(), aura.stacks()), (1, 1));

    let bind = apply(&mut fixture, FROZEN_BIND, CASTER, TARGET)
        .aura()
        .expect("applied");
    assert!(
        fixture
            .engine()
            .remove_aura_from_stack(TARGET, FROZEN_BIND, Some(CASTER), RemoveMode::Default)
    );
    assert!(fixture.world.aura(bind).is_none());
}
