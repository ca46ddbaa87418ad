//! End-to-end scenarios: bundled content driven through the runtime.

use aura_content::ContentFactory;
use aura_core::{
    ApplyOutcome, AuraApplication, AuraNotification, DamageInfo, FixedRng, HitMask, RejectReason,
    RemoveMode, SchoolMask, SpellId, Stat, UnitId, UnitRecord, UnitTable,
};
use runtime::{
    AuraLogEntry, CombatEvent, Event, Runtime, RuntimeConfig, RuntimeError, RuntimeHandle, Topic,
    UnitEvent,
};

const HERO: UnitId = UnitId(1);
const FOE: UnitId = UnitId(2);

const BATTLE_SHOUT: SpellId = SpellId(6673);
const UNSTABLE_AFFLICTION: SpellId = SpellId(30108);
const LIVING_BOMB: SpellId = SpellId(44457);
const LIVING_BOMB_EXPLOSION: SpellId = SpellId(44461);
const POWER_WORD_SHIELD: SpellId = SpellId(17);
const WEAKENED_SOUL: SpellId = SpellId(6788);

fn units() -> UnitTable {
    UnitTable::new()
        .with_unit(
            UnitRecord::new(HERO, "hero", 1_000)
                .with_stat(Stat::SpellPower, 100)
                .with_stat(Stat::AttackPower, 400),
        )
        .with_unit(UnitRecord::new(FOE, "foe", 2_000))
}

async fn start(config: RuntimeConfig) -> Runtime {
    let factory = ContentFactory::bundled();
    let catalog = factory.load_spells().expect("bundled catalog");
    let engine = factory.load_config().expect("bundled config");
    let (hooks, report) = factory.build_hooks(&catalog);
    assert!(report.disabled.is_empty(), "{:?}", report.disabled);

    Runtime::builder()
        .config(config.with_engine(engine))
        .catalog(catalog)
        .units(units())
        .hooks(hooks)
        .rng(FixedRng(0))
        .build()
        .await
        .expect("runtime builds")
}

async fn health(handle: &RuntimeHandle, unit: UnitId) -> u32 {
    handle
        .query_unit(unit)
        .await
        .expect("runtime alive")
        .map_or(0, |snapshot| snapshot.health())
}

async fn cast(handle: &RuntimeHandle, spell: SpellId, caster: UnitId, target: UnitId) -> ApplyOutcome {
    handle
        .apply_aura(AuraApplication::new(spell, caster, target))
        .await
        .expect("runtime alive")
}

#[tokio::test]
async fn living_bomb_ticks_then_explodes_on_expiry() {
    let runtime = start(RuntimeConfig::default()).await;
    let handle = runtime.handle();
    let mut combat = handle.subscribe(Topic::Combat);

    // ================================================================
    // Four 153 ticks over 12s, then the 306 explosion
    // ================================================================
    assert!(matches!(cast(&handle, LIVING_BOMB, HERO, FOE).await, ApplyOutcome::Applied(_)));
    handle.advance(12_000).await.expect("advance");

    assert_eq!(health(&handle, FOE).await, 2_000 - 4 * 153 - 306);

    let mut explosion = None;
    while let Ok(event) = combat.try_recv() {
        if let Event::Combat(CombatEvent::Damage {
            spell: Some(LIVING_BOMB_EXPLOSION),
            dealt,
            ..
        }) = event
        {
            explosion = Some(dealt);
        }
    }
    assert_eq!(explosion, Some(306));

    drop(handle);
    runtime.shutdown().await.expect("clean shutdown");
}

#[tokio::test]
async fn killing_the_target_defuses_living_bomb() {
    let runtime = start(RuntimeConfig::default()).await;
    let handle = runtime.handle();
    let mut units = handle.subscribe(Topic::Unit);

    cast(&handle, LIVING_BOMB, HERO, FOE).await;
    let removed = handle.kill_unit(FOE, Some(HERO)).await.expect("foe exists");
    assert_eq!(removed, 1);

    let snapshot = handle
        .query_unit(FOE)
        .await
        .expect("runtime alive")
        .expect("foe still tracked");
    assert!(!snapshot.is_alive());
    assert!(snapshot.auras.is_empty());

    assert_eq!(
        units.recv().await.ok(),
        Some(Event::Unit(UnitEvent::Died {
            unit: FOE,
            killer: Some(HERO),
        }))
    );

    drop(handle);
    runtime.shutdown().await.expect("clean shutdown");
}

#[tokio::test]
async fn shield_soaks_melee_damage_before_health() {
    let runtime = start(RuntimeConfig::default()).await;
    let handle = runtime.handle();

    cast(&handle, POWER_WORD_SHIELD, HERO, HERO).await;
    let snapshot = handle.query_unit(HERO).await.expect("alive").expect("hero");
    assert!(snapshot.has_aura(WEAKENED_SOUL));

    let report = handle
        .deal_damage(DamageInfo::new(FOE, HERO, 200, SchoolMask::PHYSICAL), HitMask::NORMAL)
        .await
        .expect("runtime alive");

    assert_eq!(report.absorbed, 180);
    assert_eq!(report.dealt, 20);
    assert!(!report.killed);

    let snapshot = handle.query_unit(HERO).await.expect("alive").expect("hero");
    assert_eq!(snapshot.health(), 980);
    assert!(!snapshot.has_aura(POWER_WORD_SHIELD));

    drop(handle);
    runtime.shutdown().await.expect("clean shutdown");
}

#[tokio::test]
async fn dispelling_unstable_affliction_backfires() {
    let runtime = start(RuntimeConfig::default()).await;
    let handle = runtime.handle();

    cast(&handle, UNSTABLE_AFFLICTION, HERO, FOE).await;
    let removed = handle
        .dispel(FOE, FOE, UNSTABLE_AFFLICTION)
        .await
        .expect("runtime alive");
    assert_eq!(removed, 1);

    // (110 + 20% of 100 spell power) * 9
    assert_eq!(health(&handle, FOE).await, 2_000 - 1_170);

    drop(handle);
    runtime.shutdown().await.expect("clean shutdown");
}

#[tokio::test]
async fn aura_topic_streams_notifications_in_order() {
    let runtime = start(RuntimeConfig::default()).await;
    let handle = runtime.handle();
    let mut auras = handle.subscribe(Topic::Aura);

    let aura = cast(&handle, BATTLE_SHOUT, HERO, HERO)
        .await
        .aura()
        .expect("applied");
    assert!(handle.remove_aura(aura, RemoveMode::Cancel).await.expect("alive"));
    assert!(!handle.remove_aura(aura, RemoveMode::Cancel).await.expect("alive"));

    let first = auras.recv().await.expect("applied notification");
    assert!(matches!(
        first,
        Event::Aura(AuraNotification::Applied { spell: BATTLE_SHOUT, .. })
    ));

    let mut last = None;
    while let Ok(event) = auras.try_recv() {
        last = Some(event);
    }
    assert!(matches!(
        last,
        Some(Event::Aura(AuraNotification::Removed {
            mode: RemoveMode::Cancel,
            ..
        }))
    ));

    drop(handle);
    runtime.shutdown().await.expect("clean shutdown");
}

#[tokio::test]
async fn rejected_applications_are_not_errors() {
    let runtime = start(RuntimeConfig::default()).await;
    let handle = runtime.handle();

    let outcome = cast(&handle, BATTLE_SHOUT, HERO, UnitId(42)).await;
    assert_eq!(outcome, ApplyOutcome::Rejected(RejectReason::TargetMissing(UnitId(42))));

    let duplicate = handle.spawn_unit(UnitRecord::new(HERO, "again", 10)).await;
    assert!(matches!(duplicate, Err(RuntimeError::DuplicateUnit(HERO))));

    handle
        .spawn_unit(UnitRecord::new(UnitId(3), "add", 300))
        .await
        .expect("fresh id");
    assert!(matches!(
        cast(&handle, BATTLE_SHOUT, HERO, UnitId(3)).await,
        ApplyOutcome::Applied(_)
    ));

    drop(handle);
    runtime.shutdown().await.expect("clean shutdown");
}

#[tokio::test]
async fn aura_log_records_json_lines() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("auras.jsonl");
    let runtime = start(RuntimeConfig::default().with_aura_log(&path)).await;
    let handle = runtime.handle();

    cast(&handle, BATTLE_SHOUT, HERO, HERO).await;
    handle.advance(120_000).await.expect("advance");

    drop(handle);
    runtime.shutdown().await.expect("clean shutdown");

    let contents = tokio::fs::read_to_string(&path).await.expect("log written");
    let entries: Vec<AuraLogEntry> = contents
        .lines()
        .map(|line| serde_json::from_str(line).expect("json line"))
        .collect();

    assert!(matches!(
        entries.first().map(|entry| &entry.notification),
        Some(AuraNotification::Applied { spell: BATTLE_SHOUT, .. })
    ));
    let last = entries.last().expect("at least two entries");
    assert_eq!(last.at_ms, 120_000);
    assert!(matches!(
        last.notification,
        AuraNotification::Removed {
            mode: RemoveMode::Expire,
            ..
        }
    ));
}

#[tokio::test]
async fn real_time_mode_advances_the_clock() {
    let runtime = start(RuntimeConfig::default().with_tick_ms(5)).await;
    let handle = runtime.handle();

    tokio::time::sleep(std::time::Duration::from_millis(60)).await;

    let snapshot = handle.query_unit(HERO).await.expect("alive").expect("hero");
    assert!(snapshot.now >= 5);

    drop(handle);
    runtime.shutdown().await.expect("clean shutdown");
}

#[tokio::test]
async fn building_without_a_catalog_fails() {
    let result = Runtime::builder().build().await;
    assert!(matches!(result, Err(RuntimeError::MissingCatalog)));
}
