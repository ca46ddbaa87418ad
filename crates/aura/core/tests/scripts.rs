//! Script registration: validation against the catalog and spell binding.

mod common;

use aura_core::{
    AuraApplication, AuraScript, AuraType, HookRegistry, HookSelector, ScriptHooks,
    ScriptLoadError, SpellId,
};
use common::*;

struct ShoutWatcher {
    spells: Vec<SpellId>,
    effect: u8,
    aura_type: Option<AuraType>,
    applied: Counter,
}

impl ShoutWatcher {
    fn new(spells: Vec<SpellId>) -> Self {
        Self {
            spells,
            effect: 0,
            aura_type: None,
            applied: Counter::default(),
        }
    }
}

impl AuraScript for ShoutWatcher {
    fn name(&self) -> &'static str {
        "shout_watcher"
    }

    fn spells(&self) -> &[SpellId] {
        &self.spells
    }

    fn register(&self, hooks: &mut ScriptHooks) {
        let mut selector = HookSelector::effect(self.effect);
        if let Some(aura_type) = self.aura_type {
            selector = selector.with_aura_type(aura_type);
        }
        hooks.on_apply(selector, self.applied.clone());
    }
}

#[test]
fn valid_script_binds_to_its_spells_only() {
    let catalog = catalog();
    let script = ShoutWatcher::new(vec![BATTLE_SHOUT]);
    let mut hooks = HookRegistry::new();
    hooks.register_script(&script, &catalog).expect("valid script");
    assert!(hooks.is_loaded("shout_watcher"));
    assert_eq!(hooks.len(), 1);

    let mut fixture = Fixture::with_hooks(hooks);
    let mut engine = fixture.engine();
    engine
        .apply_aura(AuraApplication::new(BATTLE_SHOUT, CASTER, TARGET))
        .expect("oracles");
    engine
        .apply_aura(AuraApplication::new(FROST_FEVER, CASTER, TARGET))
        .expect("oracles");
    assert_eq!(script.applied.get(), 1);
}

#[test]
fn unknown_spell_disables_the_whole_script() {
    let catalog = catalog();
    let script = ShoutWatcher::new(vec![BATTLE_SHOUT, SpellId(4_242)]);
    let mut hooks = HookRegistry::new();

    let error = hooks.register_script(&script, &catalog).unwrap_err();
    assert_eq!(
        error,
        ScriptLoadError::UnknownSpell {
            script: "shout_watcher",
            spell: SpellId(4_242),
        }
    );
    assert!(hooks.is_empty());
    assert!(!hooks.is_loaded("shout_watcher"));
}

#[test]
fn effect_and_aura_type_are_checked() {
    let catalog = catalog();
    let mut hooks = HookRegistry::new();

    let mut missing_effect = ShoutWatcher::new(vec![BATTLE_SHOUT]);
    missing_effect.effect = 3;
    assert!(matches!(
        hooks.register_script(&missing_effect, &catalog),
        Err(ScriptLoadError::UnknownEffect { effect: 3, .. })
    ));

    let mut wrong_type = ShoutWatcher::new(vec![BATTLE_SHOUT]);
    wrong_type.aura_type = Some(AuraType::PeriodicDamage);
    assert!(matches!(
        hooks.register_script(&wrong_type, &catalog),
        Err(ScriptLoadError::AuraTypeMismatch { .. })
    ));
    assert!(hooks.is_empty());
}

#[test]
fn scripts_load_once() {
    let catalog = catalog();
    let script = ShoutWatcher::new(vec![BATTLE_SHOUT]);
    let mut hooks = HookRegistry::new();
    hooks.register_script(&script, &catalog).expect("first load");
    assert_eq!(
        hooks.register_script(&script, &catalog),
        Err(ScriptLoadError::Duplicate {
            script: "shout_watcher"
        })
    );
    assert_eq!(hooks.scripts(), ["shout_watcher"]);
}
