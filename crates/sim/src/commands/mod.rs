//! Command implementations for aura-sim
//!
//! Each command is a separate module that implements its own CLI args and execution logic.

mod read_log;
mod run;
mod spells;

use std::path::PathBuf;

use aura_content::ContentFactory;
use aura_core::AuraNotification;
use runtime::{CombatEvent, Event, UnitEvent};

pub use read_log::ReadLog;
pub use run::RunScenario;
pub use spells::Spells;

/// Content from `dir`, or the catalog bundled with aura-content.
fn content_factory(dir: Option<PathBuf>) -> ContentFactory {
    match dir {
        Some(dir) => ContentFactory::new(dir),
        None => ContentFactory::bundled(),
    }
}

fn describe_event(event: &Event) -> String {
    match event {
        Event::Aura(notification) => describe_notification(notification),
        Event::Combat(combat) => describe_combat(combat),
        Event::Unit(unit) => describe_unit(unit),
    }
}

fn describe_notification(notification: &AuraNotification) -> String {
    match notification {
        AuraNotification::Applied {
            aura,
            unit,
            spell,
            caster,
            stacks,
            duration,
        } => format!(
            "{aura} applied: {spell} on {unit} by {caster} x{stacks} ({})",
            describe_duration(*duration)
        ),
        AuraNotification::Refreshed {
            aura,
            unit,
            spell,
            duration,
        } => format!(
            "{aura} refreshed: {spell} on {unit} ({})",
            describe_duration(*duration)
        ),
        AuraNotification::StackChanged {
            aura,
            unit,
            spell,
            previous,
            current,
        } => format!("{aura} stacks: {spell} on {unit} {previous} -> {current}"),
        AuraNotification::AmountChanged {
            aura,
            unit,
            effect,
            previous,
            current,
        } => format!("{aura} amount: effect #{effect} on {unit} {previous} -> {current}"),
        AuraNotification::ChargesChanged {
            aura,
            unit,
            previous,
            current,
        } => format!("{aura} charges: on {unit} {previous} -> {current}"),
        AuraNotification::Removed {
            aura,
            unit,
            spell,
            mode,
        } => format!("{aura} removed: {spell} from {unit} ({mode})"),
    }
}

fn describe_combat(event: &CombatEvent) -> String {
    match event {
        CombatEvent::Damage {
            source,
            target,
            spell,
            amount,
            absorbed,
            dealt,
            periodic,
            ..
        } => format!(
            "{source} -> {target} {}{}damage {amount} (absorbed {absorbed}, dealt {dealt})",
            describe_spell(*spell),
            if *periodic { "periodic " } else { "" }
        ),
        CombatEvent::Heal {
            source,
            target,
            spell,
            amount,
            effective,
            periodic,
        } => format!(
            "{source} -> {target} {}{}heal {amount} (effective {effective})",
            describe_spell(*spell),
            if *periodic { "periodic " } else { "" }
        ),
        CombatEvent::SpellCast {
            caster,
            target,
            spell,
            aura,
        } => match aura {
            Some(aura) => format!("{caster} -> {target} cast {spell} (aura {aura})"),
            None => format!("{caster} -> {target} cast {spell}"),
        },
        CombatEvent::Visual {
            unit,
            spell,
            visual,
        } => format!("{unit} visual {visual} for {spell}"),
    }
}

fn describe_unit(event: &UnitEvent) -> String {
    match event {
        UnitEvent::Spawned { unit } => format!("{unit} spawned"),
        UnitEvent::Died {
            unit,
            killer: Some(killer),
        } => format!("{unit} killed by {killer}"),
        UnitEvent::Died { unit, killer: None } => format!("{unit} died"),
        UnitEvent::ClockAdvanced { now } => format!("clock at {now}ms"),
    }
}

fn describe_spell(spell: Option<aura_core::SpellId>) -> String {
    spell.map(|spell| format!("{spell} ")).unwrap_or_default()
}

fn describe_duration(duration: Option<u32>) -> String {
    match duration {
        Some(ms) => format!("{ms}ms"),
        None => "permanent".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aura_core::{AuraId, RemoveMode, SpellId, UnitId};

    #[test]
    fn removal_mentions_mode() {
        let line = describe_event(&Event::Aura(AuraNotification::Removed {
            aura: AuraId(3),
            unit: UnitId(2),
            spell: SpellId(44457),
            mode: RemoveMode::Expire,
        }));
        assert!(line.contains("removed"));
        assert!(line.contains("expire"));
    }

    #[test]
    fn killer_is_named_when_known() {
        let killed = describe_unit(&UnitEvent::Died {
            unit: UnitId(2),
            killer: Some(UnitId(1)),
        });
        let died = describe_unit(&UnitEvent::Died {
            unit: UnitId(2),
            killer: None,
        });
        assert!(killed.contains("killed by"));
        assert!(!died.contains("killed by"));
    }
}
