//! RON scenario scripts.
//!
//! A scenario lists the units to spawn and a sequence of steps to drive
//! through a [`RuntimeHandle`]. `Expect` steps turn a scenario into a
//! regression check: the run stops at the first one that does not hold.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use aura_core::{
    AuraApplication, DamageInfo, HealInfo, HitMask, RemoveMode, SchoolMask, SpellId, Stat,
    UnitClass, UnitId, UnitRecord,
};
use runtime::RuntimeHandle;

/// Scenario compiled into the binary, used when `run` gets no file.
pub const DEMO: &str = include_str!("../scenarios/demo.ron");

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    /// Overrides the engine seed from the content config.
    #[serde(default)]
    pub seed: Option<u64>,
    pub units: Vec<UnitSpec>,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnitSpec {
    pub id: UnitId,
    pub name: String,
    #[serde(default)]
    pub class: UnitClass,
    pub health: u32,
    #[serde(default)]
    pub stats: BTreeMap<Stat, i32>,
}

impl UnitSpec {
    pub fn to_record(&self) -> UnitRecord {
        self.stats.iter().fold(
            UnitRecord::new(self.id, self.name.clone(), self.health).with_class(self.class),
            |record, (stat, value)| record.with_stat(*stat, *value),
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub enum Step {
    /// Cast a spell through the combat host (auras plus instant effects).
    Cast {
        caster: UnitId,
        target: UnitId,
        spell: SpellId,
    },
    /// Apply a spell's auras directly, optionally overriding stacks or duration.
    Apply {
        caster: UnitId,
        target: UnitId,
        spell: SpellId,
        #[serde(default)]
        stacks: Option<u8>,
        #[serde(default)]
        duration: Option<u32>,
    },
    Melee {
        attacker: UnitId,
        victim: UnitId,
        amount: u32,
        #[serde(default)]
        critical: bool,
    },
    SpellHit {
        attacker: UnitId,
        victim: UnitId,
        spell: SpellId,
        amount: u32,
        school: SchoolMask,
    },
    Heal {
        healer: UnitId,
        target: UnitId,
        amount: u32,
        #[serde(default)]
        spell: Option<SpellId>,
    },
    Dispel {
        dispeller: UnitId,
        target: UnitId,
        spell: SpellId,
    },
    /// The owner cancels its own aura of `spell`.
    Cancel { unit: UnitId, spell: SpellId },
    Kill {
        unit: UnitId,
        #[serde(default)]
        killer: Option<UnitId>,
    },
    Despawn { unit: UnitId },
    SetStat {
        unit: UnitId,
        stat: Stat,
        value: i32,
    },
    Advance { ms: u32 },
    Expect {
        unit: UnitId,
        #[serde(default)]
        health: Option<u32>,
        #[serde(default)]
        has: Vec<SpellId>,
        #[serde(default)]
        lacks: Vec<SpellId>,
    },
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid scenario: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let scenario: Scenario = ron::from_str(content).context("Failed to parse scenario RON")?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Rejects duplicate unit ids and steps naming units that are never spawned.
    fn validate(&self) -> Result<()> {
        let mut known = std::collections::BTreeSet::new();
        for spec in &self.units {
            if !known.insert(spec.id) {
                bail!("unit {} is declared twice", spec.id);
            }
        }
        for (index, step) in self.steps.iter().enumerate() {
            if let Some(unit) = step.units().into_iter().find(|unit| !known.contains(unit)) {
                bail!("step #{} references undeclared unit {}", index + 1, unit);
            }
        }
        Ok(())
    }
}

impl Step {
    fn units(&self) -> Vec<UnitId> {
        match self {
            Step::Cast { caster, target, .. }
            | Step::Apply { caster, target, .. }
            | Step::Dispel {
                dispeller: caster,
                target,
                ..
            }
            | Step::Heal {
                healer: caster,
                target,
                ..
            } => vec![*caster, *target],
            Step::Melee {
                attacker, victim, ..
            }
            | Step::SpellHit {
                attacker, victim, ..
            } => vec![*attacker, *victim],
            Step::Kill { unit, killer } => std::iter::once(*unit).chain(*killer).collect(),
            Step::Cancel { unit, .. }
            | Step::Despawn { unit }
            | Step::SetStat { unit, .. }
            | Step::Expect { unit, .. } => vec![*unit],
            Step::Advance { .. } => Vec::new(),
        }
    }

    /// Runs the step and returns a one-line summary of its direct result.
    pub async fn execute(&self, handle: &RuntimeHandle) -> Result<String> {
        let summary = match self {
            Step::Cast {
                caster,
                target,
                spell,
            } => {
                let aura = handle.cast_spell(*caster, *target, *spell).await?;
                match aura {
                    Some(aura) => format!("{caster} casts {spell} on {target} -> {aura}"),
                    None => format!("{caster} casts {spell} on {target}"),
                }
            }
            Step::Apply {
                caster,
                target,
                spell,
                stacks,
                duration,
            } => {
                let mut application = AuraApplication::new(*spell, *caster, *target);
                if let Some(stacks) = stacks {
                    application = application.with_stacks(*stacks);
                }
                if let Some(duration) = duration {
                    application = application.with_duration(*duration);
                }
                let outcome = handle.apply_aura(application).await?;
                format!("{caster} applies {spell} to {target} -> {outcome:?}")
            }
            Step::Melee {
                attacker,
                victim,
                amount,
                critical,
            } => {
                let hit = if *critical {
                    HitMask::CRITICAL
                } else {
                    HitMask::NORMAL
                };
                let damage = DamageInfo::new(*attacker, *victim, *amount, SchoolMask::PHYSICAL);
                let report = handle.deal_damage(damage, hit).await?;
                format!(
                    "{attacker} hits {victim} for {amount} (absorbed {}, dealt {}{})",
                    report.absorbed,
                    report.dealt,
                    if report.killed { ", killed" } else { "" }
                )
            }
            Step::SpellHit {
                attacker,
                victim,
                spell,
                amount,
                school,
            } => {
                let damage =
                    DamageInfo::new(*attacker, *victim, *amount, *school).with_spell(*spell);
                let report = handle.deal_damage(damage, HitMask::NORMAL).await?;
                format!(
                    "{attacker} {spell} hits {victim} for {amount} (absorbed {}, dealt {}{})",
                    report.absorbed,
                    report.dealt,
                    if report.killed { ", killed" } else { "" }
                )
            }
            Step::Heal {
                healer,
                target,
                amount,
                spell,
            } => {
                let mut heal = HealInfo::new(*healer, *target, *amount);
                heal.spell = *spell;
                let effective = handle.heal(heal).await?;
                format!("{healer} heals {target} for {amount} (effective {effective})")
            }
            Step::Dispel {
                dispeller,
                target,
                spell,
            } => {
                let removed = handle.dispel(*dispeller, *target, *spell).await?;
                format!("{dispeller} dispels {spell} from {target} -> {removed} removed")
            }
            Step::Cancel { unit, spell } => {
                let aura = handle
                    .query_unit(*unit)
                    .await?
                    .and_then(|snapshot| snapshot.aura(*spell).map(|aura| aura.id()));
                match aura {
                    Some(aura) => {
                        let removed = handle.remove_aura(aura, RemoveMode::Cancel).await?;
                        format!("{unit} cancels {spell} -> removed {removed}")
                    }
                    None => format!("{unit} cancels {spell} -> not present"),
                }
            }
            Step::Kill { unit, killer } => {
                let removed = handle.kill_unit(*unit, *killer).await?;
                format!("{unit} dies -> {removed} auras removed")
            }
            Step::Despawn { unit } => {
                let removed = handle.despawn_unit(*unit).await?;
                format!("{unit} despawns -> {removed} auras removed")
            }
            Step::SetStat { unit, stat, value } => {
                let changed = handle.set_stat(*unit, *stat, *value).await?;
                format!("{unit} {stat} = {value} -> {changed} effects recalculated")
            }
            Step::Advance { ms } => {
                let now = handle.advance(*ms).await?;
                format!("advance {ms}ms -> t={now}")
            }
            Step::Expect {
                unit,
                health,
                has,
                lacks,
            } => {
                let Some(snapshot) = handle.query_unit(*unit).await? else {
                    bail!("expected {unit} to exist");
                };
                if let Some(health) = health
                    && snapshot.health() != *health
                {
                    bail!(
                        "expected {unit} at {health} health, found {}",
                        snapshot.health()
                    );
                }
                if let Some(spell) = has.iter().find(|spell| !snapshot.has_aura(**spell)) {
                    bail!("expected {unit} to carry {spell}");
                }
                if let Some(spell) = lacks.iter().find(|spell| snapshot.has_aura(**spell)) {
                    bail!("expected {unit} not to carry {spell}");
                }
                format!("{unit} ok (health {})", snapshot.health())
            }
        };
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_demo_parses() {
        let scenario = Scenario::parse(DEMO).expect("demo scenario");
        assert!(!scenario.units.is_empty());
        assert!(
            scenario
                .steps
                .iter()
                .any(|step| matches!(step, Step::Expect { .. }))
        );
    }

    #[test]
    fn unit_specs_carry_stats_and_class() {
        let scenario = Scenario::parse(
            r#"(
                name: "stats",
                units: [
                    (
                        id: UnitId(7),
                        name: "Caster",
                        class: Warlock,
                        health: 500,
                        stats: { SpellPower: 250 },
                    ),
                ],
                steps: [Advance(ms: 1000)],
            )"#,
        )
        .expect("valid scenario");

        let record = scenario.units[0].to_record();
        assert_eq!(record.id, UnitId(7));
        assert_eq!(record.class, UnitClass::Warlock);
        assert_eq!(record.health, 500);
        assert_eq!(record.stats.get(&Stat::SpellPower), Some(&250));
    }

    #[test]
    fn steps_must_reference_declared_units() {
        let error = Scenario::parse(
            r#"(
                name: "dangling",
                units: [(id: UnitId(1), name: "Solo", health: 100)],
                steps: [Kill(unit: UnitId(1), killer: Some(UnitId(3)))],
            )"#,
        )
        .expect_err("unknown killer");
        assert!(error.to_string().contains("undeclared unit"));
    }

    #[test]
    fn duplicate_units_are_rejected() {
        let error = Scenario::parse(
            r#"(
                name: "twins",
                units: [
                    (id: UnitId(1), name: "A", health: 100),
                    (id: UnitId(1), name: "B", health: 100),
                ],
                steps: [],
            )"#,
        )
        .expect_err("duplicate id");
        assert!(error.to_string().contains("declared twice"));
    }
}
