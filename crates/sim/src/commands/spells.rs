//! Inspect the spell catalog
//!
//! Loads spells.ron, binds the bundled scripts against it, and lists both.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;

use aura_core::{SpellEffectKind, SpellId, SpellInfo, SpellOracle};

use super::content_factory;

/// List the spell catalog and the scripts bound to it
#[derive(Parser)]
pub struct Spells {
    /// Content directory holding spells.ron (defaults to the bundled content)
    #[arg(short, long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Show a single spell
    #[arg(long, value_name = "SPELL")]
    id: Option<u32>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "summary")]
    format: OutputFormat,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    /// One line per spell, then the script report
    Summary,
    /// Full JSON output
    Json,
    /// Pretty-printed debug format
    Debug,
}

impl Spells {
    pub fn execute(self) -> Result<()> {
        let factory = content_factory(self.data_dir);
        let catalog = factory.load_spells()?;

        let mut spells: Vec<&SpellInfo> = match self.id {
            Some(id) => vec![
                catalog
                    .spell(SpellId(id))
                    .with_context(|| format!("Spell {id} is not in the catalog"))?,
            ],
            None => catalog.iter().collect(),
        };
        spells.sort_by_key(|spell| spell.id);

        match self.format {
            OutputFormat::Summary => {
                println!(
                    "{} {}",
                    style("Content:").bold().cyan(),
                    factory.data_dir().display()
                );
                println!("{} {}", style("Spells:").bold().cyan(), catalog.len());
                println!();
                for spell in &spells {
                    println!("{}", describe_spell(spell));
                }

                let (_, report) = factory.build_hooks(&catalog);
                println!();
                println!("{}", style("Scripts:").bold().yellow());
                for name in &report.loaded {
                    println!("  {} {}", style("loaded").green(), name);
                }
                for error in &report.disabled {
                    println!("  {} {}", style("disabled").red(), error);
                }
            }
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(&spells)
                    .context("Failed to serialize spells to JSON")?;
                println!("{json}");
            }
            OutputFormat::Debug => {
                for spell in &spells {
                    println!("{spell:#?}");
                }
            }
        }

        Ok(())
    }
}

fn describe_spell(spell: &SpellInfo) -> String {
    let duration = match spell.duration {
        Some(ms) => format!("{ms}ms"),
        None => "permanent".to_string(),
    };
    let effects: Vec<String> = spell
        .effects
        .iter()
        .map(|effect| match effect.kind {
            SpellEffectKind::ApplyAura(aura_type) => format!("{aura_type:?}"),
            kind => format!("{kind:?}"),
        })
        .collect();

    let mut line = format!(
        "{:>6}  {:<24} {:<10} [{}]",
        spell.id.0,
        spell.name,
        duration,
        effects.join(", ")
    );
    if spell.stack_limit() > 1 {
        line.push_str(&format!(" stacks {}", spell.stack_limit()));
    }
    if spell.proc.is_some() {
        line.push_str(" proc");
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use aura_core::{AuraType, SpellEffectInfo};

    #[test]
    fn summary_line_lists_effects_and_stacks() {
        let spell = SpellInfo::new(SpellId(53817), "Maelstrom Weapon")
            .with_duration(30_000)
            .with_max_stacks(10)
            .with_effect(SpellEffectInfo::aura(AuraType::ModDamagePercentDone));

        let line = describe_spell(&spell);
        assert!(line.contains("Maelstrom Weapon"));
        assert!(line.contains("30000ms"));
        assert!(line.contains("ModDamagePercentDone"));
        assert!(line.ends_with("stacks 10"));
    }
}
