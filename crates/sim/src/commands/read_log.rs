//! Read and inspect aura logs
//!
//! Parses the JSON-lines file written by the runtime's aura-log worker.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use console::style;

use aura_core::{AuraId, AuraNotification, SpellId, UnitId};
use runtime::AuraLogEntry;

use super::describe_notification;

/// Read and filter an aura log
#[derive(Parser)]
pub struct ReadLog {
    /// Aura log file (JSON lines)
    #[arg(value_name = "FILE")]
    path: PathBuf,

    /// Only notifications about this unit
    #[arg(short, long, value_name = "UNIT")]
    unit: Option<u64>,

    /// Only notifications about auras of this spell
    #[arg(short, long, value_name = "SPELL")]
    spell: Option<u32>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "list")]
    format: OutputFormat,

    /// Limit number of entries to display (0 = unlimited)
    #[arg(short, long, default_value = "0")]
    limit: usize,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    /// Notification kinds and removal reasons with counts
    Summary,
    /// One line per notification
    List,
    /// Full JSON output
    Json,
}

impl ReadLog {
    pub fn execute(self) -> Result<()> {
        let entries = read_entries(&self.path)?;
        let total = entries.len();
        let filter = Filter {
            unit: self.unit.map(UnitId),
            spell: self.spell.map(SpellId),
        };
        let entries: Vec<_> = filter
            .apply(entries)
            .into_iter()
            .take(if self.limit == 0 {
                usize::MAX
            } else {
                self.limit
            })
            .collect();

        match self.format {
            OutputFormat::Summary => {
                println!("{} {}", style("Log:").bold().cyan(), self.path.display());
                println!(
                    "{} {} of {}",
                    style("Entries:").bold().cyan(),
                    entries.len(),
                    total
                );
                println!();
                print_summary(&entries);
            }
            OutputFormat::List => {
                for entry in &entries {
                    println!(
                        "{} {}",
                        style(format!("{:>9}ms", entry.at_ms)).dim(),
                        describe_notification(&entry.notification)
                    );
                }
            }
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(&entries)
                    .context("Failed to serialize entries to JSON")?;
                println!("{json}");
            }
        }

        Ok(())
    }
}

fn read_entries(path: &Path) -> Result<Vec<AuraLogEntry>> {
    let file =
        File::open(path).with_context(|| format!("Failed to open aura log: {}", path.display()))?;

    let mut entries = Vec::new();
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read line {}", index + 1))?;
        if line.trim().is_empty() {
            continue;
        }
        let entry: AuraLogEntry = serde_json::from_str(&line)
            .with_context(|| format!("Malformed aura log entry on line {}", index + 1))?;
        entries.push(entry);
    }
    Ok(entries)
}

struct Filter {
    unit: Option<UnitId>,
    spell: Option<SpellId>,
}

impl Filter {
    /// Amount and charge changes carry no spell id, so the spell of each aura
    /// is remembered from the notifications that do.
    fn apply(&self, entries: Vec<AuraLogEntry>) -> Vec<AuraLogEntry> {
        let mut spells: HashMap<AuraId, SpellId> = HashMap::new();

        entries
            .into_iter()
            .filter(|entry| {
                let notification = &entry.notification;
                if let Some(spell) = spell_of(notification) {
                    spells.insert(notification.aura(), spell);
                }
                let unit_ok = self.unit.is_none_or(|unit| notification.unit() == unit);
                let spell_ok = self
                    .spell
                    .is_none_or(|spell| spells.get(&notification.aura()) == Some(&spell));
                unit_ok && spell_ok
            })
            .collect()
    }
}

fn spell_of(notification: &AuraNotification) -> Option<SpellId> {
    match notification {
        AuraNotification::Applied { spell, .. }
        | AuraNotification::Refreshed { spell, .. }
        | AuraNotification::StackChanged { spell, .. }
        | AuraNotification::Removed { spell, .. } => Some(*spell),
        AuraNotification::AmountChanged { .. } | AuraNotification::ChargesChanged { .. } => None,
    }
}

fn kind_of(notification: &AuraNotification) -> &'static str {
    match notification {
        AuraNotification::Applied { .. } => "applied",
        AuraNotification::Refreshed { .. } => "refreshed",
        AuraNotification::StackChanged { .. } => "stack_changed",
        AuraNotification::AmountChanged { .. } => "amount_changed",
        AuraNotification::ChargesChanged { .. } => "charges_changed",
        AuraNotification::Removed { .. } => "removed",
    }
}

fn print_summary(entries: &[AuraLogEntry]) {
    let mut kinds: BTreeMap<&'static str, usize> = BTreeMap::new();
    let mut removals: BTreeMap<String, usize> = BTreeMap::new();
    for entry in entries {
        *kinds.entry(kind_of(&entry.notification)).or_insert(0) += 1;
        if let AuraNotification::Removed { mode, .. } = entry.notification {
            *removals.entry(mode.to_string()).or_insert(0) += 1;
        }
    }

    println!("{}", style("Notification Kinds:").bold().yellow());
    for (kind, count) in kinds {
        println!("  {kind}: {count}");
    }
    println!();

    if !removals.is_empty() {
        println!("{}", style("Removal Reasons:").bold().yellow());
        for (mode, count) in removals {
            println!("  {mode}: {count}");
        }
        println!();
    }

    if let (Some(first), Some(last)) = (entries.first(), entries.last()) {
        println!("{}", style("Time Range:").bold().yellow());
        println!("  First: {}ms", first.at_ms);
        println!("  Last: {}ms", last.at_ms);
    }
}
