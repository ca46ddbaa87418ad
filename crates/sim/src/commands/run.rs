//! Run a scenario through a fresh runtime
//!
//! Spawns the scenario's units, executes each step, and prints the events the
//! step produced on every topic.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{info, warn};

use runtime::{Event, Runtime, RuntimeConfig, RuntimeHandle, Topic};

use super::{content_factory, describe_event};
use crate::scenario::{DEMO, Scenario};

/// Run a scenario and print what happened
#[derive(Parser)]
pub struct RunScenario {
    /// Scenario file (RON). Runs the bundled demo when omitted
    #[arg(value_name = "FILE")]
    scenario: Option<PathBuf>,

    /// Content directory holding spells.ron and engine.toml (defaults to the bundled content)
    #[arg(short, long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Proc roll seed, overriding the scenario, AURA_GAME_SEED and engine.toml
    #[arg(long)]
    seed: Option<u64>,

    /// Append aura notifications to this JSON-lines file
    #[arg(long, value_name = "FILE")]
    aura_log: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Keep executing after a failed step
    #[arg(long)]
    keep_going: bool,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    /// One line per step followed by its events
    Text,
    /// One JSON object per step
    Json,
}

type Receivers = HashMap<Topic, broadcast::Receiver<Event>>;

impl RunScenario {
    pub async fn execute(self) -> Result<()> {
        let scenario = match &self.scenario {
            Some(path) => Scenario::load(path)?,
            None => Scenario::parse(DEMO).context("Bundled demo scenario is invalid")?,
        };

        let factory = content_factory(self.data_dir.clone());
        let catalog = factory.load_spells()?;
        let engine = factory.load_config()?;
        let (hooks, report) = factory.build_hooks(&catalog);
        for error in &report.disabled {
            warn!("script disabled: {error}");
        }

        let mut config = RuntimeConfig::default()
            .with_engine(engine)
            .with_overrides(|var| std::env::var(var).ok())?;
        if let Some(seed) = self.seed.or(scenario.seed) {
            config.engine.game_seed = seed;
        }
        if let Some(path) = &self.aura_log {
            config = config.with_aura_log(path);
        }

        info!(
            scenario = %scenario.name,
            units = scenario.units.len(),
            steps = scenario.steps.len(),
            seed = config.engine.game_seed,
            "running scenario"
        );

        let runtime = Runtime::builder()
            .config(config)
            .catalog(catalog)
            .hooks(hooks)
            .build()
            .await?;
        let handle = runtime.handle();
        let mut receivers = handle.subscribe_multiple(&Topic::ALL);

        if matches!(self.format, OutputFormat::Text) {
            println!("{} {}", style("Scenario:").bold().cyan(), scenario.name);
            println!();
        }

        let outcome = self.play(&scenario, &handle, &mut receivers).await;

        drop(handle);
        runtime.shutdown().await?;
        let failures = outcome?;

        if matches!(self.format, OutputFormat::Text) {
            println!();
            if failures == 0 {
                println!("{}", style("All steps passed").bold().green());
            } else {
                println!("{} {}", style("Failed steps:").bold().red(), failures);
            }
        }
        if failures > 0 {
            anyhow::bail!("{failures} step(s) failed");
        }
        Ok(())
    }

    /// Returns the number of failed steps. Stops at the first failure unless
    /// `--keep-going` is set.
    async fn play(
        &self,
        scenario: &Scenario,
        handle: &RuntimeHandle,
        receivers: &mut Receivers,
    ) -> Result<usize> {
        for spec in &scenario.units {
            handle.spawn_unit(spec.to_record()).await?;
        }
        self.print_step(0, Ok(format!("spawned {} units", scenario.units.len())), receivers)?;

        let mut failures = 0;
        for (index, step) in scenario.steps.iter().enumerate() {
            let result = step.execute(handle).await;
            let failed = result.is_err();
            self.print_step(index + 1, result, receivers)?;

            if failed {
                failures += 1;
                if !self.keep_going {
                    break;
                }
            }
        }
        Ok(failures)
    }

    fn print_step(
        &self,
        index: usize,
        result: Result<String>,
        receivers: &mut Receivers,
    ) -> Result<()> {
        let events = drain(receivers);

        match self.format {
            OutputFormat::Text => {
                match &result {
                    Ok(summary) => println!("{} {}", style(format!("[{index:>3}]")).dim(), summary),
                    Err(error) => println!(
                        "{} {}",
                        style(format!("[{index:>3}]")).red(),
                        style(format!("{error:#}")).red()
                    ),
                }
                for event in &events {
                    println!("      {}", describe_event(event));
                }
            }
            OutputFormat::Json => {
                let line = serde_json::json!({
                    "step": index,
                    "summary": result.as_ref().ok(),
                    "error": result.as_ref().err().map(|error| format!("{error:#}")),
                    "events": events,
                });
                println!(
                    "{}",
                    serde_json::to_string(&line).context("Failed to serialize step")?
                );
            }
        }
        Ok(())
    }
}

/// Everything published since the last drain, topic by topic.
fn drain(receivers: &mut Receivers) -> Vec<Event> {
    let mut events = Vec::new();
    for topic in Topic::ALL {
        let Some(receiver) = receivers.get_mut(&topic) else {
            continue;
        };
        loop {
            match receiver.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(?topic, skipped, "event output lagged; raise AURA_EVENT_BUFFER");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use aura_core::UnitId;
    use runtime::EventBus;

    #[test]
    fn drain_groups_events_by_topic() {
        let bus = EventBus::with_capacity(16);
        let mut receivers = bus.subscribe_multiple(&Topic::ALL);

        bus.publish(Event::Unit(runtime::UnitEvent::Spawned { unit: UnitId(1) }));
        bus.publish(Event::Combat(runtime::CombatEvent::Visual {
            unit: UnitId(1),
            spell: aura_core::SpellId(17),
            visual: 1,
        }));

        let events = drain(&mut receivers);
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], Event::Combat(_)));
        assert!(matches!(events[1], Event::Unit(_)));
        assert!(drain(&mut receivers).is_empty());
    }
}
