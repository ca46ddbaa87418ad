//! Runtime configuration shared across the orchestrator and workers.

use std::path::PathBuf;
use std::str::FromStr;

use aura_core::EngineConfig;

use crate::api::{Result, RuntimeError};

#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
    pub engine: EngineConfig,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
    /// Capacity of the channel feeding the aura-log worker.
    pub log_buffer_size: usize,
    /// Drive the clock from a real-time interval of this many milliseconds.
    /// `None` leaves the clock to explicit `advance` calls.
    pub tick_ms: Option<u32>,
    /// Append aura notifications as JSON lines to this file.
    pub aura_log_path: Option<PathBuf>,
}

impl RuntimeConfig {
    pub const ENV_TICK_MS: &'static str = "AURA_TICK_MS";
    pub const ENV_EVENT_BUFFER: &'static str = "AURA_EVENT_BUFFER";
    pub const ENV_COMMAND_BUFFER: &'static str = "AURA_COMMAND_BUFFER";
    pub const ENV_LOG_PATH: &'static str = "AURA_LOG_PATH";
    pub const ENV_GAME_SEED: &'static str = "AURA_GAME_SEED";

    /// Defaults overridden by `AURA_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::InvalidEnv`] when a variable is set but does not parse.
    pub fn from_env() -> Result<Self> {
        Self::default().with_overrides(|var| std::env::var(var).ok())
    }

    /// Applies `AURA_*` overrides read through `lookup`.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(ms) = parse_var::<u32>(&lookup, Self::ENV_TICK_MS)? {
            self.tick_ms = (ms > 0).then_some(ms);
        }
        if let Some(size) = parse_var(&lookup, Self::ENV_EVENT_BUFFER)? {
            self.event_buffer_size = size;
        }
        if let Some(size) = parse_var(&lookup, Self::ENV_COMMAND_BUFFER)? {
            self.command_buffer_size = size;
        }
        if let Some(seed) = parse_var(&lookup, Self::ENV_GAME_SEED)? {
            self.engine.game_seed = seed;
        }
        if let Some(path) = lookup(Self::ENV_LOG_PATH).filter(|path| !path.is_empty()) {
            self.aura_log_path = Some(PathBuf::from(path));
        }
        Ok(self)
    }

    pub fn with_engine(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_tick_ms(mut self, tick_ms: u32) -> Self {
        self.tick_ms = Some(tick_ms);
        self
    }

    pub fn with_aura_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.aura_log_path = Some(path.into());
        self
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            event_buffer_size: 100,
            command_buffer_size: 32,
            log_buffer_size: 1024,
            tick_ms: None,
            aura_log_path: None,
        }
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>> {
    let Some(raw) = lookup(var) else {
        return Ok(None);
    };
    raw.trim()
        .parse()
        .map(Some)
        .map_err(|_| RuntimeError::InvalidEnv { var, value: raw })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| vars.get(var).cloned()
    }

    #[test]
    fn overrides_replace_defaults() {
        let config = RuntimeConfig::default()
            .with_overrides(lookup(&[
                ("AURA_TICK_MS", "250"),
                ("AURA_EVENT_BUFFER", "512"),
                ("AURA_GAME_SEED", "77"),
                ("AURA_LOG_PATH", "/tmp/auras.jsonl"),
            ]))
            .expect("valid overrides");

        assert_eq!(config.tick_ms, Some(250));
        assert_eq!(config.event_buffer_size, 512);
        assert_eq!(config.command_buffer_size, 32);
        assert_eq!(config.engine.game_seed, 77);
        assert_eq!(config.aura_log_path, Some(PathBuf::from("/tmp/auras.jsonl")));
    }

    #[test]
    fn zero_tick_disables_real_time_mode() {
        let config = RuntimeConfig::default()
            .with_tick_ms(100)
            .with_overrides(lookup(&[("AURA_TICK_MS", "0")]))
            .expect("valid overrides");
        assert_eq!(config.tick_ms, None);
    }

    #[test]
    fn unparsable_values_are_rejected() {
        let error = RuntimeConfig::default()
            .with_overrides(lookup(&[("AURA_COMMAND_BUFFER", "lots")]))
            .expect_err("invalid buffer size");
        assert!(matches!(
            error,
            RuntimeError::InvalidEnv { var: "AURA_COMMAND_BUFFER", .. }
        ));
    }
}
