//! Engine configuration loader.

use std::path::Path;

use aura_core::EngineConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for engine configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    ///
    /// Missing keys fall back to [`EngineConfig::default`].
    pub fn load(path: &Path) -> LoadResult<EngineConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<EngineConfig> {
        let config: EngineConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse engine config TOML: {}", e))?;

        if !(0.0..=100.0).contains(&config.default_proc_chance) {
            anyhow::bail!(
                "default_proc_chance must be within 0..=100, got {}",
                config.default_proc_chance
            );
        }
        if config.max_hook_depth == 0 {
            anyhow::bail!("max_hook_depth must be at least 1");
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config = ConfigLoader::parse("game_seed = 7\n").unwrap();
        assert_eq!(config.game_seed, 7);
        assert_eq!(config.max_hook_depth, EngineConfig::DEFAULT_MAX_HOOK_DEPTH);
    }

    #[test]
    fn out_of_range_chance_is_rejected() {
        assert!(ConfigLoader::parse("default_proc_chance = 150.0\n").is_err());
    }
}
