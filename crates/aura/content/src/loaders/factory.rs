//! Content factory for building the engine's inputs from a data directory.

use std::path::{Path, PathBuf};

use aura_core::{EngineConfig, HookRegistry, SpellCatalog};

use crate::loaders::{ConfigLoader, LoadResult, SpellCatalogLoader};
use crate::scripts::{ScriptReport, register_all};

/// Content factory that loads all aura content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── engine.toml
/// └── spells.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Factory over the data directory bundled with this crate.
    pub fn bundled() -> Self {
        Self::new(Path::new(env!("CARGO_MANIFEST_DIR")).join("data"))
    }

    /// Load engine configuration from `engine.toml`.
    pub fn load_config(&self) -> LoadResult<EngineConfig> {
        ConfigLoader::load(&self.data_dir.join("engine.toml"))
    }

    /// Load the spell catalog from `spells.ron`.
    pub fn load_spells(&self) -> LoadResult<SpellCatalog> {
        SpellCatalogLoader::load(&self.data_dir.join("spells.ron"))
    }

    /// Registers every bundled script against `catalog`.
    ///
    /// Scripts whose spells are missing from the catalog are disabled and
    /// listed in the report; the others stay live.
    pub fn build_hooks(&self, catalog: &SpellCatalog) -> (HookRegistry, ScriptReport) {
        let mut hooks = HookRegistry::new();
        let report = register_all(&mut hooks, catalog);
        (hooks, report)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
