//! Spell catalog loader.

use std::collections::HashSet;
use std::path::Path;

use aura_core::{EngineConfig, SpellCatalog, SpellInfo};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Spell catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpellCatalogFile {
    pub spells: Vec<SpellInfo>,
}

/// Loader for the spell catalog from RON files.
pub struct SpellCatalogLoader;

impl SpellCatalogLoader {
    /// Load the spell catalog from a RON file.
    ///
    /// Effect indices are assigned from list position, so data files never
    /// spell them out.
    pub fn load(path: &Path) -> LoadResult<SpellCatalog> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<SpellCatalog> {
        let file: SpellCatalogFile = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse spell catalog RON: {}", e))?;

        let mut seen = HashSet::new();
        let mut catalog = SpellCatalog::new();
        for mut spell in file.spells {
            if !seen.insert(spell.id) {
                anyhow::bail!("Duplicate spell id {} ({})", spell.id, spell.name);
            }
            if spell.effects.len() > EngineConfig::MAX_EFFECTS_PER_AURA {
                anyhow::bail!(
                    "{} ({}) defines {} effects, at most {} are supported",
                    spell.id,
                    spell.name,
                    spell.effects.len(),
                    EngineConfig::MAX_EFFECTS_PER_AURA
                );
            }
            for (index, effect) in spell.effects.iter_mut().enumerate() {
                effect.index = index as u8;
            }
            catalog.insert(spell);
        }
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aura_core::{AuraType, SpellAttributes, SpellId, SpellOracle};

    const TWO_SPELLS: &str = r#"(
        spells: [
            (
                id: (10),
                name: "Renew",
                duration: Some(15000),
                effects: [
                    (kind: ApplyAura(PeriodicHeal), base_points: 45, amplitude: Some(3000)),
                ],
            ),
            (
                id: (11),
                name: "Shadow Word: Pain",
                duration: Some(18000),
                attributes: "NEGATIVE",
                effects: [
                    (kind: Dummy),
                    (kind: ApplyAura(PeriodicDamage), base_points: 30, amplitude: Some(3000)),
                ],
            ),
        ],
    )"#;

    #[test]
    fn parses_and_indexes_effects() {
        let catalog = SpellCatalogLoader::parse(TWO_SPELLS).unwrap();
        assert_eq!(catalog.len(), 2);

        let pain = catalog.spell(SpellId(11)).unwrap();
        assert!(pain.has_attribute(SpellAttributes::NEGATIVE));
        assert_eq!(pain.effects[1].index, 1);
        assert_eq!(pain.effects[1].aura_type(), Some(AuraType::PeriodicDamage));
        assert_eq!(pain.max_stacks, 0);
        assert_eq!(pain.stack_limit(), 1);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let doubled = r#"(spells: [
            (id: (1), name: "A", effects: [(kind: Dummy)]),
            (id: (1), name: "B", effects: [(kind: Dummy)]),
        ])"#;
        let error = SpellCatalogLoader::parse(doubled).unwrap_err();
        assert!(error.to_string().contains("Duplicate spell id"));
    }
}
