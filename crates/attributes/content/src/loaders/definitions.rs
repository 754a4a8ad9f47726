//! Definition catalog loader.

use std::path::Path;

use attributes_core::{AttributeDefinition, AttributeId};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::loaders::{read_file, LoadResult};

/// Definition catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefinitionCatalog<T> {
    pub definitions: Vec<AttributeDefinition<T>>,
}

/// Loader for attribute definition catalogs from RON files.
pub struct DefinitionsLoader;

impl DefinitionsLoader {
    /// Load a definition catalog from a RON file.
    ///
    /// The catalog is validated after parsing: duplicate IDs and inverted
    /// value ranges are authoring errors and rejected here rather than left
    /// for system construction to trip over.
    pub fn load<T>(path: &Path) -> LoadResult<Vec<AttributeDefinition<T>>>
    where
        T: AttributeId + DeserializeOwned,
    {
        let content = read_file(path)?;
        let catalog: DefinitionCatalog<T> = ron::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse definition catalog RON: {}", e))?;

        Self::validate(&catalog.definitions)?;
        Ok(catalog.definitions)
    }

    fn validate<T: AttributeId>(definitions: &[AttributeDefinition<T>]) -> LoadResult<()> {
        let mut seen = std::collections::HashSet::new();
        for definition in definitions {
            if !seen.insert(&definition.id) {
                anyhow::bail!("Duplicate attribute definition {:?}", definition.id);
            }
            if definition.value_range.min > definition.value_range.max {
                anyhow::bail!(
                    "Attribute definition {:?} has inverted value range [{}, {}]",
                    definition.id,
                    definition.value_range.min,
                    definition.value_range.max
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attributes_core::ValueRange;

    #[test]
    fn duplicate_ids_rejected() {
        let definitions = vec![
            AttributeDefinition::new("health".to_string(), ValueRange::new(0.0, 100.0)),
            AttributeDefinition::new("health".to_string(), ValueRange::new(0.0, 50.0)),
        ];
        assert!(DefinitionsLoader::validate(&definitions).is_err());
    }

    #[test]
    fn inverted_range_rejected() {
        let definitions = vec![AttributeDefinition::new(
            "health".to_string(),
            ValueRange::new(100.0, 0.0),
        )];
        assert!(DefinitionsLoader::validate(&definitions).is_err());
    }
}
