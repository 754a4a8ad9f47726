//! Entity template loader.
//!
//! A template describes the initial state of one entity's attributes:
//! which definitions it instantiates, base values, whether each instance
//! acts as a modifier, and the targeting conditions modifiers declare.
//! Equipment and buff sources are authored as templates of their own.

use std::path::Path;

use attributes_core::{AttributeId, AttributeKind, FlagOperator, ModifierCondition};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::loaders::{read_file, LoadResult};

/// Initial state for one attribute instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(serialize = "T: Serialize", deserialize = "T: Deserialize<'de>"))]
pub struct AttributeSeed<T> {
    /// Definition this instance references.
    pub id: T,

    #[serde(default)]
    pub kind: AttributeKind,

    #[serde(default)]
    pub flat: f32,

    #[serde(default)]
    pub factor: f32,

    #[serde(default)]
    pub flag_operator: FlagOperator,

    /// Targeting rules used when this instance is applied as a modifier.
    #[serde(default)]
    pub conditions: Vec<ModifierCondition<T>>,

    /// Initial capacity pool level, applied through the bounds-checked
    /// capacity path after base values are in place.
    #[serde(default)]
    pub capacity: f32,
}

/// Entity template structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityTemplate<T> {
    pub attributes: Vec<AttributeSeed<T>>,
}

/// Loader for entity templates from RON files.
pub struct TemplateLoader;

impl TemplateLoader {
    /// Load an entity template from a RON file.
    pub fn load<T>(path: &Path) -> LoadResult<EntityTemplate<T>>
    where
        T: AttributeId + DeserializeOwned,
    {
        let content = read_file(path)?;
        let template: EntityTemplate<T> = ron::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse entity template RON: {}", e))?;

        Ok(template)
    }
}
