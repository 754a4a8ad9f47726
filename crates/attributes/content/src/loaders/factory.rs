//! Factory assembling attribute systems from loaded content.

use std::collections::HashMap;
use std::sync::Arc;

use attributes_core::{AttributeDefinition, AttributeId, AttributeSystem, SystemId};

use crate::loaders::template::EntityTemplate;
use crate::loaders::LoadResult;

/// Builds [`AttributeSystem`]s from a definition catalog and entity
/// templates.
///
/// The factory owns the catalog's definitions behind [`Arc`]s so every
/// system built from it shares the same authored metadata.
pub struct SystemFactory<T> {
    definitions: HashMap<T, Arc<AttributeDefinition<T>>>,
}

impl<T: AttributeId> SystemFactory<T> {
    /// Creates a factory over a validated definition catalog.
    pub fn new(definitions: impl IntoIterator<Item = AttributeDefinition<T>>) -> LoadResult<Self> {
        let mut map = HashMap::new();
        for definition in definitions {
            let id = definition.id.clone();
            if map.insert(id.clone(), Arc::new(definition)).is_some() {
                anyhow::bail!("Duplicate attribute definition {:?}", id);
            }
        }
        Ok(Self { definitions: map })
    }

    /// Shared definition for `id`, if the catalog declares one.
    pub fn definition(&self, id: &T) -> Option<&Arc<AttributeDefinition<T>>> {
        self.definitions.get(id)
    }

    /// Builds one entity's attribute system from its template.
    ///
    /// Every seed must reference a cataloged definition. Base fields are
    /// applied first so the capacity seed is bounded by the already-resolved
    /// value.
    pub fn build(
        &self,
        system_id: SystemId,
        template: &EntityTemplate<T>,
    ) -> LoadResult<AttributeSystem<T>> {
        let mut definitions = Vec::with_capacity(template.attributes.len());
        for seed in &template.attributes {
            let definition = self.definitions.get(&seed.id).ok_or_else(|| {
                anyhow::anyhow!("Template references unknown attribute definition {:?}", seed.id)
            })?;
            definitions.push(definition.clone());
        }

        let mut system = AttributeSystem::new(system_id, definitions)
            .map_err(|e| anyhow::anyhow!("Failed to build attribute system: {}", e))?;

        for seed in &template.attributes {
            if let Some(attribute) = system.attribute_mut(&seed.id) {
                attribute.kind = seed.kind;
                attribute.flat = seed.flat;
                attribute.factor = seed.factor;
                attribute.flag_operator = seed.flag_operator;
                attribute.conditions = seed.conditions.clone();
            }
        }

        for seed in &template.attributes {
            if seed.capacity != 0.0 {
                system.capacity_add(&seed.id, seed.capacity).map_err(|e| {
                    anyhow::anyhow!("Invalid capacity seed for {:?}: {}", seed.id, e)
                })?;
            }
        }

        Ok(system)
    }
}
