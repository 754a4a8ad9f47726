//! Per-entity attribute collections and cross-system modifier application.
//!
//! An [`AttributeSystem`] owns every [`Attribute`] instance of one logical
//! entity and is the single mutation path for attachments and capacity, so
//! observer notifications always match the structural change that happened.
//!
//! Buffs and equipment are modeled as *other* systems whose modifier-kind
//! attributes are bulk-applied onto this one:
//!
//! ```
//! use std::sync::Arc;
//! use attributes_core::{
//!     AttributeDefinition, AttributeKind, AttributeSystem, ModifierCondition, SystemId,
//!     ValueRange,
//! };
//!
//! let catalog = [
//!     Arc::new(AttributeDefinition::new("attack", ValueRange::new(0.0, 1000.0))),
//!     Arc::new(AttributeDefinition::new("sharpness", ValueRange::new(0.0, 100.0))),
//! ];
//!
//! let mut hero = AttributeSystem::new(SystemId(0), [catalog[0].clone()]).unwrap();
//! hero.attribute_mut(&"attack").unwrap().flat = 10.0;
//!
//! let mut sword = AttributeSystem::new(SystemId(1), [catalog[1].clone()]).unwrap();
//! {
//!     let sharpness = sword.attribute_mut(&"sharpness").unwrap();
//!     sharpness.kind = AttributeKind::Modifier;
//!     sharpness.flat = 5.0;
//!     sharpness.factor = 0.2;
//!     sharpness.conditions.push(ModifierCondition::new("attack"));
//! }
//!
//! hero.add_modifiers(&sword);
//! assert_eq!(hero.value(&"attack"), Some(18.0));
//!
//! hero.remove_modifiers(sword.id());
//! assert_eq!(hero.value(&"attack"), Some(10.0));
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use crate::attribute::{Attribute, AttributeKind, CapacityChange, ModifierOrigin};
use crate::condition::ModifierCondition;
use crate::definition::AttributeDefinition;
use crate::error::AttributeError;
use crate::observer::AttributeObserver;
use crate::AttributeId;

/// Unique identifier for the entity an [`AttributeSystem`] belongs to.
///
/// Assigned by the caller (typically the owning entity's ID) and embedded in
/// every attachment so modifiers can be traced back to, and removed by, their
/// source system.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SystemId(pub u32);

impl std::fmt::Display for SystemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The full attribute set of one entity.
///
/// Built from a fixed list of definitions (one attribute per definition) and
/// indexed by ID for the system's whole lifetime; attributes can never be
/// added or removed afterwards, which is what makes the never-invalidated
/// lookup index sound.
pub struct AttributeSystem<T> {
    id: SystemId,
    attributes: Vec<Attribute<T>>,
    index: HashMap<T, usize>,
    observers: Vec<Arc<dyn AttributeObserver<T>>>,
}

impl<T: AttributeId> AttributeSystem<T> {
    /// Builds a system with one attribute per definition.
    ///
    /// Fails with [`AttributeError::DuplicateDefinition`] when two definitions
    /// share an ID.
    pub fn new(
        id: SystemId,
        definitions: impl IntoIterator<Item = Arc<AttributeDefinition<T>>>,
    ) -> Result<Self, AttributeError<T>> {
        let mut attributes = Vec::new();
        let mut index = HashMap::new();

        for definition in definitions {
            if index.contains_key(&definition.id) {
                return Err(AttributeError::DuplicateDefinition(definition.id.clone()));
            }
            index.insert(definition.id.clone(), attributes.len());
            attributes.push(Attribute::new(id, definition));
        }

        Ok(Self {
            id,
            attributes,
            index,
            observers: Vec::new(),
        })
    }

    pub fn id(&self) -> SystemId {
        self.id
    }

    /// All attributes, in definition order.
    pub fn attributes(&self) -> &[Attribute<T>] {
        &self.attributes
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn contains(&self, id: &T) -> bool {
        self.index.contains_key(id)
    }

    /// Registers an observer notified of attachments, detachments, and
    /// capacity changes on this system.
    ///
    /// Callbacks are fire-and-forget; they must not call back into the
    /// system.
    pub fn register_observer(&mut self, observer: Arc<dyn AttributeObserver<T>>) {
        self.observers.push(observer);
    }

    /// Looks up an attribute by definition ID.
    ///
    /// Unknown IDs are reported through `tracing` and yield `None`; they are
    /// a caller bug, not a state the system can reach on its own.
    pub fn attribute(&self, id: &T) -> Option<&Attribute<T>> {
        match self.index.get(id) {
            Some(&position) => Some(&self.attributes[position]),
            None => {
                tracing::warn!(system = %self.id, attribute = ?id, "attribute lookup failed");
                None
            }
        }
    }

    /// Mutable lookup for adjusting base fields (`flat`, `factor`, `kind`,
    /// targeting conditions).
    pub fn attribute_mut(&mut self, id: &T) -> Option<&mut Attribute<T>> {
        match self.index.get(id) {
            Some(&position) => Some(&mut self.attributes[position]),
            None => {
                tracing::warn!(system = %self.id, attribute = ?id, "attribute lookup failed");
                None
            }
        }
    }

    /// Resolved value of the attribute with the given ID.
    pub fn value(&self, id: &T) -> Option<f32> {
        self.attribute(id).map(Attribute::value)
    }

    /// Checks whether `modifier` may attach to `target` right now.
    ///
    /// The gating condition is either the explicitly supplied one or the
    /// first of the modifier's own targeting rules naming `target`. A
    /// modifier with no rule for `target` is rejected. Every clause is
    /// evaluated against this system's current values; all must hold.
    pub fn modifier_accepted(
        &self,
        target: &T,
        modifier: &Attribute<T>,
        condition: Option<&ModifierCondition<T>>,
    ) -> bool {
        if !self.index.contains_key(target) {
            tracing::warn!(system = %self.id, attribute = ?target, "attribute lookup failed");
            return false;
        }

        let resolved = condition.or_else(|| {
            modifier
                .conditions
                .iter()
                .find(|candidate| candidate.target_attribute == *target)
        });
        let Some(condition) = resolved else {
            tracing::debug!(
                system = %self.id,
                target = ?target,
                modifier = ?modifier.id(),
                "modifier declares no targeting rule for attribute"
            );
            return false;
        };

        for clause in &condition.clauses {
            let Some(&position) = self.index.get(&clause.attribute) else {
                tracing::warn!(
                    system = %self.id,
                    attribute = ?clause.attribute,
                    "condition references unknown attribute"
                );
                return false;
            };
            let current = self.attributes[position].value();
            if !clause.operator.evaluate(current, clause.threshold) {
                return false;
            }
        }

        true
    }

    /// Attaches `modifier` to `target`, gated by [`Self::modifier_accepted`].
    ///
    /// Returns whether the attachment happened; rejection is silent. Each
    /// successful call appends exactly one entry and fires one attach
    /// notification.
    pub fn add_modifier(
        &mut self,
        target: &T,
        modifier: &Attribute<T>,
        condition: Option<&ModifierCondition<T>>,
    ) -> bool {
        if !self.modifier_accepted(target, modifier, condition) {
            return false;
        }
        let Some(&position) = self.index.get(target) else {
            return false;
        };

        let attached = modifier.attachment();
        self.attributes[position].push_modifier(attached.clone());
        for observer in &self.observers {
            observer.modifier_attached(target, &attached);
        }
        true
    }

    /// Detaches the first attachment on `target` matching `origin`.
    ///
    /// Idempotent: absent origins are a no-op and fire nothing.
    pub fn remove_modifier(&mut self, target: &T, origin: &ModifierOrigin<T>) -> bool {
        let Some(&position) = self.index.get(target) else {
            tracing::warn!(system = %self.id, attribute = ?target, "attribute lookup failed");
            return false;
        };

        let Some(removed) = self.attributes[position].take_modifier(origin) else {
            return false;
        };
        for observer in &self.observers {
            observer.modifier_detached(target, &removed);
        }
        true
    }

    /// Applies every modifier-kind attribute of `source` onto this system.
    ///
    /// Each of a modifier's targeting rules is tried against its named
    /// target; rules naming attributes this system does not have are
    /// skipped. The already-resolved rule is handed to the gating check so
    /// it is not searched for again.
    pub fn add_modifiers(&mut self, source: &AttributeSystem<T>) {
        for modifier in &source.attributes {
            if modifier.kind != AttributeKind::Modifier {
                continue;
            }
            for condition in &modifier.conditions {
                if self.index.contains_key(&condition.target_attribute) {
                    self.add_modifier(&condition.target_attribute, modifier, Some(condition));
                }
            }
        }
    }

    /// Detaches every modifier originating from `source`, across all
    /// attributes, firing one detach notification per removed attachment.
    pub fn remove_modifiers(&mut self, source: SystemId) {
        let mut detached = Vec::new();
        for attribute in &mut self.attributes {
            for removed in attribute.drain_modifiers_from(source) {
                detached.push((attribute.id().clone(), removed));
            }
        }

        for (target, modifier) in &detached {
            for observer in &self.observers {
                observer.modifier_detached(target, modifier);
            }
        }
    }

    /// Raises the capacity pool of `id` by `amount`.
    ///
    /// Unless the definition allows exceeding, the pool may not rise above
    /// the attribute's current resolved value. Success fires a
    /// capacity-changed notification.
    pub fn capacity_add(
        &mut self,
        id: &T,
        amount: f32,
    ) -> Result<CapacityChange, AttributeError<T>> {
        let Some(&position) = self.index.get(id) else {
            tracing::warn!(system = %self.id, attribute = ?id, "attribute lookup failed");
            return Err(AttributeError::UnknownAttribute(id.clone()));
        };

        let change = self.attributes[position].capacity_add(amount)?;
        for observer in &self.observers {
            observer.capacity_changed(id, change.new_value, change.old_value);
        }
        Ok(change)
    }

    /// Lowers the capacity pool of `id` by `amount`, bounded below by the
    /// definition's minimum capacity.
    pub fn capacity_remove(
        &mut self,
        id: &T,
        amount: f32,
    ) -> Result<CapacityChange, AttributeError<T>> {
        let Some(&position) = self.index.get(id) else {
            tracing::warn!(system = %self.id, attribute = ?id, "attribute lookup failed");
            return Err(AttributeError::UnknownAttribute(id.clone()));
        };

        let change = self.attributes[position].capacity_remove(amount)?;
        for observer in &self.observers {
            observer.capacity_changed(id, change.new_value, change.old_value);
        }
        Ok(change)
    }
}
