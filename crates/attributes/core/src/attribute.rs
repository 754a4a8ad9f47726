//! Live attribute instances and on-demand value resolution.
//!
//! An [`Attribute`] is the mutable, per-entity counterpart of an authored
//! [`AttributeDefinition`]: it holds the base value, the currently attached
//! modifiers, and the capacity pool. Resolution is recomputed on every read
//! so the result always reflects the current attachment set.
//!
//! # Resolution
//!
//! Flag-typed attributes fold their modifiers over the base mask in
//! attachment order (`AddFlag` ors bits in, `RemoveFlag` clears them, `Set`
//! replaces the running mask outright), so ordering is observable.
//!
//! Numeric attributes are order-insensitive for the sums themselves:
//!
//! ```text
//! value = clamp((flat + Σ mod.flat) × (1 + factor + Σ mod.factor), range)
//! ```
//!
//! When the definition carries a stack-penalty curve, each modifier's factor
//! is weighted by the curve entry at its rank in descending-factor order
//! (rank 0 = largest factor), applying diminishing returns to stacked buffs.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::condition::ModifierCondition;
use crate::definition::AttributeDefinition;
use crate::error::AttributeError;
use crate::flags;
use crate::system::SystemId;
use crate::AttributeId;

/// Distinguishes plain attributes from modifier attributes.
///
/// Modifier attributes exist to be applied onto other systems' attributes;
/// they are the only ones [`crate::AttributeSystem::add_modifiers`] picks up.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum AttributeKind {
    #[default]
    Attribute,
    Modifier,
}

/// How a modifier combines into a flag-typed target's running mask.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum FlagOperator {
    /// Bitwise OR the modifier's mask into the running value.
    #[default]
    AddFlag,
    /// Clear the modifier's mask bits from the running value.
    RemoveFlag,
    /// Replace the running value with the modifier's mask.
    Set,
}

/// Non-owning handle identifying an attached modifier by its origin.
///
/// Modifiers stay owned by the system they were authored in; attachments
/// reference them relationally so bulk removal by source stays cheap.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModifierOrigin<T> {
    /// System that owns the modifier attribute.
    pub system: SystemId,
    /// Definition ID of the modifier attribute within its owning system.
    pub attribute: T,
}

/// Modifier payload captured at attach time.
///
/// Holds the scalars resolution needs (`flat`, `factor`, `flag_operator`)
/// plus the origin handle used for detachment. Mutating the source modifier
/// after attachment does not propagate; detach and re-attach to refresh.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttachedModifier<T> {
    pub origin: ModifierOrigin<T>,
    pub flat: f32,
    pub factor: f32,
    pub flag_operator: FlagOperator,
}

/// Before/after record of a successful capacity mutation.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CapacityChange {
    pub new_value: f32,
    pub old_value: f32,
}

/// Live state of one attribute on one entity.
///
/// Owned by exactly one [`crate::AttributeSystem`]; references its definition
/// through a shared [`Arc`]. Base fields (`flat`, `factor`, targeting
/// `conditions`, ...) are freely mutable; the modifier set and capacity pool
/// only change through the owning system so change notifications stay
/// consistent.
#[derive(Clone, Debug)]
pub struct Attribute<T> {
    definition: Arc<AttributeDefinition<T>>,
    owner: SystemId,

    /// Whether this instance acts as a plain attribute or as a modifier.
    pub kind: AttributeKind,

    /// Base additive value, or the base bitmask for flag-typed attributes.
    pub flat: f32,

    /// Base multiplicative contribution.
    pub factor: f32,

    /// Combination mode used when this instance is applied to a flag-typed
    /// target.
    pub flag_operator: FlagOperator,

    /// Targeting rules describing where this instance may attach as a
    /// modifier.
    pub conditions: Vec<ModifierCondition<T>>,

    capacity: f32,
    modifiers: Vec<AttachedModifier<T>>,
}

impl<T: AttributeId> Attribute<T> {
    pub(crate) fn new(owner: SystemId, definition: Arc<AttributeDefinition<T>>) -> Self {
        Self {
            definition,
            owner,
            kind: AttributeKind::Attribute,
            flat: 0.0,
            factor: 0.0,
            flag_operator: FlagOperator::AddFlag,
            conditions: Vec::new(),
            capacity: 0.0,
            modifiers: Vec::new(),
        }
    }

    /// Definition this attribute instantiates.
    pub fn definition(&self) -> &AttributeDefinition<T> {
        &self.definition
    }

    /// Definition ID, the attribute's identity within its system.
    pub fn id(&self) -> &T {
        &self.definition.id
    }

    /// System this attribute belongs to.
    pub fn owner(&self) -> SystemId {
        self.owner
    }

    /// Current capacity pool level.
    pub fn capacity(&self) -> f32 {
        self.capacity
    }

    /// Currently attached modifiers, in attachment order.
    pub fn modifiers(&self) -> &[AttachedModifier<T>] {
        &self.modifiers
    }

    /// True when capacity operations apply: the definition enables capacity,
    /// the instance is a plain attribute, and it is not flag-typed.
    pub fn supports_capacity(&self) -> bool {
        self.definition.has_capacity
            && self.kind == AttributeKind::Attribute
            && !self.definition.has_flags()
    }

    /// Payload another system stores when this instance attaches as a
    /// modifier.
    pub fn attachment(&self) -> AttachedModifier<T> {
        AttachedModifier {
            origin: ModifierOrigin {
                system: self.owner,
                attribute: self.definition.id.clone(),
            },
            flat: self.flat,
            factor: self.factor,
            flag_operator: self.flag_operator,
        }
    }

    /// Resolves the current value from base state and attached modifiers.
    ///
    /// Pure and recomputed on every call; two reads without an intervening
    /// attach/detach or base-field mutation return the same result.
    pub fn value(&self) -> f32 {
        if self.definition.has_flags() {
            let mut mask = self.flat;
            for modifier in &self.modifiers {
                mask = match modifier.flag_operator {
                    FlagOperator::AddFlag => flags::add(mask, modifier.flat),
                    FlagOperator::RemoveFlag => flags::remove(mask, modifier.flat),
                    FlagOperator::Set => modifier.flat,
                };
            }
            return mask;
        }

        // Rank modifiers by descending factor; the stable sort keeps ties in
        // attachment order. Ranking only affects stack-penalty weighting.
        let mut ordered: Vec<&AttachedModifier<T>> = self.modifiers.iter().collect();
        ordered.sort_by(|a, b| b.factor.partial_cmp(&a.factor).unwrap_or(Ordering::Equal));

        let mut total_flat = 0.0;
        let mut total_factor = 0.0;
        for (rank, modifier) in ordered.iter().enumerate() {
            total_flat += modifier.flat;

            if self.definition.has_stack_penalty() {
                let last = self.definition.stack_penalties.len() - 1;
                total_factor += modifier.factor * self.definition.stack_penalties[rank.min(last)];
            } else {
                total_factor += modifier.factor;
            }
        }

        self.definition
            .value_range
            .clamp((self.flat + total_flat) * (1.0 + self.factor + total_factor))
    }

    pub(crate) fn push_modifier(&mut self, modifier: AttachedModifier<T>) {
        self.modifiers.push(modifier);
    }

    /// Removes the first attachment matching `origin`, if any.
    pub(crate) fn take_modifier(&mut self, origin: &ModifierOrigin<T>) -> Option<AttachedModifier<T>> {
        let position = self
            .modifiers
            .iter()
            .position(|modifier| modifier.origin == *origin)?;
        Some(self.modifiers.remove(position))
    }

    /// Removes every attachment owned by `source`, preserving the order of
    /// the rest.
    pub(crate) fn drain_modifiers_from(&mut self, source: SystemId) -> Vec<AttachedModifier<T>> {
        let mut removed = Vec::new();
        self.modifiers.retain(|modifier| {
            if modifier.origin.system == source {
                removed.push(modifier.clone());
                false
            } else {
                true
            }
        });
        removed
    }

    pub(crate) fn capacity_add(&mut self, amount: f32) -> Result<CapacityChange, AttributeError<T>> {
        if !self.supports_capacity() {
            return Err(AttributeError::CapacityUnsupported(self.id().clone()));
        }

        let requested = self.capacity + amount;
        let ceiling = self.value();
        if !self.definition.allow_exceed_capacity && requested > ceiling {
            return Err(AttributeError::CapacityOutOfBounds {
                attribute: self.id().clone(),
                requested,
                min: self.definition.min_capacity,
                max: ceiling,
            });
        }

        let old_value = self.capacity;
        self.capacity = requested;
        Ok(CapacityChange {
            new_value: self.capacity,
            old_value,
        })
    }

    pub(crate) fn capacity_remove(
        &mut self,
        amount: f32,
    ) -> Result<CapacityChange, AttributeError<T>> {
        if !self.supports_capacity() {
            return Err(AttributeError::CapacityUnsupported(self.id().clone()));
        }

        let requested = self.capacity - amount;
        if requested < self.definition.min_capacity {
            return Err(AttributeError::CapacityOutOfBounds {
                attribute: self.id().clone(),
                requested,
                min: self.definition.min_capacity,
                max: f32::INFINITY,
            });
        }

        let old_value = self.capacity;
        self.capacity = requested;
        Ok(CapacityChange {
            new_value: self.capacity,
            old_value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::ValueRange;

    fn numeric(id: &'static str, min: f32, max: f32) -> Arc<AttributeDefinition<&'static str>> {
        Arc::new(AttributeDefinition::new(id, ValueRange::new(min, max)))
    }

    fn attach(
        attribute: &mut Attribute<&'static str>,
        source: u32,
        id: &'static str,
        flat: f32,
        factor: f32,
    ) {
        attribute.push_modifier(AttachedModifier {
            origin: ModifierOrigin {
                system: SystemId(source),
                attribute: id,
            },
            flat,
            factor,
            flag_operator: FlagOperator::AddFlag,
        });
    }

    #[test]
    fn base_value_without_modifiers() {
        let mut attribute = Attribute::new(SystemId(0), numeric("attack", 0.0, 1000.0));
        attribute.flat = 10.0;
        assert_eq!(attribute.value(), 10.0);
    }

    #[test]
    fn flat_and_factor_aggregation() {
        // (10 + 5 + 3) × (1 + 0.2 + 0.1) = 18 × 1.3 = 23.4
        let mut attribute = Attribute::new(SystemId(0), numeric("attack", 0.0, 1000.0));
        attribute.flat = 10.0;
        attach(&mut attribute, 1, "buff_a", 5.0, 0.2);
        attach(&mut attribute, 1, "buff_b", 3.0, 0.1);
        assert!((attribute.value() - 23.4).abs() < 1e-5);
    }

    #[test]
    fn value_is_deterministic_across_reads() {
        let mut attribute = Attribute::new(SystemId(0), numeric("attack", 0.0, 1000.0));
        attribute.flat = 7.0;
        attach(&mut attribute, 1, "buff", 2.0, 0.5);
        let first = attribute.value();
        assert_eq!(attribute.value(), first);
        assert_eq!(attribute.value(), first);
    }

    #[test]
    fn value_clamps_to_range() {
        let mut attribute = Attribute::new(SystemId(0), numeric("speed", 0.0, 100.0));
        attribute.flat = 50.0;
        attach(&mut attribute, 1, "haste", 500.0, 0.0);
        assert_eq!(attribute.value(), 100.0);

        attach(&mut attribute, 1, "crippled", -5000.0, 0.0);
        assert_eq!(attribute.value(), 0.0);
    }

    #[test]
    fn stack_penalty_weights_by_descending_factor() {
        // Penalties [1.0, 0.5, 0.25] weight 0.5 fully, 0.3 by half, 0.1 by a
        // quarter regardless of insertion order.
        let definition = Arc::new(AttributeDefinition {
            stack_penalties: vec![1.0, 0.5, 0.25],
            ..AttributeDefinition::new("crit", ValueRange::new(0.0, 1000.0))
        });
        let expected = 10.0 * (1.0 + 0.5 * 1.0 + 0.3 * 0.5 + 0.1 * 0.25);

        for order in [[0.5, 0.3, 0.1], [0.1, 0.3, 0.5], [0.3, 0.1, 0.5]] {
            let mut attribute = Attribute::new(SystemId(0), definition.clone());
            attribute.flat = 10.0;
            for (slot, factor) in order.iter().enumerate() {
                attach(&mut attribute, 1, ["a", "b", "c"][slot], 0.0, *factor);
            }
            assert!((attribute.value() - expected).abs() < 1e-5);
        }
    }

    #[test]
    fn stack_penalty_reuses_last_entry_past_curve_end() {
        let definition = Arc::new(AttributeDefinition {
            stack_penalties: vec![1.0, 0.5],
            ..AttributeDefinition::new("crit", ValueRange::new(0.0, 1000.0))
        });
        let mut attribute = Attribute::new(SystemId(0), definition);
        attribute.flat = 10.0;
        attach(&mut attribute, 1, "a", 0.0, 0.4);
        attach(&mut attribute, 1, "b", 0.0, 0.3);
        attach(&mut attribute, 1, "c", 0.0, 0.2);

        // 0.4×1.0 + 0.3×0.5 + 0.2×0.5
        let expected = 10.0 * (1.0 + 0.4 + 0.15 + 0.1);
        assert!((attribute.value() - expected).abs() < 1e-5);
    }

    #[test]
    fn flag_resolution_follows_attachment_order() {
        let definition = Arc::new(AttributeDefinition {
            flag_options: vec!["a".into(), "b".into(), "c".into()],
            ..AttributeDefinition::new("status", ValueRange::new(0.0, 0.0))
        });

        let mut attribute = Attribute::new(SystemId(0), definition.clone());
        attribute.flat = 0b001 as f32;
        attribute.push_modifier(AttachedModifier {
            origin: ModifierOrigin {
                system: SystemId(1),
                attribute: "add_b",
            },
            flat: 0b010 as f32,
            factor: 0.0,
            flag_operator: FlagOperator::AddFlag,
        });
        attribute.push_modifier(AttachedModifier {
            origin: ModifierOrigin {
                system: SystemId(1),
                attribute: "add_c",
            },
            flat: 0b100 as f32,
            factor: 0.0,
            flag_operator: FlagOperator::AddFlag,
        });
        assert_eq!(attribute.value() as u32, 0b111);

        // A Set in the middle resets accumulation from that point on.
        let mut reset = Attribute::new(SystemId(0), definition);
        reset.flat = 0b001 as f32;
        reset.push_modifier(AttachedModifier {
            origin: ModifierOrigin {
                system: SystemId(1),
                attribute: "add_b",
            },
            flat: 0b010 as f32,
            factor: 0.0,
            flag_operator: FlagOperator::AddFlag,
        });
        reset.push_modifier(AttachedModifier {
            origin: ModifierOrigin {
                system: SystemId(1),
                attribute: "wipe",
            },
            flat: 0.0,
            factor: 0.0,
            flag_operator: FlagOperator::Set,
        });
        reset.push_modifier(AttachedModifier {
            origin: ModifierOrigin {
                system: SystemId(1),
                attribute: "add_c",
            },
            flat: 0b100 as f32,
            factor: 0.0,
            flag_operator: FlagOperator::AddFlag,
        });
        assert_eq!(reset.value() as u32, 0b100);
    }

    #[test]
    fn capacity_requires_support() {
        let mut plain = Attribute::new(SystemId(0), numeric("attack", 0.0, 100.0));
        assert!(matches!(
            plain.capacity_add(5.0),
            Err(AttributeError::CapacityUnsupported(_))
        ));

        let pool = Arc::new(AttributeDefinition {
            has_capacity: true,
            ..AttributeDefinition::new("mana", ValueRange::new(0.0, 100.0))
        });
        let mut modifier = Attribute::new(SystemId(0), pool);
        modifier.kind = AttributeKind::Modifier;
        assert!(!modifier.supports_capacity());
    }

    #[test]
    fn capacity_bounded_by_resolved_value() {
        let pool = Arc::new(AttributeDefinition {
            has_capacity: true,
            ..AttributeDefinition::new("mana", ValueRange::new(0.0, 100.0))
        });
        let mut attribute = Attribute::new(SystemId(0), pool);
        attribute.flat = 50.0;

        assert!(attribute.capacity_add(50.0).is_ok());
        assert!(matches!(
            attribute.capacity_add(1.0),
            Err(AttributeError::CapacityOutOfBounds { .. })
        ));
        assert_eq!(attribute.capacity(), 50.0);
    }

    #[test]
    fn capacity_may_exceed_value_when_allowed() {
        let pool = Arc::new(AttributeDefinition {
            has_capacity: true,
            allow_exceed_capacity: true,
            ..AttributeDefinition::new("shield", ValueRange::new(0.0, 100.0))
        });
        let mut attribute = Attribute::new(SystemId(0), pool);
        attribute.flat = 10.0;

        let change = attribute.capacity_add(25.0).unwrap();
        assert_eq!(change.new_value, 25.0);
        assert_eq!(change.old_value, 0.0);
    }

    #[test]
    fn capacity_floor_is_min_capacity() {
        let pool = Arc::new(AttributeDefinition {
            has_capacity: true,
            min_capacity: 10.0,
            ..AttributeDefinition::new("mana", ValueRange::new(0.0, 100.0))
        });
        let mut attribute = Attribute::new(SystemId(0), pool);
        attribute.flat = 100.0;
        attribute.capacity_add(50.0).unwrap();

        assert!(attribute.capacity_remove(40.0).is_ok());
        assert!(matches!(
            attribute.capacity_remove(0.1),
            Err(AttributeError::CapacityOutOfBounds { .. })
        ));
        assert_eq!(attribute.capacity(), 10.0);
    }
}
