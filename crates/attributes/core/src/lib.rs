//! Deterministic attribute/modifier resolution for RPG-style stats.
//!
//! `attributes-core` models layered stat modification as pure computation:
//! authored [`AttributeDefinition`]s describe each attribute kind (range,
//! capacity rules, flag vocabulary, stack-penalty curve), an
//! [`AttributeSystem`] holds one live [`Attribute`] per definition for one
//! entity, and modifiers travel between systems gated by declarative
//! [`ModifierCondition`]s. Reading a value aggregates the current attachment
//! set on demand; nothing is cached between reads.
//!
//! The crate is synchronous and single-threaded by design: callers serialize
//! access per system, and the only data shared across systems are the
//! immutable definitions behind [`std::sync::Arc`].
pub mod attribute;
pub mod condition;
pub mod definition;
pub mod error;
pub mod flags;
pub mod observer;
pub mod system;

pub use attribute::{
    AttachedModifier, Attribute, AttributeKind, CapacityChange, FlagOperator, ModifierOrigin,
};
pub use condition::{ConditionClause, ConditionOperator, ModifierCondition};
pub use definition::{AttributeDefinition, ValueRange};
pub use error::{AttributeError, CoreError, ErrorSeverity};
pub use observer::AttributeObserver;
pub use system::{AttributeSystem, SystemId};

/// Marker bound for attribute identifier types.
///
/// Identifiers are compared, hashed for the lookup index, cloned into
/// attachment handles, and debug-printed in diagnostics. Any enum or string
/// type with the usual derives qualifies; the blanket impl covers them all.
pub trait AttributeId: Clone + Eq + std::hash::Hash + std::fmt::Debug {}

impl<T: Clone + Eq + std::hash::Hash + std::fmt::Debug> AttributeId for T {}
