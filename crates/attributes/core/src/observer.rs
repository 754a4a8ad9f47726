//! Change notifications for attribute systems.
//!
//! Observers replace ad-hoc callback fields: interested parties register a
//! trait object on the [`crate::AttributeSystem`] and receive structural
//! change notifications. All methods default to no-ops so implementors only
//! override what they care about.

use crate::attribute::AttachedModifier;

/// Receives fire-and-forget notifications from one [`crate::AttributeSystem`].
///
/// Notifications are emitted after the change has been applied. Implementors
/// must not call back into the emitting system; queue work for later instead.
pub trait AttributeObserver<T>: Send + Sync {
    /// A modifier was attached to the attribute identified by `target`.
    fn modifier_attached(&self, _target: &T, _modifier: &AttachedModifier<T>) {}

    /// A modifier was detached from the attribute identified by `target`.
    ///
    /// Fires once per removed attachment, including bulk removals by source
    /// system.
    fn modifier_detached(&self, _target: &T, _modifier: &AttachedModifier<T>) {}

    /// The capacity pool of `attribute` changed from `old_value` to
    /// `new_value`.
    fn capacity_changed(&self, _attribute: &T, _new_value: f32, _old_value: f32) {}
}
