//! Common error infrastructure for attributes-core.
//!
//! Every failure in this crate is local and recoverable: the worst outcome is
//! a rejected modifier application or an unresolved lookup, reported through
//! return values rather than panics.

/// Severity level of an error, used for categorization and recovery strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Recoverable error - can retry with same or alternative operation.
    ///
    /// Examples: capacity change rejected by bounds
    Recoverable,

    /// Validation error - invalid input, should not retry without changes.
    ///
    /// Examples: unknown attribute ID, capacity on a flag attribute
    Validation,

    /// Internal error - unexpected state inconsistency.
    ///
    /// Examples: duplicate definition IDs passed to a system builder
    Internal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }
}

/// Common trait for all attributes-core errors.
///
/// Provides a uniform interface for error classification across the crate.
/// Implementors should use `#[derive(thiserror::Error)]` for the Display impl
/// and classify severity based on recoverability, not impact.
pub trait CoreError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    ///
    /// Useful for error categorization, metrics, and testing.
    fn error_code(&self) -> &'static str;
}

/// Errors produced by attribute systems and capacity operations.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttributeError<T: core::fmt::Debug> {
    /// No attribute with the given ID exists in the system.
    #[error("attribute {0:?} not found in system")]
    UnknownAttribute(T),

    /// Two definitions with the same ID were supplied at construction.
    #[error("duplicate attribute definition {0:?}")]
    DuplicateDefinition(T),

    /// Capacity operation on an attribute without capacity semantics.
    ///
    /// Capacity is only legal on plain (non-modifier) attributes whose
    /// definition enables it and carries no flag vocabulary.
    #[error("attribute {0:?} does not support capacity")]
    CapacityUnsupported(T),

    /// Capacity change rejected because it would leave the allowed range.
    #[error("capacity change on {attribute:?} rejected: {requested} outside [{min}, {max}]")]
    CapacityOutOfBounds {
        /// Attribute whose capacity was being changed.
        attribute: T,
        /// Capacity level the operation would have produced.
        requested: f32,
        /// Lower bound (the definition's minimum capacity).
        min: f32,
        /// Upper bound (the resolved value, or infinity when exceeding is allowed).
        max: f32,
    },
}

impl<T: core::fmt::Debug> CoreError for AttributeError<T> {
    fn severity(&self) -> ErrorSeverity {
        use AttributeError::*;
        match self {
            // Bounds rejections may succeed later once the resolved value moves
            CapacityOutOfBounds { .. } => ErrorSeverity::Recoverable,

            UnknownAttribute(_) | CapacityUnsupported(_) => ErrorSeverity::Validation,

            // Duplicate IDs mean the authored definition set itself is broken
            DuplicateDefinition(_) => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        use AttributeError::*;
        match self {
            UnknownAttribute(_) => "ATTR_UNKNOWN_ATTRIBUTE",
            DuplicateDefinition(_) => "ATTR_DUPLICATE_DEFINITION",
            CapacityUnsupported(_) => "ATTR_CAPACITY_UNSUPPORTED",
            CapacityOutOfBounds { .. } => "ATTR_CAPACITY_OUT_OF_BOUNDS",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_classification() {
        let err: AttributeError<&str> = AttributeError::UnknownAttribute("health");
        assert_eq!(err.severity(), ErrorSeverity::Validation);
        assert!(!err.severity().is_recoverable());

        let err: AttributeError<&str> = AttributeError::CapacityOutOfBounds {
            attribute: "mana",
            requested: 120.0,
            min: 0.0,
            max: 100.0,
        };
        assert_eq!(err.severity(), ErrorSeverity::Recoverable);
        assert_eq!(err.error_code(), "ATTR_CAPACITY_OUT_OF_BOUNDS");
    }
}
