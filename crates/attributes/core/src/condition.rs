//! Declarative rules gating when a modifier may attach to a target attribute.
//!
//! A modifier attribute carries a list of [`ModifierCondition`]s, one per
//! attribute it knows how to target. Each condition is a conjunction of
//! clauses evaluated against the *target* system's current values at attach
//! time; later value changes never retroactively detach a modifier.

use crate::flags;

/// Comparison applied between a target attribute's resolved value and a
/// clause threshold.
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
pub enum ConditionOperator {
    #[default]
    Equals,
    Greater,
    Less,
    GreaterOrEquals,
    LessOrEquals,
    NotEquals,
    /// Both sides interpreted as bitmasks; passes when every threshold bit is set.
    ContainsFlag,
    /// Both sides interpreted as bitmasks; passes when some threshold bit is unset.
    NotContainsFlag,
}

impl ConditionOperator {
    /// Evaluates `current <op> threshold`.
    pub fn evaluate(&self, current: f32, threshold: f32) -> bool {
        match self {
            Self::Equals => current == threshold,
            Self::Greater => current > threshold,
            Self::Less => current < threshold,
            Self::GreaterOrEquals => current >= threshold,
            Self::LessOrEquals => current <= threshold,
            Self::NotEquals => current != threshold,
            Self::ContainsFlag => flags::has(current, threshold),
            Self::NotContainsFlag => !flags::has(current, threshold),
        }
    }
}

/// One rule inside a [`ModifierCondition`]: compare the named attribute's
/// current value against a threshold.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConditionClause<T> {
    /// Attribute on the target system whose value is inspected.
    pub attribute: T,
    pub operator: ConditionOperator,
    pub threshold: f32,
}

impl<T> ConditionClause<T> {
    pub fn new(attribute: T, operator: ConditionOperator, threshold: f32) -> Self {
        Self {
            attribute,
            operator,
            threshold,
        }
    }
}

/// Targeting rule declared by a modifier attribute.
///
/// `target_attribute` names the attribute this modifier changes when applied
/// to another system; `clauses` must all hold for the application to be
/// accepted. An empty clause list accepts unconditionally.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModifierCondition<T> {
    pub target_attribute: T,
    pub clauses: Vec<ConditionClause<T>>,
}

impl<T> ModifierCondition<T> {
    /// Creates an unconditional targeting rule for `target_attribute`.
    pub fn new(target_attribute: T) -> Self {
        Self {
            target_attribute,
            clauses: Vec::new(),
        }
    }

    /// Adds a clause (builder pattern).
    #[must_use]
    pub fn with_clause(mut self, attribute: T, operator: ConditionOperator, threshold: f32) -> Self {
        self.clauses
            .push(ConditionClause::new(attribute, operator, threshold));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn numeric_operators() {
        assert!(ConditionOperator::Equals.evaluate(5.0, 5.0));
        assert!(ConditionOperator::NotEquals.evaluate(5.0, 4.0));
        assert!(ConditionOperator::Greater.evaluate(5.0, 4.0));
        assert!(!ConditionOperator::Greater.evaluate(5.0, 5.0));
        assert!(ConditionOperator::GreaterOrEquals.evaluate(5.0, 5.0));
        assert!(ConditionOperator::Less.evaluate(3.0, 4.0));
        assert!(ConditionOperator::LessOrEquals.evaluate(4.0, 4.0));
    }

    #[test]
    fn flag_operators_use_masks() {
        assert!(ConditionOperator::ContainsFlag.evaluate(0b011 as f32, 0b010 as f32));
        assert!(!ConditionOperator::ContainsFlag.evaluate(0b001 as f32, 0b010 as f32));
        assert!(ConditionOperator::NotContainsFlag.evaluate(0b001 as f32, 0b010 as f32));
    }

    #[test]
    fn operator_names_round_trip() {
        assert_eq!(ConditionOperator::GreaterOrEquals.to_string(), "greater_or_equals");
        assert_eq!(
            ConditionOperator::from_str("contains_flag").unwrap(),
            ConditionOperator::ContainsFlag
        );
    }
}
