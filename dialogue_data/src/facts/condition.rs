//! Conditions - comparison predicates over a single fact.

use serde::{Deserialize, Serialize};

use super::{FactId, FactStore};
use crate::error::{DataError, Reference};

/// Comparison applied between a fact's value and a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionOp {
    Equal,
    NotEqual,
    Greater,
    Less,
    GreaterOrEqual,
    LessOrEqual,
}

impl ConditionOp {
    /// Compare `value` against `threshold`.
    pub fn compare(self, value: i32, threshold: i32) -> bool {
        match self {
            ConditionOp::Equal => value == threshold,
            ConditionOp::NotEqual => value != threshold,
            ConditionOp::Greater => value > threshold,
            ConditionOp::Less => value < threshold,
            ConditionOp::GreaterOrEqual => value >= threshold,
            ConditionOp::LessOrEqual => value <= threshold,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            ConditionOp::Equal => "==",
            ConditionOp::NotEqual => "!=",
            ConditionOp::Greater => ">",
            ConditionOp::Less => "<",
            ConditionOp::GreaterOrEqual => ">=",
            ConditionOp::LessOrEqual => "<=",
        }
    }
}

/// `fact <op> threshold`, gating whether a conversation may be selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub fact: FactId,
    pub op: ConditionOp,
    pub threshold: i32,
}

impl Condition {
    pub fn new(fact: FactId, op: ConditionOp, threshold: i32) -> Self {
        Self { fact, op, threshold }
    }

    /// Evaluate the condition against the current fact value.
    ///
    /// Never mutates the store. Fails only when the fact does not resolve.
    pub fn evaluate(&self, store: &impl FactStore) -> Result<bool, DataError> {
        let value = store
            .fact_value(self.fact)
            .ok_or(DataError::MissingReference(Reference::Fact(self.fact)))?;
        Ok(self.op.compare(value, self.threshold))
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.fact, self.op.symbol(), self.threshold)
    }
}
