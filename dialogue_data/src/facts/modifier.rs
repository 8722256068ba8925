//! Fact modifiers - arithmetic mutations applied when a conversation starts.

use serde::{Deserialize, Serialize};
use tracing::{error, trace};

use super::{FactId, FactStore};
use crate::error::{DataError, Reference};

/// Arithmetic applied to a fact's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModifyOp {
    Set,
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl ModifyOp {
    /// Compute the new value, or `None` when the operation faults.
    ///
    /// Add, subtract and multiply wrap on overflow. Division faults on a zero
    /// divisor and on `i32::MIN / -1`.
    pub fn apply(self, value: i32, amount: i32) -> Option<i32> {
        match self {
            ModifyOp::Set => Some(amount),
            ModifyOp::Add => Some(value.wrapping_add(amount)),
            ModifyOp::Subtract => Some(value.wrapping_sub(amount)),
            ModifyOp::Multiply => Some(value.wrapping_mul(amount)),
            ModifyOp::Divide => value.checked_div(amount),
        }
    }
}

/// A single `fact <op>= amount` mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifyFactParam {
    pub fact: FactId,
    pub op: ModifyOp,
    pub amount: i32,
}

impl ModifyFactParam {
    pub fn new(fact: FactId, op: ModifyOp, amount: i32) -> Self {
        Self { fact, op, amount }
    }

    /// Apply the modification to the store.
    pub fn apply(&self, store: &mut impl FactStore) -> Result<(), DataError> {
        let value = store
            .fact_value(self.fact)
            .ok_or(DataError::MissingReference(Reference::Fact(self.fact)))?;

        let new_value = self
            .op
            .apply(value, self.amount)
            .ok_or(DataError::ArithmeticFault {
                fact: self.fact,
                op: self.op,
                amount: self.amount,
            })?;

        store.set_fact_value(self.fact, new_value);
        trace!(fact = %self.fact, old = value, new = new_value, "fact modified");
        Ok(())
    }
}

/// Apply modifiers in list order.
///
/// A modifier whose fact does not resolve is logged and skipped. An arithmetic
/// fault stops the batch and is returned; modifications applied before it stay
/// applied.
pub fn modify_facts<'a>(
    store: &mut impl FactStore,
    modifiers: impl IntoIterator<Item = &'a ModifyFactParam>,
) -> Result<(), DataError> {
    for modifier in modifiers {
        match modifier.apply(store) {
            Ok(()) => {}
            Err(err @ DataError::MissingReference(_)) => {
                error!(error = %err, "skipping fact modifier");
            }
            Err(err) => return Err(err),
        }
    }
    Ok(())
}
