//! Facts - named integer counters describing world and story state.
//!
//! Conditions read facts to decide which conversation an event selects;
//! modifiers write them when a conversation starts.

mod condition;
mod modifier;

pub use condition::*;
pub use modifier::*;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for facts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FactId(pub Uuid);

impl FactId {
    /// Create a new random fact ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a nil fact ID, which never resolves to a stored fact.
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }
}

impl Default for FactId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for FactId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named integer counter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fact {
    pub id: FactId,

    pub name: String,

    /// Authored value the fact returns to on every session reset.
    pub starting_value: i32,

    /// Current runtime value.
    #[serde(default)]
    pub value: i32,
}

impl Fact {
    /// Create a new fact whose value starts at `starting_value`.
    pub fn new(name: impl Into<String>, starting_value: i32) -> Self {
        Self {
            id: FactId::new(),
            name: name.into(),
            starting_value,
            value: starting_value,
        }
    }

    /// Restore the authored starting value.
    pub fn reset(&mut self) {
        self.value = self.starting_value;
    }
}

/// Read/write access to fact values by ID.
///
/// Conditions and modifiers only see facts through this trait, so they can be
/// evaluated against the full data graph or against a small map in tests.
pub trait FactStore {
    /// Current value of a fact, or `None` if the ID does not resolve.
    fn fact_value(&self, id: FactId) -> Option<i32>;

    /// Overwrite a fact's value. Returns `false` if the ID does not resolve.
    fn set_fact_value(&mut self, id: FactId, value: i32) -> bool;
}

impl FactStore for std::collections::HashMap<FactId, Fact> {
    fn fact_value(&self, id: FactId) -> Option<i32> {
        self.get(&id).map(|fact| fact.value)
    }

    fn set_fact_value(&mut self, id: FactId, value: i32) -> bool {
        match self.get_mut(&id) {
            Some(fact) => {
                fact.value = value;
                true
            }
            None => false,
        }
    }
}
