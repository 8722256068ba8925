//! Error types for the dialogue data graph.

use thiserror::Error;

use crate::conversation::{ConversationId, EventId};
use crate::facts::{FactId, ModifyOp};

/// A reference from one part of the graph to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reference {
    Fact(FactId),
    Event(EventId),
    Conversation(ConversationId),
}

impl std::fmt::Display for Reference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Reference::Fact(id) => write!(f, "fact {}", id),
            Reference::Event(id) => write!(f, "event {}", id),
            Reference::Conversation(id) => write!(f, "conversation {}", id),
        }
    }
}

/// Errors raised while reading or mutating the data graph.
#[derive(Debug, Error)]
pub enum DataError {
    /// A reference points at nothing in the graph.
    #[error("missing reference: {0}")]
    MissingReference(Reference),

    /// A fact modification could not be computed (division by zero or overflow).
    #[error("arithmetic fault modifying fact {fact}: {op:?} by {amount}")]
    ArithmeticFault {
        fact: FactId,
        op: ModifyOp,
        amount: i32,
    },

    /// A group index outside the graph.
    #[error("unknown group index {0}")]
    UnknownGroup(usize),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
