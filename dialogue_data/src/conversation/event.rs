//! Dialogue events - ordered candidate lists resolved to a single conversation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ConversationId;

/// Unique identifier for dialogue events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub Uuid);

impl EventId {
    /// Create a new random event ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Something that happened in the scene and may start a conversation.
///
/// Candidates are tried in declared order and the first whose conditions pass
/// wins; priority plays no part in the choice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueEvent {
    pub id: EventId,
    pub name: String,
    #[serde(default)]
    pub conversations: Vec<ConversationId>,
}

impl DialogueEvent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: EventId::new(),
            name: name.into(),
            conversations: Vec::new(),
        }
    }

    pub fn with_conversation(mut self, conversation: ConversationId) -> Self {
        self.conversations.push(conversation);
        self
    }

    pub fn with_conversations(
        mut self,
        conversations: impl IntoIterator<Item = ConversationId>,
    ) -> Self {
        self.conversations.extend(conversations);
        self
    }
}
