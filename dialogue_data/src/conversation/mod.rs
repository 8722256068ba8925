//! Conversations - ordered lines with gating conditions, fact side effects and
//! follow-up events.

mod event;

pub use event::*;

use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

use crate::facts::{Condition, FactStore, ModifyFactParam};

/// Unique identifier for conversations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub Uuid);

impl ConversationId {
    /// Create a new random conversation ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConversationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who speaks a line. Speakers register under one of these roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpeakerRole {
    Player,
    Narrator,
    Merchant,
    Npc,
    Enemy,
}

/// Conversation priority. A running conversation is only preempted by a
/// strictly higher priority.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum ConversationPriority {
    /// Background remarks, e.g. noticing an unimportant object.
    Lowest,
    Low,
    #[default]
    Medium,
    /// NPC interactions.
    High,
    /// Cutscenes.
    Highest,
}

/// A single authored line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueLine {
    pub role: SpeakerRole,
    pub text: String,
}

impl DialogueLine {
    pub fn new(role: SpeakerRole, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }
}

/// A linear conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,

    pub name: String,

    /// All must hold for the conversation to be selected.
    #[serde(default)]
    pub conditions: Vec<Condition>,

    #[serde(default)]
    pub priority: ConversationPriority,

    pub lines: Vec<DialogueLine>,

    /// Applied when the conversation starts, before any line is spoken.
    #[serde(default)]
    pub fact_modifiers: Vec<ModifyFactParam>,

    /// Requested after the conversation completes without interruption.
    #[serde(default)]
    pub chained_events: Vec<EventId>,

    /// Index of the last line spoken. `None` when idle or completed.
    #[serde(skip)]
    cursor: Option<usize>,
}

impl Conversation {
    /// Create an empty conversation with medium priority.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ConversationId::new(),
            name: name.into(),
            conditions: Vec::new(),
            priority: ConversationPriority::default(),
            lines: Vec::new(),
            fact_modifiers: Vec::new(),
            chained_events: Vec::new(),
            cursor: None,
        }
    }

    pub fn with_priority(mut self, priority: ConversationPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn with_line(mut self, role: SpeakerRole, text: impl Into<String>) -> Self {
        self.lines.push(DialogueLine::new(role, text));
        self
    }

    pub fn with_modifier(mut self, modifier: ModifyFactParam) -> Self {
        self.fact_modifiers.push(modifier);
        self
    }

    pub fn with_chained_event(mut self, event: EventId) -> Self {
        self.chained_events.push(event);
        self
    }

    /// Index of the last line spoken, if the conversation is mid-playback or
    /// was interrupted.
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Record the last line spoken. Driven by the scheduler during playback.
    pub fn set_cursor(&mut self, cursor: Option<usize>) {
        self.cursor = cursor;
    }

    pub fn reset_cursor(&mut self) {
        self.cursor = None;
    }

    pub fn last_line_index(&self) -> Option<usize> {
        self.lines.len().checked_sub(1)
    }

    /// Whether the cursor sits on the final line.
    pub fn is_at_last_line(&self) -> bool {
        self.cursor.is_some() && self.cursor == self.last_line_index()
    }

    pub fn line(&self, index: usize) -> Option<&DialogueLine> {
        self.lines.get(index)
    }

    /// AND of every condition; vacuously true when there are none.
    ///
    /// A condition over a fact that does not resolve is logged and counts as
    /// failed.
    pub fn check_all_conditions(&self, store: &impl FactStore) -> bool {
        self.conditions
            .iter()
            .all(|condition| match condition.evaluate(store) {
                Ok(result) => result,
                Err(err) => {
                    error!(conversation = %self.name, error = %err, "condition cannot be evaluated");
                    false
                }
            })
    }
}
