//! Speakers - role-tagged actors that show dialogue in their own bubble.

mod registry;

pub use registry::*;

use dialogue_data::SpeakerRole;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::bubble::SpeechBubble;

/// Unique identifier for registered speakers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpeakerId(pub Uuid);

impl SpeakerId {
    /// Create a new random speaker ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SpeakerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SpeakerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub const DEFAULT_INTERRUPTED_LINE: &str = "Wait, I haven't finished";
pub const DEFAULT_CONTINUE_LINE: &str = "As I was saying,";

/// An actor that can speak lines.
#[derive(Debug, Clone)]
pub struct Speaker {
    pub id: SpeakerId,
    pub name: String,
    pub role: SpeakerRole,

    /// Set while the speaker takes part in the current conversation.
    pub in_conversation: bool,

    /// Said when the speaker's conversation is cut off mid-way.
    pub interrupted_line: String,

    /// Said when an interrupted conversation picks up again.
    pub continue_line: String,

    pub bubble: SpeechBubble,
}

impl Speaker {
    pub fn new(role: SpeakerRole) -> Self {
        Self {
            id: SpeakerId::new(),
            name: format!("{:?}", role),
            role,
            in_conversation: false,
            interrupted_line: DEFAULT_INTERRUPTED_LINE.to_string(),
            continue_line: DEFAULT_CONTINUE_LINE.to_string(),
            bubble: SpeechBubble::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_interrupted_line(mut self, line: impl Into<String>) -> Self {
        self.interrupted_line = line.into();
        self
    }

    pub fn with_continue_line(mut self, line: impl Into<String>) -> Self {
        self.continue_line = line.into();
        self
    }
}
