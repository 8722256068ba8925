//! Interaction options - things the player can interact with when near.

use dialogue_data::EventId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for interaction options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OptionId(pub Uuid);

impl OptionId {
    /// Create a new random option ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OptionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for OptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A point in the 2D world.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_squared(self, other: Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

/// How strongly an option claims the prompt. Mirrors conversation priority.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum InteractionPriority {
    /// Background details nobody has to notice
    Lowest,
    Low,
    #[default]
    Medium,
    /// NPC interactions
    High,
    /// Cutscenes
    Highest,
}

impl InteractionPriority {
    pub const COUNT: usize = 5;

    /// Highest first.
    pub const DESCENDING: [InteractionPriority; Self::COUNT] = [
        InteractionPriority::Highest,
        InteractionPriority::High,
        InteractionPriority::Medium,
        InteractionPriority::Low,
        InteractionPriority::Lowest,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// What selecting an option does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptionKind {
    /// Trigger a dialogue event.
    Dialogue { event: EventId },
    /// Fire once and disappear.
    Simple,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionOption {
    pub id: OptionId,
    pub kind: OptionKind,
    pub priority: InteractionPriority,
    pub position: Position,

    /// Shown instead of the configured prompt when set.
    pub prompt_label: Option<String>,
}

impl InteractionOption {
    pub fn new(kind: OptionKind) -> Self {
        Self {
            id: OptionId::new(),
            kind,
            priority: InteractionPriority::default(),
            position: Position::default(),
            prompt_label: None,
        }
    }

    pub fn dialogue(event: EventId) -> Self {
        Self::new(OptionKind::Dialogue { event })
    }

    pub fn simple() -> Self {
        Self::new(OptionKind::Simple)
    }

    pub fn with_priority(mut self, priority: InteractionPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn at(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    pub fn with_prompt_label(mut self, label: impl Into<String>) -> Self {
        self.prompt_label = Some(label.into());
        self
    }
}
