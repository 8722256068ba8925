//! Runtime error types.

use dialogue_data::{DataError, SpeakerRole};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DialogueError {
    #[error(transparent)]
    Data(#[from] DataError),

    /// No registered speaker has the role a line needs.
    #[error("no registered speaker for role {role:?}")]
    MissingSpeaker { role: SpeakerRole },

    #[error("invalid settings: {0}")]
    Settings(#[from] toml::de::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
