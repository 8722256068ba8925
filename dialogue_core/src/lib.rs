//! # Dialogue Core
//!
//! The runtime half of the dialogue system. It selects conversations from
//! triggered events, plays them back line by line through each speaker's
//! speech bubble, and preempts or resumes them by priority. A separate
//! resolver decides which nearby interaction prompt is active.
//!
//! ## Core Components
//!
//! - **scheduler**: The session context and conversation state machine
//! - **bubble**: Per-speaker animation queue for show, close and text reveal
//! - **speaker**: Speakers and the role-keyed registry
//! - **dispatch**: First-match selection of a conversation for an event
//! - **interaction**: Priority and proximity resolution of interaction prompts
//! - **settings**: Pacing and animation configuration, loadable from TOML
//!
//! ## Driving the system
//!
//! Everything is single threaded and cooperative. The host calls
//! [`DialogueSystem::tick`] once per frame; every wait (character reveal,
//! reading time, bubble animations) is an explicit state resumed by a later
//! tick.

pub mod bubble;
pub mod dispatch;
pub mod error;
pub mod interaction;
pub mod scheduler;
pub mod settings;
pub mod speaker;

pub use bubble::*;
pub use dispatch::*;
pub use error::*;
pub use interaction::*;
pub use scheduler::*;
pub use settings::*;
pub use speaker::*;
