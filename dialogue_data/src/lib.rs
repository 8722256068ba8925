//! # Dialogue Data
//!
//! The authored side of the dialogue system: world-state facts, the conditions
//! that gate conversations, the modifiers conversations apply, and the
//! group hierarchy that owns them. This crate holds no playback logic; the only
//! runtime state it carries is each fact's value and each conversation's
//! resumption cursor.
//!
//! ## Core Components
//!
//! - **facts**: Named integer counters, comparison conditions and arithmetic modifiers
//! - **conversation**: Conversations, their lines and the events that select them
//! - **graph**: The group hierarchy, session reset, path lookups and validation

pub mod conversation;
pub mod error;
pub mod facts;
pub mod graph;

pub use conversation::*;
pub use error::*;
pub use facts::*;
pub use graph::*;
