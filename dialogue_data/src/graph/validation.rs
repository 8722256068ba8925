//! Data integrity checks over the authored graph.
//!
//! Validation is diagnostic only: findings are logged and returned, the graph
//! is never modified and runtime behaviour is unaffected.

use thiserror::Error;
use tracing::{debug, warn};

use super::DialogueData;

/// A data-integrity finding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataWarning {
    #[error("group name is empty (group index {0})")]
    EmptyGroupName(usize),

    #[error("fact name is empty in group {group}")]
    EmptyFactName { group: String },

    #[error("dialogue event name is empty in group {group}")]
    EmptyEventName { group: String },

    #[error("conversation name is empty in group {group}")]
    EmptyConversationName { group: String },

    #[error("dialogue event has no conversations: {path}")]
    EventWithoutConversations { path: String },

    #[error("dialogue event references a missing conversation: {path}")]
    DanglingConversation { path: String },

    #[error("conversation has no lines: {path}")]
    ConversationWithoutLines { path: String },

    #[error("condition references a missing fact: {path}")]
    DanglingConditionFact { path: String },

    #[error("fact modifier references a missing fact: {path}")]
    DanglingModifierFact { path: String },

    #[error("chained event is missing: {path}")]
    DanglingChainedEvent { path: String },
}

impl DialogueData {
    /// Scan the graph for empty names, empty lists and dangling references.
    pub fn validate(&self) -> Vec<DataWarning> {
        debug!("validating dialogue data");
        let mut warnings = Vec::new();

        for (index, group) in self.groups.iter().enumerate() {
            if group.name.is_empty() {
                warnings.push(DataWarning::EmptyGroupName(index));
            }

            for fact in &group.facts {
                if fact.name.is_empty() {
                    warnings.push(DataWarning::EmptyFactName {
                        group: group.name.clone(),
                    });
                }
            }

            for event in &group.events {
                let path = format!("{}/{}", group.name, event.name);
                if event.name.is_empty() {
                    warnings.push(DataWarning::EmptyEventName {
                        group: group.name.clone(),
                    });
                }
                if event.conversations.is_empty() {
                    warnings.push(DataWarning::EventWithoutConversations { path: path.clone() });
                }
                if event
                    .conversations
                    .iter()
                    .any(|id| self.conversation(*id).is_none())
                {
                    warnings.push(DataWarning::DanglingConversation { path });
                }
            }

            for conversation in &group.conversations {
                let path = format!("{}/{}", group.name, conversation.name);
                if conversation.name.is_empty() {
                    warnings.push(DataWarning::EmptyConversationName {
                        group: group.name.clone(),
                    });
                }
                if conversation.lines.is_empty() {
                    warnings.push(DataWarning::ConversationWithoutLines { path: path.clone() });
                }
                if conversation
                    .conditions
                    .iter()
                    .any(|c| self.fact(c.fact).is_none())
                {
                    warnings.push(DataWarning::DanglingConditionFact { path: path.clone() });
                }
                if conversation
                    .fact_modifiers
                    .iter()
                    .any(|m| self.fact(m.fact).is_none())
                {
                    warnings.push(DataWarning::DanglingModifierFact { path: path.clone() });
                }
                if conversation
                    .chained_events
                    .iter()
                    .any(|e| self.event(*e).is_none())
                {
                    warnings.push(DataWarning::DanglingChainedEvent { path });
                }
            }
        }

        for warning in &warnings {
            warn!(%warning, "dialogue data integrity");
        }
        debug!(count = warnings.len(), "finished validating dialogue data");

        warnings
    }
}
