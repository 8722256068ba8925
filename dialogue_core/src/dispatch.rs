//! Dialogue event dispatch - resolve a triggered event to one conversation.

use dialogue_data::{ConversationId, DataError, DialogueData, EventId, Reference};
use tracing::{error, trace, warn};

/// Pick the first conversation of `event`, in declared order, whose
/// conditions all hold.
///
/// Returns `None` when nothing qualifies. A missing event or a candidate that
/// does not resolve is logged and skipped.
pub fn trigger_event(data: &DialogueData, event: EventId) -> Option<ConversationId> {
    let Some(dialogue_event) = data.event(event) else {
        error!(error = %DataError::MissingReference(Reference::Event(event)), "triggering missing event");
        return None;
    };

    if dialogue_event.conversations.is_empty() {
        warn!(event = %dialogue_event.name, "triggering event with no conversations");
        return None;
    }

    for &candidate in &dialogue_event.conversations {
        let Some(conversation) = data.conversation(candidate) else {
            error!(
                event = %dialogue_event.name,
                error = %DataError::MissingReference(Reference::Conversation(candidate)),
                "skipping candidate conversation"
            );
            continue;
        };

        if conversation.check_all_conditions(data) {
            trace!(event = %dialogue_event.name, conversation = %conversation.name, "event resolved");
            return Some(candidate);
        }
    }

    trace!(event = %dialogue_event.name, "no conversation qualifies");
    None
}
