//! Closing down the current conversation.

use dialogue_data::{ConversationId, EventId};
use tracing::{debug, error};

use super::Stage;
use crate::error::DialogueError;
use crate::speaker::SpeakerRegistry;

/// Why the conversation is being torn down.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TeardownReason {
    /// Playback ran out of lines. The chained events are requested once the
    /// teardown finishes.
    Completed { chained: Vec<EventId> },
    /// Cut short, optionally to make room for `next`.
    Interrupted { next: Option<ConversationId> },
}

#[derive(Debug, Clone, PartialEq)]
enum TeardownStep {
    /// Joining on every bubble's close animation.
    ClosingBubbles,
    /// Pause before anything else may start.
    BetweenConversations { remaining: f32 },
}

#[derive(Debug, Clone)]
pub(crate) struct Teardown {
    conversation: ConversationId,
    reason: TeardownReason,
    step: TeardownStep,
}

impl Teardown {
    /// Release every speaker and start closing every bubble.
    pub(crate) fn begin(conversation: ConversationId, reason: TeardownReason, speakers: &mut SpeakerRegistry) -> Self {
        debug!(%conversation, ?reason, "tearing down conversation");
        for speaker in speakers.iter_mut() {
            speaker.in_conversation = false;
            speaker.bubble.cancel_all();
            speaker.bubble.close();
        }
        Self {
            conversation,
            reason,
            step: TeardownStep::ClosingBubbles,
        }
    }

    pub(crate) fn conversation(&self) -> ConversationId {
        self.conversation
    }

    pub(crate) fn reason(&self) -> &TeardownReason {
        &self.reason
    }

    pub(crate) fn into_reason(self) -> TeardownReason {
        self.reason
    }

    /// Returns `Some(interrupted)` once the teardown is over.
    pub(crate) fn advance(&mut self, budget: &mut f32, stage: &mut Stage<'_>) -> Option<bool> {
        loop {
            match self.step {
                TeardownStep::ClosingBubbles => {
                    if stage.speakers.any_animating() {
                        return None;
                    }

                    let cut_line = stage
                        .data
                        .conversation(self.conversation)
                        .and_then(|c| c.cursor().and_then(|index| c.line(index)))
                        .map(|line| line.role);

                    let Some(role) = cut_line else {
                        self.step = TeardownStep::BetweenConversations {
                            remaining: stage.settings.time_between_conversations,
                        };
                        continue;
                    };

                    // Not awaited: the next conversation waits on this bubble if it needs it.
                    match stage
                        .speakers
                        .find_speaker(role, None)
                        .and_then(|id| stage.speakers.get_mut(id))
                    {
                        Some(speaker) => {
                            let phrase = speaker.interrupted_line.clone();
                            speaker.bubble.say_line(&phrase);
                            speaker.bubble.close();
                        }
                        None => error!(
                            conversation = %self.conversation,
                            error = %DialogueError::MissingSpeaker { role },
                            "cannot say the interrupted phrase"
                        ),
                    }
                    return Some(true);
                }
                TeardownStep::BetweenConversations { ref mut remaining } => {
                    *remaining -= std::mem::take(budget);
                    return if *remaining > 0.0 { None } else { Some(false) };
                }
            }
        }
    }
}
