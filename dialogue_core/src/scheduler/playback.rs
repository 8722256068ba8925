//! Line-by-line playback of the current conversation.

use dialogue_data::{ConversationId, DataError, EventId, Reference};
use tracing::{debug, error, trace};

use super::Stage;
use crate::error::DialogueError;
use crate::speaker::SpeakerId;

/// What a speaker is about to say.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Utterance {
    /// The authored line at this index.
    Line(usize),
    /// The speaker's continuing phrase, said when an interrupted
    /// conversation picks up again.
    Continue,
}

/// Suspension points of playback. Each one is resumed by a later tick.
#[derive(Debug, Clone, PartialEq)]
enum Step {
    NextLine,
    /// Waiting for the speaker's bubble to drain before speaking.
    AwaitBubble { speaker: SpeakerId, utterance: Utterance },
    /// Same speaker twice in a row: waiting for their bubble to close.
    AwaitClose { speaker: SpeakerId, utterance: Utterance },
    /// Waiting for the line to be fully revealed.
    Revealing { speaker: SpeakerId, delay: f32 },
    /// Leaving the line up to be read.
    Reading { remaining: f32 },
}

pub(crate) enum PlaybackStatus {
    Pending,
    /// Every line has been played; the cursor is back to idle.
    Finished { chained: Vec<EventId> },
}

#[derive(Debug, Clone)]
pub(crate) struct Playback {
    conversation: ConversationId,
    participants: Vec<SpeakerId>,
    previous: Option<SpeakerId>,
    step: Step,
}

impl Playback {
    /// Resolve the participants, flag them as in conversation and pick the
    /// first step. A conversation with a recorded cursor resumes after it.
    pub(crate) fn begin(conversation: ConversationId, stage: &mut Stage<'_>) -> Self {
        let mut participants = Vec::new();
        let mut step = Step::NextLine;

        if let Some(current) = stage.data.conversation(conversation) {
            for line in &current.lines {
                match stage.speakers.find_speaker(line.role, None) {
                    Some(id) if !participants.contains(&id) => participants.push(id),
                    Some(_) => {}
                    None => error!(
                        conversation = %current.name,
                        error = %DialogueError::MissingSpeaker { role: line.role },
                        "line will be skipped"
                    ),
                }
            }

            if let Some(line) = current.cursor().and_then(|index| current.line(index)) {
                match stage.speakers.find_speaker(line.role, Some(&participants)) {
                    Some(speaker) => {
                        debug!(conversation = %current.name, cursor = ?current.cursor(), "resuming conversation");
                        step = Step::AwaitBubble {
                            speaker,
                            utterance: Utterance::Continue,
                        };
                    }
                    None => error!(
                        conversation = %current.name,
                        role = ?line.role,
                        "cannot say the continuing phrase"
                    ),
                }
            }
        }

        let player = stage.speakers.player();
        for id in participants.iter().copied().chain(player) {
            if let Some(speaker) = stage.speakers.get_mut(id) {
                speaker.in_conversation = true;
            }
        }

        Self {
            conversation,
            participants,
            previous: None,
            step,
        }
    }

    pub(crate) fn conversation(&self) -> ConversationId {
        self.conversation
    }

    /// Run steps until one has to wait. `budget` is the time this tick has
    /// left for timed waits; the first timed wait consumes all of it.
    pub(crate) fn advance(&mut self, budget: &mut f32, stage: &mut Stage<'_>) -> PlaybackStatus {
        loop {
            match self.step {
                Step::NextLine => {
                    if let Some(chained) = self.next_line(stage) {
                        return PlaybackStatus::Finished { chained };
                    }
                }
                Step::AwaitBubble { speaker, utterance } => {
                    if stage.speakers.is_animating(speaker) {
                        return PlaybackStatus::Pending;
                    }
                    let repeat = matches!(utterance, Utterance::Line(_)) && self.previous == Some(speaker);
                    let closing = repeat
                        && stage
                            .speakers
                            .get_mut(speaker)
                            .is_some_and(|s| s.bubble.close());
                    if closing {
                        self.step = Step::AwaitClose { speaker, utterance };
                    } else {
                        self.say(speaker, utterance, stage);
                    }
                }
                Step::AwaitClose { speaker, utterance } => {
                    if stage.speakers.is_animating(speaker) {
                        return PlaybackStatus::Pending;
                    }
                    self.say(speaker, utterance, stage);
                }
                Step::Revealing { speaker, delay } => {
                    if stage.speakers.is_animating(speaker) {
                        return PlaybackStatus::Pending;
                    }
                    self.step = Step::Reading { remaining: delay };
                }
                Step::Reading { ref mut remaining } => {
                    *remaining -= std::mem::take(budget);
                    if *remaining > 0.0 {
                        return PlaybackStatus::Pending;
                    }
                    self.step = Step::NextLine;
                }
            }
        }
    }

    /// Pick the line after the cursor, or finish the conversation.
    fn next_line(&mut self, stage: &mut Stage<'_>) -> Option<Vec<EventId>> {
        let Some(conversation) = stage.data.conversation_mut(self.conversation) else {
            error!(
                error = %DataError::MissingReference(Reference::Conversation(self.conversation)),
                "conversation vanished during playback"
            );
            self.release(stage);
            return Some(Vec::new());
        };

        let index = conversation.cursor().map_or(0, |cursor| cursor + 1);
        let Some(line) = conversation.line(index) else {
            conversation.reset_cursor();
            debug!(conversation = %conversation.name, "all lines played");
            let chained = conversation.chained_events.clone();
            self.release(stage);
            return Some(chained);
        };

        match stage.speakers.find_speaker(line.role, Some(&self.participants)) {
            Some(speaker) => {
                self.step = Step::AwaitBubble {
                    speaker,
                    utterance: Utterance::Line(index),
                };
            }
            None => {
                error!(
                    conversation = %conversation.name,
                    index,
                    error = %DialogueError::MissingSpeaker { role: line.role },
                    "skipping line"
                );
                conversation.set_cursor(Some(index));
            }
        }
        None
    }

    fn say(&mut self, speaker: SpeakerId, utterance: Utterance, stage: &mut Stage<'_>) {
        let text = match utterance {
            Utterance::Line(index) => {
                let Some(conversation) = stage.data.conversation_mut(self.conversation) else {
                    self.step = Step::NextLine;
                    return;
                };
                conversation.set_cursor(Some(index));
                conversation.line(index).map(|line| line.text.clone())
            }
            Utterance::Continue => stage.speakers.get(speaker).map(|s| s.continue_line.clone()),
        };

        let Some(bubble) = stage.speakers.get_mut(speaker).map(|s| &mut s.bubble) else {
            error!(%speaker, "speaker left before it could speak");
            self.step = Step::NextLine;
            return;
        };
        let text = text.unwrap_or_default();

        trace!(%speaker, ?utterance, text = %text, "saying line");
        bubble.say_line(&text);
        self.previous = Some(speaker);
        self.step = Step::Revealing {
            speaker,
            delay: stage.settings.pacing_delay(&text),
        };
    }

    /// Clear the in-conversation flag on everyone this playback marked.
    fn release(&self, stage: &mut Stage<'_>) {
        let player = stage.speakers.player();
        for id in self.participants.iter().copied().chain(player) {
            if let Some(speaker) = stage.speakers.get_mut(id) {
                speaker.in_conversation = false;
            }
        }
    }
}
