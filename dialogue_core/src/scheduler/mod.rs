//! Conversation scheduler - the session context that starts, plays,
//! preempts and ends conversations.
//!
//! At most one conversation is current. A triggered event resolves to a
//! candidate through [`trigger_event`]; the candidate starts if nothing is
//! running, preempts the current conversation if its priority is strictly
//! higher, and is dropped otherwise. Nothing is queued.
//!
//! Every wait is an explicit state advanced by [`DialogueSystem::tick`]:
//! 1. **Playing**: wait for the speaker's bubble, reveal the line, leave it up
//!    for the pacing delay, move on
//! 2. **Tearing down**: close every bubble and join on them, then either say
//!    the interrupted phrase or pause between conversations
//! 3. **Idle**: nothing is current

mod observers;
mod playback;
mod teardown;

pub use observers::*;

use dialogue_data::{
    ConversationId, DataError, DataWarning, DialogueData, EventId, ModifyFactParam, Reference,
};
use std::mem;
use tracing::{debug, error, instrument};

use crate::dispatch::trigger_event;
use crate::error::DialogueError;
use crate::settings::DialogueSettings;
use crate::speaker::{Speaker, SpeakerId, SpeakerRegistry};
use playback::{Playback, PlaybackStatus};
use teardown::{Teardown, TeardownReason};

/// Publicly observable scheduler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// No current conversation.
    Idle,
    /// The current conversation is playing, or winding down after its last line.
    Running,
    /// The current conversation is being cut short.
    Interrupting,
}

#[derive(Debug, Clone)]
enum Phase {
    Idle,
    Playing(Playback),
    TearingDown(Teardown),
}

/// Borrowed pieces of the system a playback step works on.
pub(crate) struct Stage<'a> {
    pub data: &'a mut DialogueData,
    pub speakers: &'a mut SpeakerRegistry,
    pub settings: &'a DialogueSettings,
}

/// The dialogue session: authored data, speakers and the conversation state
/// machine. Construct one per session and pass it to whatever needs it.
#[derive(Debug)]
pub struct DialogueSystem {
    data: DialogueData,
    settings: DialogueSettings,
    speakers: SpeakerRegistry,
    phase: Phase,
    current: Option<ConversationId>,
    observers: ConversationObservers,
}

impl DialogueSystem {
    /// Start a session. Play data is reset.
    pub fn new(mut data: DialogueData, settings: DialogueSettings) -> Self {
        data.reset_play_data();
        Self {
            data,
            settings,
            speakers: SpeakerRegistry::new(),
            phase: Phase::Idle,
            current: None,
            observers: ConversationObservers::new(),
        }
    }

    pub fn data(&self) -> &DialogueData {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut DialogueData {
        &mut self.data
    }

    pub fn settings(&self) -> &DialogueSettings {
        &self.settings
    }

    pub fn speakers(&self) -> &SpeakerRegistry {
        &self.speakers
    }

    pub fn speakers_mut(&mut self) -> &mut SpeakerRegistry {
        &mut self.speakers
    }

    pub fn add_speaker(&mut self, speaker: Speaker) -> SpeakerId {
        self.speakers.add(speaker)
    }

    pub fn remove_speaker(&mut self, id: SpeakerId) -> Option<Speaker> {
        self.speakers.remove(id)
    }

    pub fn current_conversation(&self) -> Option<ConversationId> {
        self.current
    }

    pub fn in_conversation(&self) -> bool {
        self.current.is_some()
    }

    pub fn state(&self) -> SchedulerState {
        match &self.phase {
            Phase::Idle => SchedulerState::Idle,
            Phase::Playing(_) => SchedulerState::Running,
            Phase::TearingDown(teardown) => match teardown.reason() {
                TeardownReason::Completed { .. } => SchedulerState::Running,
                TeardownReason::Interrupted { .. } => SchedulerState::Interrupting,
            },
        }
    }

    pub fn subscribe(&mut self, observer: impl FnMut(&ConversationNotification) + 'static) -> SubscriptionId {
        self.observers.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Apply fact modifiers in order. An arithmetic fault stops the batch and
    /// leaves earlier modifications applied.
    pub fn modify_facts(&mut self, modifiers: &[ModifyFactParam]) -> Result<(), DialogueError> {
        Ok(self.data.modify_facts(modifiers)?)
    }

    pub fn reset_play_data(&mut self) {
        self.data.reset_play_data();
    }

    pub fn validate(&self) -> Vec<DataWarning> {
        self.data.validate()
    }

    /// Trigger `event` and start, preempt with, or drop its conversation.
    ///
    /// Returns the conversation that was accepted. A preempting conversation
    /// is returned straight away but only becomes current once the teardown of
    /// the one it replaces has finished. While such a successor is pending, a
    /// later candidate has to outrank it as well.
    #[instrument(skip(self))]
    pub fn request_conversation(&mut self, event: EventId) -> Result<Option<ConversationId>, DialogueError> {
        let candidate = trigger_event(&self.data, event);

        let Some(current) = self.current else {
            let Some(candidate) = candidate else {
                return Ok(None);
            };
            let started = self.start_conversation(candidate)?;
            return Ok(started.then_some(candidate));
        };

        let Some(candidate) = candidate else {
            debug!("no candidate, current conversation continues");
            return Ok(None);
        };

        let pending = self.pending_next().and_then(|next| self.data.conversation(next));
        let current_priority = self
            .data
            .conversation(current)
            .map(|c| pending.map_or(c.priority, |p| c.priority.max(p.priority)));
        let candidate_priority = self.data.conversation(candidate).map(|c| c.priority);
        match (current_priority, candidate_priority) {
            (Some(current_priority), Some(candidate_priority)) if candidate_priority > current_priority => {
                debug!(%candidate, ?candidate_priority, ?current_priority, "preempting current conversation");
                self.interrupt_conversation(Some(candidate))?;
                Ok(Some(candidate))
            }
            _ => {
                debug!(%candidate, ?candidate_priority, ?current_priority, "candidate rejected");
                Ok(None)
            }
        }
    }

    /// Cut the current conversation short, then start `next` if given.
    ///
    /// Every animation on every registered speaker is cancelled. A
    /// conversation cut at its last line counts as completed. With nothing
    /// current, `next` starts right away.
    #[instrument(skip(self))]
    pub fn interrupt_conversation(&mut self, next: Option<ConversationId>) -> Result<(), DialogueError> {
        let Some(current) = self.current else {
            if let Some(next) = next {
                self.start_conversation(next)?;
            }
            return Ok(());
        };

        self.speakers.cancel_all_animations();
        if let Some(conversation) = self.data.conversation_mut(current) {
            if conversation.is_at_last_line() {
                conversation.reset_cursor();
            }
        }

        self.phase = Phase::TearingDown(Teardown::begin(
            current,
            TeardownReason::Interrupted { next },
            &mut self.speakers,
        ));
        Ok(())
    }

    /// A speaker walked out of the area that hosts `conversation`. Interrupts
    /// it when it is current and the speaker is taking part.
    pub fn speaker_left_area(&mut self, speaker: SpeakerId, conversation: ConversationId) -> Result<bool, DialogueError> {
        if self.current != Some(conversation) {
            return Ok(false);
        }
        if !self.speakers.get(speaker).is_some_and(|s| s.in_conversation) {
            return Ok(false);
        }
        debug!(%speaker, %conversation, "speaker left the conversation area");
        self.interrupt_conversation(None)?;
        Ok(true)
    }

    /// Advance bubbles and the conversation by `dt` seconds.
    pub fn tick(&mut self, dt: f32) -> Result<(), DialogueError> {
        self.speakers.tick(dt, &self.settings);

        let mut budget = dt;
        loop {
            let mut stage = Stage {
                data: &mut self.data,
                speakers: &mut self.speakers,
                settings: &self.settings,
            };

            match mem::replace(&mut self.phase, Phase::Idle) {
                Phase::Idle => return Ok(()),
                Phase::Playing(mut playback) => match playback.advance(&mut budget, &mut stage) {
                    PlaybackStatus::Pending => {
                        self.phase = Phase::Playing(playback);
                        return Ok(());
                    }
                    PlaybackStatus::Finished { chained } => {
                        let teardown = Teardown::begin(
                            playback.conversation(),
                            TeardownReason::Completed { chained },
                            stage.speakers,
                        );
                        self.phase = Phase::TearingDown(teardown);
                    }
                },
                Phase::TearingDown(mut teardown) => match teardown.advance(&mut budget, &mut stage) {
                    None => {
                        self.phase = Phase::TearingDown(teardown);
                        return Ok(());
                    }
                    Some(interrupted) => return self.finish_teardown(teardown, interrupted),
                },
            }
        }
    }

    /// The conversation waiting for an interruption teardown to finish.
    fn pending_next(&self) -> Option<ConversationId> {
        match &self.phase {
            Phase::TearingDown(teardown) => match teardown.reason() {
                TeardownReason::Interrupted { next } => *next,
                TeardownReason::Completed { .. } => None,
            },
            _ => None,
        }
    }

    /// Enter playback of `conversation`. Its modifiers are applied first; a
    /// fault leaves nothing current.
    fn start_conversation(&mut self, conversation: ConversationId) -> Result<bool, DialogueError> {
        let Some(found) = self.data.conversation(conversation) else {
            error!(
                error = %DataError::MissingReference(Reference::Conversation(conversation)),
                "cannot start conversation"
            );
            return Ok(false);
        };
        debug!(conversation = %found.name, priority = ?found.priority, "starting conversation");

        let modifiers = found.fact_modifiers.clone();
        self.data.modify_facts(&modifiers)?;

        self.current = Some(conversation);
        self.observers.notify(&ConversationNotification::Started(conversation));

        let mut stage = Stage {
            data: &mut self.data,
            speakers: &mut self.speakers,
            settings: &self.settings,
        };
        self.phase = Phase::Playing(Playback::begin(conversation, &mut stage));
        Ok(true)
    }

    fn finish_teardown(&mut self, teardown: Teardown, interrupted: bool) -> Result<(), DialogueError> {
        let conversation = teardown.conversation();
        debug!(%conversation, interrupted, "conversation ended");

        self.observers.notify(&ConversationNotification::Ended {
            conversation,
            interrupted,
        });
        self.current = None;
        self.phase = Phase::Idle;

        match teardown.into_reason() {
            TeardownReason::Interrupted { next: Some(next) } => {
                self.start_conversation(next)?;
            }
            TeardownReason::Interrupted { next: None } => {}
            TeardownReason::Completed { chained } => {
                for event in chained {
                    self.request_conversation(event)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dialogue_data::{
        Condition, ConditionOp, Conversation, ConversationPriority, DialogueEvent, Fact, FactId,
        ModifyOp, SpeakerRole,
    };
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::bubble::AnimationKind;
    use crate::speaker::{DEFAULT_CONTINUE_LINE, DEFAULT_INTERRUPTED_LINE};

    const DT: f32 = 0.05;

    fn fast_settings() -> DialogueSettings {
        DialogueSettings {
            words_per_minute: 6000.0,
            min_extra_reading_time: 0.2,
            time_between_conversations: 0.2,
            appear_duration: 0.1,
            ..Default::default()
        }
    }

    fn run_until(system: &mut DialogueSystem, done: impl Fn(&DialogueSystem) -> bool) {
        for _ in 0..10_000 {
            if done(system) {
                return;
            }
            system.tick(DT).unwrap();
        }
        panic!("condition never reached");
    }

    fn cursor(system: &DialogueSystem, conversation: ConversationId) -> Option<usize> {
        system.data().conversation(conversation).unwrap().cursor()
    }

    fn record(system: &mut DialogueSystem) -> Rc<RefCell<Vec<ConversationNotification>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        system.subscribe(move |n| sink.borrow_mut().push(*n));
        log
    }

    struct Scene {
        system: DialogueSystem,
        group: usize,
        npc: SpeakerId,
        player: SpeakerId,
    }

    impl Scene {
        fn new() -> Self {
            let mut data = DialogueData::new();
            let group = data.add_group("Village");
            let mut system = DialogueSystem::new(data, fast_settings());
            let player = system.add_speaker(Speaker::new(SpeakerRole::Player));
            let npc = system.add_speaker(Speaker::new(SpeakerRole::Npc));
            Self {
                system,
                group,
                npc,
                player,
            }
        }

        fn conversation(&mut self, conversation: Conversation) -> (ConversationId, EventId) {
            let name = format!("{} event", conversation.name);
            let data = self.system.data_mut();
            let id = data.add_conversation(self.group, conversation).unwrap();
            let event = data
                .add_event(self.group, DialogueEvent::new(name).with_conversation(id))
                .unwrap();
            (id, event)
        }
    }

    fn chatter(name: &str, lines: usize) -> Conversation {
        (0..lines).fold(Conversation::new(name), |c, i| {
            let role = if i % 2 == 0 { SpeakerRole::Npc } else { SpeakerRole::Player };
            c.with_line(role, format!("{} line {}", name, i))
        })
    }

    #[test]
    fn test_end_to_end_gold() {
        let mut scene = Scene::new();
        let gold = scene.system.data_mut().add_fact(0, Fact::new("Gold", 0)).unwrap();
        let (pay, event) = scene.conversation(
            Conversation::new("Pay")
                .with_modifier(ModifyFactParam::new(gold, ModifyOp::Add, 10))
                .with_line(SpeakerRole::Npc, "Here is your gold"),
        );
        let log = record(&mut scene.system);

        assert_eq!(scene.system.request_conversation(event).unwrap(), Some(pay));
        assert_eq!(scene.system.data().fact(gold).unwrap().value, 10);
        assert!(scene.system.in_conversation());

        run_until(&mut scene.system, |s| s.state() == SchedulerState::Idle);

        assert_eq!(scene.system.data().fact(gold).unwrap().value, 10);
        assert_eq!(cursor(&scene.system, pay), None);
        assert!(!scene.system.in_conversation());
        assert_eq!(
            *log.borrow(),
            vec![
                ConversationNotification::Started(pay),
                ConversationNotification::Ended {
                    conversation: pay,
                    interrupted: false
                },
            ]
        );
    }

    #[test]
    fn test_participants_flagged() {
        let mut scene = Scene::new();
        let (_, event) = scene.conversation(
            Conversation::new("Monologue").with_line(SpeakerRole::Npc, "I talk to myself"),
        );

        scene.system.request_conversation(event).unwrap();
        let (npc, player) = (scene.npc, scene.player);
        let speakers = scene.system.speakers();
        assert!(speakers.get(npc).unwrap().in_conversation);
        assert!(speakers.get(player).unwrap().in_conversation);

        run_until(&mut scene.system, |s| s.state() == SchedulerState::Idle);
        let speakers = scene.system.speakers();
        assert!(!speakers.get(npc).unwrap().in_conversation);
        assert!(!speakers.get(player).unwrap().in_conversation);
    }

    #[test]
    fn test_preemption_by_priority() {
        let mut scene = Scene::new();
        let (chat, chat_event) = scene.conversation(chatter("Chat", 3));
        let (_, low_event) = scene.conversation(
            chatter("Mutter", 1).with_priority(ConversationPriority::Low),
        );
        let (alarm, alarm_event) = scene.conversation(
            chatter("Alarm", 1).with_priority(ConversationPriority::High),
        );
        let log = record(&mut scene.system);

        scene.system.request_conversation(chat_event).unwrap();
        run_until(&mut scene.system, |s| cursor(s, chat) == Some(0));

        assert_eq!(scene.system.request_conversation(low_event).unwrap(), None);
        assert_eq!(scene.system.current_conversation(), Some(chat));
        assert_eq!(scene.system.state(), SchedulerState::Running);

        assert_eq!(scene.system.request_conversation(alarm_event).unwrap(), Some(alarm));
        assert_eq!(scene.system.state(), SchedulerState::Interrupting);

        run_until(&mut scene.system, |s| s.current_conversation() == Some(alarm));
        assert_eq!(scene.system.state(), SchedulerState::Running);
        assert_eq!(cursor(&scene.system, chat), Some(0));
        assert_eq!(
            log.borrow()[1],
            ConversationNotification::Ended {
                conversation: chat,
                interrupted: true
            }
        );
    }

    #[test]
    fn test_equal_priority_rejected() {
        let mut scene = Scene::new();
        let (chat, chat_event) = scene.conversation(chatter("Chat", 2));
        let (_, other_event) = scene.conversation(chatter("Other", 2));

        scene.system.request_conversation(chat_event).unwrap();
        assert_eq!(scene.system.request_conversation(other_event).unwrap(), None);
        assert_eq!(scene.system.request_conversation(chat_event).unwrap(), None);
        assert_eq!(scene.system.current_conversation(), Some(chat));
    }

    #[test]
    fn test_resumes_after_interrupted_line() {
        let mut scene = Scene::new();
        let (story, event) = scene.conversation(chatter("Story", 5));
        let log = record(&mut scene.system);

        scene.system.request_conversation(event).unwrap();
        run_until(&mut scene.system, |s| cursor(s, story) == Some(2));
        scene.system.interrupt_conversation(None).unwrap();

        // Line 2 belongs to the npc, who gets cut off.
        let npc = scene.npc;
        run_until(&mut scene.system, |s| {
            s.speakers().get(npc).unwrap().bubble.text() == DEFAULT_INTERRUPTED_LINE
        });
        run_until(&mut scene.system, |s| s.state() == SchedulerState::Idle);
        assert_eq!(cursor(&scene.system, story), Some(2));
        assert_eq!(
            log.borrow()[1],
            ConversationNotification::Ended {
                conversation: story,
                interrupted: true
            }
        );

        assert_eq!(scene.system.request_conversation(event).unwrap(), Some(story));
        run_until(&mut scene.system, |s| {
            s.speakers().get(npc).unwrap().bubble.text() == DEFAULT_CONTINUE_LINE
        });
        assert_eq!(cursor(&scene.system, story), Some(2));

        run_until(&mut scene.system, |s| cursor(s, story) != Some(2));
        assert_eq!(cursor(&scene.system, story), Some(3));
    }

    #[test]
    fn test_interrupt_at_last_line_counts_as_completed() {
        let mut scene = Scene::new();
        let (short, event) = scene.conversation(chatter("Short", 2));
        let log = record(&mut scene.system);

        scene.system.request_conversation(event).unwrap();
        run_until(&mut scene.system, |s| cursor(s, short) == Some(1));
        scene.system.interrupt_conversation(None).unwrap();
        assert_eq!(cursor(&scene.system, short), None);

        run_until(&mut scene.system, |s| s.state() == SchedulerState::Idle);
        assert_eq!(
            log.borrow().last(),
            Some(&ConversationNotification::Ended {
                conversation: short,
                interrupted: false
            })
        );
    }

    #[test]
    fn test_chained_events_follow() {
        let mut scene = Scene::new();
        let (second, second_event) = scene.conversation(chatter("Second", 1));
        let (first, first_event) =
            scene.conversation(chatter("First", 1).with_chained_event(second_event));
        let log = record(&mut scene.system);

        scene.system.request_conversation(first_event).unwrap();
        run_until(&mut scene.system, |s| s.current_conversation() == Some(second));
        run_until(&mut scene.system, |s| s.state() == SchedulerState::Idle);

        assert_eq!(
            *log.borrow(),
            vec![
                ConversationNotification::Started(first),
                ConversationNotification::Ended {
                    conversation: first,
                    interrupted: false
                },
                ConversationNotification::Started(second),
                ConversationNotification::Ended {
                    conversation: second,
                    interrupted: false
                },
            ]
        );
    }

    #[test]
    fn test_missing_speaker_skips_line() {
        let mut scene = Scene::new();
        let (brawl, event) = scene.conversation(
            Conversation::new("Brawl")
                .with_line(SpeakerRole::Enemy, "Grr")
                .with_line(SpeakerRole::Npc, "Easy there"),
        );

        scene.system.request_conversation(event).unwrap();
        let npc = scene.npc;
        run_until(&mut scene.system, |s| {
            s.speakers().get(npc).unwrap().bubble.text() == "Easy there"
        });
        assert_eq!(cursor(&scene.system, brawl), Some(1));

        run_until(&mut scene.system, |s| s.state() == SchedulerState::Idle);
        assert_eq!(cursor(&scene.system, brawl), None);
    }

    #[test]
    fn test_same_speaker_closes_between_lines() {
        let mut scene = Scene::new();
        let (rant, event) = scene.conversation(
            Conversation::new("Rant")
                .with_line(SpeakerRole::Npc, "First")
                .with_line(SpeakerRole::Npc, "Second"),
        );

        scene.system.request_conversation(event).unwrap();
        run_until(&mut scene.system, |s| cursor(s, rant) == Some(0));
        let npc = scene.npc;
        run_until(&mut scene.system, |s| {
            s.speakers().get(npc).unwrap().bubble.current() == Some(AnimationKind::Close)
        });
        assert_eq!(cursor(&scene.system, rant), Some(0));

        run_until(&mut scene.system, |s| cursor(s, rant) == Some(1));
    }

    #[test]
    fn test_speaker_left_area() {
        let mut scene = Scene::new();
        let (walk, event) = scene.conversation(chatter("Walk", 3));
        let bystander = scene.system.add_speaker(Speaker::new(SpeakerRole::Merchant));

        scene.system.request_conversation(event).unwrap();
        assert!(!scene.system.speaker_left_area(scene.npc, ConversationId::new()).unwrap());
        assert!(!scene.system.speaker_left_area(bystander, walk).unwrap());
        assert!(scene.system.speaker_left_area(scene.npc, walk).unwrap());
        assert_eq!(scene.system.state(), SchedulerState::Interrupting);

        run_until(&mut scene.system, |s| s.state() == SchedulerState::Idle);
    }

    #[test]
    fn test_interrupt_while_idle_starts_next() {
        let mut scene = Scene::new();
        let (greet, _) = scene.conversation(chatter("Greet", 1));

        scene.system.interrupt_conversation(None).unwrap();
        assert_eq!(scene.system.state(), SchedulerState::Idle);

        scene.system.interrupt_conversation(Some(greet)).unwrap();
        assert_eq!(scene.system.current_conversation(), Some(greet));
    }

    #[test]
    fn test_arithmetic_fault_propagates() {
        let mut scene = Scene::new();
        let coins = scene.system.data_mut().add_fact(0, Fact::new("Coins", 7)).unwrap();
        let (_, event) = scene.conversation(
            chatter("Split", 1).with_modifier(ModifyFactParam::new(coins, ModifyOp::Divide, 0)),
        );

        let err = scene.system.request_conversation(event).unwrap_err();
        assert!(matches!(
            err,
            DialogueError::Data(DataError::ArithmeticFault { .. })
        ));
        assert_eq!(scene.system.current_conversation(), None);
        assert_eq!(scene.system.data().fact(coins).unwrap().value, 7);
    }

    #[test]
    fn test_dangling_modifier_does_not_block() {
        let mut scene = Scene::new();
        let (quiet, event) = scene.conversation(
            chatter("Quiet", 1).with_modifier(ModifyFactParam::new(FactId::new(), ModifyOp::Set, 1)),
        );

        assert_eq!(scene.system.request_conversation(event).unwrap(), Some(quiet));
    }

    #[test]
    fn test_pending_successor_raises_the_bar() {
        let mut scene = Scene::new();
        let (chat, chat_event) = scene.conversation(chatter("Chat", 3));
        let (cutscene, cutscene_event) = scene.conversation(
            chatter("Cutscene", 1).with_priority(ConversationPriority::Highest),
        );
        let (_, alarm_event) = scene.conversation(
            chatter("Alarm", 1).with_priority(ConversationPriority::High),
        );
        let log = record(&mut scene.system);

        scene.system.request_conversation(chat_event).unwrap();
        run_until(&mut scene.system, |s| cursor(s, chat) == Some(0));

        assert_eq!(scene.system.request_conversation(cutscene_event).unwrap(), Some(cutscene));
        assert_eq!(scene.system.request_conversation(alarm_event).unwrap(), None);
        assert_eq!(scene.system.state(), SchedulerState::Interrupting);

        run_until(&mut scene.system, |s| s.current_conversation() == Some(cutscene));
        assert_eq!(log.borrow()[2], ConversationNotification::Started(cutscene));
    }

    #[test]
    fn test_interrupt_cancels_bystander_lines() {
        let mut scene = Scene::new();
        let (chat, event) = scene.conversation(chatter("Chat", 3));
        let bystander = scene.system.add_speaker(Speaker::new(SpeakerRole::Merchant));

        scene.system.request_conversation(event).unwrap();
        run_until(&mut scene.system, |s| cursor(s, chat) == Some(0));

        let bubble = &mut scene.system.speakers_mut().get_mut(bystander).unwrap().bubble;
        bubble.say_line("Fresh bread!");
        assert_eq!(bubble.queued(), vec![AnimationKind::Show, AnimationKind::SayLine]);

        scene.system.interrupt_conversation(None).unwrap();
        let bubble = &scene.system.speakers().get(bystander).unwrap().bubble;
        assert_eq!(bubble.queued(), vec![AnimationKind::Close]);
    }

    #[test]
    fn test_chained_event_without_candidate_is_skipped() {
        let mut scene = Scene::new();
        let locked = scene.system.data_mut().add_fact(0, Fact::new("Locked", 1)).unwrap();
        let (_, gated_event) = scene.conversation(
            chatter("Gated", 1).with_condition(Condition::new(locked, ConditionOp::Equal, 0)),
        );
        let empty_event = scene
            .system
            .data_mut()
            .add_event(scene.group, DialogueEvent::new("Nothing"))
            .unwrap();
        let (after, after_event) = scene.conversation(chatter("After", 1));
        let (first, first_event) = scene.conversation(
            chatter("First", 1)
                .with_chained_event(gated_event)
                .with_chained_event(empty_event)
                .with_chained_event(after_event),
        );
        let log = record(&mut scene.system);

        scene.system.request_conversation(first_event).unwrap();
        run_until(&mut scene.system, |s| s.current_conversation() == Some(after));
        run_until(&mut scene.system, |s| s.state() == SchedulerState::Idle);

        assert_eq!(
            *log.borrow(),
            vec![
                ConversationNotification::Started(first),
                ConversationNotification::Ended {
                    conversation: first,
                    interrupted: false
                },
                ConversationNotification::Started(after),
                ConversationNotification::Ended {
                    conversation: after,
                    interrupted: false
                },
            ]
        );
    }
}
