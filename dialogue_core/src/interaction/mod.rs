//! Interaction resolver - picks which nearby option owns the prompt.
//!
//! Options in range sit in one bucket per [`InteractionPriority`]. The active
//! option is the nearest one in the highest non-empty bucket, and its prompt is
//! the only one shown. Selecting it either requests a conversation or fires a
//! one-shot simple option.

mod option;

pub use option::*;

use dialogue_data::ConversationId;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use tracing::{debug, trace};

use crate::bubble::SpeechBubble;
use crate::error::DialogueError;
use crate::scheduler::{ConversationNotification, DialogueSystem, SubscriptionId};

/// Result of [`InteractionResolver::interact`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    /// No option is active.
    Nothing,
    /// The option's event was accepted by the scheduler.
    Conversation {
        option: OptionId,
        conversation: ConversationId,
    },
    /// The option's event produced nothing the scheduler would run.
    Declined { option: OptionId },
    /// A simple option fired and was consumed.
    Triggered { option: OptionId },
}

/// A dialogue option whose conversation ran to the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletedInteraction {
    pub option: OptionId,
    pub conversation: ConversationId,
}

type Inbox = Rc<RefCell<VecDeque<ConversationNotification>>>;

#[derive(Debug)]
pub struct InteractionResolver {
    buckets: [Vec<OptionId>; InteractionPriority::COUNT],
    options: HashMap<OptionId, InteractionOption>,
    active: Option<OptionId>,
    receiver: Position,
    prompt: SpeechBubble,
    default_label: String,

    inbox: Inbox,
    subscription: Option<SubscriptionId>,
    in_conversation: bool,

    /// Dialogue option waiting on its conversation to end.
    triggered: Option<CompletedInteraction>,
    completed: Vec<CompletedInteraction>,
}

impl InteractionResolver {
    /// `default_label` is shown for options without their own label.
    pub fn new(default_label: impl Into<String>) -> Self {
        Self {
            buckets: Default::default(),
            options: HashMap::new(),
            active: None,
            receiver: Position::default(),
            prompt: SpeechBubble::new(),
            default_label: default_label.into(),
            inbox: Rc::new(RefCell::new(VecDeque::new())),
            subscription: None,
            in_conversation: false,
            triggered: None,
            completed: Vec::new(),
        }
    }

    /// Resolver for `system`, subscribed to its conversation notifications.
    pub fn for_system(system: &mut DialogueSystem) -> Self {
        let mut resolver = Self::new(system.settings().interaction_prompt.clone());
        resolver.attach(system);
        resolver
    }

    /// Start listening for conversation starts and ends.
    pub fn attach(&mut self, system: &mut DialogueSystem) {
        if self.subscription.is_some() {
            return;
        }
        let inbox = Rc::clone(&self.inbox);
        self.subscription = Some(system.subscribe(move |n| inbox.borrow_mut().push_back(*n)));
        self.in_conversation = system.in_conversation();
    }

    pub fn detach(&mut self, system: &mut DialogueSystem) {
        if let Some(subscription) = self.subscription.take() {
            system.unsubscribe(subscription);
        }
        self.inbox.borrow_mut().clear();
    }

    pub fn active(&self) -> Option<OptionId> {
        self.active
    }

    pub fn active_option(&self) -> Option<&InteractionOption> {
        self.active.and_then(|id| self.options.get(&id))
    }

    pub fn option(&self, id: OptionId) -> Option<&InteractionOption> {
        self.options.get(&id)
    }

    pub fn prompt(&self) -> &SpeechBubble {
        &self.prompt
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn set_receiver_position(&mut self, position: Position) {
        self.receiver = position;
    }

    /// Move an option in range. Returns `false` for unknown options.
    pub fn move_option(&mut self, id: OptionId, position: Position) -> bool {
        match self.options.get_mut(&id) {
            Some(option) => {
                option.position = position;
                true
            }
            None => false,
        }
    }

    /// An option came into range. It takes over only when nothing is active or
    /// it outranks the active option.
    pub fn enter(&mut self, option: InteractionOption) {
        self.process_notifications();

        if self.options.contains_key(&option.id) {
            return;
        }
        let id = option.id;
        let priority = option.priority;
        self.buckets[priority.index()].push(id);
        self.options.insert(id, option);
        trace!(option = %id, ?priority, "option in range");

        let promote = match self.active_option() {
            None => true,
            Some(active) => priority > active.priority,
        };
        if promote {
            self.set_active(Some(id));
        }
    }

    /// An option left range. If it was active, the nearest option of the
    /// highest remaining priority takes over.
    pub fn exit(&mut self, id: OptionId) -> Option<InteractionOption> {
        self.process_notifications();

        let option = self.options.remove(&id)?;
        self.buckets[option.priority.index()].retain(|o| *o != id);
        trace!(option = %id, "option out of range");

        if self.active == Some(id) {
            let next = InteractionPriority::DESCENDING
                .iter()
                .find(|p| !self.buckets[p.index()].is_empty())
                .and_then(|p| self.nearest(*p));
            self.set_active(next);
        }
        Some(option)
    }

    /// Handle conversation notifications, follow movement within the active
    /// priority and advance the prompt.
    pub fn tick(&mut self, dt: f32, system: &DialogueSystem) {
        self.process_notifications();

        if let Some(active) = self.active_option() {
            let nearest = self.nearest(active.priority);
            if nearest != self.active {
                self.set_active(nearest);
            }
        }

        self.prompt.tick(dt, system.settings());
    }

    /// Select the active option.
    pub fn interact(&mut self, system: &mut DialogueSystem) -> Result<Interaction, DialogueError> {
        self.process_notifications();

        let Some((id, kind)) = self.active_option().map(|o| (o.id, o.kind)) else {
            return Ok(Interaction::Nothing);
        };

        match kind {
            OptionKind::Dialogue { event } => match system.request_conversation(event)? {
                Some(conversation) => {
                    debug!(option = %id, %conversation, "interaction started a conversation");
                    self.triggered = Some(CompletedInteraction {
                        option: id,
                        conversation,
                    });
                    Ok(Interaction::Conversation {
                        option: id,
                        conversation,
                    })
                }
                None => Ok(Interaction::Declined { option: id }),
            },
            OptionKind::Simple => {
                debug!(option = %id, "simple interaction consumed");
                if let Some(option) = self.options.remove(&id) {
                    self.buckets[option.priority.index()].retain(|o| *o != id);
                }
                self.set_active(None);
                Ok(Interaction::Triggered { option: id })
            }
        }
    }

    /// Dialogue interactions whose conversations ended without interruption,
    /// oldest first.
    pub fn take_completed(&mut self) -> Vec<CompletedInteraction> {
        std::mem::take(&mut self.completed)
    }

    fn process_notifications(&mut self) {
        let pending: Vec<_> = self.inbox.borrow_mut().drain(..).collect();
        for notification in pending {
            match notification {
                ConversationNotification::Started(_) => {
                    self.in_conversation = true;
                    self.prompt.close();
                }
                ConversationNotification::Ended {
                    conversation,
                    interrupted,
                } => {
                    self.in_conversation = false;

                    if let Some(triggered) = self.triggered {
                        if triggered.conversation == conversation {
                            self.triggered = None;
                            if !interrupted {
                                self.completed.push(triggered);
                            }
                        }
                    }

                    if let Some(active) = self.active_option() {
                        let nearest = self.nearest(active.priority);
                        self.set_active(nearest);
                    }
                }
            }
        }
    }

    /// Nearest option to the receiver within one priority. Ties go to the
    /// earliest entered.
    fn nearest(&self, priority: InteractionPriority) -> Option<OptionId> {
        let mut best: Option<(OptionId, f32)> = None;
        for id in &self.buckets[priority.index()] {
            let Some(option) = self.options.get(id) else {
                continue;
            };
            let distance = option.position.distance_squared(self.receiver);
            if best.map_or(true, |(_, closest)| distance < closest) {
                best = Some((*id, distance));
            }
        }
        best.map(|(id, _)| id)
    }

    fn set_active(&mut self, option: Option<OptionId>) {
        let Some(option) = option.and_then(|id| self.options.get(&id)) else {
            self.prompt.close();
            self.active = None;
            return;
        };

        #[cfg(debug_assertions)]
        {
            let outranked = self.buckets[option.priority.index() + 1..]
                .iter()
                .any(|bucket| !bucket.is_empty());
            if outranked {
                tracing::error!(option = %option.id, priority = ?option.priority, "activating option below a higher priority one");
            }
        }

        let label = option
            .prompt_label
            .clone()
            .unwrap_or_else(|| self.default_label.clone());
        let id = option.id;

        if self.active.is_some() {
            self.prompt.close();
        }
        self.active = Some(id);
        trace!(option = %id, "option active");

        if !self.in_conversation {
            self.prompt.show(label);
        }
    }
}
