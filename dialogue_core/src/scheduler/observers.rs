//! Start and end notifications for conversations.

use dialogue_data::ConversationId;

/// Something that happened to a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationNotification {
    Started(ConversationId),
    Ended {
        conversation: ConversationId,
        /// `false` when the conversation ran out of lines, or was cut at its last line.
        interrupted: bool,
    },
}

/// Handle returned by [`ConversationObservers::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn FnMut(&ConversationNotification)>;

/// Observer list, notified synchronously in subscription order.
#[derive(Default)]
pub struct ConversationObservers {
    next_id: u64,
    observers: Vec<(SubscriptionId, Observer)>,
}

impl ConversationObservers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: impl FnMut(&ConversationNotification) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Returns `false` if the subscription was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sub, _)| *sub != id);
        self.observers.len() != before
    }

    pub fn notify(&mut self, notification: &ConversationNotification) {
        for (_, observer) in &mut self.observers {
            observer(notification);
        }
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl std::fmt::Debug for ConversationObservers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationObservers")
            .field("observers", &self.observers.len())
            .finish()
    }
}
