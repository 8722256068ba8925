//! Dialogue data graph - the authored group hierarchy and its runtime indices.

mod validation;

pub use validation::*;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::conversation::{Conversation, ConversationId, DialogueEvent, EventId};
use crate::error::DataError;
use crate::facts::{modify_facts, Fact, FactId, FactStore, ModifyFactParam};

/// Authoring container. Owns facts, events and conversations but has no
/// meaning at runtime beyond the `"Group/Name"` paths it provides.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Group {
    pub name: String,
    #[serde(default)]
    pub facts: Vec<Fact>,
    #[serde(default)]
    pub events: Vec<DialogueEvent>,
    #[serde(default)]
    pub conversations: Vec<Conversation>,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Location of an item inside the group list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Slot {
    group: usize,
    index: usize,
}

/// Serialized shape of the graph; indices are rebuilt on load.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct DataFile {
    groups: Vec<Group>,
}

/// The complete authored dialogue data.
///
/// Fact values and conversation cursors are the only fields mutated at
/// runtime; both return to their defaults on [`DialogueData::reset_play_data`].
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(from = "DataFile", into = "DataFile")]
pub struct DialogueData {
    groups: Vec<Group>,

    fact_slots: HashMap<FactId, Slot>,
    event_slots: HashMap<EventId, Slot>,
    conversation_slots: HashMap<ConversationId, Slot>,
}

impl From<DataFile> for DialogueData {
    fn from(file: DataFile) -> Self {
        let mut data = Self {
            groups: file.groups,
            ..Default::default()
        };
        data.rebuild_index();
        data
    }
}

impl From<DialogueData> for DataFile {
    fn from(data: DialogueData) -> Self {
        Self {
            groups: data.groups,
        }
    }
}

impl DialogueData {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a graph from JSON. Cursors start idle; fact values are taken as
    /// stored, call [`reset_play_data`](Self::reset_play_data) to start a session.
    pub fn from_json(json: &str) -> Result<Self, DataError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, DataError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn rebuild_index(&mut self) {
        self.fact_slots.clear();
        self.event_slots.clear();
        self.conversation_slots.clear();

        for (group, entry) in self.groups.iter().enumerate() {
            for (index, fact) in entry.facts.iter().enumerate() {
                self.fact_slots.insert(fact.id, Slot { group, index });
            }
            for (index, event) in entry.events.iter().enumerate() {
                self.event_slots.insert(event.id, Slot { group, index });
            }
            for (index, conversation) in entry.conversations.iter().enumerate() {
                self.conversation_slots
                    .insert(conversation.id, Slot { group, index });
            }
        }
    }

    /// Add a group and return its index.
    pub fn add_group(&mut self, name: impl Into<String>) -> usize {
        self.groups.push(Group::new(name));
        self.groups.len() - 1
    }

    fn group_mut(&mut self, group: usize) -> Result<&mut Group, DataError> {
        self.groups
            .get_mut(group)
            .ok_or(DataError::UnknownGroup(group))
    }

    /// Add a fact to a group.
    pub fn add_fact(&mut self, group: usize, fact: Fact) -> Result<FactId, DataError> {
        let id = fact.id;
        let entry = self.group_mut(group)?;
        entry.facts.push(fact);
        let index = entry.facts.len() - 1;
        self.fact_slots.insert(id, Slot { group, index });
        Ok(id)
    }

    /// Add a dialogue event to a group.
    pub fn add_event(&mut self, group: usize, event: DialogueEvent) -> Result<EventId, DataError> {
        let id = event.id;
        let entry = self.group_mut(group)?;
        entry.events.push(event);
        let index = entry.events.len() - 1;
        self.event_slots.insert(id, Slot { group, index });
        Ok(id)
    }

    /// Add a conversation to a group.
    pub fn add_conversation(
        &mut self,
        group: usize,
        conversation: Conversation,
    ) -> Result<ConversationId, DataError> {
        let id = conversation.id;
        let entry = self.group_mut(group)?;
        entry.conversations.push(conversation);
        let index = entry.conversations.len() - 1;
        self.conversation_slots.insert(id, Slot { group, index });
        Ok(id)
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn fact(&self, id: FactId) -> Option<&Fact> {
        let slot = self.fact_slots.get(&id)?;
        self.groups[slot.group].facts.get(slot.index)
    }

    pub fn fact_mut(&mut self, id: FactId) -> Option<&mut Fact> {
        let slot = *self.fact_slots.get(&id)?;
        self.groups[slot.group].facts.get_mut(slot.index)
    }

    pub fn event(&self, id: EventId) -> Option<&DialogueEvent> {
        let slot = self.event_slots.get(&id)?;
        self.groups[slot.group].events.get(slot.index)
    }

    pub fn conversation(&self, id: ConversationId) -> Option<&Conversation> {
        let slot = self.conversation_slots.get(&id)?;
        self.groups[slot.group].conversations.get(slot.index)
    }

    pub fn conversation_mut(&mut self, id: ConversationId) -> Option<&mut Conversation> {
        let slot = *self.conversation_slots.get(&id)?;
        self.groups[slot.group].conversations.get_mut(slot.index)
    }

    /// Iterate over every fact in group order.
    pub fn facts(&self) -> impl Iterator<Item = &Fact> {
        self.groups.iter().flat_map(|group| group.facts.iter())
    }

    /// Iterate over every conversation in group order.
    pub fn conversations(&self) -> impl Iterator<Item = &Conversation> {
        self.groups.iter().flat_map(|group| group.conversations.iter())
    }

    /// Start a new session: every fact returns to its starting value and every
    /// conversation cursor to idle.
    pub fn reset_play_data(&mut self) {
        for group in &mut self.groups {
            for fact in &mut group.facts {
                fact.reset();
            }
            for conversation in &mut group.conversations {
                conversation.reset_cursor();
            }
        }
    }

    /// Apply modifiers in order. See [`modify_facts`].
    pub fn modify_facts(&mut self, modifiers: &[ModifyFactParam]) -> Result<(), DataError> {
        modify_facts(self, modifiers)
    }

    fn path_of(&self, slot: Option<&Slot>, name: impl Fn(&Group, usize) -> &str) -> Option<String> {
        let slot = slot?;
        let group = &self.groups[slot.group];
        Some(format!("{}/{}", group.name, name(group, slot.index)))
    }

    /// `"Group/Name"` of a fact.
    pub fn fact_path(&self, id: FactId) -> Option<String> {
        self.path_of(self.fact_slots.get(&id), |g, i| g.facts[i].name.as_str())
    }

    /// `"Group/Name"` of a dialogue event.
    pub fn event_path(&self, id: EventId) -> Option<String> {
        self.path_of(self.event_slots.get(&id), |g, i| g.events[i].name.as_str())
    }

    /// `"Group/Name"` of a conversation.
    pub fn conversation_path(&self, id: ConversationId) -> Option<String> {
        self.path_of(self.conversation_slots.get(&id), |g, i| {
            g.conversations[i].name.as_str()
        })
    }

    /// All facts as `(path, id)` pairs.
    pub fn all_facts(&self) -> Vec<(String, FactId)> {
        self.groups
            .iter()
            .flat_map(|g| g.facts.iter().map(move |f| (format!("{}/{}", g.name, f.name), f.id)))
            .collect()
    }

    /// All dialogue events as `(path, id)` pairs.
    pub fn all_events(&self) -> Vec<(String, EventId)> {
        self.groups
            .iter()
            .flat_map(|g| g.events.iter().map(move |e| (format!("{}/{}", g.name, e.name), e.id)))
            .collect()
    }

    /// All conversations as `(path, id)` pairs.
    pub fn all_conversations(&self) -> Vec<(String, ConversationId)> {
        self.groups
            .iter()
            .flat_map(|g| {
                g.conversations
                    .iter()
                    .map(move |c| (format!("{}/{}", g.name, c.name), c.id))
            })
            .collect()
    }

    fn split_path(path: &str) -> Option<(&str, &str)> {
        path.split_once('/')
    }

    pub fn find_fact(&self, path: &str) -> Option<FactId> {
        let (group, name) = Self::split_path(path)?;
        self.groups
            .iter()
            .filter(|g| g.name == group)
            .flat_map(|g| g.facts.iter())
            .find(|f| f.name == name)
            .map(|f| f.id)
    }

    pub fn find_event(&self, path: &str) -> Option<EventId> {
        let (group, name) = Self::split_path(path)?;
        self.groups
            .iter()
            .filter(|g| g.name == group)
            .flat_map(|g| g.events.iter())
            .find(|e| e.name == name)
            .map(|e| e.id)
    }

    pub fn find_conversation(&self, path: &str) -> Option<ConversationId> {
        let (group, name) = Self::split_path(path)?;
        self.groups
            .iter()
            .filter(|g| g.name == group)
            .flat_map(|g| g.conversations.iter())
            .find(|c| c.name == name)
            .map(|c| c.id)
    }
}

impl FactStore for DialogueData {
    fn fact_value(&self, id: FactId) -> Option<i32> {
        self.fact(id).map(|fact| fact.value)
    }

    fn set_fact_value(&mut self, id: FactId, value: i32) -> bool {
        match self.fact_mut(id) {
            Some(fact) => {
                fact.value = value;
                true
            }
            None => false,
        }
    }
}
