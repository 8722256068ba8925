//! Speaker registry - the speakers currently present in the scene.

use dialogue_data::SpeakerRole;
use tracing::debug;

use super::{Speaker, SpeakerId};
use crate::settings::DialogueSettings;

/// Registered speakers in registration order.
///
/// Roles are not unique. Lookups return the first match in iteration order.
#[derive(Debug, Clone, Default)]
pub struct SpeakerRegistry {
    speakers: Vec<Speaker>,
}

impl SpeakerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a speaker. Registering the same ID twice is a no-op.
    pub fn add(&mut self, speaker: Speaker) -> SpeakerId {
        let id = speaker.id;
        if self.contains(id) {
            return id;
        }
        debug!(speaker = %speaker.name, role = ?speaker.role, "speaker registered");
        self.speakers.push(speaker);
        id
    }

    /// Unregister a speaker and hand it back.
    pub fn remove(&mut self, id: SpeakerId) -> Option<Speaker> {
        let index = self.speakers.iter().position(|s| s.id == id)?;
        let speaker = self.speakers.remove(index);
        debug!(speaker = %speaker.name, role = ?speaker.role, "speaker unregistered");
        Some(speaker)
    }

    pub fn contains(&self, id: SpeakerId) -> bool {
        self.speakers.iter().any(|s| s.id == id)
    }

    pub fn get(&self, id: SpeakerId) -> Option<&Speaker> {
        self.speakers.iter().find(|s| s.id == id)
    }

    pub fn get_mut(&mut self, id: SpeakerId) -> Option<&mut Speaker> {
        self.speakers.iter_mut().find(|s| s.id == id)
    }

    /// First speaker with `role`, searching `subset` in its order when given,
    /// otherwise every registered speaker.
    pub fn find_speaker(&self, role: SpeakerRole, subset: Option<&[SpeakerId]>) -> Option<SpeakerId> {
        match subset {
            Some(ids) => ids
                .iter()
                .copied()
                .find(|id| self.get(*id).is_some_and(|s| s.role == role)),
            None => self.speakers.iter().find(|s| s.role == role).map(|s| s.id),
        }
    }

    /// The dedicated player speaker.
    pub fn player(&self) -> Option<SpeakerId> {
        self.find_speaker(SpeakerRole::Player, None)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Speaker> {
        self.speakers.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Speaker> {
        self.speakers.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.speakers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.speakers.is_empty()
    }

    /// Stop every animation on every registered speaker.
    pub fn cancel_all_animations(&mut self) {
        for speaker in &mut self.speakers {
            speaker.bubble.cancel_all();
        }
    }

    pub fn any_animating(&self) -> bool {
        self.speakers.iter().any(|s| s.bubble.is_animating())
    }

    /// Whether the given speaker's bubble is busy. Unknown speakers are idle.
    pub fn is_animating(&self, id: SpeakerId) -> bool {
        self.get(id).is_some_and(|s| s.bubble.is_animating())
    }

    /// Advance every speaker's bubble.
    pub fn tick(&mut self, dt: f32, settings: &DialogueSettings) {
        for speaker in &mut self.speakers {
            speaker.bubble.tick(dt, settings);
        }
    }
}
