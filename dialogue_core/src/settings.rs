//! Pacing and animation settings.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::bubble::{AnimationCurve, BubbleStyle};
use crate::error::DialogueError;

/// Average characters per word, used to turn words per minute into a
/// per-character reveal rate.
pub const AVERAGE_CHARS_PER_WORD: f32 = 4.7;

/// Configuration shared by the scheduler, the speech bubbles and the
/// interaction prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogueSettings {
    /// Text speed in words per minute. Human reading speed is roughly 250-300.
    pub words_per_minute: f32,

    /// Extra reading time after a line, as a fraction of the time to reveal it.
    pub extra_reading_percentage: f32,

    /// Lower bound on the reading wait after a line, in seconds.
    pub min_extra_reading_time: f32,

    /// Pause after a conversation ends without interruption, in seconds.
    pub time_between_conversations: f32,

    /// Duration of the show and close tweens, in seconds.
    pub appear_duration: f32,

    /// Scale of a bubble over the show tween, sampled on `[0, 1]`.
    pub appear_curve: AnimationCurve,

    /// Label shown by the interaction prompt.
    pub interaction_prompt: String,

    pub bubble: BubbleStyle,
}

impl Default for DialogueSettings {
    fn default() -> Self {
        Self {
            words_per_minute: 250.0,
            extra_reading_percentage: 0.5,
            min_extra_reading_time: 3.0,
            time_between_conversations: 2.0,
            appear_duration: 1.0,
            appear_curve: AnimationCurve::default(),
            interaction_prompt: "E".to_string(),
            bubble: BubbleStyle::default(),
        }
    }
}

impl DialogueSettings {
    /// Parse settings from TOML. Missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, DialogueError> {
        Ok(toml::from_str(source)?)
    }

    /// Load settings from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DialogueError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Seconds between revealed characters.
    pub fn seconds_per_char(&self) -> f32 {
        1.0 / (self.words_per_minute * AVERAGE_CHARS_PER_WORD / 60.0)
    }

    /// How long to leave a line on screen after it has been revealed.
    pub fn pacing_delay(&self, text: &str) -> f32 {
        let reveal_time = text.chars().count() as f32 * self.seconds_per_char();
        (reveal_time * self.extra_reading_percentage).max(self.min_extra_reading_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_seconds_per_char() {
        let settings = DialogueSettings::default();
        // 250 wpm * 4.7 chars / 60 s ~= 19.58 chars per second
        assert!((settings.seconds_per_char() - 0.051_063).abs() < 1e-4);
    }

    #[rstest]
    #[case("Hi", 3.0)]
    #[case("", 3.0)]
    fn test_pacing_delay_floor(#[case] text: &str, #[case] expected: f32) {
        let settings = DialogueSettings::default();
        assert!((settings.pacing_delay(text) - expected).abs() < 1e-4);
    }

    #[test]
    fn test_pacing_delay_long_line() {
        let settings = DialogueSettings::default();
        let text = "a".repeat(200);
        let expected = 200.0 * settings.seconds_per_char() * 0.5;
        assert!(expected > 3.0);
        assert!((settings.pacing_delay(&text) - expected).abs() < 1e-4);
    }

    #[test]
    fn test_from_toml_partial() {
        let settings = DialogueSettings::from_toml_str(
            r#"
            words_per_minute = 300.0
            min_extra_reading_time = 1.5
            interaction_prompt = "F"

            [bubble]
            padding = [0.5, 0.25]
            "#,
        )
        .unwrap();

        assert_eq!(settings.words_per_minute, 300.0);
        assert_eq!(settings.min_extra_reading_time, 1.5);
        assert_eq!(settings.interaction_prompt, "F");
        assert_eq!(settings.bubble.padding, [0.5, 0.25]);
        // untouched keys keep their defaults
        assert_eq!(settings.time_between_conversations, 2.0);
        assert_eq!(settings.bubble.line_height, BubbleStyle::default().line_height);
    }

    #[test]
    fn test_from_toml_invalid() {
        let result = DialogueSettings::from_toml_str("words_per_minute = \"fast\"");
        assert!(matches!(result, Err(DialogueError::Settings(_))));
    }
}
