//! Speech bubbles - a per-speaker FIFO of cancellable animations.
//!
//! Each bubble runs at most one animation at a time, the head of its queue.
//! Redundant requests queued behind the head collapse into one:
//! - a pending `SayLine` is replaced by a newer `SayLine`
//! - a pending `Show` or `Close` is replaced by a newer `Show` or `Close`,
//!   so the latest visibility request wins
//!
//! The head itself is never replaced. Completion of the head starts the next
//! task. Waiting for a bubble is a poll on [`SpeechBubble::is_animating`].

mod curve;

pub use curve::*;

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{error, trace};

use crate::settings::DialogueSettings;

/// Layout used to size the bubble background around its text.
///
/// Text measurement is approximate: every glyph has the same advance and
/// every line the same height. Rendering collaborators are free to measure
/// properly; the scheduler only depends on the reveal timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BubbleStyle {
    /// Space between text and background edge, horizontal and vertical.
    pub padding: [f32; 2],
    pub glyph_width: f32,
    pub line_height: f32,
}

impl Default for BubbleStyle {
    fn default() -> Self {
        Self {
            padding: [0.75, 0.75],
            glyph_width: 0.25,
            line_height: 0.5,
        }
    }
}

impl BubbleStyle {
    /// Size of the text block alone.
    pub fn measure(&self, text: &str) -> [f32; 2] {
        if text.is_empty() {
            return [0.0, 0.0];
        }
        let columns = text.lines().map(|l| l.chars().count()).max().unwrap_or(0);
        let rows = text.lines().count().max(1);
        [
            columns as f32 * self.glyph_width,
            rows as f32 * self.line_height,
        ]
    }

    /// Size of the background for the given text, padding included.
    pub fn background_size(&self, text: &str) -> [f32; 2] {
        let [width, height] = self.measure(text);
        let [pad_x, pad_y] = self.padding;
        if width > 0.0 {
            [width + pad_x * 2.0, height + pad_y * 2.0]
        } else {
            [self.line_height + pad_x * 2.0, self.line_height + pad_y * 2.0]
        }
    }
}

/// Tag of a queued animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationKind {
    Show,
    Close,
    SayLine,
}

impl AnimationKind {
    /// Whether a newer request of `other` replaces a pending task of `self`.
    fn collapses_with(self, other: AnimationKind) -> bool {
        use AnimationKind::*;
        matches!(
            (self, other),
            (SayLine, SayLine) | (Show | Close, Show | Close)
        )
    }
}

#[derive(Debug, Clone)]
enum Animation {
    Show {
        text: String,
        progress: f32,
        tween: bool,
    },
    Close {
        progress: f32,
        tween: bool,
    },
    SayLine {
        line: Vec<char>,
        revealed: usize,
        countdown: f32,
    },
}

impl Animation {
    fn kind(&self) -> AnimationKind {
        match self {
            Animation::Show { .. } => AnimationKind::Show,
            Animation::Close { .. } => AnimationKind::Close,
            Animation::SayLine { .. } => AnimationKind::SayLine,
        }
    }

    /// Runs once, when the task becomes the head of the queue.
    fn start(&mut self, view: &mut BubbleView) {
        match self {
            Animation::Show { text, tween, .. } => {
                view.text = text.clone();
                *tween = !view.visible;
                if *tween {
                    view.visible = true;
                    view.alpha = 0.0;
                }
            }
            Animation::Close { progress, tween } => {
                *tween = view.visible;
                *progress = 1.0;
            }
            Animation::SayLine { line, .. } => {
                if line.iter().all(|c| c.is_whitespace()) {
                    error!("speech bubble asked to say a blank line");
                    line.clear();
                    return;
                }
                view.text.clear();
                view.scale = 1.0;
                view.alpha = 1.0;
            }
        }
    }

    /// Advance by `dt` seconds. Returns `true` once the animation is finished.
    fn step(&mut self, dt: f32, view: &mut BubbleView, settings: &DialogueSettings) -> bool {
        let curve = &settings.appear_curve;
        let rate = if settings.appear_duration > 0.0 {
            dt / settings.appear_duration
        } else {
            f32::INFINITY
        };

        match self {
            Animation::Show { tween: false, .. } => true,
            Animation::Show { progress, .. } => {
                if *progress == 0.0 {
                    view.size = settings.bubble.background_size(&view.text);
                }
                *progress += rate;
                if *progress >= 1.0 {
                    view.scale = curve.last_value();
                    view.alpha = 1.0;
                    true
                } else {
                    view.scale = curve.evaluate(*progress);
                    view.alpha = *progress;
                    false
                }
            }
            Animation::Close { tween: false, .. } => true,
            Animation::Close { progress, .. } => {
                *progress -= rate;
                if *progress <= 0.0 {
                    view.visible = false;
                    view.scale = curve.evaluate(0.0);
                    view.alpha = 0.0;
                    true
                } else {
                    view.scale = curve.evaluate(*progress);
                    view.alpha = *progress;
                    false
                }
            }
            Animation::SayLine {
                line,
                revealed,
                countdown,
            } => {
                if line.is_empty() {
                    return true;
                }
                *countdown -= dt;
                while *countdown <= 0.0 && *revealed < line.len() {
                    view.text.push(line[*revealed]);
                    *revealed += 1;
                    view.size = settings.bubble.background_size(&view.text);
                    *countdown += settings.seconds_per_char();
                }
                *revealed == line.len() && *countdown <= 0.0
            }
        }
    }
}

/// What a renderer needs to draw the bubble.
#[derive(Debug, Clone, PartialEq)]
struct BubbleView {
    visible: bool,
    text: String,
    scale: f32,
    alpha: f32,
    size: [f32; 2],
}

impl Default for BubbleView {
    fn default() -> Self {
        Self {
            visible: false,
            text: String::new(),
            scale: 0.0,
            alpha: 0.0,
            size: [0.0, 0.0],
        }
    }
}

/// A speech bubble and its animation queue.
#[derive(Debug, Clone, Default)]
pub struct SpeechBubble {
    queue: VecDeque<Animation>,
    view: BubbleView,
}

impl SpeechBubble {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pop the bubble open with `text` already in it.
    pub fn show(&mut self, text: impl Into<String>) {
        self.enqueue(Animation::Show {
            text: text.into(),
            progress: 0.0,
            tween: false,
        });
    }

    /// Close the bubble. Returns `false` when there is nothing to close: the
    /// queue is empty and the bubble is already hidden.
    pub fn close(&mut self) -> bool {
        if self.queue.is_empty() && !self.view.visible {
            return false;
        }
        self.enqueue(Animation::Close {
            progress: 1.0,
            tween: false,
        });
        true
    }

    /// Reveal `text` one character at a time, opening the bubble first if it
    /// is hidden.
    pub fn say_line(&mut self, text: &str) {
        if !self.view.visible {
            self.show("");
        }
        self.enqueue(Animation::SayLine {
            line: text.chars().collect(),
            revealed: 0,
            countdown: 0.0,
        });
    }

    fn enqueue(&mut self, mut animation: Animation) {
        let kind = animation.kind();

        if self.queue.is_empty() {
            animation.start(&mut self.view);
            self.queue.push_back(animation);
            trace!(?kind, "animation started");
            return;
        }

        // Position 0 is running and is never replaced.
        if let Some(pending) = self
            .queue
            .iter_mut()
            .skip(1)
            .find(|pending| pending.kind().collapses_with(kind))
        {
            trace!(replaced = ?pending.kind(), ?kind, "pending animation replaced");
            *pending = animation;
            return;
        }

        self.queue.push_back(animation);
    }

    /// Advance the running animation; start the next one when it finishes.
    pub fn tick(&mut self, dt: f32, settings: &DialogueSettings) {
        let Some(head) = self.queue.front_mut() else {
            return;
        };
        if head.step(dt, &mut self.view, settings) {
            let finished = self.queue.pop_front().map(|a| a.kind());
            trace!(?finished, "animation finished");
            if let Some(next) = self.queue.front_mut() {
                next.start(&mut self.view);
            }
        }
    }

    /// Stop the running animation and drop everything queued.
    ///
    /// Nothing is marked finished; anyone polling [`is_animating`](Self::is_animating)
    /// simply sees the queue empty.
    pub fn cancel_all(&mut self) {
        if !self.queue.is_empty() {
            trace!(dropped = self.queue.len(), "animations cancelled");
        }
        self.queue.clear();
    }

    pub fn is_animating(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Kind of the running animation, if any.
    pub fn current(&self) -> Option<AnimationKind> {
        self.queue.front().map(Animation::kind)
    }

    /// Kinds of every queued animation, running head first.
    pub fn queued(&self) -> Vec<AnimationKind> {
        self.queue.iter().map(Animation::kind).collect()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn is_visible(&self) -> bool {
        self.view.visible
    }

    pub fn text(&self) -> &str {
        &self.view.text
    }

    pub fn scale(&self) -> f32 {
        self.view.scale
    }

    pub fn alpha(&self) -> f32 {
        self.view.alpha
    }

    /// Background size, padding included.
    pub fn size(&self) -> [f32; 2] {
        self.view.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_until_idle(bubble: &mut SpeechBubble, settings: &DialogueSettings) {
        for _ in 0..10_000 {
            if !bubble.is_animating() {
                return;
            }
            bubble.tick(0.05, settings);
        }
        panic!("bubble never finished animating");
    }

    #[test]
    fn test_show_starts_immediately() {
        let mut bubble = SpeechBubble::new();
        bubble.show("E");

        assert_eq!(bubble.current(), Some(AnimationKind::Show));
        assert!(bubble.is_visible());
        assert_eq!(bubble.text(), "E");
    }

    #[test]
    fn test_show_close_show_collapses() {
        let mut bubble = SpeechBubble::new();
        bubble.show("");
        bubble.close();
        bubble.show("");

        assert_eq!(bubble.len(), 2);
        assert_eq!(
            bubble.queued(),
            vec![AnimationKind::Show, AnimationKind::Show]
        );
    }

    #[test]
    fn test_running_head_never_replaced() {
        let mut bubble = SpeechBubble::new();
        bubble.show("");
        bubble.show("");
        assert_eq!(bubble.len(), 2);

        bubble.show("");
        assert_eq!(bubble.len(), 2);

        bubble.close();
        assert_eq!(
            bubble.queued(),
            vec![AnimationKind::Show, AnimationKind::Close]
        );
    }

    #[test]
    fn test_pending_say_line_replaced() {
        let settings = DialogueSettings::default();
        let mut bubble = SpeechBubble::new();
        bubble.say_line("first");
        bubble.say_line("second");
        assert_eq!(
            bubble.queued(),
            vec![AnimationKind::Show, AnimationKind::SayLine]
        );

        run_until_idle(&mut bubble, &settings);
        assert_eq!(bubble.text(), "second");
    }

    #[test]
    fn test_show_tween() {
        let settings = DialogueSettings::default();
        let mut bubble = SpeechBubble::new();
        bubble.show("");

        for _ in 0..3 {
            bubble.tick(0.25, &settings);
        }
        assert!(bubble.is_animating());
        assert!((bubble.alpha() - 0.75).abs() < 1e-6);

        bubble.tick(0.25, &settings);
        assert!(!bubble.is_animating());
        assert_eq!(bubble.alpha(), 1.0);
        assert_eq!(bubble.scale(), settings.appear_curve.last_value());
    }

    #[test]
    fn test_say_line_reveals_per_character() {
        let settings = DialogueSettings::default();
        let mut bubble = SpeechBubble::new();
        bubble.show("");
        run_until_idle(&mut bubble, &settings);

        bubble.say_line("Hey");
        assert_eq!(bubble.current(), Some(AnimationKind::SayLine));
        assert_eq!(bubble.text(), "");

        bubble.tick(0.01, &settings);
        assert_eq!(bubble.text(), "H");
        let [pad_x, _] = settings.bubble.padding;
        let one_glyph = settings.bubble.glyph_width + pad_x * 2.0;
        assert!((bubble.size()[0] - one_glyph).abs() < 1e-6);

        run_until_idle(&mut bubble, &settings);
        assert_eq!(bubble.text(), "Hey");
        let three_glyphs = settings.bubble.glyph_width * 3.0 + pad_x * 2.0;
        assert!((bubble.size()[0] - three_glyphs).abs() < 1e-6);
    }

    #[test]
    fn test_say_line_opens_hidden_bubble() {
        let settings = DialogueSettings::default();
        let mut bubble = SpeechBubble::new();
        bubble.say_line("Hello");

        assert_eq!(
            bubble.queued(),
            vec![AnimationKind::Show, AnimationKind::SayLine]
        );
        run_until_idle(&mut bubble, &settings);
        assert!(bubble.is_visible());
        assert_eq!(bubble.text(), "Hello");
    }

    #[test]
    fn test_close_hides() {
        let settings = DialogueSettings::default();
        let mut bubble = SpeechBubble::new();
        bubble.show("E");
        run_until_idle(&mut bubble, &settings);

        assert!(bubble.close());
        run_until_idle(&mut bubble, &settings);
        assert!(!bubble.is_visible());
        assert_eq!(bubble.alpha(), 0.0);
    }

    #[test]
    fn test_close_hidden_idle_bubble_is_noop() {
        let mut bubble = SpeechBubble::new();
        assert!(!bubble.close());
        assert!(!bubble.is_animating());
    }

    #[test]
    fn test_cancel_all() {
        let mut bubble = SpeechBubble::new();
        bubble.say_line("Interrupted mid-sentence");
        assert!(bubble.is_animating());

        bubble.cancel_all();
        assert!(!bubble.is_animating());
        assert_eq!(bubble.current(), None);
        // visual state is left where the animation stopped
        assert!(bubble.is_visible());
    }

    #[test]
    fn test_blank_line_finishes_immediately() {
        let settings = DialogueSettings::default();
        let mut bubble = SpeechBubble::new();
        bubble.show("");
        run_until_idle(&mut bubble, &settings);

        bubble.say_line("   ");
        bubble.tick(0.0, &settings);
        assert!(!bubble.is_animating());
    }

    #[test]
    fn test_background_size_fallback() {
        let style = BubbleStyle::default();
        let [width, height] = style.background_size("");
        assert!((width - (style.line_height + 1.5)).abs() < 1e-6);
        assert!((height - (style.line_height + 1.5)).abs() < 1e-6);

        let [width, height] = style.background_size("ab\nabcd");
        assert!((width - (4.0 * style.glyph_width + 1.5)).abs() < 1e-6);
        assert!((height - (2.0 * style.line_height + 1.5)).abs() < 1e-6);
    }
}
