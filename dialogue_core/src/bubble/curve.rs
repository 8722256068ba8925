//! Keyframed curves for the show and close tweens.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveKey {
    pub time: f32,
    pub value: f32,
}

impl CurveKey {
    pub fn new(time: f32, value: f32) -> Self {
        Self { time, value }
    }
}

/// Piecewise-linear curve through keys sorted by time.
///
/// Sampling before the first key or after the last clamps to the end values.
/// An empty curve samples as `1.0` everywhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationCurve {
    pub keys: Vec<CurveKey>,
}

impl Default for AnimationCurve {
    /// Grows past full size and settles back, a small pop on appear.
    fn default() -> Self {
        Self::new(vec![
            CurveKey::new(0.0, 0.0),
            CurveKey::new(0.7, 1.1),
            CurveKey::new(1.0, 1.0),
        ])
    }
}

impl AnimationCurve {
    pub fn new(mut keys: Vec<CurveKey>) -> Self {
        keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self { keys }
    }

    pub fn linear() -> Self {
        Self::new(vec![CurveKey::new(0.0, 0.0), CurveKey::new(1.0, 1.0)])
    }

    pub fn evaluate(&self, t: f32) -> f32 {
        let (Some(first), Some(last)) = (self.keys.first(), self.keys.last()) else {
            return 1.0;
        };
        if t <= first.time {
            return first.value;
        }
        if t >= last.time {
            return last.value;
        }

        self.keys
            .windows(2)
            .find(|pair| t <= pair[1].time)
            .map(|pair| {
                let (a, b) = (pair[0], pair[1]);
                let span = b.time - a.time;
                if span <= f32::EPSILON {
                    b.value
                } else {
                    a.value + (b.value - a.value) * (t - a.time) / span
                }
            })
            .unwrap_or(last.value)
    }

    /// Value of the final key; the resting scale once a show tween completes.
    pub fn last_value(&self) -> f32 {
        self.keys.last().map(|key| key.value).unwrap_or(1.0)
    }
}
