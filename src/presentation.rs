//! # Radius / Color Derivation
//! Pure mappings from rolling cluster state to the values the rendering layer
//! draws: bubble radius from the frequency score, banded fill color and
//! continuous stroke color from sentiment.
//!
//! Fill and stroke intentionally use different schemes:
//! - fill: three bands (red below -0.2, flat gray, green above 0.2)
//! - stroke: `hue = 70 * s + 45`, fixed saturation/lightness

use serde::{Serialize, Serializer};
use std::fmt;

pub const BASE_RADIUS: f64 = 25.0;
pub const MIN_RADIUS: f64 = 20.0;
pub const MAX_RADIUS: f64 = 100.0;
/// `frequency_score / 10` is capped here before the square root.
pub const MAX_FREQUENCY_FACTOR: f64 = 5.0;

pub const NEGATIVE_BAND_BELOW: f64 = -0.2;
pub const POSITIVE_BAND_ABOVE: f64 = 0.2;

/// HSL color; renders as CSS `hsl(h, s%, l%)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    pub hue: f64,
    pub saturation: f64,
    pub lightness: f64,
}

impl Hsl {
    pub const fn new(hue: f64, saturation: f64, lightness: f64) -> Self {
        Self {
            hue,
            saturation,
            lightness,
        }
    }
}

impl fmt::Display for Hsl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hsl({:.1}, {:.1}%, {:.1}%)",
            self.hue, self.saturation, self.lightness
        )
    }
}

impl Serialize for Hsl {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

pub const NEUTRAL_FILL: Hsl = Hsl::new(0.0, 0.0, 60.0);

/// Clamp to `[-1, 1]`; non-finite input is treated as neutral.
pub fn clamp_sentiment(sentiment: f64) -> f64 {
    if sentiment.is_finite() {
        sentiment.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

/// `clamp(25 * (1 + sqrt(min(score / 10, 5))), 20, 100)`.
pub fn radius(frequency_score: u64) -> f64 {
    let factor = (frequency_score as f64 / 10.0).min(MAX_FREQUENCY_FACTOR).sqrt();
    (BASE_RADIUS * (1.0 + factor)).clamp(MIN_RADIUS, MAX_RADIUS)
}

/// Linear interpolation from `a` (t = 0) to `b` (t = 1).
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

pub fn fill_color(sentiment: f64) -> Hsl {
    let s = clamp_sentiment(sentiment);
    let band_width = 1.0 - POSITIVE_BAND_ABOVE;

    if s < NEGATIVE_BAND_BELOW {
        // -0.2 -> t = 0, -1 -> t = 1: darker, more saturated red
        let t = (NEGATIVE_BAND_BELOW - s) / band_width;
        Hsl::new(0.0, lerp(80.0, 95.0, t), lerp(55.0, 40.0, t))
    } else if s > POSITIVE_BAND_ABOVE {
        let t = (s - POSITIVE_BAND_ABOVE) / band_width;
        Hsl::new(lerp(120.0, 150.0, t), lerp(70.0, 90.0, t), lerp(50.0, 65.0, t))
    } else {
        NEUTRAL_FILL
    }
}

/// Hue is wrapped into `[0, 360)`, so strongly negative sentiment lands in
/// the red/magenta range (-1 -> 335).
pub fn stroke_color(sentiment: f64) -> Hsl {
    let s = clamp_sentiment(sentiment);
    let hue = (70.0 * s + 45.0).rem_euclid(360.0);
    Hsl::new(hue, 65.0, 35.0)
}
