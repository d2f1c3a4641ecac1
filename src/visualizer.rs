//! Bar-chart rendering of track envelopes.
//!
//! The playback controller talks to a [`Visualizer`] only through `clear` and
//! `draw`. [`layout_bars`] turns an envelope and a drawing area into bar
//! rectangles; the terminal player paints those onto a canvas.

use crate::constants::BAR_GLYPHS;
use crate::envelope::Envelope;

/// Size of the drawing area and the gap between bars, in the renderer's units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub width: f32,
    pub height: f32,
    pub spacing: f32,
}

impl Geometry {
    pub fn new(width: f32, height: f32, spacing: f32) -> Self {
        Self {
            width,
            height,
            spacing,
        }
    }
}

/// One bar, anchored on the baseline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub x: f32,
    pub width: f32,
    pub height: f32,
}

/// Rendering collaborator driven by the playback controller.
pub trait Visualizer {
    /// Remove whatever is currently drawn.
    fn clear(&mut self);

    fn draw(&mut self, envelope: &Envelope, geometry: &Geometry);
}

/// Lay out one bar per envelope value across `geometry.width`.
///
/// Bars share the width left after `spacing` between neighbours. When the
/// spacing leaves no room the gaps are dropped rather than producing
/// zero-width bars.
pub fn layout_bars(envelope: &Envelope, geometry: &Geometry) -> Vec<Bar> {
    let count = envelope.len();
    if count == 0 || geometry.width <= 0.0 {
        return Vec::new();
    }

    let gaps = (count - 1) as f32;
    let mut spacing = geometry.spacing.max(0.0);
    if geometry.width - spacing * gaps <= 0.0 {
        spacing = 0.0;
    }
    let bar_width = (geometry.width - spacing * gaps) / count as f32;

    envelope
        .values()
        .iter()
        .enumerate()
        .map(|(i, &value)| Bar {
            x: i as f32 * (bar_width + spacing),
            width: bar_width,
            height: value.clamp(0.0, 1.0) * geometry.height,
        })
        .collect()
}

/// Convert amplitude to a terminal block character
pub fn amplitude_to_blocks(amplitude: f32) -> &'static str {
    let normalized = amplitude.abs().min(1.0);
    let index = (normalized * 8.0) as usize;
    BAR_GLYPHS[index.min(BAR_GLYPHS.len() - 1)]
}

/// One-line rendering of an envelope, one glyph per bar.
pub fn sparkline(envelope: &Envelope) -> String {
    envelope
        .values()
        .iter()
        .map(|&v| amplitude_to_blocks(v))
        .collect()
}
