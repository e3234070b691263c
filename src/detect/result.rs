use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in normalized frame coordinates.
///
/// All components are fractions of frame width/height in [0, 1].
/// The origin is the **bottom-left** corner of the frame; `overlay`
/// is the only module that converts to top-left pixel space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl NormalizedRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Center point of the rectangle, still in normalized coordinates.
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// One labeled detection produced by a backend for a single frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    pub label: String,
    /// Confidence in [0, 1].
    pub confidence: f32,
    pub rect: NormalizedRect,
}

impl Detection {
    pub fn new(label: &str, confidence: f32, rect: NormalizedRect) -> Self {
        Self {
            label: label.to_string(),
            confidence,
            rect,
        }
    }
}
