//! catspot - on-device cat spotting.
//!
//! Per captured frame the pipeline runs an object-detection backend,
//! feeds the qualifying detections through a centering/stability
//! gate, and produces overlay drawing instructions plus a
//! [`PresenceEvent`] whenever a sighting is first confirmed.
//!
//! Coordinate convention, everywhere except `overlay`: rectangles
//! are normalized fractions of the frame with a bottom-left origin.
//!
//! The interesting policy lives in [`stability`]: a sighting is
//! *centered* when its box center falls in an exclusive window
//! around frame center, and *confirmed* once it has stayed centered
//! and within a per-axis tolerance of the previous frame's box for
//! more than a configured number of consecutive frames.

use serde::{Deserialize, Serialize};

pub mod config;
pub mod detect;
pub mod frame;
pub mod ingest;
pub mod overlay;
pub mod pipeline;
pub mod stability;

pub use config::SpotterConfig;
pub use detect::{
    BackendRegistry, CpuBackend, Detection, DetectionCapability, DetectorBackend, NormalizedRect,
    StubBackend,
};
#[cfg(feature = "backend-tract")]
pub use detect::TractBackend;
pub use frame::Frame;
pub use ingest::{CameraConfig, CameraSource, CameraStats};
pub use overlay::{OverlayColor, OverlayConfig, OverlayPlan, OverlayShape, Viewport};
pub use pipeline::{FrameReport, Spotter, SpotterStats};
pub use stability::{assess_frame, GateState, Sighting, StabilityConfig};

/// Emitted once per confirmation: the subject held still, centered,
/// long enough for the gate to trust it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PresenceEvent {
    pub label: String,
    /// Confidence of the sighting that crossed the threshold.
    pub confidence: f32,
    pub rect: NormalizedRect,
    /// Capture index of the confirming frame.
    pub frame_index: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presence_event_round_trips_as_json() {
        let event = PresenceEvent {
            label: "cat".to_string(),
            confidence: 0.92,
            rect: NormalizedRect::new(0.45, 0.45, 0.1, 0.1),
            frame_index: 17,
        };

        let json = serde_json::to_string(&event).expect("serialize");
        let back: PresenceEvent = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.label, event.label);
        assert_eq!(back.frame_index, 17);
        assert_eq!(back.rect, event.rect);
    }
}
