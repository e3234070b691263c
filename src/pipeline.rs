//! Per-frame orchestration.
//!
//! `Spotter` wires the pieces together: a detection backend from the
//! registry, the stability gate, and overlay planning. One call per
//! captured frame, on one worker; the gate state lives here and is
//! threaded through each call explicitly.

use anyhow::Result;

use crate::detect::{BackendRegistry, DetectionCapability};
use crate::frame::Frame;
use crate::overlay::{plan_overlay, OverlayConfig, OverlayPlan, Viewport};
use crate::stability::{assess_frame, GateState, Sighting, StabilityConfig};
use crate::PresenceEvent;

/// Everything the pipeline produced for one frame.
#[derive(Clone, Debug)]
pub struct FrameReport {
    pub frame_index: u64,
    pub sightings: Vec<Sighting>,
    pub overlay: OverlayPlan,
    /// At most one per frame: emitted on the not-confirmed ->
    /// confirmed edge, not on every confirmed frame.
    pub events: Vec<PresenceEvent>,
}

/// Running counters for health logging.
#[derive(Clone, Copy, Debug, Default)]
pub struct SpotterStats {
    pub frames_processed: u64,
    pub events_emitted: u64,
}

pub struct Spotter {
    registry: BackendRegistry,
    stability: StabilityConfig,
    overlay: OverlayConfig,
    viewport: Viewport,
    state: GateState,
    confirmed_live: bool,
    stats: SpotterStats,
}

impl Spotter {
    pub fn new(
        registry: BackendRegistry,
        stability: StabilityConfig,
        overlay: OverlayConfig,
        viewport: Viewport,
    ) -> Self {
        Self {
            registry,
            stability,
            overlay,
            viewport,
            state: GateState::default(),
            confirmed_live: false,
            stats: SpotterStats::default(),
        }
    }

    /// Process one frame: detect, gate, plan the overlay, emit a
    /// presence event on the confirmation edge.
    pub fn process(&mut self, frame: &Frame) -> Result<FrameReport> {
        let detections = self.registry.detect_with_capability(
            DetectionCapability::ObjectDetection,
            frame.pixels(),
            frame.width,
            frame.height,
        )?;

        let (state, sightings) = assess_frame(&self.stability, self.state, &detections);
        self.state = state;

        let confirmed_now = sightings.iter().any(|s| s.is_confirmed);
        let mut events = Vec::new();
        if confirmed_now && !self.confirmed_live {
            // First confirmed sighting carries the event payload.
            if let Some(sighting) = sightings.iter().find(|s| s.is_confirmed) {
                let event = PresenceEvent {
                    label: sighting.detection.label.clone(),
                    confidence: sighting.detection.confidence,
                    rect: sighting.detection.rect,
                    frame_index: frame.index,
                };
                log::info!(
                    "presence confirmed: {} conf={:.2} frame={}",
                    event.label,
                    event.confidence,
                    event.frame_index
                );
                self.stats.events_emitted += 1;
                events.push(event);
            }
        }
        self.confirmed_live = confirmed_now;

        let overlay = plan_overlay(&self.overlay, self.viewport, &sightings);

        self.stats.frames_processed += 1;
        Ok(FrameReport {
            frame_index: frame.index,
            sightings,
            overlay,
            events,
        })
    }

    pub fn stats(&self) -> SpotterStats {
        self.stats
    }

    /// Current gate state, for health logging and tests.
    pub fn gate_state(&self) -> GateState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::{Detection, NormalizedRect, StubBackend};
    use crate::overlay::{OverlayColor, OverlayShape};

    fn centered_cat() -> Vec<Detection> {
        vec![Detection::new(
            "cat",
            0.9,
            NormalizedRect::new(0.45, 0.45, 0.1, 0.1),
        )]
    }

    fn spotter_with_script(script: Vec<Vec<Detection>>) -> Spotter {
        let mut registry = BackendRegistry::new();
        registry.register(StubBackend::with_script(script));
        Spotter::new(
            registry,
            StabilityConfig::default(),
            OverlayConfig::default(),
            Viewport {
                width: 640,
                height: 480,
            },
        )
    }

    fn frame(index: u64) -> Frame {
        // Distinct pixels per index so the stub backend advances.
        let pixels = vec![index as u8; 2 * 2 * 3];
        Frame::new(pixels, 2, 2, index).expect("frame")
    }

    #[test]
    fn confirmation_edge_emits_exactly_one_event() -> Result<()> {
        let script = vec![centered_cat(); 10];
        let mut spotter = spotter_with_script(script);

        let mut all_events = Vec::new();
        for i in 0..10u64 {
            let report = spotter.process(&frame(i))?;
            all_events.extend(report.events);
        }

        assert_eq!(all_events.len(), 1);
        // Runs 1..=6 over frames 0..=5: the edge lands on frame 5.
        assert_eq!(all_events[0].frame_index, 5);
        assert_eq!(all_events[0].label, "cat");
        assert_eq!(spotter.stats().events_emitted, 1);
        assert_eq!(spotter.stats().frames_processed, 10);
        Ok(())
    }

    #[test]
    fn losing_and_regaining_confirmation_emits_again() -> Result<()> {
        let mut script = vec![centered_cat(); 7];
        script.push(Vec::new()); // subject lost for one frame
        script.extend(vec![centered_cat(); 7]);
        let mut spotter = spotter_with_script(script);

        let mut edges = Vec::new();
        for i in 0..15u64 {
            let report = spotter.process(&frame(i))?;
            if !report.events.is_empty() {
                edges.push(i);
            }
        }

        // Second edge: the empty frame is a no-op on the gate state,
        // so confirmation returns immediately once the cat is back.
        assert_eq!(edges, vec![5, 8]);
        Ok(())
    }

    #[test]
    fn overlay_goes_green_once_confirmed() -> Result<()> {
        let script = vec![centered_cat(); 8];
        let mut spotter = spotter_with_script(script);

        let mut last = None;
        for i in 0..8u64 {
            last = Some(spotter.process(&frame(i))?);
        }
        let report = last.expect("report");

        assert!(matches!(
            report.overlay.shapes[0],
            OverlayShape::BorderBox {
                color: OverlayColor::Green,
                ..
            }
        ));
        Ok(())
    }

    #[test]
    fn empty_frames_produce_empty_reports() -> Result<()> {
        let mut spotter = spotter_with_script(vec![Vec::new(), Vec::new()]);
        let report = spotter.process(&frame(0))?;
        assert!(report.sightings.is_empty());
        assert!(report.overlay.is_empty());
        assert!(report.events.is_empty());
        Ok(())
    }
}
