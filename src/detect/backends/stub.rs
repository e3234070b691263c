use anyhow::Result;
use sha2::{Digest, Sha256};

use crate::detect::backend::{DetectionCapability, DetectorBackend};
use crate::detect::result::{Detection, NormalizedRect};

/// Stub backend for tests and the demo binary.
///
/// Plays back a scripted sequence of detections, one script step per
/// distinct frame. A frame whose pixels hash identically to the
/// previous one replays the previous step instead of advancing, so
/// duplicated frames from a stalled source do not fast-forward the
/// script.
pub struct StubBackend {
    script: Vec<Vec<Detection>>,
    step: usize,
    last_hash: Option<[u8; 32]>,
}

impl StubBackend {
    /// Default script: a cat walks in from the lower left, sits
    /// centered and still long enough to confirm, then wanders off.
    pub fn new() -> Self {
        Self::with_script(walkabout_script())
    }

    /// Play back an explicit per-frame script. Steps past the end of
    /// the script produce no detections.
    pub fn with_script(script: Vec<Vec<Detection>>) -> Self {
        Self {
            script,
            step: 0,
            last_hash: None,
        }
    }
}

impl Default for StubBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl DetectorBackend for StubBackend {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn supports(&self, capability: DetectionCapability) -> bool {
        matches!(capability, DetectionCapability::ObjectDetection)
    }

    fn detect(&mut self, pixels: &[u8], _width: u32, _height: u32) -> Result<Vec<Detection>> {
        let current_hash: [u8; 32] = Sha256::digest(pixels).into();
        let advanced = match self.last_hash {
            Some(prev) => prev != current_hash,
            None => true,
        };
        self.last_hash = Some(current_hash);

        let index = if advanced {
            let index = self.step;
            self.step += 1;
            index
        } else {
            self.step.saturating_sub(1)
        };

        Ok(self.script.get(index).cloned().unwrap_or_default())
    }
}

fn cat(confidence: f32, x: f32, y: f32) -> Vec<Detection> {
    vec![Detection::new(
        "cat",
        confidence,
        NormalizedRect::new(x, y, 0.1, 0.1),
    )]
}

fn walkabout_script() -> Vec<Vec<Detection>> {
    let mut script = Vec::new();

    // Approach: each hop moves more than the stability tolerance.
    script.push(cat(0.82, 0.05, 0.10));
    script.push(cat(0.84, 0.20, 0.22));
    script.push(cat(0.87, 0.33, 0.34));

    // Settled dead center; identical boxes, so the run can confirm.
    for _ in 0..8 {
        script.push(cat(0.92, 0.45, 0.45));
    }

    // Wanders off toward the top edge, then out of frame.
    script.push(cat(0.88, 0.48, 0.62));
    script.push(cat(0.78, 0.55, 0.80));
    script.push(Vec::new());

    script
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_frames_advance_the_script() -> Result<()> {
        let mut backend = StubBackend::with_script(vec![
            cat(0.9, 0.1, 0.1),
            cat(0.9, 0.2, 0.2),
        ]);

        let first = backend.detect(b"frame-a", 4, 4)?;
        let second = backend.detect(b"frame-b", 4, 4)?;
        assert_eq!(first[0].rect.x, 0.1);
        assert_eq!(second[0].rect.x, 0.2);
        Ok(())
    }

    #[test]
    fn duplicate_frames_replay_the_current_step() -> Result<()> {
        let mut backend = StubBackend::with_script(vec![
            cat(0.9, 0.1, 0.1),
            cat(0.9, 0.2, 0.2),
        ]);

        let first = backend.detect(b"frame-a", 4, 4)?;
        let replay = backend.detect(b"frame-a", 4, 4)?;
        assert_eq!(first, replay);

        // The next distinct frame picks up where the script left off.
        let second = backend.detect(b"frame-b", 4, 4)?;
        assert_eq!(second[0].rect.x, 0.2);
        Ok(())
    }

    #[test]
    fn script_exhaustion_yields_no_detections() -> Result<()> {
        let mut backend = StubBackend::with_script(vec![cat(0.9, 0.1, 0.1)]);
        backend.detect(b"frame-a", 4, 4)?;
        let after = backend.detect(b"frame-b", 4, 4)?;
        assert!(after.is_empty());
        Ok(())
    }

    #[test]
    fn default_script_holds_a_centered_stretch() -> Result<()> {
        let mut backend = StubBackend::new();
        let mut centered_identical = 0u32;
        let mut previous: Option<NormalizedRect> = None;

        for i in 0..16u32 {
            let frame = format!("frame-{}", i);
            let dets = backend.detect(frame.as_bytes(), 4, 4)?;
            let rect = dets.first().map(|d| d.rect);
            if let (Some(prev), Some(rect)) = (previous, rect) {
                if prev == rect {
                    centered_identical += 1;
                }
            }
            previous = rect;
        }

        // Enough identical consecutive boxes for a confirmation run.
        assert!(centered_identical >= 6);
        Ok(())
    }
}
