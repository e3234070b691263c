//! Centering and stability gate.
//!
//! Decides, frame by frame, whether the highest-priority subject is
//! centered in the viewport and has held roughly the same position
//! and size long enough to count as a deliberate, steady presence.
//! The gate is a pure function over an explicit [`GateState`] value:
//! callers thread the state through each frame, one frame at a time
//! (the state is a plain value and is not safe to update from two
//! frames concurrently).

use crate::detect::{Detection, NormalizedRect};

/// Thresholds for the gate. [`StabilityConfig::default`] matches the
/// shipped tuning: cats above 0.7 confidence, a 20%-wide center
/// window, 0.1 per-axis box tolerance, confirmation after a run of
/// more than 5 stable frames.
#[derive(Clone, Debug)]
pub struct StabilityConfig {
    /// Class label the gate cares about; everything else is ignored.
    pub target_label: String,
    /// Detections at or below this confidence are ignored (strict >).
    pub confidence_threshold: f32,
    /// Exclusive band the box center must fall in, on both axes.
    pub center_band: (f32, f32),
    /// Per-axis |delta| bound (strict <) for origin and size between
    /// consecutive frames.
    pub box_tolerance: f32,
    /// A sighting is confirmed once the stable run exceeds this count.
    pub confirm_after: u32,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            target_label: "cat".to_string(),
            confidence_threshold: 0.7,
            center_band: (0.4, 0.6),
            box_tolerance: 0.1,
            confirm_after: 5,
        }
    }
}

/// Per-stream gate state, threaded through [`assess_frame`].
///
/// `previous_box` is the baseline for the next frame's tolerance
/// comparison. It updates on every qualifying detection, centered or
/// not. The state is never reset implicitly: losing the subject for
/// any number of frames leaves both fields untouched.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GateState {
    pub previous_box: Option<NormalizedRect>,
    pub consecutive_stable: u32,
}

/// One qualifying detection, annotated by the gate.
#[derive(Clone, Debug, PartialEq)]
pub struct Sighting {
    pub detection: Detection,
    pub is_centered: bool,
    pub is_confirmed: bool,
}

/// Run one frame's detections through the gate.
///
/// Qualifying detections (matching label, confidence strictly above
/// threshold) are folded through the state in input order; the
/// returned state reflects the last of them. A frame with no
/// qualifying detections returns the state unchanged and no
/// sightings.
///
/// All comparisons are total: NaN centers are not centered, NaN
/// deltas are not within tolerance, and nothing here panics.
pub fn assess_frame(
    config: &StabilityConfig,
    mut state: GateState,
    detections: &[Detection],
) -> (GateState, Vec<Sighting>) {
    let mut sightings = Vec::new();

    for detection in detections {
        if detection.label != config.target_label
            || !(detection.confidence > config.confidence_threshold)
        {
            continue;
        }

        let rect = detection.rect;
        let is_centered = centered(config, rect);

        if is_centered {
            if stable_against(config, rect, state.previous_box) {
                state.consecutive_stable += 1;
            } else {
                state.consecutive_stable = 0;
            }
        }

        let is_confirmed = is_centered && state.consecutive_stable > config.confirm_after;

        // Baseline updates even off-center; a near-center box that
        // drifts in on the next frame compares against this one.
        state.previous_box = Some(rect);

        sightings.push(Sighting {
            detection: detection.clone(),
            is_centered,
            is_confirmed,
        });
    }

    (state, sightings)
}

fn centered(config: &StabilityConfig, rect: NormalizedRect) -> bool {
    let (lo, hi) = config.center_band;
    let (cx, cy) = rect.center();
    cx > lo && cx < hi && cy > lo && cy < hi
}

/// Within-tolerance check against the previous frame's box. A missing
/// baseline counts as stable: the first centered sighting starts the
/// run at 1.
fn stable_against(
    config: &StabilityConfig,
    rect: NormalizedRect,
    previous: Option<NormalizedRect>,
) -> bool {
    let Some(prev) = previous else {
        return true;
    };
    let tol = config.box_tolerance;

    (rect.x - prev.x).abs() < tol
        && (rect.y - prev.y).abs() < tol
        && (rect.width - prev.width).abs() < tol
        && (rect.height - prev.height).abs() < tol
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cat(confidence: f32, rect: NormalizedRect) -> Detection {
        Detection::new("cat", confidence, rect)
    }

    fn centered_box() -> NormalizedRect {
        // center = (0.5, 0.5)
        NormalizedRect::new(0.45, 0.45, 0.1, 0.1)
    }

    #[test]
    fn exact_center_is_centered() {
        let config = StabilityConfig::default();
        let (_, sightings) = assess_frame(
            &config,
            GateState::default(),
            &[cat(0.9, centered_box())],
        );
        assert!(sightings[0].is_centered);
    }

    #[test]
    fn center_band_bounds_are_exclusive() {
        let config = StabilityConfig::default();
        // center.x = 0.39 -> outside the (0.4, 0.6) band
        let rect = NormalizedRect::new(0.34, 0.45, 0.1, 0.1);
        let (_, sightings) = assess_frame(&config, GateState::default(), &[cat(0.9, rect)]);
        assert!(!sightings[0].is_centered);

        // center.x = 0.4 exactly is also out (strict >)
        let rect = NormalizedRect::new(0.35, 0.45, 0.1, 0.1);
        let (_, sightings) = assess_frame(&config, GateState::default(), &[cat(0.9, rect)]);
        assert!(!sightings[0].is_centered);
    }

    #[test]
    fn six_identical_centered_frames_confirm_on_the_sixth() {
        let config = StabilityConfig::default();
        let mut state = GateState::default();

        for frame in 1..=6u32 {
            let (next, sightings) =
                assess_frame(&config, state, &[cat(0.9, centered_box())]);
            state = next;
            assert_eq!(state.consecutive_stable, frame);
            let expect_confirmed = frame >= 6;
            assert_eq!(
                sightings[0].is_confirmed, expect_confirmed,
                "frame {}",
                frame
            );
        }
    }

    #[test]
    fn off_tolerance_frame_resets_the_run() {
        let config = StabilityConfig::default();
        let mut state = GateState::default();

        for _ in 0..4 {
            let (next, _) = assess_frame(&config, state, &[cat(0.9, centered_box())]);
            state = next;
        }
        assert_eq!(state.consecutive_stable, 4);

        // Still centered, but the box doubled in width: |delta w| =
        // 0.1 is not strictly below the tolerance.
        let jumped = NormalizedRect::new(0.40, 0.45, 0.20, 0.10);
        assert!(centered(&config, jumped));
        let (next, sightings) = assess_frame(&config, state, &[cat(0.9, jumped)]);
        state = next;
        assert_eq!(state.consecutive_stable, 0);
        assert!(!sightings[0].is_confirmed);

        // The next frame matching the new baseline counts from 1.
        let (next, _) = assess_frame(&config, state, &[cat(0.9, jumped)]);
        assert_eq!(next.consecutive_stable, 1);
    }

    #[test]
    fn non_centered_detections_never_touch_the_counter() {
        let config = StabilityConfig::default();
        let mut state = GateState::default();

        for _ in 0..3 {
            let (next, _) = assess_frame(&config, state, &[cat(0.9, centered_box())]);
            state = next;
        }
        assert_eq!(state.consecutive_stable, 3);

        // Identical size, parked in a corner: similar to the previous
        // box or not, the counter must not move.
        let corner = NormalizedRect::new(0.05, 0.05, 0.1, 0.1);
        let (next, sightings) = assess_frame(&config, state, &[cat(0.9, corner)]);
        assert_eq!(next.consecutive_stable, 3);
        assert!(!sightings[0].is_centered);
        assert!(!sightings[0].is_confirmed);

        // But it did move the baseline (preserved quirk), so a return
        // to center from far away is a fresh comparison against the
        // corner box.
        assert_eq!(next.previous_box, Some(corner));
    }

    #[test]
    fn below_threshold_and_wrong_label_are_ignored() {
        let config = StabilityConfig::default();
        let state = GateState {
            previous_box: Some(centered_box()),
            consecutive_stable: 7,
        };

        let (next, sightings) = assess_frame(
            &config,
            state,
            &[
                cat(0.7, centered_box()), // exactly at threshold: strict >
                Detection::new("dog", 0.99, centered_box()),
            ],
        );
        assert!(sightings.is_empty());
        assert_eq!(next, state);
    }

    #[test]
    fn empty_frame_is_a_no_op_on_state() {
        let config = StabilityConfig::default();
        let state = GateState {
            previous_box: Some(centered_box()),
            consecutive_stable: 4,
        };
        let (next, sightings) = assess_frame(&config, state, &[]);
        assert!(sightings.is_empty());
        assert_eq!(next, state);
    }

    #[test]
    fn centering_is_a_pure_function_of_the_box() {
        let config = StabilityConfig::default();
        let rect = NormalizedRect::new(0.41, 0.52, 0.05, 0.05);
        let mut verdicts = Vec::new();
        for _ in 0..5 {
            let (_, sightings) =
                assess_frame(&config, GateState::default(), &[cat(0.9, rect)]);
            verdicts.push(sightings[0].is_centered);
        }
        assert!(verdicts.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn nan_boxes_do_not_panic_and_do_not_center() {
        let config = StabilityConfig::default();
        let rect = NormalizedRect::new(f32::NAN, 0.45, 0.1, 0.1);
        let (next, sightings) = assess_frame(&config, GateState::default(), &[cat(0.9, rect)]);
        assert!(!sightings[0].is_centered);
        assert!(!sightings[0].is_confirmed);
        // NaN still becomes the baseline; the following comparison is
        // simply never within tolerance.
        let (next, sightings) =
            assess_frame(&config, next, &[cat(0.9, centered_box())]);
        assert!(sightings[0].is_centered);
        assert_eq!(next.consecutive_stable, 0);
    }

    #[test]
    fn multiple_cats_fold_through_in_input_order() {
        let config = StabilityConfig::default();
        let state = GateState {
            previous_box: Some(centered_box()),
            consecutive_stable: 2,
        };

        let far = NormalizedRect::new(0.44, 0.46, 0.12, 0.1);
        let (next, sightings) = assess_frame(
            &config,
            state,
            &[cat(0.9, centered_box()), cat(0.8, far)],
        );

        assert_eq!(sightings.len(), 2);
        // First cat extends the run; second is compared against the
        // first cat's box, stays within tolerance, and extends again.
        assert_eq!(next.consecutive_stable, 4);
        assert_eq!(next.previous_box, Some(far));
    }
}
