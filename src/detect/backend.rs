use anyhow::Result;

use crate::detect::result::Detection;

/// Detection capabilities supported by backends.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DetectionCapability {
    /// Localized detections with labels and bounding boxes.
    ObjectDetection,
    /// Whole-frame label/confidence only (no boxes).
    Classification,
}

/// Detector backend trait.
///
/// Backends receive raw RGB24 pixels and return zero or more labeled
/// detections with normalized bottom-left-origin bounding boxes.
/// Implementations must treat the pixel slice as read-only and must
/// not retain it beyond the `detect` call.
pub trait DetectorBackend: Send {
    /// Backend identifier.
    fn name(&self) -> &'static str;

    /// Returns true when the backend supports a capability.
    fn supports(&self, capability: DetectionCapability) -> bool;

    /// Run detection on a frame.
    fn detect(&mut self, pixels: &[u8], width: u32, height: u32) -> Result<Vec<Detection>>;

    /// Optional warm-up hook.
    fn warm_up(&mut self) -> Result<()> {
        Ok(())
    }
}
