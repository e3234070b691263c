use anyhow::{anyhow, Result};

use crate::detect::backend::{DetectionCapability, DetectorBackend};
use crate::detect::result::{Detection, NormalizedRect};

const DEFAULT_LUMA_THRESHOLD: u8 = 200;
const MIN_BLOB_PIXELS: u32 = 16;

/// CPU backend: bright-blob detector.
///
/// Finds the bounding box of pixels whose luminance exceeds a
/// threshold and reports it as a single detection. Pairs with the
/// synthetic camera, which paints the subject as the only bright
/// region on a dark background; on arbitrary footage it is a crude
/// spotlight detector, not a classifier.
pub struct CpuBackend {
    label: String,
    luma_threshold: u8,
}

impl CpuBackend {
    pub fn new() -> Self {
        Self {
            label: "cat".to_string(),
            luma_threshold: DEFAULT_LUMA_THRESHOLD,
        }
    }

    /// Label to report for the blob.
    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    /// Override the default luminance threshold.
    pub fn with_luma_threshold(mut self, threshold: u8) -> Self {
        self.luma_threshold = threshold;
        self
    }
}

impl Default for CpuBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl DetectorBackend for CpuBackend {
    fn name(&self) -> &'static str {
        "cpu"
    }

    fn supports(&self, capability: DetectionCapability) -> bool {
        matches!(capability, DetectionCapability::ObjectDetection)
    }

    fn detect(&mut self, pixels: &[u8], width: u32, height: u32) -> Result<Vec<Detection>> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(3))
            .ok_or_else(|| anyhow!("frame dimensions overflow"))?;
        if pixels.len() != expected {
            return Err(anyhow!(
                "expected {} RGB bytes for {}x{}, received {}",
                expected,
                width,
                height,
                pixels.len()
            ));
        }
        if width == 0 || height == 0 {
            return Ok(Vec::new());
        }

        // Row 0 is the top of the frame; rows scan downward.
        let mut min_x = u32::MAX;
        let mut max_x = 0u32;
        let mut min_row = u32::MAX;
        let mut max_row = 0u32;
        let mut bright = 0u32;

        for row in 0..height {
            for col in 0..width {
                let idx = ((row * width + col) * 3) as usize;
                let luma = luminance(pixels[idx], pixels[idx + 1], pixels[idx + 2]);
                if luma > self.luma_threshold {
                    bright += 1;
                    min_x = min_x.min(col);
                    max_x = max_x.max(col);
                    min_row = min_row.min(row);
                    max_row = max_row.max(row);
                }
            }
        }

        if bright < MIN_BLOB_PIXELS {
            return Ok(Vec::new());
        }

        let box_w = max_x - min_x + 1;
        let box_h = max_row - min_row + 1;

        // Flip to the bottom-left origin convention: the lowest
        // on-screen row (max_row) becomes the rectangle's y origin.
        let rect = NormalizedRect::new(
            min_x as f32 / width as f32,
            (height - 1 - max_row) as f32 / height as f32,
            box_w as f32 / width as f32,
            box_h as f32 / height as f32,
        );

        // Fill density of the box stands in for model confidence.
        let confidence = (bright as f32 / (box_w * box_h) as f32).min(1.0);

        Ok(vec![Detection::new(&self.label, confidence, rect)])
    }
}

fn luminance(r: u8, g: u8, b: u8) -> u8 {
    // Integer Rec. 601 approximation.
    ((r as u32 * 77 + g as u32 * 150 + b as u32 * 29) >> 8) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dark_frame(width: u32, height: u32) -> Vec<u8> {
        vec![10u8; (width * height * 3) as usize]
    }

    fn paint_block(
        pixels: &mut [u8],
        width: u32,
        col0: u32,
        row0: u32,
        block_w: u32,
        block_h: u32,
    ) {
        for row in row0..row0 + block_h {
            for col in col0..col0 + block_w {
                let idx = ((row * width + col) * 3) as usize;
                pixels[idx] = 255;
                pixels[idx + 1] = 255;
                pixels[idx + 2] = 255;
            }
        }
    }

    #[test]
    fn dark_frame_has_no_detections() -> Result<()> {
        let mut backend = CpuBackend::new();
        let pixels = dark_frame(32, 32);
        assert!(backend.detect(&pixels, 32, 32)?.is_empty());
        Ok(())
    }

    #[test]
    fn bright_block_yields_bottom_left_box() -> Result<()> {
        let mut backend = CpuBackend::new();
        let (width, height) = (100, 100);
        let mut pixels = dark_frame(width, height);
        // 10x10 block with its top-left pixel at column 40, row 50.
        paint_block(&mut pixels, width, 40, 50, 10, 10);

        let dets = backend.detect(&pixels, width, height)?;
        assert_eq!(dets.len(), 1);
        let rect = dets[0].rect;
        assert!((rect.x - 0.40).abs() < 1e-6);
        // Bottom row of the block is row 59; bottom-left y = (100-1-59)/100.
        assert!((rect.y - 0.40).abs() < 1e-6);
        assert!((rect.width - 0.10).abs() < 1e-6);
        assert!((rect.height - 0.10).abs() < 1e-6);
        assert_eq!(dets[0].label, "cat");
        assert!(dets[0].confidence > 0.99);
        Ok(())
    }

    #[test]
    fn tiny_speckle_is_ignored() -> Result<()> {
        let mut backend = CpuBackend::new();
        let (width, height) = (32, 32);
        let mut pixels = dark_frame(width, height);
        paint_block(&mut pixels, width, 5, 5, 3, 3); // 9 px < MIN_BLOB_PIXELS

        assert!(backend.detect(&pixels, width, height)?.is_empty());
        Ok(())
    }

    #[test]
    fn wrong_buffer_length_is_an_error() {
        let mut backend = CpuBackend::new();
        assert!(backend.detect(&[0u8; 10], 32, 32).is_err());
    }
}
