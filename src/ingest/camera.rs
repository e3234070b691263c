use anyhow::{anyhow, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::frame::Frame;

/// Configuration for a camera source.
#[derive(Clone, Debug)]
pub struct CameraConfig {
    /// Source URL. `stub://<name>` selects the synthetic camera;
    /// a plain local path selects the JPEG sequence source
    /// (feature: ingest-jpeg).
    pub url: String,
    /// Target frame rate (frames per second). The run loop paces to
    /// this; sources deliver on demand.
    pub target_fps: u32,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Seed for the synthetic camera's sub-tolerance jitter.
    pub seed: u64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            url: "stub://camera".to_string(),
            target_fps: 10,
            width: 640,
            height: 480,
            seed: 0,
        }
    }
}

/// Camera frame source.
pub struct CameraSource {
    backend: CameraBackend,
}

enum CameraBackend {
    Synthetic(SyntheticCamera),
    #[cfg(feature = "ingest-jpeg")]
    JpegDir(super::jpeg_dir::JpegDirSource),
}

impl CameraSource {
    pub fn new(config: CameraConfig) -> Result<Self> {
        if config.width == 0 || config.height == 0 {
            return Err(anyhow!("camera dimensions must be non-zero"));
        }
        if config.url.starts_with("stub://") {
            return Ok(Self {
                backend: CameraBackend::Synthetic(SyntheticCamera::new(config)),
            });
        }
        if config.url.contains("://") {
            return Err(anyhow!(
                "unsupported camera url '{}': only stub:// and local paths are handled",
                config.url
            ));
        }
        #[cfg(feature = "ingest-jpeg")]
        {
            Ok(Self {
                backend: CameraBackend::JpegDir(super::jpeg_dir::JpegDirSource::new(config)?),
            })
        }
        #[cfg(not(feature = "ingest-jpeg"))]
        {
            Err(anyhow!(
                "local frame sequences require the ingest-jpeg feature"
            ))
        }
    }

    /// Connect to the source.
    pub fn connect(&mut self) -> Result<()> {
        match &mut self.backend {
            CameraBackend::Synthetic(source) => source.connect(),
            #[cfg(feature = "ingest-jpeg")]
            CameraBackend::JpegDir(source) => source.connect(),
        }
    }

    /// Capture the next frame.
    pub fn next_frame(&mut self) -> Result<Frame> {
        match &mut self.backend {
            CameraBackend::Synthetic(source) => source.next_frame(),
            #[cfg(feature = "ingest-jpeg")]
            CameraBackend::JpegDir(source) => source.next_frame(),
        }
    }

    /// Check if the source is healthy.
    pub fn is_healthy(&self) -> bool {
        match &self.backend {
            CameraBackend::Synthetic(source) => source.is_healthy(),
            #[cfg(feature = "ingest-jpeg")]
            CameraBackend::JpegDir(source) => source.is_healthy(),
        }
    }

    /// Get frame statistics.
    pub fn stats(&self) -> CameraStats {
        match &self.backend {
            CameraBackend::Synthetic(source) => source.stats(),
            #[cfg(feature = "ingest-jpeg")]
            CameraBackend::JpegDir(source) => source.stats(),
        }
    }
}

/// Statistics for a camera source.
#[derive(Clone, Debug)]
pub struct CameraStats {
    pub frames_captured: u64,
    pub url: String,
}

// ----------------------------------------------------------------------------
// Synthetic camera (stub://) for tests and the demo
// ----------------------------------------------------------------------------

const BACKGROUND_LUMA: u8 = 12;
const SUBJECT_LUMA: u8 = 235;
/// Subject edge length as a fraction of the frame.
const SUBJECT_SIZE: f32 = 0.1;
/// Jitter amplitude while settled, well below the gate's tolerance.
const SETTLE_JITTER: f32 = 0.01;

struct SyntheticCamera {
    config: CameraConfig,
    frame_count: u64,
    rng: StdRng,
}

impl SyntheticCamera {
    fn new(config: CameraConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self {
            config,
            frame_count: 0,
            rng,
        }
    }

    fn connect(&mut self) -> Result<()> {
        log::info!(
            "CameraSource: connected to {} (synthetic)",
            self.config.url
        );
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Frame> {
        let step = self.frame_count;
        self.frame_count += 1;

        let pixels = match self.subject_center(step) {
            Some((cx, cy)) => self.paint(cx, cy),
            None => self.background(),
        };

        Frame::new(pixels, self.config.width, self.config.height, step)
    }

    /// Scripted subject path in bottom-left normalized coordinates:
    /// walk in from the lower left, settle centered with a little
    /// jitter, wander off the top, gone.
    fn subject_center(&mut self, step: u64) -> Option<(f32, f32)> {
        match step {
            0 => Some((0.10, 0.15)),
            1 => Some((0.25, 0.27)),
            2 => Some((0.38, 0.39)),
            3..=10 => {
                let jx: f32 = self.rng.gen_range(-SETTLE_JITTER..=SETTLE_JITTER);
                let jy: f32 = self.rng.gen_range(-SETTLE_JITTER..=SETTLE_JITTER);
                Some((0.5 + jx, 0.5 + jy))
            }
            11 => Some((0.53, 0.67)),
            12 => Some((0.60, 0.85)),
            _ => None,
        }
    }

    fn background(&self) -> Vec<u8> {
        let len = (self.config.width * self.config.height * 3) as usize;
        vec![BACKGROUND_LUMA; len]
    }

    fn paint(&self, cx: f32, cy: f32) -> Vec<u8> {
        let width = self.config.width;
        let height = self.config.height;
        let mut pixels = self.background();

        let half = SUBJECT_SIZE / 2.0;
        let left = ((cx - half) * width as f32).round().max(0.0) as u32;
        let right = (((cx + half) * width as f32).round() as u32).min(width);
        // Bottom-left normalized y maps to rows counted from the
        // bottom of the image.
        let top_row = ((1.0 - (cy + half)) * height as f32).round().max(0.0) as u32;
        let bottom_row = ((((1.0 - (cy - half)) * height as f32).round()) as u32).min(height);

        for row in top_row..bottom_row {
            for col in left..right {
                let idx = ((row * width + col) * 3) as usize;
                pixels[idx] = SUBJECT_LUMA;
                pixels[idx + 1] = SUBJECT_LUMA;
                pixels[idx + 2] = SUBJECT_LUMA;
            }
        }

        pixels
    }

    fn is_healthy(&self) -> bool {
        true
    }

    fn stats(&self) -> CameraStats {
        CameraStats {
            frames_captured: self.frame_count,
            url: self.config.url.clone(),
        }
    }
}
