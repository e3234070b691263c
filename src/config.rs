use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::ingest::CameraConfig;
use crate::overlay::{OverlayConfig, Viewport};
use crate::stability::StabilityConfig;

const DEFAULT_CAMERA_URL: &str = "stub://camera";
const DEFAULT_CAMERA_FPS: u32 = 10;
const DEFAULT_CAMERA_WIDTH: u32 = 640;
const DEFAULT_CAMERA_HEIGHT: u32 = 480;
const DEFAULT_BACKEND: &str = "cpu";
const DEFAULT_TARGET_LABEL: &str = "cat";
const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.7;
const DEFAULT_CENTER_BAND: (f32, f32) = (0.4, 0.6);
const DEFAULT_BOX_TOLERANCE: f32 = 0.1;
const DEFAULT_CONFIRM_AFTER: u32 = 5;
const DEFAULT_STROKE_WIDTH: f32 = 4.0;
const DEFAULT_FONT_SIZE: f32 = 24.0;
const DEFAULT_LABEL_TEXT: &str = "yes";

#[derive(Debug, Deserialize, Default)]
struct SpotterConfigFile {
    camera: Option<CameraConfigFile>,
    detector: Option<DetectorConfigFile>,
    stability: Option<StabilityConfigFile>,
    overlay: Option<OverlayConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
struct CameraConfigFile {
    url: Option<String>,
    target_fps: Option<u32>,
    width: Option<u32>,
    height: Option<u32>,
    seed: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct DetectorConfigFile {
    backend: Option<String>,
    model_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default)]
struct StabilityConfigFile {
    target_label: Option<String>,
    confidence_threshold: Option<f32>,
    center_band_low: Option<f32>,
    center_band_high: Option<f32>,
    box_tolerance: Option<f32>,
    confirm_after: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
struct OverlayConfigFile {
    stroke_width: Option<f32>,
    font_size: Option<f32>,
    label_text: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SpotterConfig {
    pub camera: CameraSettings,
    pub detector: DetectorSettings,
    pub stability: StabilitySettings,
    pub overlay: OverlaySettings,
}

#[derive(Debug, Clone)]
pub struct CameraSettings {
    pub url: String,
    pub target_fps: u32,
    pub width: u32,
    pub height: u32,
    pub seed: u64,
}

#[derive(Debug, Clone)]
pub struct DetectorSettings {
    /// Registry name of the backend to prefer ("stub", "cpu", "tract").
    pub backend: String,
    /// Model file for backends that load one.
    pub model_path: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct StabilitySettings {
    pub target_label: String,
    pub confidence_threshold: f32,
    pub center_band: (f32, f32),
    pub box_tolerance: f32,
    pub confirm_after: u32,
}

#[derive(Debug, Clone)]
pub struct OverlaySettings {
    pub stroke_width: f32,
    pub font_size: f32,
    pub label_text: String,
}

impl SpotterConfig {
    /// Load configuration: JSON file named by `CATSPOT_CONFIG` (if
    /// set), then env-var overrides, then validation.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("CATSPOT_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) => Some(read_config_file(Path::new(path))?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: SpotterConfigFile) -> Self {
        let camera = CameraSettings {
            url: file
                .camera
                .as_ref()
                .and_then(|camera| camera.url.clone())
                .unwrap_or_else(|| DEFAULT_CAMERA_URL.to_string()),
            target_fps: file
                .camera
                .as_ref()
                .and_then(|camera| camera.target_fps)
                .unwrap_or(DEFAULT_CAMERA_FPS),
            width: file
                .camera
                .as_ref()
                .and_then(|camera| camera.width)
                .unwrap_or(DEFAULT_CAMERA_WIDTH),
            height: file
                .camera
                .as_ref()
                .and_then(|camera| camera.height)
                .unwrap_or(DEFAULT_CAMERA_HEIGHT),
            seed: file
                .camera
                .as_ref()
                .and_then(|camera| camera.seed)
                .unwrap_or(0),
        };
        let detector = DetectorSettings {
            backend: file
                .detector
                .as_ref()
                .and_then(|detector| detector.backend.clone())
                .unwrap_or_else(|| DEFAULT_BACKEND.to_string()),
            model_path: file.detector.and_then(|detector| detector.model_path),
        };
        let stability = StabilitySettings {
            target_label: file
                .stability
                .as_ref()
                .and_then(|stability| stability.target_label.clone())
                .unwrap_or_else(|| DEFAULT_TARGET_LABEL.to_string()),
            confidence_threshold: file
                .stability
                .as_ref()
                .and_then(|stability| stability.confidence_threshold)
                .unwrap_or(DEFAULT_CONFIDENCE_THRESHOLD),
            center_band: (
                file.stability
                    .as_ref()
                    .and_then(|stability| stability.center_band_low)
                    .unwrap_or(DEFAULT_CENTER_BAND.0),
                file.stability
                    .as_ref()
                    .and_then(|stability| stability.center_band_high)
                    .unwrap_or(DEFAULT_CENTER_BAND.1),
            ),
            box_tolerance: file
                .stability
                .as_ref()
                .and_then(|stability| stability.box_tolerance)
                .unwrap_or(DEFAULT_BOX_TOLERANCE),
            confirm_after: file
                .stability
                .as_ref()
                .and_then(|stability| stability.confirm_after)
                .unwrap_or(DEFAULT_CONFIRM_AFTER),
        };
        let overlay = OverlaySettings {
            stroke_width: file
                .overlay
                .as_ref()
                .and_then(|overlay| overlay.stroke_width)
                .unwrap_or(DEFAULT_STROKE_WIDTH),
            font_size: file
                .overlay
                .as_ref()
                .and_then(|overlay| overlay.font_size)
                .unwrap_or(DEFAULT_FONT_SIZE),
            label_text: file
                .overlay
                .and_then(|overlay| overlay.label_text)
                .unwrap_or_else(|| DEFAULT_LABEL_TEXT.to_string()),
        };
        Self {
            camera,
            detector,
            stability,
            overlay,
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(url) = std::env::var("CATSPOT_CAMERA_URL") {
            if !url.trim().is_empty() {
                self.camera.url = url;
            }
        }
        if let Ok(backend) = std::env::var("CATSPOT_BACKEND") {
            if !backend.trim().is_empty() {
                self.detector.backend = backend;
            }
        }
        if let Ok(label) = std::env::var("CATSPOT_TARGET_LABEL") {
            if !label.trim().is_empty() {
                self.stability.target_label = label;
            }
        }
        if let Ok(confirm) = std::env::var("CATSPOT_CONFIRM_AFTER") {
            let frames: u32 = confirm
                .parse()
                .map_err(|_| anyhow!("CATSPOT_CONFIRM_AFTER must be an integer frame count"))?;
            self.stability.confirm_after = frames;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.camera.target_fps == 0 {
            return Err(anyhow!("camera.target_fps must be at least 1"));
        }
        if self.camera.width == 0 || self.camera.height == 0 {
            return Err(anyhow!("camera dimensions must be non-zero"));
        }
        if self.stability.target_label.trim().is_empty() {
            return Err(anyhow!("stability.target_label must not be empty"));
        }
        if !(0.0..=1.0).contains(&self.stability.confidence_threshold) {
            return Err(anyhow!(
                "stability.confidence_threshold must be within [0, 1]"
            ));
        }
        let (lo, hi) = self.stability.center_band;
        if !(0.0..=1.0).contains(&lo) || !(0.0..=1.0).contains(&hi) || lo >= hi {
            return Err(anyhow!(
                "stability.center_band must satisfy 0 <= low < high <= 1"
            ));
        }
        if !(self.stability.box_tolerance > 0.0) {
            return Err(anyhow!("stability.box_tolerance must be positive"));
        }
        Ok(())
    }

    pub fn camera_config(&self) -> CameraConfig {
        CameraConfig {
            url: self.camera.url.clone(),
            target_fps: self.camera.target_fps,
            width: self.camera.width,
            height: self.camera.height,
            seed: self.camera.seed,
        }
    }

    pub fn stability_config(&self) -> StabilityConfig {
        StabilityConfig {
            target_label: self.stability.target_label.clone(),
            confidence_threshold: self.stability.confidence_threshold,
            center_band: self.stability.center_band,
            box_tolerance: self.stability.box_tolerance,
            confirm_after: self.stability.confirm_after,
        }
    }

    pub fn overlay_config(&self) -> OverlayConfig {
        OverlayConfig {
            stroke_width: self.overlay.stroke_width,
            font_size: self.overlay.font_size,
            label_text: self.overlay.label_text.clone(),
        }
    }

    /// Overlay viewport matches the capture size; a host renderer
    /// scaling to a different surface rebuilds the plan itself.
    pub fn viewport(&self) -> Viewport {
        Viewport {
            width: self.camera.width,
            height: self.camera.height,
        }
    }
}

fn read_config_file(path: &Path) -> Result<SpotterConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = serde_json::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = SpotterConfig::from_file(SpotterConfigFile::default());
        cfg.validate().expect("defaults validate");
        assert_eq!(cfg.camera.url, DEFAULT_CAMERA_URL);
        assert_eq!(cfg.detector.backend, "cpu");
        assert_eq!(cfg.stability.confirm_after, 5);
        assert_eq!(cfg.stability.center_band, (0.4, 0.6));
    }

    #[test]
    fn inverted_center_band_is_rejected() {
        let mut cfg = SpotterConfig::from_file(SpotterConfigFile::default());
        cfg.stability.center_band = (0.6, 0.4);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn zero_fps_is_rejected() {
        let mut cfg = SpotterConfig::from_file(SpotterConfigFile::default());
        cfg.camera.target_fps = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn nan_tolerance_is_rejected() {
        let mut cfg = SpotterConfig::from_file(SpotterConfigFile::default());
        cfg.stability.box_tolerance = f32::NAN;
        assert!(cfg.validate().is_err());
    }
}
