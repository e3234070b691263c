#![cfg(feature = "ingest-jpeg")]

//! JPEG sequence source.
//!
//! Reads a directory of JPEG stills in lexicographic order and
//! serves them as the frame stream. Intended for replaying captured
//! footage through the pipeline; frames are decoded lazily, one per
//! `next_frame` call, and the source reports unhealthy once the
//! sequence is exhausted.

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};

use super::camera::{CameraConfig, CameraStats};
use crate::frame::Frame;

pub struct JpegDirSource {
    config: CameraConfig,
    entries: Vec<PathBuf>,
    cursor: usize,
    frame_count: u64,
}

impl JpegDirSource {
    pub fn new(config: CameraConfig) -> Result<Self> {
        let dir = PathBuf::from(&config.url);
        if !dir.is_dir() {
            return Err(anyhow!(
                "jpeg sequence source expects a directory, got '{}'",
                config.url
            ));
        }

        let mut entries: Vec<PathBuf> = std::fs::read_dir(&dir)
            .with_context(|| format!("reading frame directory {}", dir.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg"))
            })
            .collect();
        entries.sort();

        if entries.is_empty() {
            return Err(anyhow!("no JPEG frames found in {}", dir.display()));
        }

        Ok(Self {
            config,
            entries,
            cursor: 0,
            frame_count: 0,
        })
    }

    pub fn connect(&mut self) -> Result<()> {
        log::info!(
            "CameraSource: connected to {} ({} JPEG frames)",
            self.config.url,
            self.entries.len()
        );
        Ok(())
    }

    pub fn next_frame(&mut self) -> Result<Frame> {
        let path = self
            .entries
            .get(self.cursor)
            .ok_or_else(|| anyhow!("frame sequence exhausted"))?;
        self.cursor += 1;

        let decoded = image::open(path)
            .with_context(|| format!("decoding {}", path.display()))?
            .to_rgb8();
        let (width, height) = decoded.dimensions();

        let index = self.frame_count;
        self.frame_count += 1;
        Frame::new(decoded.into_raw(), width, height, index)
    }

    pub fn is_healthy(&self) -> bool {
        self.cursor < self.entries.len()
    }

    pub fn stats(&self) -> CameraStats {
        CameraStats {
            frames_captured: self.frame_count,
            url: self.config.url.clone(),
        }
    }
}
