//! Frame container.
//!
//! `Frame` is the unit of work handed from ingest to the pipeline:
//! owned RGB24 pixels plus dimensions and a running capture index.
//! The detection layer consumes the pixels read-only; nothing in the
//! crate retains a frame beyond the call that processes it.

use anyhow::{anyhow, Result};

/// One captured RGB24 frame.
#[derive(Clone, Debug)]
pub struct Frame {
    pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Monotonic capture index assigned by the source.
    pub index: u64,
}

impl Frame {
    /// Build a frame, validating that the buffer length matches the
    /// dimensions (`width * height * 3`).
    pub fn new(pixels: Vec<u8>, width: u32, height: u32, index: u64) -> Result<Self> {
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
        Ok(Self {
            pixels,
            width,
            height,
            index,
        })
    }

    /// Read-only pixel access for detection backends.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn byte_len(&self) -> usize {
        self.pixels.len()
    }
}
