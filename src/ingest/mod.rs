//! Frame ingestion sources.
//!
//! This module produces the [`Frame`](crate::Frame) stream the
//! pipeline consumes:
//! - Synthetic camera (`stub://` URLs): paints a scripted bright
//!   subject on a dark background, sized so the CPU blob backend can
//!   find it. Used by tests and the demo binary.
//! - JPEG sequence directories (feature: ingest-jpeg): local
//!   directory of numbered stills, decoded in order.
//!
//! Real capture hardware is out of scope; a platform capture stack
//! slots in behind the same `connect`/`next_frame` surface. Sources
//! deliver frames at whatever rate the caller polls them; pacing is
//! the run loop's job.

pub mod camera;
#[cfg(feature = "ingest-jpeg")]
pub mod jpeg_dir;

pub use camera::{CameraConfig, CameraSource, CameraStats};
