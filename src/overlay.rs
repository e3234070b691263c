//! Overlay planning.
//!
//! Turns annotated sightings into viewport-space drawing
//! instructions: a bordered box per sighting (red until the gate
//! confirms it, green after) and a centered label. This module owns
//! the only coordinate flip in the crate: detection rectangles are
//! normalized with a **bottom-left** origin, render surfaces count
//! pixels from the **top-left**.
//!
//! Nothing here touches a screen. The plan is plain data for
//! whatever renderer the host wires up; the `snapshot` feature adds
//! a rasterizer for captures and tests.

use crate::detect::NormalizedRect;
use crate::stability::Sighting;

/// Fixed pixel height of the label box.
const LABEL_BOX_HEIGHT: f32 = 40.0;

/// Render surface size in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// Rectangle in top-left-origin pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PixelRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverlayColor {
    /// Sighting present but not confirmed.
    Red,
    /// Confirmed: centered and stable.
    Green,
    /// Label text.
    Cyan,
}

impl OverlayColor {
    pub fn rgb(self) -> [u8; 3] {
        match self {
            OverlayColor::Red => [255, 0, 0],
            OverlayColor::Green => [0, 255, 0],
            OverlayColor::Cyan => [0, 255, 255],
        }
    }
}

/// One drawing instruction.
#[derive(Clone, Debug, PartialEq)]
pub enum OverlayShape {
    BorderBox {
        rect: PixelRect,
        color: OverlayColor,
        stroke_width: f32,
    },
    Label {
        text: String,
        rect: PixelRect,
        color: OverlayColor,
        font_size: f32,
    },
}

/// Styling knobs for the plan.
#[derive(Clone, Debug)]
pub struct OverlayConfig {
    pub stroke_width: f32,
    pub font_size: f32,
    pub label_text: String,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            stroke_width: 4.0,
            font_size: 24.0,
            label_text: "yes".to_string(),
        }
    }
}

/// A frame's worth of drawing instructions, in draw order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OverlayPlan {
    pub shapes: Vec<OverlayShape>,
}

impl OverlayPlan {
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

/// Flip a bottom-left normalized rectangle into top-left pixel space.
pub fn to_pixel_rect(rect: NormalizedRect, viewport: Viewport) -> PixelRect {
    let w = viewport.width as f32;
    let h = viewport.height as f32;
    PixelRect {
        x: rect.x * w,
        y: (1.0 - rect.y - rect.height) * h,
        width: rect.width * w,
        height: rect.height * h,
    }
}

/// Build the overlay plan for one frame's sightings.
pub fn plan_overlay(
    config: &OverlayConfig,
    viewport: Viewport,
    sightings: &[Sighting],
) -> OverlayPlan {
    let mut shapes = Vec::with_capacity(sightings.len() * 2);

    for sighting in sightings {
        let rect = sighting.detection.rect;
        let color = if sighting.is_confirmed {
            OverlayColor::Green
        } else {
            OverlayColor::Red
        };

        shapes.push(OverlayShape::BorderBox {
            rect: to_pixel_rect(rect, viewport),
            color,
            stroke_width: config.stroke_width,
        });

        // Label sits vertically centered on the box, full box width.
        let w = viewport.width as f32;
        let h = viewport.height as f32;
        let centered_y = (1.0 - rect.y - rect.height / 2.0) * h - config.font_size / 2.0;
        shapes.push(OverlayShape::Label {
            text: config.label_text.clone(),
            rect: PixelRect {
                x: rect.x * w,
                y: centered_y,
                width: rect.width * w,
                height: LABEL_BOX_HEIGHT,
            },
            color: OverlayColor::Cyan,
            font_size: config.font_size,
        });
    }

    OverlayPlan { shapes }
}

// ----------------------------------------------------------------------------
// Snapshot rasterizer (feature: snapshot)
// ----------------------------------------------------------------------------

/// Rasterize a plan over a frame for captures and tests.
///
/// Border boxes are drawn as nested hollow rectangles to honor the
/// stroke width. Labels are skipped: text rendering needs a bundled
/// font, and snapshots exist to eyeball box placement.
#[cfg(feature = "snapshot")]
pub fn render_snapshot(frame: &crate::Frame, plan: &OverlayPlan) -> anyhow::Result<image::RgbImage> {
    use imageproc::drawing::draw_hollow_rect_mut;
    use imageproc::rect::Rect;

    let mut canvas =
        image::RgbImage::from_raw(frame.width, frame.height, frame.pixels().to_vec())
            .ok_or_else(|| anyhow::anyhow!("frame buffer does not match its dimensions"))?;

    for shape in &plan.shapes {
        let OverlayShape::BorderBox {
            rect,
            color,
            stroke_width,
        } = shape
        else {
            continue;
        };

        let strokes = (*stroke_width).max(1.0) as i32;
        for inset in 0..strokes {
            let x = rect.x as i32 + inset;
            let y = rect.y as i32 + inset;
            let w = (rect.width as i32 - 2 * inset).max(1) as u32;
            let h = (rect.height as i32 - 2 * inset).max(1) as u32;
            draw_hollow_rect_mut(
                &mut canvas,
                Rect::at(x, y).of_size(w, h),
                image::Rgb(color.rgb()),
            );
        }
    }

    Ok(canvas)
}
