//! Point cloud reconstruction from normalized depth.
//!
//! The triangle topology is static and built once; only vertex content
//! changes per frame. Position and color buffers are allocated at
//! startup and mutated in place under single-writer discipline — no
//! per-frame allocation, no sharing between frames.

use crate::normalize::NormalizedDepth;
use glam::Vec3;
use image::RgbImage;
use parallax_data::GridTopology;
use tracing::debug;

// Fraction of the unit span the grid occupies in local X/Y.
const GRID_SPAN: f32 = 0.9;

/// Rebuilds vertex positions and colors from each frame's depth field.
///
/// Positions are an orthographic placement: grid X/Y centered and scaled
/// to ±[`GRID_SPAN`]/2, normalized depth written directly to Z. This is
/// deliberately not an intrinsics-based unprojection; revisit here if
/// metric reconstruction is ever needed.
pub struct PointCloudBuilder {
    width: u32,
    height: u32,
    topology: GridTopology,
    positions: Vec<Vec3>,
    colors: Vec<Vec3>,
}

impl PointCloudBuilder {
    /// Allocate buffers and build the static topology for a
    /// `width x height` depth grid.
    pub fn new(width: u32, height: u32) -> Self {
        let count = width as usize * height as usize;
        debug!("Point cloud builder for {}x{} grid", width, height);
        Self {
            width,
            height,
            topology: GridTopology::build(width, height),
            positions: vec![Vec3::ZERO; count],
            colors: vec![Vec3::splat(0.8); count],
        }
    }

    /// Rebuild vertices from this frame's normalized depth and the
    /// resampled camera image.
    ///
    /// The color lookup flips the row (`height - 1 - y`): the camera
    /// image's row origin is bottom-left while the depth field's is
    /// top-left, and the flip keeps color and geometry aligned.
    pub fn rebuild(&mut self, normalized: &NormalizedDepth, source: &RgbImage) {
        assert_eq!(
            (normalized.width(), normalized.height()),
            (self.width, self.height),
            "normalized depth does not match builder grid"
        );
        assert_eq!(
            source.dimensions(),
            (self.width, self.height),
            "source image does not match builder grid"
        );

        let cx = self.width as f32 / 2.0;
        let cy = self.height as f32 / 2.0;
        let scale_x = self.width as f32 / GRID_SPAN;
        let scale_y = self.height as f32 / GRID_SPAN;

        for (i, &v) in normalized.values().iter().enumerate() {
            let x = i as u32 % self.width;
            let y = i as u32 / self.width;

            self.positions[i] = Vec3::new(
                (x as f32 - cx) / scale_x,
                (y as f32 - cy) / scale_y,
                v,
            );

            let flipped_y = self.height - 1 - y;
            let pixel = source.get_pixel(x, flipped_y).0;
            self.colors[i] = Vec3::new(
                pixel[0] as f32 / 255.0,
                pixel[1] as f32 / 255.0,
                pixel[2] as f32 / 255.0,
            );
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn topology(&self) -> &GridTopology {
        &self.topology
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn colors(&self) -> &[Vec3] {
        &self.colors
    }
}
