//! Depth normalization and gradient coloring.

use glam::Vec3;
use image::{Rgb, RgbImage};
use parallax_data::{DepthField, DepthGradient};
use tracing::trace;

/// Every element maps here when the frame's depth range collapses.
pub const DEGENERATE_VALUE: f32 = 0.5;

/// Depth values rescaled to [0, 1] against the current frame's range.
///
/// Recomputed from scratch every frame; carries the observed raw range
/// for logging and diagnostics.
#[derive(Debug, Clone)]
pub struct NormalizedDepth {
    width: u32,
    height: u32,
    values: Vec<f32>,
    /// Minimum raw depth observed this frame.
    pub raw_min: f32,
    /// Maximum raw depth observed this frame.
    pub raw_max: f32,
}

impl NormalizedDepth {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Rescales raw depth fields to [0, 1] and maps them onto the gradient.
#[derive(Debug, Clone)]
pub struct DepthNormalizer {
    epsilon: f32,
    gradient: DepthGradient,
}

impl DepthNormalizer {
    pub fn new(epsilon: f32, gradient: DepthGradient) -> Self {
        Self { epsilon, gradient }
    }

    pub fn gradient(&self) -> &DepthGradient {
        &self.gradient
    }

    /// Rescale a raw depth field against its own min/max.
    ///
    /// One pass over the field finds the range; a range below epsilon is
    /// a constant-depth frame and every element maps to
    /// [`DEGENERATE_VALUE`] instead of dividing by near-zero.
    pub fn normalize(&self, depth: &DepthField) -> NormalizedDepth {
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        for &v in depth.values() {
            min = min.min(v);
            max = max.max(v);
        }

        let range = max - min;
        let values = if range < self.epsilon {
            trace!("Degenerate depth range ({} .. {}), flattening", min, max);
            vec![DEGENERATE_VALUE; depth.len()]
        } else {
            depth
                .values()
                .iter()
                .map(|&v| ((v - min) / range).clamp(0.0, 1.0))
                .collect()
        };

        NormalizedDepth {
            width: depth.width(),
            height: depth.height(),
            values,
            raw_min: min,
            raw_max: max,
        }
    }

    /// Map a normalized depth value onto the near/mid/far gradient.
    pub fn colorize(&self, v: f32) -> Vec3 {
        self.gradient.sample(v)
    }

    /// Render the whole normalized field as a 2D color image for the
    /// display sink.
    pub fn colorize_field(&self, normalized: &NormalizedDepth) -> RgbImage {
        let mut image = RgbImage::new(normalized.width(), normalized.height());
        for (i, &v) in normalized.values().iter().enumerate() {
            let x = i as u32 % normalized.width();
            let y = i as u32 / normalized.width();
            let c = self.gradient.sample(v);
            image.put_pixel(
                x,
                y,
                Rgb([
                    (c.x * 255.0) as u8,
                    (c.y * 255.0) as u8,
                    (c.z * 255.0) as u8,
                ]),
            );
        }
        image
    }
}

impl Default for DepthNormalizer {
    fn default() -> Self {
        Self {
            epsilon: 1e-6,
            gradient: DepthGradient::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(width: u32, height: u32, values: Vec<f32>) -> DepthField {
        DepthField::new(width, height, values).unwrap()
    }

    #[test]
    fn test_output_in_unit_range_with_extremes() {
        let normalizer = DepthNormalizer::default();
        let depth = field(4, 3, (0..12).map(|i| 10.0 + i as f32 * 3.5).collect());
        let normalized = normalizer.normalize(&depth);

        assert!(normalized.values().iter().all(|v| (0.0..=1.0).contains(v)));
        let zeros = normalized.values().iter().filter(|&&v| v == 0.0).count();
        let ones = normalized.values().iter().filter(|&&v| v == 1.0).count();
        assert_eq!(zeros, 1);
        assert_eq!(ones, 1);
    }

    #[test]
    fn test_ramp_is_evenly_spaced() {
        let normalizer = DepthNormalizer::default();
        let depth = field(4, 3, (0..12).map(|i| i as f32).collect());
        let normalized = normalizer.normalize(&depth);

        let step = 1.0 / 11.0;
        for (i, &v) in normalized.values().iter().enumerate() {
            assert!((v - i as f32 * step).abs() < 1e-6);
        }
    }

    #[test]
    fn test_constant_field_flattens_to_midpoint() {
        let normalizer = DepthNormalizer::default();
        let depth = field(4, 3, vec![42.0; 12]);
        let normalized = normalizer.normalize(&depth);

        assert!(normalized.values().iter().all(|&v| v == DEGENERATE_VALUE));
        assert!(normalized.values().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_near_constant_field_uses_epsilon() {
        let normalizer = DepthNormalizer::new(1e-3, DepthGradient::default());
        let depth = field(2, 1, vec![5.0, 5.0 + 1e-4]);
        let normalized = normalizer.normalize(&depth);
        assert!(normalized.values().iter().all(|&v| v == DEGENERATE_VALUE));
    }

    #[test]
    fn test_raw_range_recorded() {
        let normalizer = DepthNormalizer::default();
        let depth = field(2, 2, vec![3.0, 9.0, 6.0, 4.5]);
        let normalized = normalizer.normalize(&depth);
        assert_eq!(normalized.raw_min, 3.0);
        assert_eq!(normalized.raw_max, 9.0);
    }

    #[test]
    fn test_colorize_endpoints() {
        let normalizer = DepthNormalizer::default();
        let g = *normalizer.gradient();
        assert_eq!(normalizer.colorize(0.0), g.near);
        assert_eq!(normalizer.colorize(0.5), g.mid);
        assert_eq!(normalizer.colorize(1.0), g.far);
    }

    #[test]
    fn test_colorize_field_dimensions_and_corners() {
        let normalizer = DepthNormalizer::default();
        let depth = field(4, 3, (0..12).map(|i| i as f32).collect());
        let normalized = normalizer.normalize(&depth);
        let image = normalizer.colorize_field(&normalized);

        assert_eq!(image.dimensions(), (4, 3));
        // First pixel is the nearest value, last the farthest.
        assert_eq!(image.get_pixel(0, 0).0, [255, 0, 0]);
        assert_eq!(image.get_pixel(3, 2).0, [0, 0, 255]);
    }
}
