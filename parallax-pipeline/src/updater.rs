//! Fixed-capacity point buffer, mirrored to the renderer every frame.

use crate::normalize::NormalizedDepth;
use glam::Vec3;
use parallax_data::{CloudPoint, DepthGradient};
use tracing::trace;

/// Display-sink boundary: accepts the whole point buffer in one call.
///
/// There are no partial updates — the population is fixed for the
/// process lifetime and only content is resubmitted.
pub trait PointSink {
    fn submit(&mut self, points: &[CloudPoint]);
}

/// Maintains one [`CloudPoint`] per depth-grid cell.
///
/// The record array is allocated once; `update` rewrites content in
/// place and `publish` hands the full slice to the sink. Nearer points
/// render larger: size lerps from `max_size` at depth 0 to `min_size`
/// at depth 1.
pub struct PointBufferUpdater {
    points: Vec<CloudPoint>,
    max_size: f32,
    min_size: f32,
}

impl PointBufferUpdater {
    pub fn new(capacity: usize, max_size: f32, min_size: f32) -> Self {
        Self {
            points: vec![CloudPoint::default(); capacity],
            max_size,
            min_size,
        }
    }

    /// Rewrite every record from this frame's vertices and depth.
    pub fn update(
        &mut self,
        positions: &[Vec3],
        normalized: &NormalizedDepth,
        gradient: &DepthGradient,
    ) {
        assert_eq!(
            positions.len(),
            self.points.len(),
            "vertex count does not match point buffer capacity"
        );
        assert_eq!(
            normalized.len(),
            self.points.len(),
            "depth count does not match point buffer capacity"
        );

        for (i, point) in self.points.iter_mut().enumerate() {
            let v = normalized.values()[i];
            point.position = positions[i];
            point.color = gradient.sample(v).extend(1.0);
            point.size = self.max_size + (self.min_size - self.max_size) * v;
            point.lifetime = f32::INFINITY;
        }
        trace!("Updated {} point records", self.points.len());
    }

    /// Publish the whole buffer to the renderer in one call.
    pub fn publish(&self, sink: &mut dyn PointSink) {
        sink.submit(&self.points);
    }

    pub fn points(&self) -> &[CloudPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::DepthNormalizer;
    use parallax_data::DepthField;

    struct RecordingSink {
        submissions: usize,
        last: Vec<CloudPoint>,
    }

    impl RecordingSink {
        fn new() -> Self {
            Self {
                submissions: 0,
                last: Vec::new(),
            }
        }
    }

    impl PointSink for RecordingSink {
        fn submit(&mut self, points: &[CloudPoint]) {
            self.submissions += 1;
            self.last = points.to_vec();
        }
    }

    fn ramp(width: u32, height: u32) -> NormalizedDepth {
        let count = (width * height) as usize;
        let field = DepthField::new(width, height, (0..count).map(|i| i as f32).collect()).unwrap();
        DepthNormalizer::default().normalize(&field)
    }

    #[test]
    fn test_size_attenuates_with_depth() {
        let mut updater = PointBufferUpdater::new(12, 0.04, 0.005);
        let n = ramp(4, 3);
        let positions = vec![Vec3::ZERO; 12];
        updater.update(&positions, &n, &DepthGradient::default());

        assert_eq!(updater.points()[0].size, 0.04);
        let last = updater.points()[11].size;
        assert!((last - 0.005).abs() < 1e-6);
        // Monotonically shrinking along the ramp
        for pair in updater.points().windows(2) {
            assert!(pair[0].size >= pair[1].size);
        }
    }

    #[test]
    fn test_colors_follow_gradient() {
        let gradient = DepthGradient::default();
        let mut updater = PointBufferUpdater::new(12, 0.04, 0.005);
        let n = ramp(4, 3);
        updater.update(&vec![Vec3::ZERO; 12], &n, &gradient);

        assert_eq!(updater.points()[0].color.truncate(), gradient.near);
        assert_eq!(updater.points()[11].color.truncate(), gradient.far);
        assert!(updater.points().iter().all(|p| p.color.w == 1.0));
    }

    #[test]
    fn test_lifetimes_infinite() {
        let mut updater = PointBufferUpdater::new(4, 0.04, 0.005);
        let n = ramp(2, 2);
        updater.update(&vec![Vec3::ZERO; 4], &n, &DepthGradient::default());
        assert!(updater.points().iter().all(|p| p.lifetime.is_infinite()));
    }

    #[test]
    fn test_publish_submits_everything() {
        let mut updater = PointBufferUpdater::new(6, 0.04, 0.005);
        let n = ramp(3, 2);
        updater.update(&vec![Vec3::ONE; 6], &n, &DepthGradient::default());

        let mut sink = RecordingSink::new();
        updater.publish(&mut sink);

        assert_eq!(sink.submissions, 1);
        assert_eq!(sink.last.len(), 6);
        assert_eq!(sink.last[0].position, Vec3::ONE);
    }

    #[test]
    fn test_capacity_fixed_across_updates() {
        let mut updater = PointBufferUpdater::new(4, 0.04, 0.005);
        let ptr_before = updater.points().as_ptr();
        for _ in 0..3 {
            let n = ramp(2, 2);
            updater.update(&vec![Vec3::ZERO; 4], &n, &DepthGradient::default());
        }
        assert_eq!(updater.points().as_ptr(), ptr_before);
        assert_eq!(updater.len(), 4);
    }

    #[test]
    #[should_panic(expected = "does not match point buffer capacity")]
    fn test_mismatched_vertex_count_rejected() {
        let mut updater = PointBufferUpdater::new(4, 0.04, 0.005);
        let n = ramp(2, 2);
        updater.update(&vec![Vec3::ZERO; 5], &n, &DepthGradient::default());
    }
}
