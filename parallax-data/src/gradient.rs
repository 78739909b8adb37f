//! Depth-coded color gradients.

use glam::Vec3;

/// Three-stop near/mid/far gradient over normalized depth.
///
/// Sampling is a two-segment piecewise lerp: `v < 0.5` interpolates
/// near to mid, `v >= 0.5` interpolates mid to far. Both segments agree
/// at the midpoint, which visually emphasizes the near/far transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthGradient {
    /// Color of points closest to the camera.
    pub near: Vec3,
    /// Color at the middle of the depth range.
    pub mid: Vec3,
    /// Color of points farthest from the camera.
    pub far: Vec3,
}

impl DepthGradient {
    pub fn new(near: Vec3, mid: Vec3, far: Vec3) -> Self {
        Self { near, mid, far }
    }

    /// Sample the gradient at normalized depth `v`, clamped to [0, 1].
    pub fn sample(&self, v: f32) -> Vec3 {
        let v = v.clamp(0.0, 1.0);
        if v < 0.5 {
            self.near.lerp(self.mid, v / 0.5)
        } else {
            self.mid.lerp(self.far, (v - 0.5) / 0.5)
        }
    }
}

impl Default for DepthGradient {
    /// Red near, yellow mid, blue far.
    fn default() -> Self {
        Self {
            near: Vec3::new(1.0, 0.0, 0.0),
            mid: Vec3::new(1.0, 1.0, 0.0),
            far: Vec3::new(0.0, 0.0, 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_and_midpoint() {
        let g = DepthGradient::default();
        assert_eq!(g.sample(0.0), g.near);
        assert_eq!(g.sample(0.5), g.mid);
        assert_eq!(g.sample(1.0), g.far);
    }

    #[test]
    fn test_continuous_at_midpoint() {
        let g = DepthGradient::default();
        let left = g.sample(0.5 - 1e-5);
        let right = g.sample(0.5);
        assert!((left - right).length() < 1e-3);
    }

    #[test]
    fn test_quarter_points() {
        let g = DepthGradient::new(Vec3::ZERO, Vec3::ONE, Vec3::ZERO);
        assert!((g.sample(0.25) - Vec3::splat(0.5)).length() < 1e-6);
        assert!((g.sample(0.75) - Vec3::splat(0.5)).length() < 1e-6);
    }

    #[test]
    fn test_out_of_range_clamped() {
        let g = DepthGradient::default();
        assert_eq!(g.sample(-1.0), g.near);
        assert_eq!(g.sample(2.0), g.far);
    }
}
