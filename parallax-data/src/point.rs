//! Renderable point records.

use glam::{Vec3, Vec4};

/// Lifetime value for points that never expire.
pub const LIFETIME_INFINITE: f32 = f32::INFINITY;

/// A single renderable point: position, RGBA color, size, and remaining
/// lifetime. One record exists per model grid cell; the population is
/// fixed at startup and only the content changes per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CloudPoint {
    /// Position in local space.
    pub position: Vec3,
    /// RGBA color (linear, 0-1 range).
    pub color: Vec4,
    /// Render size in world units.
    pub size: f32,
    /// Remaining lifetime in seconds; infinite points never expire.
    pub lifetime: f32,
}

impl CloudPoint {
    pub fn new(position: Vec3, color: Vec4, size: f32) -> Self {
        Self {
            position,
            color,
            size,
            lifetime: LIFETIME_INFINITE,
        }
    }
}

impl Default for CloudPoint {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            color: Vec4::ONE,
            size: 0.04,
            lifetime: LIFETIME_INFINITE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_infinite() {
        let p = CloudPoint::default();
        assert!(p.lifetime.is_infinite());
        assert_eq!(p.position, Vec3::ZERO);
    }

    #[test]
    fn test_new_point() {
        let p = CloudPoint::new(Vec3::X, Vec4::new(1.0, 0.0, 0.0, 1.0), 0.02);
        assert_eq!(p.size, 0.02);
        assert!(p.lifetime.is_infinite());
    }
}
