//! Frame resampling seam.
//!
//! The pipeline owns the trait; the GPU crate provides the
//! blit-and-readback implementation. Keeping the seam here means the
//! pipeline never depends on wgpu and tests can plug in CPU stubs.

use image::RgbImage;
use thiserror::Error;

/// Errors that can occur while resampling a frame.
#[derive(Debug, Error)]
pub enum ResampleError {
    #[error("Source image has degenerate size {width}x{height}")]
    EmptySource { width: u32, height: u32 },

    #[error("Target size {width}x{height} is degenerate")]
    EmptyTarget { width: u32, height: u32 },

    #[error("GPU error during resample: {0}")]
    Gpu(String),

    #[error("Readback failed: {0}")]
    Readback(String),
}

/// Converts an arbitrary-resolution source image into a fixed target
/// resolution. The output is always exactly `target_w x target_h`;
/// degenerate source or target sizes fail instead of producing an
/// empty image.
pub trait FrameResampler {
    fn resample(
        &mut self,
        source: &RgbImage,
        target_w: u32,
        target_h: u32,
    ) -> Result<RgbImage, ResampleError>;
}

/// Validate source and target dimensions before any resource is acquired.
pub fn check_dims(
    source_w: u32,
    source_h: u32,
    target_w: u32,
    target_h: u32,
) -> Result<(), ResampleError> {
    if source_w == 0 || source_h == 0 {
        return Err(ResampleError::EmptySource {
            width: source_w,
            height: source_h,
        });
    }
    if target_w == 0 || target_h == 0 {
        return Err(ResampleError::EmptyTarget {
            width: target_w,
            height: target_h,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_source_rejected() {
        assert!(matches!(
            check_dims(0, 0, 224, 224),
            Err(ResampleError::EmptySource { .. })
        ));
        assert!(matches!(
            check_dims(640, 0, 224, 224),
            Err(ResampleError::EmptySource { .. })
        ));
    }

    #[test]
    fn test_zero_target_rejected() {
        assert!(matches!(
            check_dims(640, 480, 0, 224),
            Err(ResampleError::EmptyTarget { .. })
        ));
    }

    #[test]
    fn test_valid_dims_accepted() {
        assert!(check_dims(1, 1, 224, 224).is_ok());
        assert!(check_dims(1920, 1080, 224, 224).is_ok());
    }
}
