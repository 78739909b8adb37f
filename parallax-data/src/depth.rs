//! Raw depth fields produced by the estimation model.

use thiserror::Error;

/// Errors raised when constructing a depth field from model output.
#[derive(Debug, Error)]
pub enum DepthError {
    #[error("Depth value count {got} does not match grid {width}x{height}")]
    LengthMismatch { width: u32, height: u32, got: usize },

    #[error("Non-finite depth value at index {index}")]
    NonFinite { index: usize },
}

/// A dense per-pixel depth field, row-major, one f32 per model grid cell.
///
/// The values are raw model output: unnormalized and in a model-defined
/// scale. Construction enforces the two invariants every consumer relies
/// on: the length equals `width * height`, and every value is finite.
#[derive(Debug, Clone)]
pub struct DepthField {
    width: u32,
    height: u32,
    values: Vec<f32>,
}

impl DepthField {
    /// Build a depth field, validating length and finiteness.
    pub fn new(width: u32, height: u32, values: Vec<f32>) -> Result<Self, DepthError> {
        let expected = width as usize * height as usize;
        if values.len() != expected {
            return Err(DepthError::LengthMismatch {
                width,
                height,
                got: values.len(),
            });
        }
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(DepthError::NonFinite { index });
        }
        Ok(Self {
            width,
            height,
            values,
        })
    }

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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_field() {
        let field = DepthField::new(4, 3, vec![1.0; 12]).unwrap();
        assert_eq!(field.width(), 4);
        assert_eq!(field.height(), 3);
        assert_eq!(field.len(), 12);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let err = DepthField::new(4, 3, vec![1.0; 11]).unwrap_err();
        assert!(matches!(err, DepthError::LengthMismatch { got: 11, .. }));
    }

    #[test]
    fn test_nan_rejected() {
        let mut values = vec![1.0; 12];
        values[5] = f32::NAN;
        let err = DepthField::new(4, 3, values).unwrap_err();
        assert!(matches!(err, DepthError::NonFinite { index: 5 }));
    }

    #[test]
    fn test_infinity_rejected() {
        let mut values = vec![1.0; 12];
        values[0] = f32::INFINITY;
        assert!(DepthField::new(4, 3, values).is_err());
    }
}
