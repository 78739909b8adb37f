//! Dense tensors and the image/depth codec.
//!
//! The model contract is channel-major: input `[1, 3, H, W]` with RGB in
//! [0, 1], output one value per grid cell, row-major. Encoding is a pure
//! layout transform (u8 channels rescaled to [0, 1], no reordering);
//! decoding flattens the output buffer into a validated depth field.

use crate::error::InferError;
use image::RgbImage;
use parallax_data::DepthField;

/// A dense, shaped f32 buffer in the layout the inference engine expects.
///
/// Tensors are transient: created for one inference call and dropped as
/// soon as that call's consumer is done with them.
#[derive(Debug, Clone)]
pub struct Tensor {
    pub shape: Vec<usize>,
    pub data: Vec<f32>,
}

impl Tensor {
    /// Build a tensor, validating that the shape covers the data.
    pub fn new(shape: Vec<usize>, data: Vec<f32>) -> Result<Self, InferError> {
        let expected: usize = shape.iter().product();
        if expected != data.len() {
            return Err(InferError::ShapeMismatch {
                expected: format!("{:?} ({} values)", shape, expected),
                got: format!("{} values", data.len()),
            });
        }
        Ok(Self { shape, data })
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Encode an RGB image into the model's `[1, 3, H, W]` input layout.
///
/// Pixel channels are rescaled from [0, 255] to [0, 1]; channel order is
/// preserved.
pub fn encode_image(image: &RgbImage) -> Tensor {
    let (w, h) = (image.width() as usize, image.height() as usize);
    let plane = w * h;
    let mut data = vec![0.0f32; 3 * plane];

    for (x, y, pixel) in image.enumerate_pixels() {
        let base = y as usize * w + x as usize;
        for ch in 0..3 {
            data[ch * plane + base] = pixel.0[ch] as f32 / 255.0;
        }
    }

    Tensor {
        shape: vec![1, 3, h, w],
        data,
    }
}

/// Decode a model output tensor into a `width x height` depth field.
///
/// Accepts any rank whose element count is `width * height` and whose
/// non-unit axes equal `(height, width)` in order; this covers the
/// `[1, 1, H, W]`, `[1, H, W]`, and `[H, W]` exporter variants with one
/// rule while rejecting transposed or truncated outputs. Non-finite
/// values are a data error, never passed downstream.
pub fn decode_depth(tensor: &Tensor, width: u32, height: u32) -> Result<DepthField, InferError> {
    let expected_len = width as usize * height as usize;
    let non_unit: Vec<usize> = tensor.shape.iter().copied().filter(|&d| d != 1).collect();
    let expected_axes: Vec<usize> = [height as usize, width as usize]
        .into_iter()
        .filter(|&d| d != 1)
        .collect();

    if tensor.data.len() != expected_len || non_unit != expected_axes {
        return Err(InferError::ShapeMismatch {
            expected: format!("[1, 1, {}, {}]", height, width),
            got: format!("{:?}", tensor.shape),
        });
    }

    Ok(DepthField::new(width, height, tensor.data.clone())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tensor_shape_must_cover_data() {
        assert!(Tensor::new(vec![1, 3, 2, 2], vec![0.0; 12]).is_ok());
        assert!(Tensor::new(vec![1, 3, 2, 2], vec![0.0; 11]).is_err());
    }

    #[test]
    fn test_encode_layout() {
        // 2x2 image with distinct channel values per pixel
        let mut img = RgbImage::new(2, 2);
        img.put_pixel(0, 0, image::Rgb([255, 0, 0]));
        img.put_pixel(1, 0, image::Rgb([0, 255, 0]));
        img.put_pixel(0, 1, image::Rgb([0, 0, 255]));
        img.put_pixel(1, 1, image::Rgb([255, 255, 255]));

        let tensor = encode_image(&img);
        assert_eq!(tensor.shape, vec![1, 3, 2, 2]);

        // Red plane: pixel (0,0) only, plus (1,1)
        assert_eq!(&tensor.data[0..4], &[1.0, 0.0, 0.0, 1.0]);
        // Green plane: pixel (1,0) and (1,1)
        assert_eq!(&tensor.data[4..8], &[0.0, 1.0, 0.0, 1.0]);
        // Blue plane: pixel (0,1) and (1,1)
        assert_eq!(&tensor.data[8..12], &[0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_decode_identity_roundtrip() {
        let values: Vec<f32> = (0..12).map(|i| i as f32 * 0.25).collect();
        let tensor = Tensor::new(vec![1, 1, 3, 4], values.clone()).unwrap();
        let field = decode_depth(&tensor, 4, 3).unwrap();
        assert_eq!(field.values(), values.as_slice());
    }

    #[test]
    fn test_decode_accepts_squeezed_ranks() {
        let values = vec![0.5f32; 12];
        for shape in [vec![1, 3, 4], vec![3, 4], vec![1, 1, 3, 4]] {
            let tensor = Tensor::new(shape, values.clone()).unwrap();
            assert!(decode_depth(&tensor, 4, 3).is_ok());
        }
    }

    #[test]
    fn test_decode_rejects_transposed() {
        let tensor = Tensor::new(vec![1, 1, 4, 3], vec![0.0; 12]).unwrap();
        let err = decode_depth(&tensor, 4, 3).unwrap_err();
        assert!(matches!(err, InferError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_decode_rejects_truncated() {
        let tensor = Tensor::new(vec![1, 1, 3, 3], vec![0.0; 9]).unwrap();
        assert!(decode_depth(&tensor, 4, 3).is_err());
    }

    #[test]
    fn test_decode_rejects_nan() {
        let mut values = vec![0.0f32; 12];
        values[7] = f32::NAN;
        let tensor = Tensor {
            shape: vec![1, 1, 3, 4],
            data: values,
        };
        let err = decode_depth(&tensor, 4, 3).unwrap_err();
        assert!(matches!(err, InferError::InvalidOutput(_)));
    }
}
