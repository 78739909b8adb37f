use image::{Rgb, RgbImage};
use parallax_infer::{decode_depth, encode_image, InferError, Tensor};

#[test]
fn test_encode_shape_matches_image() {
    let img = RgbImage::new(8, 6);
    let tensor = encode_image(&img);
    assert_eq!(tensor.shape, vec![1, 3, 6, 8]);
    assert_eq!(tensor.len(), 3 * 6 * 8);
}

#[test]
fn test_encode_values_normalized() {
    let mut img = RgbImage::new(2, 1);
    img.put_pixel(0, 0, Rgb([51, 102, 204]));
    img.put_pixel(1, 0, Rgb([255, 0, 127]));

    let tensor = encode_image(&img);
    for v in &tensor.data {
        assert!((0.0..=1.0).contains(v));
    }
    assert!((tensor.data[0] - 51.0 / 255.0).abs() < 1e-6);
    assert!((tensor.data[1] - 1.0).abs() < 1e-6);
}

#[test]
fn test_encode_decode_identity() {
    // A synthetic single-channel grid passed through the decoder must
    // come back exactly: the codec is a layout transform, not lossy.
    let values: Vec<f32> = (0..20).map(|i| (i as f32).sin()).collect();
    let tensor = Tensor::new(vec![1, 1, 4, 5], values.clone()).unwrap();

    let field = decode_depth(&tensor, 5, 4).unwrap();
    assert_eq!(field.values(), values.as_slice());
    assert_eq!(field.width(), 5);
    assert_eq!(field.height(), 4);
}

#[test]
fn test_decode_shape_mismatch_is_explicit() {
    let tensor = Tensor::new(vec![1, 1, 4, 5], vec![0.0; 20]).unwrap();
    match decode_depth(&tensor, 4, 5) {
        Err(InferError::ShapeMismatch { expected, got }) => {
            assert!(expected.contains('5'));
            assert!(got.contains('4'));
        }
        other => panic!("expected shape mismatch, got {:?}", other.map(|f| f.len())),
    }
}

#[test]
fn test_decode_never_truncates_or_pads() {
    // Too many values for the grid: must error, not silently truncate.
    let tensor = Tensor::new(vec![1, 1, 5, 5], vec![0.0; 25]).unwrap();
    assert!(decode_depth(&tensor, 4, 4).is_err());

    // Too few: must error, not pad.
    let tensor = Tensor::new(vec![1, 1, 3, 3], vec![0.0; 9]).unwrap();
    assert!(decode_depth(&tensor, 4, 4).is_err());
}
