//! Parallax Inference Crate
//!
//! Bridges camera images and the ONNX depth-estimation model:
//!
//! - [`tensor`]: packed NCHW tensor type and the image/depth codec
//! - [`session`]: ort-backed session adapter and the [`DepthModel`] trait
//!
//! The model is treated as an opaque function from a `[1, 3, H, W]`
//! normalized RGB tensor to a single-channel depth grid. Everything
//! model-internal stays behind [`session::DepthSession`].

pub mod error;
pub mod session;
pub mod tensor;

pub use error::InferError;
pub use session::{DepthEstimator, DepthModel, DepthSession};
pub use tensor::{decode_depth, encode_image, Tensor};
