//! ONNX depth-model session adapter.

use crate::error::InferError;
use crate::tensor::{decode_depth, encode_image, Tensor};
use image::RgbImage;
use ndarray::ArrayD;
use ort::{inputs, session::Session as OrtSession, value::TensorRef};
use parallax_data::DepthField;
use std::path::Path;
use tracing::{debug, info};

/// An opaque depth-estimation model: resampled RGB frame in, raw depth
/// field out. The pipeline depends only on this trait, so tests can
/// substitute synthetic models for the ort-backed one.
pub trait DepthModel {
    /// The (width, height) the model expects its input resampled to.
    fn input_size(&self) -> (u32, u32);

    /// Run one synchronous, blocking inference pass.
    fn estimate(&mut self, image: &RgbImage) -> Result<DepthField, InferError>;
}

/// Owns the loaded ONNX model and its compute context for the process
/// lifetime. Construction is fatal on a missing or unreadable model
/// asset; nothing downstream can run without it, so there is no retry.
pub struct DepthSession {
    session: OrtSession,
    input_name: String,
    output_name: String,
}

impl DepthSession {
    /// Load a model from an ONNX file and resolve its single input and
    /// primary output names.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, InferError> {
        let path = path.as_ref();
        info!("Loading depth model from {}", path.display());

        let mut builder = OrtSession::builder()
            .map_err(|e| InferError::ModelLoad(format!("failed to create session builder: {e}")))?;
        let session = builder
            .commit_from_file(path)
            .map_err(|e| InferError::ModelLoad(format!("{}: {e}", path.display())))?;

        let input_names: Vec<String> = session
            .inputs()
            .iter()
            .map(|input| input.name().to_string())
            .collect();
        let output_names: Vec<String> = session
            .outputs()
            .iter()
            .map(|output| output.name().to_string())
            .collect();

        let [input_name] = input_names.as_slice() else {
            return Err(InferError::ModelLoad(format!(
                "expected a single-input model, got inputs {:?}",
                input_names
            )));
        };
        let Some(output_name) = output_names.first() else {
            return Err(InferError::ModelLoad("model has no outputs".to_string()));
        };

        info!(
            "Depth model ready: input '{}', output '{}'",
            input_name, output_name
        );

        Ok(Self {
            input_name: input_name.clone(),
            output_name: output_name.clone(),
            session,
        })
    }

    /// Execute the model against one input tensor.
    ///
    /// The input is only read; the returned tensor is owned by the
    /// caller and should be dropped before the next frame begins.
    pub fn run(&mut self, input: &Tensor) -> Result<Tensor, InferError> {
        let array = ArrayD::from_shape_vec(input.shape.clone(), input.data.clone())
            .map_err(|e| InferError::Backend(format!("failed to create ndarray: {e}")))?;
        let tensor_ref = TensorRef::from_array_view(array.view())
            .map_err(|e| InferError::Backend(format!("failed to create tensor ref: {e}")))?;

        let outputs = self
            .session
            .run(inputs![self.input_name.as_str() => tensor_ref])
            .map_err(|e| InferError::Backend(format!("inference failed: {e}")))?;

        let value = &outputs[self.output_name.as_str()];
        let output = value.try_extract_array::<f32>().map_err(|e| {
            InferError::InvalidOutput(format!("output '{}' is not f32: {e}", self.output_name))
        })?;

        let shape = output.shape().to_vec();
        let data: Vec<f32> = output.iter().copied().collect();
        debug!("Inference produced output with shape {:?}", shape);

        Tensor::new(shape, data)
    }
}

/// End-to-end estimator: encode → run → decode.
///
/// Wraps a [`DepthSession`] with the fixed model grid size, so callers
/// hand in a resampled frame and get back a validated depth field.
pub struct DepthEstimator {
    session: DepthSession,
    width: u32,
    height: u32,
}

impl DepthEstimator {
    /// Load the model and fix the expected input grid.
    pub fn new(model_path: impl AsRef<Path>, width: u32, height: u32) -> Result<Self, InferError> {
        let session = DepthSession::from_file(model_path)?;
        Ok(Self {
            session,
            width,
            height,
        })
    }
}

impl DepthModel for DepthEstimator {
    fn input_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn estimate(&mut self, image: &RgbImage) -> Result<DepthField, InferError> {
        if image.dimensions() != (self.width, self.height) {
            return Err(InferError::ShapeMismatch {
                expected: format!("{}x{} input image", self.width, self.height),
                got: format!("{}x{}", image.width(), image.height()),
            });
        }

        // Input and output tensors both live only for this call.
        let input = encode_image(image);
        let output = self.session.run(&input)?;
        decode_depth(&output, self.width, self.height)
    }
}
