//! The per-frame depth pipeline.

use crate::builder::PointCloudBuilder;
use crate::config::PipelineConfig;
use crate::normalize::DepthNormalizer;
use crate::resample::{FrameResampler, ResampleError};
use crate::updater::{PointBufferUpdater, PointSink};
use image::RgbImage;
use parallax_data::{CloudPoint, GridTopology};
use parallax_infer::{DepthModel, InferError};
use thiserror::Error;
use tracing::debug;

/// Errors from one frame's pass through the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Resample(#[from] ResampleError),

    #[error(transparent)]
    Infer(#[from] InferError),
}

/// What one processed frame hands to the display sink besides the
/// published point buffer.
#[derive(Debug)]
pub struct FrameOutput {
    /// Colorized 2D depth map for on-screen presentation.
    pub depth_map: RgbImage,
    /// Number of point records published this frame.
    pub point_count: usize,
    /// Raw model depth range observed this frame.
    pub raw_min: f32,
    pub raw_max: f32,
}

/// Frame-driven pipeline: camera image in, point cloud out.
///
/// One external tick drives one full pass — resample, infer, normalize,
/// rebuild, publish — with no overlap between frames. A tick without a
/// fresh frame is a no-op: nothing is mutated and nothing is published,
/// so the sink keeps showing the last frame's cloud.
pub struct DepthPipeline<R: FrameResampler> {
    resampler: R,
    model: Box<dyn DepthModel>,
    normalizer: DepthNormalizer,
    builder: PointCloudBuilder,
    updater: PointBufferUpdater,
}

impl<R: FrameResampler> DepthPipeline<R> {
    /// Assemble the pipeline around a loaded model.
    ///
    /// Grid dimensions come from the model; the config supplies gradient
    /// colors, point sizes, and the degenerate-range epsilon.
    pub fn new(config: &PipelineConfig, resampler: R, model: Box<dyn DepthModel>) -> Self {
        let (width, height) = model.input_size();
        let capacity = width as usize * height as usize;
        Self {
            resampler,
            model,
            normalizer: DepthNormalizer::new(config.range_epsilon, config.gradient()),
            builder: PointCloudBuilder::new(width, height),
            updater: PointBufferUpdater::new(
                capacity,
                config.max_point_size,
                config.min_point_size,
            ),
        }
    }

    /// Handle one external tick.
    ///
    /// `None` means no new camera frame was available; the tick is
    /// skipped with no state mutation. Frames are never queued.
    pub fn tick(
        &mut self,
        frame: Option<&RgbImage>,
        sink: &mut dyn PointSink,
    ) -> Result<Option<FrameOutput>, PipelineError> {
        match frame {
            None => {
                debug!("No new frame this tick, skipping");
                Ok(None)
            }
            Some(image) => self.process_frame(image, sink).map(Some),
        }
    }

    /// Run one full pass over a fresh camera frame.
    #[tracing::instrument(skip_all)]
    pub fn process_frame(
        &mut self,
        frame: &RgbImage,
        sink: &mut dyn PointSink,
    ) -> Result<FrameOutput, PipelineError> {
        let (width, height) = self.model.input_size();

        let resampled = self.resampler.resample(frame, width, height)?;
        let depth = self.model.estimate(&resampled)?;
        let normalized = self.normalizer.normalize(&depth);

        self.builder.rebuild(&normalized, &resampled);
        self.updater
            .update(self.builder.positions(), &normalized, self.normalizer.gradient());
        self.updater.publish(sink);

        let depth_map = self.normalizer.colorize_field(&normalized);

        debug!(
            "Frame processed: {} points, raw depth {:.4} .. {:.4}",
            self.updater.len(),
            normalized.raw_min,
            normalized.raw_max
        );

        Ok(FrameOutput {
            depth_map,
            point_count: self.updater.len(),
            raw_min: normalized.raw_min,
            raw_max: normalized.raw_max,
        })
    }

    /// The static triangle topology over the point grid.
    pub fn topology(&self) -> &GridTopology {
        self.builder.topology()
    }

    /// The current point buffer content.
    pub fn points(&self) -> &[CloudPoint] {
        self.updater.points()
    }

    /// Current mesh vertex positions (orthographic grid placement).
    pub fn vertex_positions(&self) -> &[glam::Vec3] {
        self.builder.positions()
    }

    /// Current mesh vertex colors, sampled from the resampled camera
    /// image. Distinct from the depth-coded point colors.
    pub fn vertex_colors(&self) -> &[glam::Vec3] {
        self.builder.colors()
    }
}
