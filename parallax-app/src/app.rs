//! Frame loop and lifecycle for the parallax viewer.

use parallax_capture::{CaptureError, CaptureSource, WebcamCapture};
use parallax_data::{write_cloud_to_ply, CloudPoint};
use parallax_gpu::renderer::PointCloudRenderer;
use parallax_gpu::resample::GpuResampler;
use parallax_gpu::{GpuContext, GpuError};
use parallax_infer::{DepthEstimator, InferError};
use parallax_pipeline::{ConfigError, DepthPipeline, PipelineConfig, PipelineError};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, warn};

// Output resolution of the offscreen cloud render.
const RENDER_WIDTH: u32 = 800;
const RENDER_HEIGHT: u32 = 600;

// Give up after this many consecutive capture failures.
const MAX_CAPTURE_FAILURES: u32 = 30;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),

    #[error("GPU error: {0}")]
    Gpu(#[from] GpuError),

    #[error("Inference error: {0}")]
    Infer(#[from] InferError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub struct AppOptions {
    pub model: PathBuf,
    pub camera: u32,
    pub config: Option<PathBuf>,
    pub frames: u64,
    pub snapshot_dir: Option<PathBuf>,
    pub snapshot_every: u64,
    pub export_ply: Option<PathBuf>,
}

pub struct App {
    options: AppOptions,
    capture: WebcamCapture,
    pipeline: DepthPipeline<GpuResampler>,
    renderer: PointCloudRenderer,
    processed: u64,
}

impl App {
    pub fn new(options: AppOptions) -> Result<Self, AppError> {
        let config = match &options.config {
            Some(path) => PipelineConfig::load(path)?,
            None => PipelineConfig::default(),
        };

        // Fatal if the model asset cannot be loaded; nothing runs
        // without it and retrying a fixed asset will not change that.
        let estimator =
            DepthEstimator::new(&options.model, config.model_width, config.model_height)?;

        let ctx = GpuContext::new()?;
        let resampler = GpuResampler::new(ctx.clone());
        let renderer = PointCloudRenderer::new(
            ctx,
            config.model_width as usize * config.model_height as usize,
            RENDER_WIDTH,
            RENDER_HEIGHT,
        );

        let capture = WebcamCapture::new(options.camera)?;

        if let Some(dir) = &options.snapshot_dir {
            std::fs::create_dir_all(dir)?;
        }

        Ok(Self {
            options,
            capture,
            pipeline: DepthPipeline::new(&config, resampler, Box::new(estimator)),
            renderer,
            processed: 0,
        })
    }

    /// Drive the pipeline until the frame budget runs out, then shut
    /// down in order: camera, inference session, GPU resources.
    pub fn run(mut self) -> Result<(), AppError> {
        info!(
            "Starting frame loop ({} points per frame)",
            self.pipeline.points().len()
        );

        let mut capture_failures = 0u32;

        loop {
            if self.options.frames > 0 && self.processed >= self.options.frames {
                info!("Frame budget reached ({} frames)", self.processed);
                break;
            }

            let frame = match self.capture.next_frame() {
                Ok(frame) => {
                    capture_failures = 0;
                    frame
                }
                Err(e) => {
                    capture_failures += 1;
                    if capture_failures >= MAX_CAPTURE_FAILURES {
                        return Err(e.into());
                    }
                    warn!("Capture failed, skipping tick: {e}");
                    continue;
                }
            };

            let image = frame.as_ref().map(|f| &f.image);
            match self.pipeline.tick(image, &mut self.renderer) {
                Ok(Some(output)) => {
                    self.processed += 1;
                    if self.processed % self.options.snapshot_every == 0 {
                        self.snapshot(&output.depth_map)?;
                    }
                }
                // No fresh frame: published buffer stays as-is.
                Ok(None) => {}
                // A degenerate resample is this frame's problem only.
                Err(PipelineError::Resample(e)) => {
                    warn!("Resample failed, skipping frame: {e}");
                }
                // Model-side failures do not fix themselves; halt.
                Err(e) => return Err(e.into()),
            }
        }

        if let Some(path) = self.options.export_ply.take() {
            self.export_mesh(&path)?;
        }

        self.shutdown();
        Ok(())
    }

    fn snapshot(&self, depth_map: &image::RgbImage) -> Result<(), AppError> {
        let Some(dir) = &self.options.snapshot_dir else {
            return Ok(());
        };

        let depth_path = dir.join(format!("depth_{:05}.png", self.processed));
        depth_map.save(&depth_path)?;

        let cloud = self.renderer.render_to_image()?;
        let cloud_path = dir.join(format!("cloud_{:05}.png", self.processed));
        cloud.save(&cloud_path)?;

        info!("Snapshot {} written to {}", self.processed, dir.display());
        Ok(())
    }

    /// Export the camera-colored mesh (grid triangles over the current
    /// vertices).
    fn export_mesh(&self, path: &std::path::Path) -> Result<(), AppError> {
        let vertices: Vec<CloudPoint> = self
            .pipeline
            .vertex_positions()
            .iter()
            .zip(self.pipeline.vertex_colors())
            .map(|(&position, &color)| CloudPoint::new(position, color.extend(1.0), 0.0))
            .collect();

        write_cloud_to_ply(path, &vertices, Some(self.pipeline.topology()))?;
        Ok(())
    }

    fn shutdown(self) {
        let Self {
            capture,
            pipeline,
            renderer,
            ..
        } = self;

        // Release order: camera first, then the inference session and
        // its model, then GPU resources. Nothing may touch a released
        // resource afterwards.
        drop(capture);
        drop(pipeline);
        drop(renderer);
        info!("Shutdown complete");
    }
}
