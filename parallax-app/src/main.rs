mod app;

use clap::Parser;
use parallax_capture::WebcamCapture;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

/// Live monocular-depth point cloud viewer.
#[derive(Parser, Debug)]
#[command(name = "parallax")]
struct Args {
    /// ONNX depth-estimation model to load
    #[arg(long)]
    model: Option<PathBuf>,

    /// Webcam device index
    #[arg(long, default_value_t = 0)]
    camera: u32,

    /// List available camera devices and exit
    #[arg(long)]
    list_cameras: bool,

    /// Pipeline config JSON file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of frames to process before exiting (0 = run until interrupted)
    #[arg(long, default_value_t = 0)]
    frames: u64,

    /// Directory for periodic depth-map and cloud snapshots
    #[arg(long)]
    snapshot_dir: Option<PathBuf>,

    /// Snapshot every N processed frames
    #[arg(long, default_value_t = 30)]
    snapshot_every: u64,

    /// Write the final point cloud mesh to this PLY file on exit
    #[arg(long)]
    export_ply: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    if args.list_cameras {
        return match WebcamCapture::list_devices() {
            Ok(devices) if devices.is_empty() => {
                println!("No cameras found");
                ExitCode::SUCCESS
            }
            Ok(devices) => {
                for device in devices {
                    println!("{device}");
                }
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!("Failed to query cameras: {e}");
                ExitCode::FAILURE
            }
        };
    }

    let Some(model) = args.model else {
        error!("--model is required (or use --list-cameras)");
        return ExitCode::FAILURE;
    };

    let options = app::AppOptions {
        model,
        camera: args.camera,
        config: args.config,
        frames: args.frames,
        snapshot_dir: args.snapshot_dir,
        snapshot_every: args.snapshot_every.max(1),
        export_ply: args.export_ply,
    };

    match app::App::new(options).and_then(app::App::run) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
