//! Parallax Capture - camera frame acquisition
//!
//! The pipeline never controls camera timing; it only reacts to frame
//! availability. A [`CaptureSource`] yields `Ok(Some(frame))` when a new
//! frame is ready and `Ok(None)` when there is nothing new to process
//! (not yet settled, no update this tick), which the pipeline treats as
//! a skipped frame.
//!
//! ## Example
//!
//! ```ignore
//! use parallax_capture::{CaptureSource, WebcamCapture};
//!
//! let mut camera = WebcamCapture::new(0)?;
//! while let Some(frame) = camera.next_frame()? {
//!     // Process frame...
//! }
//! ```

mod source;

#[cfg(feature = "webcam")]
mod webcam;

pub use source::{CaptureError, CaptureSource, FrameData};

#[cfg(feature = "webcam")]
pub use webcam::WebcamCapture;
