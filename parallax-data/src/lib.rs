//! Parallax Data Crate
//!
//! CPU-side data types for the depth sensing pipeline: raw depth fields,
//! the static grid topology connecting them, depth-coded color gradients,
//! and renderable point records. This crate is GPU-agnostic; Pod types
//! with bytemuck derives live in parallax-gpu.

pub mod depth;
pub mod gradient;
pub mod grid;
pub mod ply;
pub mod point;

pub use depth::{DepthError, DepthField};
pub use gradient::DepthGradient;
pub use grid::GridTopology;
pub use ply::write_cloud_to_ply;
pub use point::CloudPoint;
