//! Tonescope Render - Visual Styles and Software Rasterization
//!
//! Styles consume the analysis core's spectra, band levels and raw
//! samples and emit drawing primitives into a [`Canvas`] in normalized
//! device coordinates; a `tiny-skia` backed [`SoftwareRenderer`] turns
//! the draw list into an RGBA framebuffer shared by the window path and
//! the video encoder path. Styles are purely presentational: they never
//! mutate their inputs and own nothing but their smoothing state.

use thiserror::Error;

pub mod camera;
pub mod draw;
pub mod input;
pub mod raster;
pub mod styles;

pub use camera::Camera;
pub use draw::{Canvas, Color, Primitive};
pub use input::{FrameInput, SourceAnalysis};
pub use raster::SoftwareRenderer;
pub use styles::{Style, StyleKind};

/// Render errors
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Invalid framebuffer size {0}x{1}")]
    InvalidSize(u32, u32),
}

/// Result type for render operations
pub type Result<T> = std::result::Result<T, RenderError>;
