//! Rasterisation of log-power grids.
//!
//! - [`colormap`]: named palettes.
//! - [`canvas`]: the single reusable drawing surface and its per-window guard.
pub mod canvas;
pub mod colormap;

pub use canvas::{Canvas, CanvasFrame};
pub use colormap::ColorMap;
