//! Reusable drawing surface.
//!
//! One [`Canvas`] is allocated per renderer and shared by every window.  Each
//! window draws through a [`CanvasFrame`] guard, which wipes the surface when
//! it goes out of scope, whether the image was written or the window was
//! abandoned halfway.  The next window therefore always starts blank.
use std::path::Path;

use anyhow::{Context, Result};
use image::{ImageFormat, Rgb, RgbImage};
use ndarray::Array2;

use super::ColorMap;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);

pub struct Canvas {
    image: RgbImage,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self { image: RgbImage::from_pixel(width.max(1), height.max(1), BACKGROUND) }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Begin drawing one image.  The surface is cleared when the frame drops.
    pub fn frame(&mut self) -> CanvasFrame<'_> {
        CanvasFrame { canvas: self }
    }

    /// `true` when no pixel differs from the background.
    pub fn is_blank(&self) -> bool {
        self.image.pixels().all(|p| *p == BACKGROUND)
    }

    fn clear(&mut self) {
        for p in self.image.pixels_mut() {
            *p = BACKGROUND;
        }
    }
}

/// Scoped access to a [`Canvas`] for one window.
pub struct CanvasFrame<'a> {
    canvas: &'a mut Canvas,
}

impl CanvasFrame<'_> {
    /// Fill the whole surface with `grid` (`[n_freq, n_time]`).
    ///
    /// Nearest-cell mapping, frequency bin 0 on the bottom row, colour scale
    /// stretched between the grid's finite minimum and maximum.  No axes,
    /// ticks or margins are drawn.
    pub fn draw_grid(&mut self, grid: &Array2<f64>, cmap: ColorMap) {
        let (n_freq, n_time) = grid.dim();
        if n_freq == 0 || n_time == 0 {
            return;
        }
        let (lo, hi) = grid
            .iter()
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        let range = if hi > lo { hi - lo } else { 1.0 };

        let (width, height) = self.canvas.image.dimensions();
        let cols: Vec<usize> = (0..width as usize)
            .map(|x| x * n_time / width as usize)
            .collect();

        for y in 0..height {
            let f = (height - 1 - y) as usize * n_freq / height as usize;
            for (x, &t) in cols.iter().enumerate() {
                let v = grid[[f, t]];
                let rgb = cmap.rgb((v - lo) / range);
                self.canvas.image.put_pixel(x as u32, y, Rgb(rgb));
            }
        }
    }

    /// Write the current surface as PNG.
    pub fn save_png(&self, path: &Path) -> Result<()> {
        self.canvas
            .image
            .save_with_format(path, ImageFormat::Png)
            .with_context(|| format!("writing {}", path.display()))
    }
}

impl Drop for CanvasFrame<'_> {
    fn drop(&mut self) {
        self.canvas.clear();
    }
}
