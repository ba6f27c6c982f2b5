//! Sliding-window spectrogram renderer.
//!
//! For every window of a [`WindowPlan`]:
//!
//! ```text
//! samples[i..j]
//!   ├─ SpectrogramPlan::compute()   PSD grid  [freq, time]
//!   ├─ log_power()                  log10, or Skipped(UndefinedLogarithm)
//!   ├─ CanvasFrame::draw_grid()     palette, no axes / margins
//!   └─ CanvasFrame::save_png()      {prefix}_{ordinal}.png
//! ```
//!
//! A skipped window writes nothing but still consumes its ordinal, so file
//! names always reflect window position.  A window whose image cannot be
//! written is reported as [`WindowOutcome::Failed`] and the loop moves on to
//! the next window.  The renderer never creates directories; the parent of
//! `output_prefix` must exist.
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use log::{debug, warn};

use crate::config::{ImageConfig, PipelineConfig, SpectrogramConfig};
use crate::error::UndefinedLogarithm;
use crate::render::Canvas;
use crate::spectrogram::{log_power, SpectrogramPlan};
use crate::window::WindowPlan;

/// Why a window produced no image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    UndefinedLogarithm(UndefinedLogarithm),
}

/// Result of processing one window.
#[derive(Debug, Clone, PartialEq)]
pub enum WindowOutcome {
    Rendered { ordinal: usize, path: PathBuf },
    Skipped { ordinal: usize, path: PathBuf, reason: SkipReason },
    /// The image was drawn but writing it failed.
    Failed { ordinal: usize, path: PathBuf, error: String },
}

impl WindowOutcome {
    pub fn ordinal(&self) -> usize {
        match self {
            WindowOutcome::Rendered { ordinal, .. }
            | WindowOutcome::Skipped { ordinal, .. }
            | WindowOutcome::Failed { ordinal, .. } => *ordinal,
        }
    }
}

/// Tallies of one [`SpectrogramRenderer::render_all`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderSummary {
    pub rendered: usize,
    pub skipped: usize,
    /// Ordinals of the skipped windows, ascending.
    pub skipped_ordinals: Vec<usize>,
    /// Windows whose image could not be written.
    pub failed: usize,
    pub failed_ordinals: Vec<usize>,
}

impl RenderSummary {
    pub fn windows(&self) -> usize {
        self.rendered + self.skipped + self.failed
    }
}

/// `{prefix}_{ordinal}.png`
pub fn window_path(output_prefix: &Path, ordinal: usize) -> PathBuf {
    let mut name = output_prefix.as_os_str().to_owned();
    name.push(format!("_{ordinal}.png"));
    PathBuf::from(name)
}

/// Owns the transform plan and the single drawing surface reused by every window.
pub struct SpectrogramRenderer {
    plan: SpectrogramPlan,
    image: ImageConfig,
    canvas: Canvas,
}

impl SpectrogramRenderer {
    pub fn new(spectrogram: &SpectrogramConfig, image: &ImageConfig) -> Self {
        let (w, h) = image.pixel_size();
        Self {
            plan: SpectrogramPlan::new(*spectrogram),
            image: *image,
            canvas: Canvas::new(w, h),
        }
    }

    pub fn from_config(cfg: &PipelineConfig) -> Self {
        Self::new(&cfg.spectrogram, &cfg.image)
    }

    /// Render every window of `sequence` to `{output_prefix}_{ordinal}.png`.
    ///
    /// Windows whose power grid contains an exact zero are skipped and logged;
    /// windows whose image cannot be written are logged and counted as failed.
    ///
    /// # Errors
    ///
    /// Invalid parameters (zero window length or stride, non-positive sample
    /// rate), detected before any window is processed.
    pub fn render_all(
        &mut self,
        sequence: &[f32],
        sample_rate: f32,
        window_length: usize,
        stride: usize,
        output_prefix: &Path,
    ) -> Result<RenderSummary> {
        if sample_rate.is_nan() || sample_rate <= 0.0 {
            bail!("sample rate must be > 0, got {sample_rate}");
        }
        let plan = WindowPlan::new(sequence.len(), window_length, stride)?;
        debug!(
            "{}: {} samples → {} windows of {} (stride {})",
            output_prefix.display(),
            sequence.len(),
            plan.count(),
            window_length,
            stride,
        );

        let mut summary = RenderSummary::default();
        for span in &plan {
            let outcome =
                self.render_window(&sequence[span.range], sample_rate, span.ordinal, output_prefix)?;
            match outcome {
                WindowOutcome::Rendered { .. } => summary.rendered += 1,
                WindowOutcome::Skipped { ordinal, .. } => {
                    summary.skipped += 1;
                    summary.skipped_ordinals.push(ordinal);
                }
                WindowOutcome::Failed { ordinal, .. } => {
                    summary.failed += 1;
                    summary.failed_ordinals.push(ordinal);
                }
            }
        }
        Ok(summary)
    }

    /// Transform, compress and rasterise a single window.
    pub fn render_window(
        &mut self,
        window: &[f32],
        sample_rate: f32,
        ordinal: usize,
        output_prefix: &Path,
    ) -> Result<WindowOutcome> {
        let path = window_path(output_prefix, ordinal);
        let spec = self.plan.compute(window, sample_rate)?;

        let mut frame = self.canvas.frame();
        let log_grid = match log_power(&spec.power) {
            Ok(g) => g,
            Err(e) => {
                warn!("skipping {}: {e}", path.display());
                return Ok(WindowOutcome::Skipped {
                    ordinal,
                    path,
                    reason: SkipReason::UndefinedLogarithm(e),
                });
            }
        };
        frame.draw_grid(&log_grid, self.image.cmap);
        if let Err(e) = frame.save_png(&path) {
            warn!("window {ordinal} not written: {e:#}");
            return Ok(WindowOutcome::Failed { ordinal, path, error: format!("{e:#}") });
        }
        Ok(WindowOutcome::Rendered { ordinal, path })
    }

    /// `true` when the shared surface holds no leftover drawing.
    pub fn canvas_is_clear(&self) -> bool {
        self.canvas.is_blank()
    }
}

/// Render `sequence` with the transform and image settings of `cfg`.
///
/// The stride is `cfg.stride` when set, else `round(sample_rate)`: one window
/// per second of the given sequence.
pub fn render_all(
    sequence: &[f32],
    sample_rate: f32,
    window_length: usize,
    output_prefix: &Path,
    cfg: &PipelineConfig,
) -> Result<RenderSummary> {
    SpectrogramRenderer::from_config(cfg).render_all(
        sequence,
        sample_rate,
        window_length,
        cfg.stride_for(sample_rate),
        output_prefix,
    )
}
