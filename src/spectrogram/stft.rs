//! One-sided power spectral density spectrogram.
//!
//! Per sub-window (matching `scipy.signal.spectrogram` with
//! `detrend='constant'`, `scaling='density'`, `mode='psd'`):
//!   1. Subtract the sub-window mean.
//!   2. Multiply by the taper `w`.
//!   3. FFT of length `nperseg`, keep bins `0 ..= nperseg/2`.
//!   4. `P = |X|² / (fs · Σw²)`; double every bin except DC and (for even
//!      `nperseg`) Nyquist.
//!
//! Sub-windows start at `0, step, 2·step, …` with `step = nperseg − noverlap`;
//! trailing samples that do not fill a sub-window are ignored.
use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{bail, Result};
use ndarray::Array2;
use rustfft::{num_complex::Complex, Fft, FftPlanner};

use super::Spectrogram;
use crate::config::SpectrogramConfig;

/// Reusable transform state: FFT plans and tapers cached per segment length.
pub struct SpectrogramPlan {
    cfg: SpectrogramConfig,
    planner: FftPlanner<f64>,
    plans: HashMap<usize, (Arc<dyn Fft<f64>>, Vec<f64>)>,
}

impl SpectrogramPlan {
    pub fn new(cfg: SpectrogramConfig) -> Self {
        Self { cfg, planner: FftPlanner::new(), plans: HashMap::new() }
    }

    pub fn config(&self) -> &SpectrogramConfig {
        &self.cfg
    }

    /// Compute the PSD spectrogram of `x` sampled at `fs` Hz.
    ///
    /// The sub-window length is derived from `x.len()` via
    /// [`SpectrogramConfig::segment_len`].
    pub fn compute(&mut self, x: &[f32], fs: f32) -> Result<Spectrogram> {
        if x.is_empty() {
            bail!("cannot compute a spectrogram of an empty window");
        }
        if fs.is_nan() || fs <= 0.0 {
            bail!("sample rate must be > 0, got {fs}");
        }
        let nperseg = self.cfg.segment_len(x.len());
        let noverlap = self.cfg.overlap_len(nperseg);
        let step = nperseg - noverlap;
        let n_frames = (x.len() - nperseg) / step + 1;
        let n_freq = nperseg / 2 + 1;
        let fs = fs as f64;

        let (fft, taper) = self.plan(nperseg);
        let win_energy: f64 = taper.iter().map(|w| w * w).sum();
        let scale = 1.0 / (fs * win_energy);

        let mut power = Array2::<f64>::zeros((n_freq, n_frames));
        let mut buf = vec![Complex::<f64>::default(); nperseg];
        for frame in 0..n_frames {
            let seg = &x[frame * step..frame * step + nperseg];
            let mean = seg.iter().map(|&v| v as f64).sum::<f64>() / nperseg as f64;
            for ((b, &v), &w) in buf.iter_mut().zip(seg).zip(taper.iter()) {
                *b = Complex { re: (v as f64 - mean) * w, im: 0.0 };
            }
            fft.process(&mut buf);

            for (f, b) in buf.iter().take(n_freq).enumerate() {
                let mut p = b.norm_sqr() * scale;
                let is_nyquist = nperseg % 2 == 0 && f == n_freq - 1;
                if f != 0 && !is_nyquist {
                    p *= 2.0;
                }
                power[[f, frame]] = p;
            }
        }

        let freqs = (0..n_freq).map(|f| f as f64 * fs / nperseg as f64).collect();
        let times = (0..n_frames)
            .map(|t| (t * step) as f64 / fs + nperseg as f64 / (2.0 * fs))
            .collect();

        Ok(Spectrogram { freqs, times, power })
    }

    fn plan(&mut self, nperseg: usize) -> (Arc<dyn Fft<f64>>, Vec<f64>) {
        let taper = self.cfg.taper;
        let planner = &mut self.planner;
        let (fft, w) = self
            .plans
            .entry(nperseg)
            .or_insert_with(|| (planner.plan_fft_forward(nperseg), taper.coefficients(nperseg)));
        (Arc::clone(fft), w.clone())
    }
}

/// One-shot convenience wrapper around [`SpectrogramPlan`].
pub fn spectrogram(x: &[f32], fs: f32, cfg: &SpectrogramConfig) -> Result<Spectrogram> {
    SpectrogramPlan::new(*cfg).compute(x, fs)
}
