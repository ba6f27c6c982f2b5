//! Per-window time–frequency transform and log-power compression.
//!
//! - [`taper`]: periodic raised-cosine tapers.
//! - [`stft`]: one-sided PSD spectrogram with a cached FFT plan.
//!
//! [`log_power`] turns the power grid into the image values.  A grid holding
//! an exact zero cannot be compressed; that is reported as
//! [`UndefinedLogarithm`] rather than silently producing `-inf`.
pub mod stft;
pub mod taper;

pub use stft::{spectrogram, SpectrogramPlan};
pub use taper::Taper;

use ndarray::Array2;

use crate::error::UndefinedLogarithm;

/// Power grid of one window plus its axes.
#[derive(Debug, Clone)]
pub struct Spectrogram {
    /// Bin centre frequencies in Hz, length `n_freq`.
    pub freqs: Vec<f64>,
    /// Sub-window centre times in seconds from the window start, length `n_time`.
    pub times: Vec<f64>,
    /// `[n_freq, n_time]` power spectral density.
    pub power: Array2<f64>,
}

/// Element-wise `log10` of a power grid.
///
/// # Errors
///
/// [`UndefinedLogarithm`] at the first (row-major) bin equal to zero.
pub fn log_power(power: &Array2<f64>) -> Result<Array2<f64>, UndefinedLogarithm> {
    if let Some(((freq_bin, time_bin), _)) = power.indexed_iter().find(|(_, p)| **p == 0.0) {
        return Err(UndefinedLogarithm { freq_bin, time_bin });
    }
    Ok(power.mapv(f64::log10))
}
