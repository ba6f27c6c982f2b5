//! Raised-cosine tapers.
//!
//! All windows are *periodic* (DFT-even): the denominator is `n`, not `n − 1`,
//! which is what spectral analysis routines such as `scipy.signal.get_window`
//! return by default.
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

/// Taper applied to every STFT sub-window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Taper {
    /// `0.5 − 0.5·cos(2πi/n)`
    #[default]
    Hann,
    /// `0.54 − 0.46·cos(2πi/n)`
    Hamming,
    /// `0.42 − 0.5·cos(2πi/n) + 0.08·cos(4πi/n)`
    Blackman,
}

impl Taper {
    /// Coefficients of length `n`.
    ///
    /// ```
    /// use eegram::Taper;
    /// let w = Taper::Hann.coefficients(4);
    /// assert_eq!(w.len(), 4);
    /// assert_eq!(w[0], 0.0);
    /// ```
    pub fn coefficients(self, n: usize) -> Vec<f64> {
        match n {
            0 => Vec::new(),
            1 => vec![1.0],
            _ => {
                let m = n as f64;
                (0..n)
                    .map(|i| {
                        let a = 2.0 * PI * i as f64 / m;
                        match self {
                            Taper::Hann => 0.5 - 0.5 * a.cos(),
                            Taper::Hamming => 0.54 - 0.46 * a.cos(),
                            Taper::Blackman => 0.42 - 0.5 * a.cos() + 0.08 * (2.0 * a).cos(),
                        }
                    })
                    .collect()
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Taper::Hann => "hann",
            Taper::Hamming => "hamming",
            Taper::Blackman => "blackman",
        }
    }
}

impl fmt::Display for Taper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Taper {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hann" | "hanning" => Ok(Taper::Hann),
            "hamming" => Ok(Taper::Hamming),
            "blackman" => Ok(Taper::Blackman),
            other => Err(format!("unknown taper `{other}`")),
        }
    }
}
