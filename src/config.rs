//! Pipeline configuration.
//!
//! [`PipelineConfig`] holds every tunable parameter for the split and image
//! stages.  All fields have defaults matching the mental-attention dataset the
//! pipeline was built for: 128 Hz recordings, seven frontal/temporal channels
//! and three consecutive 10-minute state intervals.
use crate::render::ColorMap;
use crate::spectrogram::Taper;
use crate::state::{default_intervals, StateInterval};

/// Configuration for the full split + image pipeline.
///
/// All fields are `pub` so you can construct one with struct-update syntax:
///
/// ```
/// use eegram::PipelineConfig;
///
/// let cfg = PipelineConfig {
///     window_len: 512,        // 4 s windows instead of 2 s
///     stride:     Some(64),   // two images per second
///     ..PipelineConfig::default()
/// };
/// assert_eq!(cfg.stride_samples(), 64);
/// ```
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Sampling rate of the recordings in Hz.
    ///
    /// Default: `128.0` Hz.
    pub sample_rate: f32,

    /// Zero-based column indices of the channels to process.
    ///
    /// Default: `[4, 5, 8, 9, 10, 11, 16]`.
    pub channels: Vec<usize>,

    /// Labeled sample-index intervals cut out of every channel.
    ///
    /// Default: see [`default_intervals`].
    pub intervals: Vec<StateInterval>,

    /// Length of one spectrogram window in samples.
    ///
    /// Default: `256` samples (2 s at 128 Hz).
    pub window_len: usize,

    /// Advance between consecutive window starts in samples.
    ///
    /// `None` means one window per elapsed second, i.e. `round(sample_rate)`.
    ///
    /// Default: `None`.
    pub stride: Option<usize>,

    /// Parameters of the per-window time–frequency transform.
    pub spectrogram: SpectrogramConfig,

    /// Raster output parameters.
    pub image: ImageConfig,

    /// Name of the top-level variable holding the recording in `.mat` files.
    ///
    /// Default: `"o"`.
    pub mat_variable: String,

    /// Struct field of [`mat_variable`](Self::mat_variable) holding the
    /// `[samples, channels]` matrix.
    ///
    /// Default: `"data"`.
    pub mat_field: String,
}

impl Default for PipelineConfig {
    /// 128 Hz · 7 channels · 256-sample windows · 1 s stride.
    fn default() -> Self {
        Self {
            sample_rate: 128.0,
            channels: vec![4, 5, 8, 9, 10, 11, 16],
            intervals: default_intervals().to_vec(),
            window_len: 256,
            stride: None,
            spectrogram: SpectrogramConfig::default(),
            image: ImageConfig::default(),
            mat_variable: "o".into(),
            mat_field: "data".into(),
        }
    }
}

impl PipelineConfig {
    /// Sample advance between consecutive windows.
    ///
    /// ```
    /// use eegram::PipelineConfig;
    /// let cfg = PipelineConfig::default();
    /// assert_eq!(cfg.stride_samples(), 128);
    /// ```
    pub fn stride_samples(&self) -> usize {
        self.stride_for(self.sample_rate)
    }

    /// Stride for a sequence sampled at `sample_rate` Hz: the explicit
    /// [`stride`](Self::stride) if set, else one window per second.
    ///
    /// ```
    /// use eegram::PipelineConfig;
    /// let cfg = PipelineConfig::default();
    /// assert_eq!(cfg.stride_for(256.0), 256);
    /// ```
    pub fn stride_for(&self, sample_rate: f32) -> usize {
        self.stride
            .unwrap_or_else(|| sample_rate.round().max(1.0) as usize)
    }
}

/// Short-time transform applied inside each window.
///
/// The transform splits the window into overlapping sub-windows of
/// [`segment_len`](Self::segment_len) samples; the sub-window hop is
/// independent of the outer window stride.
#[derive(Debug, Clone, Copy)]
pub struct SpectrogramConfig {
    /// Taper applied to every sub-window.
    ///
    /// Default: [`Taper::Hann`].
    pub taper: Taper,

    /// Sub-window length as a fraction of the window length.
    ///
    /// Default: `0.75`.
    pub segment_ratio: f32,

    /// Fraction of each sub-window shared with the next one.
    ///
    /// Default: `0.9`.
    pub overlap: f32,
}

impl Default for SpectrogramConfig {
    fn default() -> Self {
        Self {
            taper: Taper::Hann,
            segment_ratio: 0.75,
            overlap: 0.9,
        }
    }
}

impl SpectrogramConfig {
    /// Sub-window length for a window of `window_len` samples.
    ///
    /// Always in `1..=window_len` for a non-empty window.
    pub fn segment_len(&self, window_len: usize) -> usize {
        let n = (window_len as f32 * self.segment_ratio).floor() as usize;
        n.clamp(1, window_len.max(1))
    }

    /// Samples shared by consecutive sub-windows of length `segment_len`.
    ///
    /// Always strictly less than `segment_len`.
    pub fn overlap_len(&self, segment_len: usize) -> usize {
        let n = (segment_len as f32 * self.overlap).floor() as usize;
        n.min(segment_len.saturating_sub(1))
    }
}

/// Raster export parameters.
///
/// The image has no axes or margins: the whole surface is the spectrogram.
#[derive(Debug, Clone, Copy)]
pub struct ImageConfig {
    /// Palette the log-power values are mapped through.
    ///
    /// Default: [`ColorMap::Viridis`].
    pub cmap: ColorMap,

    /// Figure width in inches.  Default: `6.4`.
    pub width_in: f32,

    /// Figure height in inches.  Default: `4.8`.
    pub height_in: f32,

    /// Pixel density.  Default: `100.0` dots per inch.
    pub dpi: f32,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            cmap: ColorMap::Viridis,
            width_in: 6.4,
            height_in: 4.8,
            dpi: 100.0,
        }
    }
}

impl ImageConfig {
    /// Output raster size `(width, height)` in pixels, at least 1×1.
    ///
    /// ```
    /// use eegram::ImageConfig;
    /// assert_eq!(ImageConfig::default().pixel_size(), (640, 480));
    /// ```
    pub fn pixel_size(&self) -> (u32, u32) {
        let w = (self.width_in * self.dpi).round().max(1.0) as u32;
        let h = (self.height_in * self.dpi).round().max(1.0) as u32;
        (w, h)
    }
}
