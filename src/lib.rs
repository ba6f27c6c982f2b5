//! # eegram: EEG mental-state spectrogram images in pure Rust
//!
//! `eegram` turns raw multi-channel EEG recordings into labeled spectrogram
//! images for attention-state classification.  A recording is cut into three
//! consecutive state intervals (focused, unfocused, drowsy) per channel, and
//! each state segment is rendered as a sequence of overlapping short-time
//! spectrogram images.
//!
//! ## Pipeline overview
//!
//! ```text
//! eeg_record30.mat
//!   │
//!   ├─ mat::read_matrix_field()   level-5 MAT reader, o.data → [T, C]
//!   ├─ extract()                  state interval → borrowed segment
//!   ├─ write_segment_csv()        state_root/eeg_record30/4/FOCUSED
//!   │
//!   │   (image stage, per segment)
//!   ├─ WindowPlan                 window_len / stride sliding windows
//!   ├─ SpectrogramPlan::compute() tapered STFT → PSD [freq, time]
//!   ├─ log_power()                log10, windows with a zero bin skipped
//!   └─ Canvas                     palette raster → focused_<n>.png
//! ```
//!
//! ## Quick start
//!
//! ```no_run
//! use eegram::{image_stage, split_stage, PipelineConfig, StateSelection};
//! use std::path::Path;
//!
//! let cfg = PipelineConfig::default();
//! let split = split_stage(Path::new("data"), Path::new("states"), &cfg).unwrap();
//! println!("{} segments", split.segments_written);
//!
//! let images = image_stage(Path::new("states"), StateSelection::All, &cfg).unwrap();
//! println!("{} rendered, {} skipped", images.rendered, images.skipped);
//! ```
//!
//! ## Rendering a single sequence
//!
//! ```no_run
//! use eegram::{render_all, PipelineConfig};
//! use std::path::Path;
//!
//! let signal: Vec<f32> = (0..2000).map(|i| (i as f32 * 0.3).sin()).collect();
//! let cfg = PipelineConfig { stride: Some(128), ..PipelineConfig::default() };
//! let summary = render_all(&signal, 128.0, 256, Path::new("/tmp/focused"), &cfg).unwrap();
//! assert_eq!(summary.windows(), 14);
//! ```

pub mod config;
pub mod discover;
pub mod error;
pub mod extract;
pub mod io;
pub mod mat;
pub mod pipeline;
pub mod render;
pub mod renderer;
pub mod spectrogram;
pub mod state;
pub mod window;

// ── Crate-root re-exports ─────────────────────────────────────────────────

// config
pub use config::{ImageConfig, PipelineConfig, SpectrogramConfig};

// state + extraction
pub use extract::extract;
pub use state::{default_intervals, MentalState, StateInterval};

// errors
pub use error::{PipelineError, RangeUnavailable, UndefinedLogarithm};

// io
pub use discover::discover_recordings;
pub use io::{read_segment_csv, write_segment_csv, Recording, StWriter};

// transform
pub use spectrogram::{log_power, spectrogram, Spectrogram, SpectrogramPlan, Taper};
pub use window::{WindowPlan, WindowSpan};

// rendering
pub use render::{Canvas, ColorMap};
pub use renderer::{render_all, RenderSummary, SkipReason, SpectrogramRenderer, WindowOutcome};

// stages
pub use pipeline::{
    clean_state_root, image_stage, split_stage, ImageReport, SplitReport, StateSelection,
};
