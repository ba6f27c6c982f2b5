use anyhow::Result;
use clap::Parser;
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;

use eegram::{
    clean_state_root, image_stage, split_stage, ColorMap, PipelineConfig, PipelineError,
    StateSelection, Taper,
};

#[derive(Parser, Debug)]
#[command(name = "eegram", about = "EEG mental-state spectrogram image generator")]
struct Args {
    /// Split every recording into per-channel state segments (CSV).
    #[arg(long)]
    split: bool,

    /// Render spectrogram images for FOCUSED, UNFOCUSED, DROWSY or ALL.
    #[arg(long, value_name = "STATE")]
    images: Option<StateSelection>,

    /// Remove the state directory tree before splitting.
    #[arg(long)]
    clean: bool,

    /// Directory searched recursively for .mat / .safetensors recordings.
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Root of the per-recording state directory tree.
    #[arg(long, default_value = "states")]
    state_root: PathBuf,

    /// Sampling rate of the recordings (Hz).
    #[arg(long, default_value_t = 128.0_f32)]
    sample_rate: f32,

    /// Channel column indices (comma-separated, zero-based).
    #[arg(long, value_delimiter = ',', default_value = "4,5,8,9,10,11,16")]
    channels: Vec<usize>,

    /// Window length in samples.
    #[arg(long, default_value_t = 256)]
    window_len: usize,

    /// Window stride in samples (default: one second of samples).
    #[arg(long)]
    stride: Option<usize>,

    /// Sub-window taper: hann, hamming or blackman.
    #[arg(long, default_value = "hann")]
    taper: Taper,

    /// Palette: viridis, magma, inferno, plasma or grayscale.
    #[arg(long, default_value = "viridis")]
    cmap: ColorMap,

    /// Raster resolution in dots per inch.
    #[arg(long, default_value_t = 100.0_f32)]
    dpi: f32,
}

impl Args {
    fn config(&self) -> PipelineConfig {
        let base = PipelineConfig::default();
        PipelineConfig {
            sample_rate: self.sample_rate,
            channels: self.channels.clone(),
            window_len: self.window_len,
            stride: self.stride,
            spectrogram: eegram::SpectrogramConfig { taper: self.taper, ..base.spectrogram },
            image: eegram::ImageConfig { cmap: self.cmap, dpi: self.dpi, ..base.image },
            ..base
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let cfg = args.config();

    if args.clean {
        clean_state_root(&args.state_root)?;
    }
    if args.split {
        let report = split_stage(&args.data_dir, &args.state_root, &cfg)?;
        info!(
            "split done: {} recording(s), {} segment(s) → {}",
            report.recordings,
            report.segments_written,
            args.state_root.display()
        );
    }
    if let Some(selection) = args.images {
        let report = image_stage(&args.state_root, selection, &cfg)?;
        info!(
            "images done: {} group(s), {} image(s), {} window(s) skipped",
            report.groups, report.rendered, report.skipped
        );
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if !args.split && args.images.is_none() && !args.clean {
        eprintln!("nothing to do: pass --split and/or --images <STATE>");
        return ExitCode::from(2);
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if let Some(PipelineError::MissingPrerequisiteDirectory { path }) =
                e.downcast_ref::<PipelineError>()
            {
                error!("{} has no split output; run with --split first", path.display());
            } else {
                error!("{e:#}");
            }
            ExitCode::FAILURE
        }
    }
}
