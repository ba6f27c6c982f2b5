/// window_steps: cut one window out of one recording channel/state, run each
/// transform step and write every intermediate array to a safetensors file
/// for comparison against a reference spectrogram implementation.
///
/// Output keys:
///   window      [N]            f32  raw window samples
///   taper       [M]            f64  sub-window taper coefficients
///   freqs       [F]            f64  bin frequencies (Hz)
///   times       [K]            f64  sub-window centre times (s)
///   power       [F, K]         f64  one-sided PSD
///   log_power   [F, K]         f64  log10(power), absent if a bin is zero
use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;

use eegram::{
    extract, log_power, MentalState, PipelineConfig, Recording, SpectrogramConfig, SpectrogramPlan,
    StWriter, Taper, WindowPlan,
};

#[derive(Parser, Debug)]
#[command(name = "window_steps")]
struct Args {
    /// Input recording (.mat or .safetensors).
    #[arg(long)]
    input: PathBuf,

    /// Output safetensors path.
    #[arg(long)]
    output: PathBuf,

    /// Channel column index.
    #[arg(long, default_value_t = 4)]
    channel: usize,

    /// State segment the window is taken from.
    #[arg(long, default_value = "focused")]
    state: MentalState,

    /// 1-based window ordinal within the segment.
    #[arg(long, default_value_t = 1)]
    window: usize,

    /// Window length in samples.
    #[arg(long, default_value_t = 256)]
    window_len: usize,

    /// Window stride in samples (default: one second of samples).
    #[arg(long)]
    stride: Option<usize>,

    /// Sub-window taper.
    #[arg(long, default_value = "hann")]
    taper: Taper,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let cfg = PipelineConfig {
        window_len: args.window_len,
        stride: args.stride,
        spectrogram: SpectrogramConfig { taper: args.taper, ..SpectrogramConfig::default() },
        ..PipelineConfig::default()
    };

    // ── 1. Load + cut ──────────────────────────────────────────────────────
    let t_load = now();
    let rec = Recording::load(&args.input, &cfg)?;
    let samples = rec.channel(args.channel)?;
    let interval = cfg
        .intervals
        .iter()
        .find(|iv| iv.state == args.state)
        .with_context(|| format!("no interval configured for {}", args.state))?;
    let segment = extract(&samples, interval)?;
    let ms_load = t_load.elapsed().as_secs_f64() * 1000.0;

    let plan = WindowPlan::new(segment.len(), cfg.window_len, cfg.stride_samples())?;
    let Some(span) = plan.iter().find(|s| s.ordinal == args.window) else {
        bail!(
            "{} segment has {} window(s), requested #{}",
            args.state,
            plan.count(),
            args.window
        );
    };
    let window = &segment[span.range.clone()];

    // ── 2. Transform ───────────────────────────────────────────────────────
    let t_stft = now();
    let mut stft = SpectrogramPlan::new(cfg.spectrogram);
    let spec = stft.compute(window, cfg.sample_rate)?;
    let ms_stft = t_stft.elapsed().as_secs_f64() * 1000.0;

    let t_log = now();
    let logged = log_power(&spec.power);
    let ms_log = t_log.elapsed().as_secs_f64() * 1000.0;

    eprintln!("TIMING load={ms_load:.4}ms stft={ms_stft:.4}ms log={ms_log:.4}ms");
    eprintln!(
        "  {} window #{} samples {:?}  power {:?}",
        rec.id,
        span.ordinal,
        span.range,
        spec.power.dim()
    );

    // ── 3. Write output ────────────────────────────────────────────────────
    let taper = cfg.spectrogram.taper.coefficients(cfg.spectrogram.segment_len(window.len()));
    let mut w = StWriter::new();
    w.add_f32("window", window, &[window.len()]);
    w.add_f64("taper", &taper, &[taper.len()]);
    w.add_f64("freqs", &spec.freqs, &[spec.freqs.len()]);
    w.add_f64("times", &spec.times, &[spec.times.len()]);
    w.add_f64_arr2("power", &spec.power);
    match logged {
        Ok(lp) => w.add_f64_arr2("log_power", &lp),
        Err(e) => eprintln!("  log_power omitted: {e}"),
    }
    w.write(&args.output)?;

    eprintln!("Written → {}", args.output.display());
    Ok(())
}

#[inline(always)]
fn now() -> std::time::Instant {
    std::time::Instant::now()
}
