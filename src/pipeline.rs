//! Stage orchestration.
//!
//! ```text
//! data_root/**/eeg_recordN.mat
//!   │  split_stage()
//!   ▼
//! state_root/eeg_recordN/<channel>/FOCUSED | UNFOCUSED | DROWSY     (CSV)
//!   │  image_stage()
//!   ▼
//! state_root/eeg_recordN/<channel>/<state>_<ordinal>.png
//! ```
//!
//! Failures are contained: an unreadable recording, a missing channel or an
//! unavailable state range is logged and counted, and the stage moves on.
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use log::{debug, info, warn};

use crate::config::PipelineConfig;
use crate::discover::discover_recordings;
use crate::error::PipelineError;
use crate::extract::extract;
use crate::io::{read_segment_csv, recording_id, write_segment_csv, Recording};
use crate::renderer::SpectrogramRenderer;
use crate::state::MentalState;

/// Which split state segments feed the image stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateSelection {
    Focused,
    Unfocused,
    Drowsy,
    All,
}

impl StateSelection {
    pub fn states(self) -> Vec<MentalState> {
        match self {
            StateSelection::Focused => vec![MentalState::Focused],
            StateSelection::Unfocused => vec![MentalState::Unfocused],
            StateSelection::Drowsy => vec![MentalState::Drowsy],
            StateSelection::All => MentalState::ALL.to_vec(),
        }
    }
}

impl FromStr for StateSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(StateSelection::All);
        }
        Ok(match s.parse::<MentalState>()? {
            MentalState::Focused => StateSelection::Focused,
            MentalState::Unfocused => StateSelection::Unfocused,
            MentalState::Drowsy => StateSelection::Drowsy,
        })
    }
}

/// Counters of one split run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitReport {
    pub recordings: usize,
    /// Unreadable files plus files whose id was already taken.
    pub recordings_failed: usize,
    pub channels_missing: usize,
    pub segments_written: usize,
    pub segments_failed: usize,
    pub ranges_unavailable: usize,
}

impl SplitReport {
    fn absorb(&mut self, other: SplitReport) {
        self.recordings += other.recordings;
        self.recordings_failed += other.recordings_failed;
        self.channels_missing += other.channels_missing;
        self.segments_written += other.segments_written;
        self.segments_failed += other.segments_failed;
        self.ranges_unavailable += other.ranges_unavailable;
    }
}

/// Counters of one image run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageReport {
    /// (recording, channel, state) groups that had a segment to render.
    pub groups: usize,
    pub groups_failed: usize,
    pub rendered: usize,
    pub skipped: usize,
    /// Windows whose image could not be written.
    pub failed: usize,
}

/// Directory holding the segments and images of one recording channel.
pub fn channel_dir(state_root: &Path, recording_id: &str, channel: usize) -> PathBuf {
    state_root.join(recording_id).join(channel.to_string())
}

// ── Split stage ──────────────────────────────────────────────────────────────

/// Cut every configured channel of every recording under `data_root` into
/// its state segments and write them as CSV below `state_root`.
pub fn split_stage(data_root: &Path, state_root: &Path, cfg: &PipelineConfig) -> Result<SplitReport> {
    std::fs::read_dir(data_root).map_err(|source| PipelineError::DataRootUnreadable {
        path: data_root.to_path_buf(),
        source,
    })?;
    let files = discover_recordings(data_root)?;
    info!("split: {} recording(s) under {}", files.len(), data_root.display());

    let mut report = SplitReport::default();
    // recording id -> first file that claimed it
    let mut claimed: HashMap<String, &Path> = HashMap::new();
    for path in &files {
        let id = match recording_id(path) {
            Ok(id) => id,
            Err(e) => {
                warn!("skipping {e:#}");
                report.recordings += 1;
                report.recordings_failed += 1;
                continue;
            }
        };
        if let Some(first) = claimed.get(&id) {
            warn!(
                "skipping {}: recording id `{id}` already used by {}",
                path.display(),
                first.display()
            );
            report.recordings += 1;
            report.recordings_failed += 1;
            continue;
        }
        claimed.insert(id, path.as_path());

        match Recording::load(path, cfg) {
            Ok(rec) => {
                debug!(
                    "{}: {} samples × {} channels",
                    path.display(),
                    rec.n_samples(),
                    rec.n_channels()
                );
                report.absorb(split_recording(&rec, path, state_root, cfg));
            }
            Err(e) => {
                warn!("skipping {}: {e:#}", path.display());
                report.recordings += 1;
                report.recordings_failed += 1;
            }
        }
    }
    info!(
        "split: {} segment(s) written, {} range(s) unavailable, {} recording(s) failed",
        report.segments_written, report.ranges_unavailable, report.recordings_failed
    );
    Ok(report)
}

/// Split one decoded recording.  `source` is only used in diagnostics.
pub fn split_recording(
    rec: &Recording,
    source: &Path,
    state_root: &Path,
    cfg: &PipelineConfig,
) -> SplitReport {
    let mut report = SplitReport { recordings: 1, ..SplitReport::default() };
    for &ch in &cfg.channels {
        let samples = match rec.channel(ch) {
            Ok(s) => s,
            Err(e) => {
                warn!("{}: {e:#}", source.display());
                report.channels_missing += 1;
                continue;
            }
        };
        let dir = channel_dir(state_root, &rec.id, ch);
        if let Err(e) = std::fs::create_dir_all(&dir) {
            warn!("cannot create {}: {e}", dir.display());
            report.segments_failed += cfg.intervals.len();
            continue;
        }

        for interval in &cfg.intervals {
            let segment = match extract(&samples, interval) {
                Ok(s) => s,
                Err(e) => {
                    warn!(
                        "{}: {} needs {} samples from index {}, only {} available; not persisted",
                        source.display(),
                        interval.state,
                        e.requested(),
                        e.start,
                        e.available,
                    );
                    report.ranges_unavailable += 1;
                    continue;
                }
            };
            let out = dir.join(interval.state.csv_name());
            match write_segment_csv(&out, segment) {
                Ok(()) => report.segments_written += 1,
                Err(e) => {
                    warn!("{e:#}");
                    report.segments_failed += 1;
                }
            }
        }
    }
    report
}

// ── Image stage ──────────────────────────────────────────────────────────────

/// Recording directories produced by a previous split run, sorted.
///
/// # Errors
///
/// [`PipelineError::MissingPrerequisiteDirectory`] when `state_root` does not
/// exist or holds no recording directory.
pub fn split_recording_dirs(state_root: &Path) -> Result<Vec<PathBuf>, PipelineError> {
    let missing = || PipelineError::MissingPrerequisiteDirectory { path: state_root.to_path_buf() };
    let entries = std::fs::read_dir(state_root).map_err(|_| missing())?;
    let mut dirs: Vec<PathBuf> = entries
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.is_dir())
        .collect();
    if dirs.is_empty() {
        return Err(missing());
    }
    dirs.sort();
    Ok(dirs)
}

/// Channel directories of one recording, numeric names in numeric order.
fn channel_dirs(recording_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs: Vec<PathBuf> = std::fs::read_dir(recording_dir)
        .with_context(|| format!("listing {}", recording_dir.display()))?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort_by_key(|p| {
        let name = p.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        (name.parse::<usize>().ok(), name)
    });
    Ok(dirs)
}

/// Remove `{label}_{n}.png` files left in `dir` by an earlier run.
fn remove_stale_images(dir: &Path, label: &str) -> Result<usize> {
    let mut removed = 0;
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let stale = name
            .strip_prefix(label)
            .and_then(|r| r.strip_prefix('_'))
            .and_then(|r| r.strip_suffix(".png"))
            .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()));
        if stale {
            std::fs::remove_file(&path)?;
            removed += 1;
        }
    }
    Ok(removed)
}

/// Render spectrogram images for every split segment of the selected states.
pub fn image_stage(
    state_root: &Path,
    selection: StateSelection,
    cfg: &PipelineConfig,
) -> Result<ImageReport> {
    let recordings = split_recording_dirs(state_root)?;
    let stride = cfg.stride_samples();
    info!(
        "images: {} recording(s), window {} samples, stride {}, states {:?}",
        recordings.len(),
        cfg.window_len,
        stride,
        selection
    );

    let mut renderer = SpectrogramRenderer::from_config(cfg);
    let mut report = ImageReport::default();
    for rec_dir in &recordings {
        let channels = match channel_dirs(rec_dir) {
            Ok(c) => c,
            Err(e) => {
                warn!("{e:#}");
                continue;
            }
        };
        for ch_dir in &channels {
            for state in selection.states() {
                let csv = ch_dir.join(state.csv_name());
                if !csv.is_file() {
                    debug!("no {} segment in {}", state, ch_dir.display());
                    continue;
                }
                report.groups += 1;

                let samples = match read_segment_csv(&csv) {
                    Ok(s) => s,
                    Err(e) => {
                        warn!("{e:#}");
                        report.groups_failed += 1;
                        continue;
                    }
                };
                if let Err(e) = remove_stale_images(ch_dir, state.label()) {
                    warn!("cannot clear old images in {}: {e}", ch_dir.display());
                }
                let prefix = ch_dir.join(state.label());
                match renderer.render_all(&samples, cfg.sample_rate, cfg.window_len, stride, &prefix) {
                    Ok(s) => {
                        debug!(
                            "{}: {} rendered, {} skipped, {} failed",
                            prefix.display(),
                            s.rendered,
                            s.skipped,
                            s.failed
                        );
                        report.rendered += s.rendered;
                        report.skipped += s.skipped;
                        report.failed += s.failed;
                    }
                    Err(e) => {
                        warn!("{}: {e:#}", prefix.display());
                        report.groups_failed += 1;
                    }
                }
            }
        }
    }
    info!(
        "images: {} rendered, {} skipped, {} not written, {} group(s) failed",
        report.rendered, report.skipped, report.failed, report.groups_failed
    );
    Ok(report)
}

/// Delete a previous split/image tree.  A missing directory is not an error.
pub fn clean_state_root(state_root: &Path) -> Result<()> {
    if state_root.exists() {
        std::fs::remove_dir_all(state_root)
            .with_context(|| format!("removing {}", state_root.display()))?;
        info!("removed {}", state_root.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_parses_all_and_single_states() {
        assert_eq!("ALL".parse::<StateSelection>().unwrap(), StateSelection::All);
        assert_eq!("drowsy".parse::<StateSelection>().unwrap(), StateSelection::Drowsy);
        assert!("sleepy".parse::<StateSelection>().is_err());
        assert_eq!(StateSelection::All.states().len(), 3);
    }

    #[test]
    fn stale_images_of_other_states_survive() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["focused_1.png", "focused_12.png", "unfocused_1.png", "focused_x.png", "FOCUSED"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        assert_eq!(remove_stale_images(dir.path(), "focused").unwrap(), 2);
        assert!(dir.path().join("unfocused_1.png").exists());
        assert!(dir.path().join("focused_x.png").exists());
        assert!(dir.path().join("FOCUSED").exists());
    }

    #[test]
    fn empty_state_root_is_missing_prerequisite() {
        let dir = tempfile::tempdir().unwrap();
        let err = split_recording_dirs(dir.path()).unwrap_err();
        assert!(matches!(err, PipelineError::MissingPrerequisiteDirectory { .. }));
        let err = split_recording_dirs(&dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, PipelineError::MissingPrerequisiteDirectory { .. }));
    }

    #[test]
    fn channel_dirs_sort_numerically() {
        let dir = tempfile::tempdir().unwrap();
        for ch in ["16", "4", "10", "5"] {
            std::fs::create_dir(dir.path().join(ch)).unwrap();
        }
        let names: Vec<_> = channel_dirs(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["4", "5", "10", "16"]);
    }
}
