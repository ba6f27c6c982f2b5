//! Raw recording discovery.
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// File extensions accepted as recordings (compared case-insensitively).
pub const RECORDING_EXTENSIONS: [&str; 2] = ["mat", "safetensors"];

/// Every recording file under `root`, recursively, sorted by path.
pub fn discover_recordings(root: &Path) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    walk(root, &mut out)?;
    out.sort();
    Ok(out)
}

fn walk(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    let entries = std::fs::read_dir(dir).with_context(|| format!("listing {}", dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        if path.is_dir() {
            walk(&path, out)?;
        } else if is_recording(&path) {
            out.push(path);
        }
    }
    Ok(())
}

fn is_recording(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| RECORDING_EXTENSIONS.iter().any(|r| r.eq_ignore_ascii_case(e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_nested_recordings_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("b")).unwrap();
        std::fs::write(root.join("eeg_record2.mat"), b"").unwrap();
        std::fs::write(root.join("b/eeg_record1.MAT"), b"").unwrap();
        std::fs::write(root.join("a.safetensors"), b"").unwrap();
        std::fs::write(root.join("readme.txt"), b"").unwrap();

        let found = discover_recordings(root).unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(names, vec!["a.safetensors", "b/eeg_record1.MAT", "eeg_record2.mat"]);
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover_recordings(&dir.path().join("nope")).is_err());
    }
}
