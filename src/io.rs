//! Recording and segment I/O.
//!
//! - [`Recording`]: one source file decoded to a `[samples, channels]` matrix
//!   (`.mat` level-5 or `.safetensors`).
//! - Segment CSV: one sample per line, written by the split stage and read
//!   back by the image stage.
//! - [`StWriter`]: minimal safetensors writer for debug dumps and fixtures.
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use ndarray::Array2;

use crate::config::PipelineConfig;
use crate::mat;

// ── Recording ────────────────────────────────────────────────────────────────

/// One decoded source file.  Rows are time samples, columns are channels.
#[derive(Debug, Clone)]
pub struct Recording {
    /// File stem, e.g. `eeg_record30`.
    pub id: String,
    /// `[T, C]` samples.
    pub data: Array2<f32>,
}

impl Recording {
    /// Decode `path`, choosing the reader from the file extension.
    pub fn load(path: &Path, cfg: &PipelineConfig) -> Result<Self> {
        let id = recording_id(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        let data = match ext.as_str() {
            "mat" => mat::read_matrix_field(path, &cfg.mat_variable, &cfg.mat_field)?
                .mapv(|v| v as f32),
            "safetensors" => read_safetensors_matrix(path, "data")?,
            other => bail!("{}: unsupported recording format `{other}`", path.display()),
        };
        Ok(Self { id, data })
    }

    pub fn n_samples(&self) -> usize {
        self.data.nrows()
    }

    pub fn n_channels(&self) -> usize {
        self.data.ncols()
    }

    /// Copy of one channel column.
    pub fn channel(&self, index: usize) -> Result<Vec<f32>> {
        if index >= self.n_channels() {
            bail!(
                "{}: channel {index} out of range ({} channels)",
                self.id,
                self.n_channels()
            );
        }
        Ok(self.data.column(index).to_vec())
    }
}

/// File stem of `path` as a UTF-8 string.
pub fn recording_id(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(String::from)
        .with_context(|| format!("{}: no usable file stem", path.display()))
}

// ── Safetensors reader ──────────────────────────────────────────────────────

fn parse_header(bytes: &[u8]) -> Result<(HashMap<String, serde_json::Value>, usize)> {
    if bytes.len() < 8 {
        bail!("safetensors file too small");
    }
    let mut len = [0u8; 8];
    len.copy_from_slice(&bytes[..8]);
    let n = u64::from_le_bytes(len) as usize;
    if bytes.len() < 8 + n {
        bail!("safetensors header truncated");
    }
    let header: HashMap<String, serde_json::Value> = serde_json::from_slice(&bytes[8..8 + n])
        .context("failed to parse safetensors header")?;
    Ok((header, 8 + n))
}

fn usize_array(entry: &serde_json::Value, key: &str) -> Result<Vec<usize>> {
    entry[key]
        .as_array()
        .with_context(|| format!("tensor entry has no `{key}` array"))?
        .iter()
        .map(|v| v.as_u64().map(|v| v as usize).context("non-integer in tensor entry"))
        .collect()
}

/// Read a rank-2 F32 or F64 tensor named `name` as `[rows, cols]` f32.
pub fn read_safetensors_matrix(path: &Path, name: &str) -> Result<Array2<f32>> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let (header, data_start) = parse_header(&bytes)?;
    let entry = header
        .get(name)
        .with_context(|| format!("{}: missing '{name}' tensor", path.display()))?;

    let shape = usize_array(entry, "shape")?;
    if shape.len() != 2 {
        bail!("{}: '{name}' has rank {}, expected 2", path.display(), shape.len());
    }
    let offsets = usize_array(entry, "data_offsets")?;
    if offsets.len() != 2 || data_start + offsets[1] > bytes.len() || offsets[0] > offsets[1] {
        bail!("{}: '{name}' has invalid data offsets", path.display());
    }
    let raw = &bytes[data_start + offsets[0]..data_start + offsets[1]];

    let values: Vec<f32> = match entry["dtype"].as_str() {
        Some("F32") => raw
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect(),
        Some("F64") => raw
            .chunks_exact(8)
            .map(|b| f64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]) as f32)
            .collect(),
        other => bail!("{}: '{name}' has unsupported dtype {other:?}", path.display()),
    };
    Array2::from_shape_vec((shape[0], shape[1]), values)
        .with_context(|| format!("{}: '{name}' shape does not match its data", path.display()))
}

// ── Safetensors writer ──────────────────────────────────────────────────────

/// One tensor queued in a [`StWriter`].
struct Tensor {
    name: String,
    dtype: &'static str,
    shape: Vec<usize>,
    bytes: Vec<u8>,
}

/// Safetensors writer for window dumps and test recordings.
///
/// Tensors are laid out in insertion order; the JSON header is space-padded
/// to an 8-byte boundary.
///
/// ```rust,no_run
/// use eegram::io::StWriter;
/// use std::path::Path;
/// let mut w = StWriter::new();
/// w.add_f32("window", &[1.0f32, 2.0, 3.0], &[3]);
/// w.add_f64("power", &[1.0f64, 2.0], &[2, 1]);
/// w.write(Path::new("/tmp/steps.safetensors")).unwrap();
/// ```
#[derive(Default)]
pub struct StWriter {
    tensors: Vec<Tensor>,
}

impl StWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_f32(&mut self, name: &str, data: &[f32], shape: &[usize]) {
        self.push(name, "F32", shape, data.iter().flat_map(|v| v.to_le_bytes()).collect());
    }

    pub fn add_f64(&mut self, name: &str, data: &[f64], shape: &[usize]) {
        self.push(name, "F64", shape, data.iter().flat_map(|v| v.to_le_bytes()).collect());
    }

    /// Row-major `[rows, cols]` F64 tensor.
    pub fn add_f64_arr2(&mut self, name: &str, arr: &Array2<f64>) {
        let bytes = arr.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.push(name, "F64", &[arr.nrows(), arr.ncols()], bytes);
    }

    fn push(&mut self, name: &str, dtype: &'static str, shape: &[usize], bytes: Vec<u8>) {
        self.tensors.push(Tensor { name: name.to_string(), dtype, shape: shape.to_vec(), bytes });
    }

    /// Serialized file contents.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut header = serde_json::Map::new();
        let mut end = 0usize;
        for t in &self.tensors {
            let begin = end;
            end += t.bytes.len();
            header.insert(
                t.name.clone(),
                serde_json::json!({ "dtype": t.dtype, "shape": t.shape, "data_offsets": [begin, end] }),
            );
        }
        let mut json = serde_json::to_vec(&header)?;
        json.resize(json.len().next_multiple_of(8), b' ');

        let mut out = Vec::with_capacity(8 + json.len() + end);
        out.extend_from_slice(&(json.len() as u64).to_le_bytes());
        out.extend(json);
        for t in &self.tensors {
            out.extend_from_slice(&t.bytes);
        }
        Ok(out)
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let bytes = self.to_bytes()?;
        let mut f = BufWriter::new(
            File::create(path).with_context(|| format!("creating {}", path.display()))?,
        );
        f.write_all(&bytes)
            .and_then(|()| f.flush())
            .with_context(|| format!("writing {}", path.display()))
    }
}

// ── Segment CSV ─────────────────────────────────────────────────────────────

/// Write one sample per line.  Values use the shortest round-trip formatting.
pub fn write_segment_csv(path: &Path, samples: &[f32]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut w = BufWriter::new(file);
    for v in samples {
        writeln!(w, "{v}")?;
    }
    w.flush().with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

/// Read a segment CSV: the first comma-delimited field of every non-empty line.
pub fn read_segment_csv(path: &Path) -> Result<Vec<f32>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut out = Vec::new();
    for (lineno, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("reading {}", path.display()))?;
        let field = line.split(',').next().unwrap_or("").trim();
        if field.is_empty() {
            continue;
        }
        let v: f32 = field.parse().with_context(|| {
            format!("{}:{}: invalid sample `{field}`", path.display(), lineno + 1)
        })?;
        out.push(v);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_csv_preserves_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("FOCUSED");
        let samples = [0.1_f32, -4235.25, 1e-7, 3.0];
        write_segment_csv(&path, &samples).unwrap();
        assert_eq!(read_segment_csv(&path).unwrap(), samples.to_vec());
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 4);
    }

    #[test]
    fn segment_csv_reads_first_column_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("DROWSY");
        std::fs::write(&path, "1.5,9\n\n2.5, 8\n").unwrap();
        assert_eq!(read_segment_csv(&path).unwrap(), vec![1.5, 2.5]);
    }

    #[test]
    fn segment_csv_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("UNFOCUSED");
        std::fs::write(&path, "1.0\nabc\n").unwrap();
        let err = read_segment_csv(&path).unwrap_err();
        assert!(format!("{err:#}").contains(":2:"));
    }

    #[test]
    fn safetensors_recording_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eeg_record7.safetensors");
        let data = Array2::from_shape_fn((50, 3), |(t, c)| (t * 10 + c) as f32);
        let mut w = StWriter::new();
        w.add_f32("data", &data.iter().copied().collect::<Vec<_>>(), &[50, 3]);
        w.write(&path).unwrap();

        let rec = Recording::load(&path, &PipelineConfig::default()).unwrap();
        assert_eq!(rec.id, "eeg_record7");
        assert_eq!(rec.n_samples(), 50);
        assert_eq!(rec.channel(2).unwrap()[4], 42.0);
        assert!(rec.channel(3).is_err());
    }

    #[test]
    fn writer_header_is_padded_and_offsets_are_contiguous() {
        let mut w = StWriter::new();
        w.add_f32("a", &[1.0, 2.0, 3.0], &[3]);
        w.add_f64_arr2("b", &Array2::from_elem((2, 2), 0.5));
        let bytes = w.to_bytes().unwrap();
        let n = u64::from_le_bytes(bytes[..8].try_into().unwrap()) as usize;
        assert_eq!(n % 8, 0);
        assert_eq!(bytes.len(), 8 + n + 12 + 32);
        let header: serde_json::Value = serde_json::from_slice(&bytes[8..8 + n]).unwrap();
        assert_eq!(header["a"]["data_offsets"], serde_json::json!([0, 12]));
        assert_eq!(header["b"]["data_offsets"], serde_json::json!([12, 44]));
        assert_eq!(header["b"]["dtype"], "F64");
    }

    #[test]
    fn unknown_extension_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "x").unwrap();
        assert!(Recording::load(&path, &PipelineConfig::default()).is_err());
    }
}
