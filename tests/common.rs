/// Shared helpers: synthetic signals, small configs and recording fixtures.
use eegram::io::StWriter;
use eegram::{ImageConfig, MentalState, PipelineConfig, StateInterval};
use ndarray::Array2;
use std::path::{Path, PathBuf};

#[allow(unused)]
/// Deterministic uniform noise in `[-0.5, 0.5)` (64-bit LCG).
pub fn noise(n: usize, seed: u64) -> Vec<f32> {
    let mut s = seed.wrapping_add(0x9e37_79b9_7f4a_7c15);
    (0..n)
        .map(|_| {
            s = s.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            ((s >> 33) as f32 / (1u64 << 31) as f32) - 0.5
        })
        .collect()
}

#[allow(unused)]
/// `[n_samples, n_channels]` noise matrix, every channel seeded differently.
pub fn noise_matrix(n_samples: usize, n_channels: usize, seed: u64) -> Array2<f32> {
    let mut data = Array2::<f32>::zeros((n_samples, n_channels));
    for c in 0..n_channels {
        let col = noise(n_samples, seed.wrapping_mul(31).wrapping_add(c as u64));
        data.column_mut(c).iter_mut().zip(col).for_each(|(d, v)| *d = v);
    }
    data
}

#[allow(unused)]
/// 32 × 24 px images: enough to exercise the raster path quickly.
pub fn small_image() -> ImageConfig {
    ImageConfig { width_in: 0.32, height_in: 0.24, dpi: 100.0, ..ImageConfig::default() }
}

#[allow(unused)]
/// Three 1000-sample state intervals, channels 0 and 2, 256/128 windows.
pub fn small_config() -> PipelineConfig {
    PipelineConfig {
        channels: vec![0, 2],
        intervals: vec![
            StateInterval::new(MentalState::Focused, 0, 1000),
            StateInterval::new(MentalState::Unfocused, 1000, 2000),
            StateInterval::new(MentalState::Drowsy, 2000, 3000),
        ],
        window_len: 256,
        stride: Some(128),
        image: small_image(),
        ..PipelineConfig::default()
    }
}

#[allow(unused)]
/// Sorted file names directly inside `dir`.
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[allow(unused)]
/// Write `data` as a `.safetensors` recording (tensor `data`, F32).
pub fn write_safetensors_recording(path: &Path, data: &Array2<f32>) {
    let mut w = StWriter::new();
    let (rows, cols) = data.dim();
    w.add_f32("data", &data.iter().copied().collect::<Vec<_>>(), &[rows, cols]);
    w.write(path).unwrap();
}

// ── Minimal little-endian level-5 MAT writer ───────────────────────────────

const MI_INT8: u32 = 1;
const MI_INT32: u32 = 5;
const MI_UINT32: u32 = 6;
const MI_DOUBLE: u32 = 9;
const MI_MATRIX: u32 = 14;
const MI_COMPRESSED: u32 = 15;
const MX_STRUCT: u32 = 2;
const MX_DOUBLE: u32 = 6;

fn element(mtype: u32, payload: &[u8]) -> Vec<u8> {
    let mut b = mtype.to_le_bytes().to_vec();
    b.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    b.extend_from_slice(payload);
    while b.len() % 8 != 0 {
        b.push(0);
    }
    b
}

fn matrix(class: u32, rows: usize, cols: usize, name: &str, body: &[u8]) -> Vec<u8> {
    let mut p = element(MI_UINT32, &[class.to_le_bytes(), 0u32.to_le_bytes()].concat());
    let dims = [(rows as i32).to_le_bytes(), (cols as i32).to_le_bytes()].concat();
    p.extend(element(MI_INT32, &dims));
    p.extend(element(MI_INT8, name.as_bytes()));
    p.extend_from_slice(body);
    element(MI_MATRIX, &p)
}

#[allow(unused)]
/// Write `data` as `o.data` in an uncompressed MAT file.
pub fn write_mat_recording(path: &Path, data: &Array2<f32>) {
    write_mat(path, data, false);
}

/// Same layout as [`write_mat_recording`] with `o` wrapped in a zlib
/// `miCOMPRESSED` element, as MATLAB's default `save` writes it.
#[allow(unused)]
pub fn write_compressed_mat_recording(path: &Path, data: &Array2<f32>) {
    write_mat(path, data, true);
}

#[allow(unused)]
fn write_mat(path: &Path, data: &Array2<f32>, compress: bool) {
    let (rows, cols) = data.dim();
    let col_major: Vec<u8> = data
        .t()
        .iter()
        .flat_map(|&v| (v as f64).to_le_bytes())
        .collect();
    let field = matrix(MX_DOUBLE, rows, cols, "", &element(MI_DOUBLE, &col_major));

    let mut body = Vec::new();
    body.extend_from_slice(&((4u32 << 16) | MI_INT32).to_le_bytes());
    body.extend_from_slice(&8i32.to_le_bytes());
    body.extend(element(MI_INT8, b"data\0\0\0\0"));
    body.extend(field);

    let mut file = b"MATLAB 5.0 MAT-file, eegram test fixture".to_vec();
    file.resize(124, b' ');
    file.extend_from_slice(&0x0100u16.to_le_bytes());
    file.extend_from_slice(b"IM");
    let o = matrix(MX_STRUCT, 1, 1, "o", &body);
    if compress {
        use std::io::Write;
        let mut enc = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        enc.write_all(&o).unwrap();
        let z = enc.finish().unwrap();
        file.extend_from_slice(&MI_COMPRESSED.to_le_bytes());
        file.extend_from_slice(&(z.len() as u32).to_le_bytes());
        file.extend(z);
    } else {
        file.extend(o);
    }
    std::fs::write(path, file).unwrap();
}

#[allow(unused)]
pub fn channel_dir(state_root: &Path, rec: &str, ch: usize) -> PathBuf {
    state_root.join(rec).join(ch.to_string())
}
