//! MATLAB level-5 MAT-file reader.
//!
//! Decodes the layout MATLAB's `save` produces for v6 and v7 files: a 128-byte
//! text header followed by one element per variable.  A variable is either a
//! plain `miMATRIX` (v6) or an `miCOMPRESSED` element whose zlib stream
//! inflates to a single `miMATRIX` (v7, the default).
//!
//! # Quick start
//! ```no_run
//! use eegram::mat::read_mat;
//!
//! let mat = read_mat("data/eeg_record1.mat".as_ref()).unwrap();
//! let data = mat.get("o").and_then(|o| o.field("data")).unwrap().as_matrix().unwrap();
//! println!("{} samples × {} channels", data.nrows(), data.ncols());
//! ```
pub mod constants;
pub mod element;
pub mod matrix;

pub use element::{ElementHeader, Endian};
pub use matrix::{read_matrix, MatValue};

use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};
use flate2::read::ZlibDecoder;
use ndarray::Array2;

use constants::*;

/// All decodable variables of one MAT file.
#[derive(Debug, Clone)]
pub struct MatFile {
    /// Descriptive text from the first 116 header bytes, trimmed.
    pub description: String,
    pub endian: Endian,
    pub variables: Vec<(String, MatValue)>,
    /// Number of variables that were stored as `miCOMPRESSED`.
    pub compressed: usize,
}

impl MatFile {
    pub fn get(&self, name: &str) -> Option<&MatValue> {
        self.variables.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }
}

/// Read and decode a MAT file from disk.
pub fn read_mat(path: &Path) -> Result<MatFile> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    parse_mat(&bytes).with_context(|| format!("decoding {}", path.display()))
}

/// Decode an in-memory MAT file.
pub fn parse_mat(bytes: &[u8]) -> Result<MatFile> {
    if bytes.len() < HEADER_LEN {
        bail!("file too small for a MAT header ({} bytes)", bytes.len());
    }
    let endian = match &bytes[ENDIAN_OFFSET..HEADER_LEN] {
        b"IM" => Endian::Little,
        b"MI" => Endian::Big,
        other => bail!("not a level-5 MAT file (endian indicator {other:?})"),
    };
    let description = String::from_utf8_lossy(&bytes[..116])
        .trim_end_matches(['\0', ' '])
        .to_string();
    if description.contains("MATLAB 7.3") {
        bail!("HDF5-based v7.3 MAT files are not supported; re-save with `save -v7`");
    }

    let mut variables = Vec::new();
    let mut compressed = 0;
    let mut pos = HEADER_LEN;
    while pos + 8 <= bytes.len() {
        let hdr = element::read_header(bytes, pos, endian)?;
        match hdr.mtype {
            MI_MATRIX => {
                let (name, value) = read_matrix(bytes, &hdr, endian)
                    .with_context(|| format!("variable @ {pos:#x}"))?;
                variables.push((name, value));
                pos = hdr.next_pos();
            }
            MI_COMPRESSED => {
                let inflated = inflate(bytes, &hdr)?;
                let inner = element::read_header(&inflated, 0, endian)?;
                if inner.mtype == MI_MATRIX {
                    let (name, value) = read_matrix(&inflated, &inner, endian)
                        .with_context(|| format!("compressed variable @ {pos:#x}"))?;
                    variables.push((name, value));
                }
                compressed += 1;
                // compressed elements carry no trailing padding
                pos = hdr.data_pos() + hdr.nbytes;
            }
            _ => pos = hdr.next_pos(),
        }
    }
    Ok(MatFile { description, endian, variables, compressed })
}

/// Inflate the zlib stream of an `miCOMPRESSED` element.
fn inflate(bytes: &[u8], hdr: &ElementHeader) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    ZlibDecoder::new(element::payload(bytes, hdr)?)
        .read_to_end(&mut out)
        .with_context(|| format!("inflating compressed element @ {:#x}", hdr.pos))?;
    Ok(out)
}

/// Load `variable.field` (or `variable` itself if it is numeric) as a matrix.
pub fn read_matrix_field(path: &Path, variable: &str, field: &str) -> Result<Array2<f64>> {
    let mat = read_mat(path)?;
    let Some(value) = mat.get(variable) else {
        bail!("{}: variable '{variable}' not found", path.display());
    };
    let target = match value {
        MatValue::Struct { .. } => value.field(field).with_context(|| {
            format!("{}: struct '{variable}' has no field '{field}'", path.display())
        })?,
        other => other,
    };
    target
        .as_matrix()
        .with_context(|| format!("{}: '{variable}.{field}'", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Minimal little-endian MAT writer for fixtures ──────────────────────

    fn element(mtype: u32, payload: &[u8]) -> Vec<u8> {
        let mut b = mtype.to_le_bytes().to_vec();
        b.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        b.extend_from_slice(payload);
        while b.len() % 8 != 0 {
            b.push(0);
        }
        b
    }

    fn matrix(class: u8, dims: &[i32], name: &str, body: &[u8]) -> Vec<u8> {
        let mut p = Vec::new();
        let flags: Vec<u8> = [class as u32, 0].iter().flat_map(|v| v.to_le_bytes()).collect();
        p.extend(element(MI_UINT32, &flags));
        let d: Vec<u8> = dims.iter().flat_map(|v| v.to_le_bytes()).collect();
        p.extend(element(MI_INT32, &d));
        p.extend(element(MI_INT8, name.as_bytes()));
        p.extend_from_slice(body);
        element(MI_MATRIX, &p)
    }

    fn doubles(rows: i32, cols: i32, col_major: &[f64]) -> Vec<u8> {
        let data: Vec<u8> = col_major.iter().flat_map(|v| v.to_le_bytes()).collect();
        matrix(MX_DOUBLE, &[rows, cols], "", &element(MI_DOUBLE, &data))
    }

    fn header() -> Vec<u8> {
        let mut h = b"MATLAB 5.0 MAT-file, test fixture".to_vec();
        h.resize(124, b' ');
        h.extend_from_slice(&0x0100u16.to_le_bytes());
        h.extend_from_slice(b"IM");
        h
    }

    fn struct_o(data: Vec<u8>) -> Vec<u8> {
        let mut body = Vec::new();
        // field-name length as a small element
        body.extend_from_slice(&((4u32 << 16) | MI_INT32).to_le_bytes());
        body.extend_from_slice(&8i32.to_le_bytes());
        let mut names = b"id\0\0\0\0\0\0".to_vec();
        names.extend_from_slice(b"data\0\0\0\0");
        body.extend(element(MI_INT8, &names));
        body.extend(doubles(1, 1, &[30.0]));
        body.extend(data);
        matrix(MX_STRUCT, &[1, 1], "o", &body)
    }

    #[test]
    fn struct_field_matrix_is_column_major() {
        // 3 samples × 2 channels: ch0 = [1,2,3], ch1 = [10,20,30]
        let mut file = header();
        file.extend(struct_o(doubles(3, 2, &[1.0, 2.0, 3.0, 10.0, 20.0, 30.0])));
        let mat = parse_mat(&file).unwrap();
        assert_eq!(mat.endian, Endian::Little);
        let data = mat.get("o").unwrap().field("data").unwrap().as_matrix().unwrap();
        assert_eq!(data.dim(), (3, 2));
        assert_eq!(data[[2, 0]], 3.0);
        assert_eq!(data[[0, 1]], 10.0);
        let id = mat.get("o").unwrap().field("id").unwrap().as_matrix().unwrap();
        assert_eq!(id[[0, 0]], 30.0);
    }

    fn zlib(raw: &[u8]) -> Vec<u8> {
        use flate2::write::ZlibEncoder;
        use std::io::Write;
        let mut enc = ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        enc.write_all(raw).unwrap();
        enc.finish().unwrap()
    }

    /// `miCOMPRESSED` tag + zlib stream, unpadded as MATLAB writes it.
    fn compressed(raw: &[u8]) -> Vec<u8> {
        let z = zlib(raw);
        let mut b = MI_COMPRESSED.to_le_bytes().to_vec();
        b.extend_from_slice(&(z.len() as u32).to_le_bytes());
        b.extend(z);
        b
    }

    #[test]
    fn compressed_variables_are_inflated() {
        let mut file = header();
        file.extend(compressed(&struct_o(doubles(3, 2, &[1.0, 2.0, 3.0, 10.0, 20.0, 30.0]))));
        let mat = parse_mat(&file).unwrap();
        assert_eq!(mat.compressed, 1);
        let data = mat.get("o").unwrap().field("data").unwrap().as_matrix().unwrap();
        assert_eq!(data.dim(), (3, 2));
        assert_eq!(data[[1, 1]], 20.0);
    }

    #[test]
    fn consecutive_compressed_variables_without_padding() {
        let mut file = header();
        let x: Vec<u8> = [7.0f64, 8.0, 9.0].iter().flat_map(|v| v.to_le_bytes()).collect();
        file.extend(compressed(&matrix(MX_DOUBLE, &[1, 3], "x", &element(MI_DOUBLE, &x))));
        file.extend(compressed(&struct_o(doubles(1, 1, &[5.0]))));
        let mat = parse_mat(&file).unwrap();
        assert_eq!(mat.compressed, 2);
        assert_eq!(mat.get("x").unwrap().as_matrix().unwrap()[[0, 2]], 9.0);
        assert_eq!(mat.get("o").unwrap().field("data").unwrap().as_matrix().unwrap()[[0, 0]], 5.0);
    }

    #[test]
    fn corrupt_zlib_stream_is_an_error() {
        let mut file = header();
        file.extend(element(MI_COMPRESSED, &[0u8; 13]));
        assert!(parse_mat(&file).is_err());
    }

    #[test]
    fn bad_endian_indicator_rejected() {
        let mut file = header();
        file[126] = b'X';
        assert!(parse_mat(&file).is_err());
    }

    #[test]
    fn read_matrix_field_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eeg_record1.mat");
        let mut file = header();
        file.extend(struct_o(doubles(2, 2, &[1.0, 2.0, 3.0, 4.0])));
        std::fs::write(&path, &file).unwrap();

        let m = read_matrix_field(&path, "o", "data").unwrap();
        assert_eq!(m[[1, 1]], 4.0);
        assert!(read_matrix_field(&path, "o", "missing").is_err());
        assert!(read_matrix_field(&path, "x", "data").is_err());
    }

    #[test]
    fn value_count_mismatch_rejected() {
        let mut file = header();
        file.extend(doubles(2, 2, &[1.0, 2.0, 3.0]));
        assert!(parse_mat(&file).is_err());
    }
}
