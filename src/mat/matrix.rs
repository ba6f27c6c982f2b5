//! `miMATRIX` decoding.
//!
//! An `miMATRIX` payload is a sequence of sub-elements:
//!
//! ```text
//! array flags  (miUINT32 × 2)   class in the low byte of word 0
//! dimensions   (miINT32 × ndim)
//! array name   (miINT8)
//! … class-specific:
//!   numeric  real part [, imaginary part]
//!   char     character data
//!   struct   field-name length, field names, then one miMATRIX per
//!            (element, field) in column-major element order
//!   cell     one miMATRIX per cell
//! ```
use anyhow::{bail, Context, Result};
use ndarray::{Array2, ShapeBuilder};

use super::constants::*;
use super::element::{
    payload, read_header, read_i32s, read_name, read_numeric, read_u32s, ElementHeader, Endian,
};

/// A decoded MATLAB array.
#[derive(Debug, Clone, PartialEq)]
pub enum MatValue {
    /// Real part of a numeric array, column-major.
    Numeric { dims: Vec<usize>, data: Vec<f64> },
    Char(String),
    Struct {
        dims: Vec<usize>,
        fields: Vec<String>,
        /// `elements[e][f]` is field `f` of struct element `e`.
        elements: Vec<Vec<MatValue>>,
    },
    Cell { dims: Vec<usize>, cells: Vec<MatValue> },
    /// Zero-length `miMATRIX` (MATLAB writes these for `[]`).
    Empty,
    /// Sparse, object and other classes this reader does not decode.
    Unsupported { class: u8 },
}

impl MatValue {
    /// Field `name` of the first struct element.
    pub fn field(&self, name: &str) -> Option<&MatValue> {
        match self {
            MatValue::Struct { fields, elements, .. } => {
                let idx = fields.iter().position(|f| f == name)?;
                elements.first()?.get(idx)
            }
            _ => None,
        }
    }

    /// View a 2-D numeric array as `[rows, cols]`.
    pub fn as_matrix(&self) -> Result<Array2<f64>> {
        match self {
            MatValue::Numeric { dims, data } => {
                if dims.len() != 2 {
                    bail!("expected a 2-D array, got dimensions {dims:?}");
                }
                Array2::from_shape_vec((dims[0], dims[1]).f(), data.clone())
                    .context("array data does not match its dimensions")
            }
            MatValue::Empty => Ok(Array2::zeros((0, 0))),
            other => bail!("expected a numeric array, got {}", other.kind()),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            MatValue::Numeric { .. } => "numeric",
            MatValue::Char(_) => "char",
            MatValue::Struct { .. } => "struct",
            MatValue::Cell { .. } => "cell",
            MatValue::Empty => "empty",
            MatValue::Unsupported { .. } => "unsupported",
        }
    }
}

/// Sequential reader over the sub-elements of one `miMATRIX`.
struct SubElements<'a> {
    bytes: &'a [u8],
    pos: usize,
    end: usize,
    endian: Endian,
}

impl SubElements<'_> {
    fn next(&mut self, what: &str) -> Result<ElementHeader> {
        if self.pos + 8 > self.end {
            bail!("matrix @ {:#x}: missing {what}", self.pos);
        }
        let hdr = read_header(self.bytes, self.pos, self.endian)?;
        if hdr.next_pos() > self.end {
            bail!("matrix @ {:#x}: {what} overruns the enclosing element", self.pos);
        }
        self.pos = hdr.next_pos();
        Ok(hdr)
    }
}

/// Decode the `miMATRIX` element `hdr`, returning its name and value.
pub fn read_matrix(bytes: &[u8], hdr: &ElementHeader, endian: Endian) -> Result<(String, MatValue)> {
    if hdr.mtype != MI_MATRIX {
        bail!("element @ {:#x}: expected miMATRIX, got type {}", hdr.pos, hdr.mtype);
    }
    if hdr.nbytes == 0 {
        return Ok((String::new(), MatValue::Empty));
    }
    payload(bytes, hdr)?;
    let mut sub = SubElements {
        bytes,
        pos: hdr.data_pos(),
        end: hdr.data_pos() + hdr.nbytes,
        endian,
    };

    let flags = read_u32s(bytes, &sub.next("array flags")?, endian)?;
    let flags0 = *flags.first().context("empty array flags")?;
    let class = (flags0 & 0xff) as u8;

    let dims: Vec<usize> = read_i32s(bytes, &sub.next("dimensions")?, endian)?
        .into_iter()
        .map(|d| d.max(0) as usize)
        .collect();
    let n_elem: usize = dims.iter().product();
    let name = read_name(bytes, &sub.next("array name")?)?;

    let value = match class {
        MX_DOUBLE..=MX_UINT64 => {
            let re = sub.next("real part")?;
            let data = read_numeric(bytes, &re, endian)?;
            if data.len() != n_elem {
                bail!(
                    "array '{name}': {} values for dimensions {dims:?}",
                    data.len()
                );
            }
            MatValue::Numeric { dims, data }
        }
        MX_CHAR => {
            let chars = sub.next("character data")?;
            let codes = read_numeric(bytes, &chars, endian)?;
            MatValue::Char(
                codes
                    .into_iter()
                    .map(|c| char::from_u32(c as u32).unwrap_or('\u{fffd}'))
                    .collect(),
            )
        }
        MX_STRUCT => {
            let name_len = *read_i32s(bytes, &sub.next("field name length")?, endian)?
                .first()
                .context("empty field name length")?;
            let name_len = name_len.max(1) as usize;
            let names_hdr = sub.next("field names")?;
            let fields: Vec<String> = payload(bytes, &names_hdr)?
                .chunks(name_len)
                .map(|c| {
                    let end = c.iter().position(|&b| b == 0).unwrap_or(c.len());
                    String::from_utf8_lossy(&c[..end]).into_owned()
                })
                .collect();
            let mut elements = Vec::with_capacity(n_elem);
            for _ in 0..n_elem {
                let mut values = Vec::with_capacity(fields.len());
                for field in &fields {
                    let h = sub.next("struct field")?;
                    let (_, v) = read_matrix(bytes, &h, endian)
                        .with_context(|| format!("struct '{name}', field '{field}'"))?;
                    values.push(v);
                }
                elements.push(values);
            }
            MatValue::Struct { dims, fields, elements }
        }
        MX_CELL => {
            let mut cells = Vec::with_capacity(n_elem);
            for i in 0..n_elem {
                let h = sub.next("cell")?;
                let (_, v) = read_matrix(bytes, &h, endian)
                    .with_context(|| format!("cell array '{name}', cell {i}"))?;
                cells.push(v);
            }
            MatValue::Cell { dims, cells }
        }
        other => MatValue::Unsupported { class: other },
    };
    Ok((name, value))
}
