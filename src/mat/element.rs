//! MAT-file data elements.
//!
//! Every piece of data is wrapped in an element: an 8-byte tag followed by a
//! payload padded to a multiple of 8 bytes.
//!
//! ```text
//! regular:  ┌─ type : u32 ─┬─ nbytes : u32 ─┬─ payload … (pad to 8) ─┐
//! small:    ┌─ nbytes : u16 │ type : u16 ────┬─ payload (≤ 4 bytes) ──┐
//! ```
//!
//! A small element packs `nbytes` into the upper 16 bits of the first word,
//! so any first word with non-zero upper bits is a small element.
use anyhow::{bail, Result};

use super::constants::*;

/// Byte order of a MAT file, from its `IM` / `MI` indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

impl Endian {
    #[inline]
    pub fn u16(self, b: [u8; 2]) -> u16 {
        match self {
            Endian::Little => u16::from_le_bytes(b),
            Endian::Big => u16::from_be_bytes(b),
        }
    }

    #[inline]
    pub fn u32(self, b: [u8; 4]) -> u32 {
        match self {
            Endian::Little => u32::from_le_bytes(b),
            Endian::Big => u32::from_be_bytes(b),
        }
    }

    #[inline]
    pub fn u64(self, b: [u8; 8]) -> u64 {
        match self {
            Endian::Little => u64::from_le_bytes(b),
            Endian::Big => u64::from_be_bytes(b),
        }
    }
}

/// Tag of one element; the payload is not copied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementHeader {
    pub mtype: u32,
    pub nbytes: usize,
    /// Byte offset of the tag.
    pub pos: usize,
    pub small: bool,
}

impl ElementHeader {
    /// Offset of the first payload byte.
    #[inline]
    pub fn data_pos(&self) -> usize {
        if self.small { self.pos + 4 } else { self.pos + 8 }
    }

    /// Offset of the element that follows this one.
    #[inline]
    pub fn next_pos(&self) -> usize {
        if self.small {
            self.pos + 8
        } else {
            self.pos + 8 + self.nbytes.div_ceil(8) * 8
        }
    }
}

fn array<const N: usize>(bytes: &[u8], pos: usize) -> Result<[u8; N]> {
    match bytes.get(pos..pos + N) {
        Some(s) => {
            let mut a = [0u8; N];
            a.copy_from_slice(s);
            Ok(a)
        }
        None => bail!("unexpected end of data at byte {pos:#x}"),
    }
}

/// Read the element tag at `pos`.
pub fn read_header(bytes: &[u8], pos: usize, endian: Endian) -> Result<ElementHeader> {
    let first = endian.u32(array(bytes, pos)?);
    if first >> 16 != 0 {
        let nbytes = (first >> 16) as usize;
        if nbytes > 4 {
            bail!("small element @ {pos:#x} claims {nbytes} bytes");
        }
        return Ok(ElementHeader { mtype: first & 0xffff, nbytes, pos, small: true });
    }
    let nbytes = endian.u32(array(bytes, pos + 4)?) as usize;
    Ok(ElementHeader { mtype: first, nbytes, pos, small: false })
}

/// Borrow the payload of `hdr` (without padding).
pub fn payload<'a>(bytes: &'a [u8], hdr: &ElementHeader) -> Result<&'a [u8]> {
    let start = hdr.data_pos();
    match bytes.get(start..start + hdr.nbytes) {
        Some(p) => Ok(p),
        None => bail!(
            "element @ {:#x} ({} bytes) runs past the end of the file",
            hdr.pos,
            hdr.nbytes
        ),
    }
}

/// Size in bytes of one value of a numeric data type.
pub fn type_size(mtype: u32) -> Option<usize> {
    match mtype {
        MI_INT8 | MI_UINT8 | MI_UTF8 => Some(1),
        MI_INT16 | MI_UINT16 | MI_UTF16 => Some(2),
        MI_INT32 | MI_UINT32 | MI_SINGLE | MI_UTF32 => Some(4),
        MI_DOUBLE | MI_INT64 | MI_UINT64 => Some(8),
        _ => None,
    }
}

/// Decode a numeric payload of any storage type, promoting to f64.
///
/// MATLAB stores `double` arrays with the smallest integer type that holds
/// every value, so a double matrix may arrive as `miUINT8`, `miINT16`, …
pub fn read_numeric(bytes: &[u8], hdr: &ElementHeader, endian: Endian) -> Result<Vec<f64>> {
    let p = payload(bytes, hdr)?;
    let Some(size) = type_size(hdr.mtype) else {
        bail!("element @ {:#x}: type {} is not numeric", hdr.pos, hdr.mtype);
    };
    let out = p
        .chunks_exact(size)
        .map(|c| match hdr.mtype {
            MI_INT8 => c[0] as i8 as f64,
            MI_UINT8 | MI_UTF8 => c[0] as f64,
            MI_INT16 => endian.u16([c[0], c[1]]) as i16 as f64,
            MI_UINT16 | MI_UTF16 => endian.u16([c[0], c[1]]) as f64,
            MI_INT32 => endian.u32([c[0], c[1], c[2], c[3]]) as i32 as f64,
            MI_UINT32 | MI_UTF32 => endian.u32([c[0], c[1], c[2], c[3]]) as f64,
            MI_SINGLE => f32::from_bits(endian.u32([c[0], c[1], c[2], c[3]])) as f64,
            MI_INT64 => endian.u64([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]) as i64 as f64,
            MI_UINT64 => endian.u64([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]) as f64,
            _ => f64::from_bits(endian.u64([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]])),
        })
        .collect();
    Ok(out)
}

/// Decode an `miINT32` payload (array dimensions, field-name length).
pub fn read_i32s(bytes: &[u8], hdr: &ElementHeader, endian: Endian) -> Result<Vec<i32>> {
    if hdr.mtype != MI_INT32 {
        bail!("element @ {:#x}: expected miINT32, got type {}", hdr.pos, hdr.mtype);
    }
    Ok(payload(bytes, hdr)?
        .chunks_exact(4)
        .map(|c| endian.u32([c[0], c[1], c[2], c[3]]) as i32)
        .collect())
}

/// Decode an `miUINT32` payload (array flags).
pub fn read_u32s(bytes: &[u8], hdr: &ElementHeader, endian: Endian) -> Result<Vec<u32>> {
    if hdr.mtype != MI_UINT32 {
        bail!("element @ {:#x}: expected miUINT32, got type {}", hdr.pos, hdr.mtype);
    }
    Ok(payload(bytes, hdr)?
        .chunks_exact(4)
        .map(|c| endian.u32([c[0], c[1], c[2], c[3]]))
        .collect())
}

/// Decode an `miINT8` / `miUTF8` payload as text, stopping at the first NUL.
pub fn read_name(bytes: &[u8], hdr: &ElementHeader) -> Result<String> {
    let p = payload(bytes, hdr)?;
    let end = p.iter().position(|&b| b == 0).unwrap_or(p.len());
    Ok(String::from_utf8_lossy(&p[..end]).into_owned())
}
