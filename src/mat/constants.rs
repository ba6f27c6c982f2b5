//! MAT-file level-5 constants.
//!
//! Names follow the MATLAB "MAT-File Format" reference: `mi*` are on-disk
//! data types of an element tag, `mx*` are array classes stored in the
//! array-flags sub-element of an `miMATRIX`.

#![allow(dead_code)]

/// Length of the descriptive file header.
pub const HEADER_LEN: usize = 128;
/// Offset of the two-byte endian indicator inside the header.
pub const ENDIAN_OFFSET: usize = 126;

// ── Data types (element tag `type` field) ─────────────────────────────────

pub const MI_INT8:       u32 = 1;
pub const MI_UINT8:      u32 = 2;
pub const MI_INT16:      u32 = 3;
pub const MI_UINT16:     u32 = 4;
pub const MI_INT32:      u32 = 5;
pub const MI_UINT32:     u32 = 6;
pub const MI_SINGLE:     u32 = 7;
pub const MI_DOUBLE:     u32 = 9;
pub const MI_INT64:      u32 = 12;
pub const MI_UINT64:     u32 = 13;
/// Array (numeric, char, struct, cell, …) with its own sub-elements.
pub const MI_MATRIX:     u32 = 14;
/// zlib-compressed element (written by `save -v7`, the MATLAB default).
pub const MI_COMPRESSED: u32 = 15;
pub const MI_UTF8:       u32 = 16;
pub const MI_UTF16:      u32 = 17;
pub const MI_UTF32:      u32 = 18;

// ── Array classes (low byte of the first array-flags word) ────────────────

pub const MX_CELL:   u8 = 1;
pub const MX_STRUCT: u8 = 2;
pub const MX_OBJECT: u8 = 3;
pub const MX_CHAR:   u8 = 4;
pub const MX_SPARSE: u8 = 5;
pub const MX_DOUBLE: u8 = 6;
pub const MX_SINGLE: u8 = 7;
pub const MX_INT8:   u8 = 8;
pub const MX_UINT8:  u8 = 9;
pub const MX_INT16:  u8 = 10;
pub const MX_UINT16: u8 = 11;
pub const MX_INT32:  u8 = 12;
pub const MX_UINT32: u8 = 13;
pub const MX_INT64:  u8 = 14;
pub const MX_UINT64: u8 = 15;

/// Array-flags bit marking a complex array (an imaginary part follows).
pub const FLAG_COMPLEX: u32 = 0x0800;
