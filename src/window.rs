//! Sliding-window plan.
//!
//! Windows of `window_len` samples start at `0, stride, 2·stride, …` and are
//! numbered with 1-based ordinals.  A window `[i, j)` is taken while
//! `j < len`, so a window ending exactly on the last sample is not produced.
//! Overlapping (`stride < window_len`) and gapped (`stride > window_len`)
//! layouts are both valid.
use anyhow::{bail, Result};
use std::ops::Range;

/// Window positions over a sequence of fixed length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowPlan {
    len: usize,
    window_len: usize,
    stride: usize,
}

/// One window: its 1-based ordinal and sample range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowSpan {
    pub ordinal: usize,
    pub range: Range<usize>,
}

impl WindowPlan {
    pub fn new(len: usize, window_len: usize, stride: usize) -> Result<Self> {
        if window_len == 0 {
            bail!("window length must be > 0");
        }
        if stride == 0 {
            bail!("window stride must be > 0");
        }
        Ok(Self { len, window_len, stride })
    }

    /// Number of windows: `floor((len − window_len − 1) / stride) + 1`
    /// when `len > window_len`, else 0.
    ///
    /// Starts advance while `start < len`, so a window ending exactly at
    /// `len` is never produced.  This is one fewer than
    /// `floor((len − window_len) / stride) + 1` whenever `stride` divides
    /// `len − window_len`, and equal to it otherwise.
    pub fn count(&self) -> usize {
        if self.len <= self.window_len {
            0
        } else {
            (self.len - self.window_len - 1) / self.stride + 1
        }
    }

    pub fn window_len(&self) -> usize {
        self.window_len
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Iterate over all windows in order.
    pub fn iter(&self) -> Windows {
        Windows { plan: *self, start: 0, ordinal: 0 }
    }
}

impl IntoIterator for &WindowPlan {
    type Item = WindowSpan;
    type IntoIter = Windows;

    fn into_iter(self) -> Windows {
        self.iter()
    }
}

/// Iterator returned by [`WindowPlan::iter`].
#[derive(Debug, Clone)]
pub struct Windows {
    plan: WindowPlan,
    start: usize,
    ordinal: usize,
}

impl Iterator for Windows {
    type Item = WindowSpan;

    fn next(&mut self) -> Option<WindowSpan> {
        let end = self.start.checked_add(self.plan.window_len)?;
        if end >= self.plan.len {
            return None;
        }
        self.ordinal += 1;
        let span = WindowSpan { ordinal: self.ordinal, range: self.start..end };
        self.start = self.start.saturating_add(self.plan.stride);
        Some(span)
    }
}
