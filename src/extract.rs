//! Labeled-range extraction.
//!
//! Cuts the samples of one [`StateInterval`] out of a full channel sequence.
//! The end of the interval is clipped silently to the available data; a start
//! beyond the data is reported as [`RangeUnavailable`] so the caller can skip
//! that (recording, state) pair.
use crate::error::RangeUnavailable;
use crate::state::StateInterval;

/// Return `sequence[start .. min(end, len)]`.
///
/// `start == len` is in range and yields an empty slice.
///
/// # Errors
///
/// [`RangeUnavailable`] when `interval.start > sequence.len()`.
///
/// # Examples
///
/// ```
/// use eegram::{extract, MentalState, StateInterval};
///
/// let s = [0.0_f32, 1.0, 2.0, 3.0, 4.0];
/// let iv = StateInterval::new(MentalState::Focused, 2, 100);
/// assert_eq!(extract(&s, &iv).unwrap(), &[2.0, 3.0, 4.0]);
///
/// let late = StateInterval::new(MentalState::Drowsy, 6, 9);
/// assert!(extract(&s, &late).is_err());
/// ```
pub fn extract<'a>(
    sequence: &'a [f32],
    interval: &StateInterval,
) -> Result<&'a [f32], RangeUnavailable> {
    let available = sequence.len();
    if interval.start > available {
        return Err(RangeUnavailable {
            start: interval.start,
            end: interval.end,
            available,
        });
    }
    let end = interval.end.min(available).max(interval.start);
    Ok(&sequence[interval.start..end])
}
