//! Mental-state labels and their fixed sample-index intervals.
//!
//! Each recording is assumed to follow the same protocol: the subject is
//! focused first, then unfocused, then drowsy.  The boundaries are constants
//! of the pipeline, not derived from the data.
use std::fmt;
use std::str::FromStr;

/// Mental-state category attached to an interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MentalState {
    Focused,
    Unfocused,
    Drowsy,
}

impl MentalState {
    /// All states in protocol order.
    pub const ALL: [MentalState; 3] = [
        MentalState::Focused,
        MentalState::Unfocused,
        MentalState::Drowsy,
    ];

    /// Lower-case label used as the image file stem (`focused_1.png`).
    pub fn label(self) -> &'static str {
        match self {
            MentalState::Focused => "focused",
            MentalState::Unfocused => "unfocused",
            MentalState::Drowsy => "drowsy",
        }
    }

    /// Upper-case label used as the segment CSV file name.
    pub fn csv_name(self) -> &'static str {
        match self {
            MentalState::Focused => "FOCUSED",
            MentalState::Unfocused => "UNFOCUSED",
            MentalState::Drowsy => "DROWSY",
        }
    }
}

impl fmt::Display for MentalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.csv_name())
    }
}

impl FromStr for MentalState {
    type Err = String;

    /// Case-insensitive parse of `focused`, `unfocused` or `drowsy`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "focused" => Ok(MentalState::Focused),
            "unfocused" => Ok(MentalState::Unfocused),
            "drowsy" => Ok(MentalState::Drowsy),
            other => Err(format!("unknown mental state `{other}`")),
        }
    }
}

/// A labeled half-open interval `[start, end)` of absolute sample indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateInterval {
    pub state: MentalState,
    pub start: usize,
    pub end: usize,
}

impl StateInterval {
    /// Build an interval; `end` is raised to `start` if it lies before it.
    pub const fn new(state: MentalState, start: usize, end: usize) -> Self {
        let end = if end < start { start } else { end };
        Self { state, start, end }
    }

    /// Requested number of samples (before any clipping).  Zero for an
    /// inverted literal whose `end` lies before `start`.
    #[inline]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Samples per state at 128 Hz: 10 minutes.
const STATE_SPAN: usize = 10 * 60 * 128;

static DEFAULT_INTERVALS: [StateInterval; 3] = [
    StateInterval::new(MentalState::Focused, 0, STATE_SPAN),
    StateInterval::new(MentalState::Unfocused, STATE_SPAN, 2 * STATE_SPAN),
    StateInterval::new(MentalState::Drowsy, 2 * STATE_SPAN, 3 * STATE_SPAN),
];

/// Protocol intervals: `[0, 76800)`, `[76800, 153600)`, `[153600, 230400)`.
pub fn default_intervals() -> &'static [StateInterval] {
    &DEFAULT_INTERVALS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_intervals_are_contiguous() {
        let iv = default_intervals();
        assert_eq!(iv[0].start, 0);
        for pair in iv.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        assert_eq!(iv[2].end, 230_400);
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("FOCUSED".parse::<MentalState>().unwrap(), MentalState::Focused);
        assert_eq!("Drowsy".parse::<MentalState>().unwrap(), MentalState::Drowsy);
        assert!("asleep".parse::<MentalState>().is_err());
    }

    #[test]
    fn inverted_interval_collapses_to_empty() {
        let iv = StateInterval::new(MentalState::Focused, 10, 5);
        assert!(iv.is_empty());
        assert_eq!(iv.len(), 0);
    }

    #[test]
    fn inverted_literal_has_zero_len() {
        let iv = StateInterval { state: MentalState::Drowsy, start: 10, end: 5 };
        assert_eq!(iv.len(), 0);
        assert!(iv.is_empty());
    }
}
