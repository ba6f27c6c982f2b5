//! Named colour palettes.
//!
//! Each palette is sampled from the matplotlib colormap of the same name at
//! nine evenly spaced points and linearly interpolated in between.
use std::fmt;
use std::str::FromStr;

/// Palette the log-power image is mapped through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMap {
    #[default]
    Viridis,
    Magma,
    Inferno,
    Plasma,
    Grayscale,
}

type Anchors = [[u8; 3]; 9];

const VIRIDIS: Anchors = [
    [68, 1, 84], [72, 40, 120], [62, 73, 137], [49, 104, 142], [38, 130, 142],
    [31, 158, 137], [53, 183, 121], [110, 206, 88], [253, 231, 37],
];
const MAGMA: Anchors = [
    [0, 0, 4], [28, 16, 68], [79, 18, 123], [129, 37, 129], [181, 54, 122],
    [229, 80, 100], [251, 135, 97], [254, 194, 135], [252, 253, 191],
];
const INFERNO: Anchors = [
    [0, 0, 4], [31, 12, 72], [85, 15, 109], [136, 34, 106], [186, 54, 85],
    [227, 89, 51], [249, 142, 9], [249, 203, 53], [252, 255, 164],
];
const PLASMA: Anchors = [
    [13, 8, 135], [76, 2, 161], [126, 3, 168], [169, 35, 149], [204, 71, 120],
    [230, 108, 92], [248, 149, 64], [253, 197, 39], [240, 249, 33],
];
const GRAY: Anchors = [
    [0, 0, 0], [32, 32, 32], [64, 64, 64], [96, 96, 96], [128, 128, 128],
    [159, 159, 159], [191, 191, 191], [223, 223, 223], [255, 255, 255],
];

impl ColorMap {
    /// RGB colour of a normalised value; `t` is clamped to `[0, 1]`, NaN maps to 0.
    pub fn rgb(self, t: f64) -> [u8; 3] {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let anchors = self.anchors();
        let pos = t * (anchors.len() - 1) as f64;
        let lo = (pos.floor() as usize).min(anchors.len() - 2);
        let frac = pos - lo as f64;
        let (a, b) = (anchors[lo], anchors[lo + 1]);
        let mix = |i: usize| (a[i] as f64 + (b[i] as f64 - a[i] as f64) * frac).round() as u8;
        [mix(0), mix(1), mix(2)]
    }

    fn anchors(self) -> &'static Anchors {
        match self {
            ColorMap::Viridis => &VIRIDIS,
            ColorMap::Magma => &MAGMA,
            ColorMap::Inferno => &INFERNO,
            ColorMap::Plasma => &PLASMA,
            ColorMap::Grayscale => &GRAY,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ColorMap::Viridis => "viridis",
            ColorMap::Magma => "magma",
            ColorMap::Inferno => "inferno",
            ColorMap::Plasma => "plasma",
            ColorMap::Grayscale => "gray",
        }
    }
}

impl fmt::Display for ColorMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ColorMap {
    type Err = String;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.to_ascii_lowercase().as_str() {
            "viridis" => Ok(ColorMap::Viridis),
            "magma" => Ok(ColorMap::Magma),
            "inferno" => Ok(ColorMap::Inferno),
            "plasma" => Ok(ColorMap::Plasma),
            "gray" | "grey" | "grayscale" => Ok(ColorMap::Grayscale),
            other => Err(format!("unknown colormap `{other}`")),
        }
    }
}
