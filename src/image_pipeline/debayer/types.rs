//! Types for debayering operations

use std::fmt;
use std::str::FromStr;

use crate::image_pipeline::common::error::ConversionError;

/// RGB image data after debayering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
    /// RGB pixel data interleaved [R, G, B, R, G, B, ...]
    pub data: Vec<u16>,
    /// Bit depth of the source samples (8, 10 or 16)
    pub bits_per_sample: u32,
}

impl RasterImage {
    #[inline]
    pub fn pixel(&self, row: usize, col: usize) -> [u16; 3] {
        let i = (row * self.width + col) * 3;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }
}

/// Color recorded by one CFA cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CfaColor {
    Red,
    Green,
    Blue,
}

/// 2x2 Bayer tile layouts, named by reading the tile row by row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CfaPattern {
    #[default]
    Rggb,
    Bggr,
    Grbg,
    Gbrg,
}

impl CfaPattern {
    pub const ALL: [CfaPattern; 4] = [CfaPattern::Rggb, CfaPattern::Bggr, CfaPattern::Grbg, CfaPattern::Gbrg];

    /// Colors of the tile cells (0,0), (0,1), (1,0), (1,1).
    pub const fn layout(self) -> [CfaColor; 4] {
        use CfaColor::*;
        match self {
            CfaPattern::Rggb => [Red, Green, Green, Blue],
            CfaPattern::Bggr => [Blue, Green, Green, Red],
            CfaPattern::Grbg => [Green, Red, Blue, Green],
            CfaPattern::Gbrg => [Green, Blue, Red, Green],
        }
    }

    /// Tile cell indices of the red cell, the blue cell and the two green cells.
    pub fn cell_indices(self) -> TileCells {
        let layout = self.layout();
        let find = |color| layout.iter().position(|&c| c == color).unwrap_or(0);
        let green_first = find(CfaColor::Green);
        let green_second = (green_first + 1..4)
            .find(|&i| layout[i] == CfaColor::Green)
            .unwrap_or(green_first);
        TileCells {
            red: find(CfaColor::Red),
            blue: find(CfaColor::Blue),
            greens: [green_first, green_second],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CfaPattern::Rggb => "RGGB",
            CfaPattern::Bggr => "BGGR",
            CfaPattern::Grbg => "GRBG",
            CfaPattern::Gbrg => "GBRG",
        }
    }
}

/// Positions of each color inside a 2x2 tile, as indices `row * 2 + col`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileCells {
    pub red: usize,
    pub blue: usize,
    pub greens: [usize; 2],
}

impl fmt::Display for CfaPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CfaPattern {
    type Err = ConversionError;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        CfaPattern::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(code))
            .ok_or_else(|| ConversionError::UnsupportedPattern(code.to_string()))
    }
}
