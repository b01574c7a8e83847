//! RAW frame data types

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::debayer::pattern::strip_sensor_prefix;

/// Geometry and format of a captured frame, as declared by the capture tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameGeometry {
    /// Width of the frame in pixels
    pub width: u32,
    /// Height of the frame in pixels
    pub height: u32,
    /// Bytes per row in the dump, padding included
    pub row_stride: u32,
    /// Sensor pixel format, e.g. `SBGGR10_CSI2P`
    pub format_tag: String,
}

impl FrameGeometry {
    pub fn new(width: u32, height: u32, row_stride: u32, format_tag: impl Into<String>) -> Self {
        Self {
            width,
            height,
            row_stride,
            format_tag: format_tag.into(),
        }
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Single-channel CFA mosaic, one 16-bit sample per pixel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleGrid {
    /// Width of the grid in pixels
    pub width: usize,
    /// Height of the grid in pixels
    pub height: usize,
    /// Row-major samples, `width * height` long
    pub data: Vec<u16>,
    /// Bit depth of the source samples before promotion to 16 bits (8, 10 or 16)
    pub bits_per_sample: u32,
}

impl SampleGrid {
    pub fn new(width: usize, height: usize, data: Vec<u16>, bits_per_sample: u32) -> Self {
        debug_assert_eq!(data.len(), width * height);
        Self {
            width,
            height,
            data,
            bits_per_sample,
        }
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u16 {
        self.data[row * self.width + col]
    }
}

/// Byte order of the unpacked 16-bit fallback layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SampleEndianness {
    #[default]
    Little,
    Big,
}

/// Byte layouts a frame dump can be decoded from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawLayout {
    /// MIPI CSI-2 style: 4 samples in 5 bytes, rows padded to the stride
    Packed10,
    /// One 16-bit sample per pixel, no padding
    Unpacked16,
    /// One byte per pixel, no padding
    Unpacked8,
}

impl RawLayout {
    /// Checked in order; the declared tag wins over size heuristics.
    pub const DISPATCH_ORDER: [RawLayout; 3] =
        [RawLayout::Packed10, RawLayout::Unpacked16, RawLayout::Unpacked8];

    /// True for `S<code>10_CSI2P` / `S<code>10_PACKED` style tags: the bit depth
    /// must directly follow the four pattern letters.
    pub fn is_packed10_tag(format_tag: &str) -> bool {
        let Some(after_code) = strip_sensor_prefix(format_tag).and_then(|rest| rest.get(4..)) else {
            return false;
        };
        let depth_len = after_code.bytes().take_while(u8::is_ascii_digit).count();
        let (depth, suffix) = after_code.split_at(depth_len);
        let suffix = suffix.to_ascii_uppercase();
        depth == "10" && (suffix.contains("CSI2P") || suffix.contains("PACKED"))
    }

    fn matches(self, geometry: &FrameGeometry, len: usize) -> bool {
        let pixels = geometry.pixel_count();
        match self {
            RawLayout::Packed10 => Self::is_packed10_tag(&geometry.format_tag),
            RawLayout::Unpacked16 => pixels.checked_mul(2) == Some(len),
            RawLayout::Unpacked8 => pixels == len,
        }
    }

    pub fn detect(geometry: &FrameGeometry, len: usize) -> Result<RawLayout> {
        Self::DISPATCH_ORDER
            .into_iter()
            .find(|layout| layout.matches(geometry, len))
            .ok_or(ConversionError::UnrecognizedFormat {
                len,
                width: geometry.width as usize,
                height: geometry.height as usize,
            })
    }

    pub fn bits_per_sample(self) -> u32 {
        match self {
            RawLayout::Packed10 => 10,
            RawLayout::Unpacked16 => 16,
            RawLayout::Unpacked8 => 8,
        }
    }
}
