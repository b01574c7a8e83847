//! Sensor frame reader for libcamera-style raw dumps.
//!
//! This module picks the byte layout of a dump from its declared format tag
//! and size, then decodes it into a 16-bit CFA sample grid.

use tracing::debug;

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::raw::reader::RawImageReader;
use crate::image_pipeline::raw::types::{FrameGeometry, RawLayout, SampleEndianness, SampleGrid};
use crate::image_pipeline::raw::unpack::unpack_10bit_packed;

/// Shift that promotes an 8-bit sample to the 16-bit range.
const PROMOTE_8_TO_16: u32 = 8;

/// Reader for raw sensor dumps described by a [`FrameGeometry`].
///
/// Supported layouts, tried in this order:
/// - packed 10-bit (`*10_CSI2P` / `*10_PACKED` tags)
/// - unpacked 16-bit, when the dump is exactly `width * height * 2` bytes
/// - unpacked 8-bit, when the dump is exactly `width * height` bytes
#[derive(Debug, Clone, Copy, Default)]
pub struct SensorFrameReader {
    endianness: SampleEndianness,
}

impl SensorFrameReader {
    pub fn new(endianness: SampleEndianness) -> Self {
        Self { endianness }
    }

    fn decode_16bit(&self, data: &[u8]) -> Vec<u16> {
        data.chunks_exact(2)
            .map(|pair| match self.endianness {
                SampleEndianness::Little => u16::from_le_bytes([pair[0], pair[1]]),
                SampleEndianness::Big => u16::from_be_bytes([pair[0], pair[1]]),
            })
            .collect()
    }
}

impl RawImageReader for SensorFrameReader {
    /// Decodes a raw dump into a sample grid.
    ///
    /// # Arguments
    ///
    /// * `data` - Bytes of the dump, exactly as written by the capture tool
    /// * `geometry` - Declared width, height, row stride and format tag
    ///
    /// # Returns
    ///
    /// * `Ok(SampleGrid)` - `width * height` samples in the 16-bit range
    /// * `Err(ConversionError)` - `MalformedInput` for inconsistent stride or
    ///   short buffers, `UnrecognizedFormat` when no layout matches
    fn read_raw(&self, data: &[u8], geometry: &FrameGeometry) -> Result<SampleGrid> {
        let width = geometry.width as usize;
        let height = geometry.height as usize;
        if width == 0 || height == 0 {
            return Err(ConversionError::InvalidDimensions(width, height));
        }

        let layout = RawLayout::detect(geometry, data.len())?;
        debug!(
            ?layout,
            bytes = data.len(),
            format = %geometry.format_tag,
            "Decoding raw frame"
        );

        let grid = match layout {
            RawLayout::Packed10 => {
                unpack_10bit_packed(data, width, height, geometry.row_stride as usize)?
            }
            RawLayout::Unpacked16 => {
                SampleGrid::new(width, height, self.decode_16bit(data), layout.bits_per_sample())
            }
            RawLayout::Unpacked8 => {
                let samples = data.iter().map(|&b| (b as u16) << PROMOTE_8_TO_16).collect();
                SampleGrid::new(width, height, samples, layout.bits_per_sample())
            }
        };

        debug!("Decoded frame: {}x{}", grid.width, grid.height);
        Ok(grid)
    }
}
