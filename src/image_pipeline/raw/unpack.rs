//! Packed 10-bit sample decoding.
//!
//! Four 10-bit samples are stored in five bytes: bytes 0..4 carry the eight
//! most significant bits of samples 0..4, and the fifth byte carries the two
//! least significant bits of each sample, sample 0 in bits 0-1 up to
//! sample 3 in bits 6-7. Rows are `row_stride` bytes long; anything after the
//! last group of a row is padding.

use rayon::prelude::*;
use tracing::debug;

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::raw::types::SampleGrid;

/// Bytes occupied by one group of packed samples.
pub const GROUP_BYTES: usize = 5;

/// Samples carried by one group.
pub const GROUP_SAMPLES: usize = 4;

/// Shift that promotes a 10-bit sample to the 16-bit range.
const NORMALIZE_SHIFT: u32 = 6;

/// Smallest row stride able to hold `width` packed samples.
pub fn min_row_stride(width: usize) -> usize {
    width.div_ceil(GROUP_SAMPLES) * GROUP_BYTES
}

/// Decodes one 5-byte group into four raw 10-bit values.
#[inline]
fn unpack_group(group: &[u8]) -> [u16; GROUP_SAMPLES] {
    let low_bits = group[4] as u16;
    std::array::from_fn(|i| ((group[i] as u16) << 2) | ((low_bits >> (2 * i)) & 0x3))
}

/// Encodes four 10-bit values into a 5-byte group. Bits above the tenth are ignored.
pub fn pack_10bit_group(samples: [u16; GROUP_SAMPLES]) -> [u8; GROUP_BYTES] {
    let mut group = [0u8; GROUP_BYTES];
    for (i, &sample) in samples.iter().enumerate() {
        let sample = sample & 0x3ff;
        group[i] = (sample >> 2) as u8;
        group[4] |= ((sample & 0x3) as u8) << (2 * i);
    }
    group
}

fn unpack_row(row_bytes: &[u8], out: &mut [u16]) {
    for (group_index, out_chunk) in out.chunks_mut(GROUP_SAMPLES).enumerate() {
        let offset = group_index * GROUP_BYTES;
        let Some(group) = row_bytes.get(offset..offset + GROUP_BYTES) else {
            // Cells stay zero rather than reading past the row
            continue;
        };
        let values = unpack_group(group);
        for (dst, value) in out_chunk.iter_mut().zip(values) {
            *dst = value << NORMALIZE_SHIFT;
        }
    }
}

/// Unpacks a padded 10-bit packed frame into a 16-bit sample grid.
///
/// Every sample is stored as `value << 6`, so the output lies in `[0, 65472]`
/// in steps of 64.
///
/// # Errors
///
/// * `MalformedInput` if `row_stride` cannot hold `width` packed samples, or
///   if `data` is shorter than `row_stride * height`.
pub fn unpack_10bit_packed(
    data: &[u8],
    width: usize,
    height: usize,
    row_stride: usize,
) -> Result<SampleGrid> {
    let min_stride = min_row_stride(width);
    if row_stride < min_stride {
        return Err(ConversionError::MalformedInput(format!(
            "row stride {} is smaller than the {} bytes needed for {} packed samples",
            row_stride, min_stride, width
        )));
    }

    let required = row_stride.checked_mul(height).ok_or_else(|| {
        ConversionError::MalformedInput(format!(
            "frame size overflows: stride {} x height {}",
            row_stride, height
        ))
    })?;
    if data.len() < required {
        return Err(ConversionError::MalformedInput(format!(
            "buffer holds {} bytes, {} rows of {} bytes need {}",
            data.len(),
            height,
            row_stride,
            required
        )));
    }

    debug!(width, height, row_stride, "Unpacking 10-bit packed frame");

    let mut samples = vec![0u16; width * height];
    if width == 0 || height == 0 {
        return Ok(SampleGrid::new(width, height, samples, 10));
    }

    samples
        .par_chunks_mut(width)
        .zip(data[..required].par_chunks(row_stride))
        .for_each(|(out_row, row_bytes)| unpack_row(&row_bytes[..min_stride], out_row));

    Ok(SampleGrid::new(width, height, samples, 10))
}
