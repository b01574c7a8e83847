use rayon::prelude::*;
use tracing::info;

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::debayer::types::{CfaPattern, RasterImage, TileCells};
use crate::image_pipeline::raw::SampleGrid;

/// Nearest-neighbour demosaicing over aligned 2x2 tiles.
///
/// Every pixel of a tile takes the tile's red and blue samples. Green cells
/// keep their own sample; the red and blue cells take the floor average of
/// the two greens.
///
/// Tiles are anchored at even coordinates. When the width or height is odd,
/// the missing cells of the last tile are read from the last valid column or
/// row.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuDebayer;

impl CpuDebayer {
    pub fn new() -> Self {
        Self
    }

    pub fn process(&self, grid: &SampleGrid, pattern: CfaPattern) -> Result<RasterImage> {
        let width = grid.width;
        let height = grid.height;
        if grid.data.len() != width * height {
            return Err(ConversionError::MalformedInput(format!(
                "sample grid holds {} values, {}x{} expected",
                grid.data.len(),
                width,
                height
            )));
        }
        info!("Starting CPU debayering for image {}x{}, CFA={}", width, height, pattern);

        let mut data = vec![0u16; width * height * 3];
        if width > 0 && height > 0 {
            let cells = pattern.cell_indices();
            data.par_chunks_mut(width * 3)
                .enumerate()
                .for_each(|(row, out_row)| demosaic_row(grid, cells, row, out_row));
        }

        Ok(RasterImage {
            width,
            height,
            data,
            bits_per_sample: grid.bits_per_sample,
        })
    }
}

/// Convenience wrapper around [`CpuDebayer::process`].
pub fn demosaic(grid: &SampleGrid, pattern: CfaPattern) -> Result<RasterImage> {
    CpuDebayer::new().process(grid, pattern)
}

fn demosaic_row(grid: &SampleGrid, cells: TileCells, row: usize, out_row: &mut [u16]) {
    let top = row & !1;
    let bottom = (top + 1).min(grid.height - 1);
    let row_parity = row & 1;

    for (col, pixel) in out_row.chunks_exact_mut(3).enumerate() {
        let left = col & !1;
        let right = (left + 1).min(grid.width - 1);
        let tile = [
            grid.get(top, left),
            grid.get(top, right),
            grid.get(bottom, left),
            grid.get(bottom, right),
        ];

        let position = (row_parity << 1) | (col & 1);
        let [g1, g2] = cells.greens;
        let green = if position == g1 || position == g2 {
            tile[position]
        } else {
            ((tile[g1] as u32 + tile[g2] as u32) / 2) as u16
        };

        pixel[0] = tile[cells.red];
        pixel[1] = green;
        pixel[2] = tile[cells.blue];
    }
}
