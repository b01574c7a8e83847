//! Linear exposure gain for sample grids and rasters

use rayon::prelude::*;
use tracing::debug;

use crate::image_pipeline::debayer::RasterImage;
use crate::image_pipeline::raw::SampleGrid;

/// Scales one 16-bit sample, clamping to `[0, 65535]`.
#[inline]
pub fn scale_sample(value: u16, gain: f64) -> u16 {
    (value as f64 * gain).clamp(0.0, u16::MAX as f64) as u16
}

/// Images whose samples can be brightened in place.
pub trait Exposure: Sized {
    fn samples_mut(&mut self) -> &mut [u16];

    /// Multiplies every sample by `gain`. A gain of exactly 1.0 is a no-op.
    fn apply_gain(mut self, gain: f64) -> Self {
        if gain == 1.0 {
            return self;
        }
        let samples = self.samples_mut();
        debug!(gain, samples = samples.len(), "Applying exposure gain");
        samples
            .par_iter_mut()
            .for_each(|v| *v = scale_sample(*v, gain));
        self
    }
}

impl Exposure for SampleGrid {
    fn samples_mut(&mut self) -> &mut [u16] {
        &mut self.data
    }
}

impl Exposure for RasterImage {
    fn samples_mut(&mut self) -> &mut [u16] {
        &mut self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_sample() {
        assert_eq!(scale_sample(1000, 10.0), 10000);
        assert_eq!(scale_sample(60000, 2.0), u16::MAX);
        assert_eq!(scale_sample(1000, 0.5), 500);
        assert_eq!(scale_sample(1000, -3.0), 0);
    }

    #[test]
    fn test_grid_gain() {
        let grid = SampleGrid::new(2, 1, vec![1000, 60000], 16).apply_gain(10.0);
        assert_eq!(grid.data, vec![10000, u16::MAX]);
    }

    #[test]
    fn test_unit_gain_is_identity() {
        let grid = SampleGrid::new(3, 1, vec![1, 32768, u16::MAX], 10);
        assert_eq!(grid.clone().apply_gain(1.0), grid);
    }

    #[test]
    fn test_raster_gain() {
        let raster = RasterImage {
            width: 1,
            height: 1,
            data: vec![100, 200, 40000],
            bits_per_sample: 10,
        }
        .apply_gain(2.0);
        assert_eq!(raster.data, vec![200, 400, u16::MAX]);
    }
}
