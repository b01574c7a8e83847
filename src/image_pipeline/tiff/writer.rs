use std::io::Write;
use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::raw::types::SampleGrid;
use crate::image_pipeline::debayer::types::RasterImage;
use crate::image_pipeline::tiff::types::ConversionConfig;

pub trait TiffWriter {
    fn write_tiff(&self, image: &SampleGrid, output: &mut dyn Write, config: &ConversionConfig) -> Result<()>;
    fn write_rgb_tiff(&self, image: &RasterImage, output: &mut dyn Write, config: &ConversionConfig) -> Result<()>;
}
