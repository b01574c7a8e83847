use std::io::{Cursor, Write};

use tiff::encoder::colortype::{ColorType, Gray16, RGB16};
use tiff::encoder::compression::DeflateLevel;
use tiff::encoder::{Compression, TiffEncoder};
use tiff::tags::Predictor;
use tracing::debug;

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::debayer::types::RasterImage;
use crate::image_pipeline::raw::types::SampleGrid;
use crate::image_pipeline::tiff::types::{ConversionConfig, TiffCompression};
use crate::image_pipeline::tiff::writer::TiffWriter;

pub struct StandardTiffWriter;

impl StandardTiffWriter {
    fn encode<C>(
        width: usize,
        height: usize,
        samples: &[u16],
        output: &mut dyn Write,
        config: &ConversionConfig,
    ) -> Result<()>
    where
        C: ColorType<Inner = u16>,
    {
        let mut buffer = Vec::new();

        let compression = match config.compression {
            TiffCompression::None => Compression::Uncompressed,
            TiffCompression::Lzw => Compression::Lzw,
            TiffCompression::DeflateFast => Compression::Deflate(DeflateLevel::Fast),
            TiffCompression::DeflateBalanced => Compression::Deflate(DeflateLevel::Balanced),
            TiffCompression::DeflateBest => Compression::Deflate(DeflateLevel::Best),
        };

        let mut encoder = TiffEncoder::new(Cursor::new(&mut buffer))
            .map_err(|e| ConversionError::EncodeError(e.to_string()))?
            .with_compression(compression);

        if let Some(predictor_val) = config.predictor {
            let predictor = match predictor_val {
                2 => Predictor::Horizontal,
                _ => Predictor::None,
            };
            encoder = encoder.with_predictor(predictor);
        }

        encoder
            .write_image::<C>(width as u32, height as u32, samples)
            .map_err(|e| ConversionError::EncodeError(e.to_string()))?;

        output.write_all(&buffer)?;
        Ok(())
    }
}

impl TiffWriter for StandardTiffWriter {
    fn write_tiff(&self, image: &SampleGrid, output: &mut dyn Write, config: &ConversionConfig) -> Result<()> {
        debug!("Encoding mosaic TIFF image: {}x{}", image.width, image.height);
        Self::encode::<Gray16>(image.width, image.height, &image.data, output, config)?;
        debug!("TIFF encoding complete");
        Ok(())
    }

    fn write_rgb_tiff(&self, image: &RasterImage, output: &mut dyn Write, config: &ConversionConfig) -> Result<()> {
        debug!("Encoding RGB TIFF image: {}x{}", image.width, image.height);
        Self::encode::<RGB16>(image.width, image.height, &image.data, output, config)?;
        debug!("TIFF encoding complete");
        Ok(())
    }
}
