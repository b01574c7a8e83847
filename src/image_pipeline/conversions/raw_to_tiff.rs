use rayon::prelude::*;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{error, info, instrument, warn};

use crate::image_pipeline::{
    common::error::{ConversionError, Result},
    debayer::{CpuDebayer, RasterImage, resolve_pattern},
    exposure::Exposure,
    raw::{FrameGeometry, RawImageReader, SampleGrid, SensorFrameReader, read_info_file, sidecar_path},
    tiff::{ConversionConfig, StandardTiffWriter, TiffWriter},
};

const RAW_EXTENSION: &str = "raw";
const TIFF_EXTENSION: &str = "tiff";

/// Outcome of a directory conversion
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Output files written
    pub converted: Vec<PathBuf>,
    /// Input files that failed, with the reason
    pub failed: Vec<(PathBuf, ConversionError)>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct RawToTiffPipeline<R: RawImageReader, W: TiffWriter> {
    reader: R,
    writer: W,
    debayer: CpuDebayer,
    config: ConversionConfig,
}

impl RawToTiffPipeline<SensorFrameReader, StandardTiffWriter> {
    pub fn new(config: ConversionConfig) -> Self {
        Self {
            reader: SensorFrameReader::new(config.sample_endianness),
            writer: StandardTiffWriter,
            debayer: CpuDebayer::new(),
            config,
        }
    }
}

impl<R: RawImageReader, W: TiffWriter> RawToTiffPipeline<R, W> {
    pub fn with_custom(reader: R, writer: W, config: ConversionConfig) -> Self {
        Self {
            reader,
            writer,
            debayer: CpuDebayer::new(),
            config,
        }
    }

    fn validate_dimensions(&self, geometry: &FrameGeometry) -> Result<()> {
        if !self.config.validate_dimensions {
            return Ok(());
        }

        let (width, height) = (geometry.width as usize, geometry.height as usize);
        if width == 0 || height == 0 {
            return Err(ConversionError::InvalidDimensions(width, height));
        }

        if let Some(max) = self.config.max_dimension {
            if width > max || height > max {
                warn!("Image dimensions {}x{} exceed maximum {}", width, height, max);
                return Err(ConversionError::InvalidDimensions(width, height));
            }
        }

        Ok(())
    }

    fn validate_gain(gain: f64) -> Result<()> {
        if !gain.is_finite() || gain < 0.0 {
            return Err(ConversionError::InvalidGain(gain));
        }
        Ok(())
    }

    /// Validates the request and decodes the dump into its CFA mosaic.
    fn decode_mosaic(&self, raw: &[u8], geometry: &FrameGeometry, gain: f64) -> Result<SampleGrid> {
        self.validate_dimensions(geometry)?;
        Self::validate_gain(gain)?;

        let _span = tracing::info_span!("decode_raw").entered();
        let grid = self.reader.read_raw(raw, geometry)?;
        if grid.width != geometry.width as usize || grid.height != geometry.height as usize {
            return Err(ConversionError::MalformedInput(format!(
                "reader produced {}x{}, geometry declares {}x{}",
                grid.width, grid.height, geometry.width, geometry.height
            )));
        }
        Ok(grid)
    }

    fn apply_exposure(grid: SampleGrid, gain: f64) -> SampleGrid {
        if gain == 1.0 {
            return grid;
        }
        let _span = tracing::info_span!("apply_gain", gain).entered();
        grid.apply_gain(gain)
    }

    /// Converts one raw dump into an RGB raster.
    ///
    /// Nothing is returned unless every stage succeeded.
    #[instrument(skip(self, raw, geometry), fields(input_size = raw.len(), format = %geometry.format_tag))]
    pub fn convert(&self, raw: &[u8], geometry: &FrameGeometry, gain: f64) -> Result<RasterImage> {
        info!("Starting raw frame conversion");

        let grid = self.decode_mosaic(raw, geometry, gain)?;
        let pattern = resolve_pattern(&geometry.format_tag)?;
        let grid = Self::apply_exposure(grid, gain);

        let raster = {
            let _span = tracing::info_span!("demosaic", %pattern).entered();
            self.debayer.process(&grid, pattern)?
        };

        info!(
            width = raster.width,
            height = raster.height,
            bits = raster.bits_per_sample,
            "Conversion complete"
        );
        Ok(raster)
    }

    /// Converts with the configured gain and encodes the result to `output`.
    pub fn convert_to_writer(
        &self,
        raw: &[u8],
        geometry: &FrameGeometry,
        output: &mut dyn Write,
    ) -> Result<()> {
        let gain = self.config.gain;
        if self.config.debayer {
            let raster = self.convert(raw, geometry, gain)?;
            let _span = tracing::info_span!("encode_tiff").entered();
            self.writer.write_rgb_tiff(&raster, output, &self.config)
        } else {
            let grid = Self::apply_exposure(self.decode_mosaic(raw, geometry, gain)?, gain);
            let _span = tracing::info_span!("encode_tiff").entered();
            self.writer.write_tiff(&grid, output, &self.config)
        }
    }

    /// Converts a dump and its `.info` sidecar into a TIFF file.
    ///
    /// The output file is only created once encoding has succeeded, and is
    /// renamed into place so a failed write never leaves a truncated TIFF.
    #[instrument(skip(self, input_path, output_path))]
    pub fn convert_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_path: P,
        output_path: Q,
    ) -> Result<()> {
        let input_path = input_path.as_ref();
        let output_path = output_path.as_ref();

        info!(
            input = %input_path.display(),
            output = %output_path.display(),
            "Converting file"
        );

        let (geometry, input_data) = {
            let _span = tracing::info_span!("read_input_file").entered();
            let geometry = read_info_file(&sidecar_path(input_path))?;
            let data = std::fs::read(input_path).map_err(|e| {
                ConversionError::InputReadError(format!("{}: {}", input_path.display(), e))
            })?;
            (geometry, data)
        };

        let mut encoded = Vec::new();
        self.convert_to_writer(&input_data, &geometry, &mut encoded)?;

        let _span = tracing::info_span!("write_output_file", bytes = encoded.len()).entered();
        write_atomically(output_path, &encoded)
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }
}

impl<R, W> RawToTiffPipeline<R, W>
where
    R: RawImageReader + Sync,
    W: TiffWriter + Sync,
{
    /// Converts every `*.raw` file of `input_dir` into `output_dir/<stem>.tiff`.
    ///
    /// Files are converted in parallel. A failing file is logged and recorded
    /// in the report; the rest of the batch still runs.
    #[instrument(skip(self, input_dir, output_dir))]
    pub fn convert_dir<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_dir: P,
        output_dir: Q,
    ) -> Result<BatchReport> {
        let input_dir = input_dir.as_ref();
        let output_dir = output_dir.as_ref();

        let inputs = list_raw_files(input_dir)?;
        info!(
            files = inputs.len(),
            input = %input_dir.display(),
            output = %output_dir.display(),
            "Starting batch conversion"
        );
        std::fs::create_dir_all(output_dir).map_err(|e| {
            ConversionError::OutputWriteError(format!("{}: {}", output_dir.display(), e))
        })?;

        let results: Vec<(PathBuf, Result<PathBuf>)> = inputs
            .into_par_iter()
            .map(|input| {
                let output = output_path_for(&input, output_dir);
                let result = self.convert_file(&input, &output).map(|_| output);
                (input, result)
            })
            .collect();

        let mut report = BatchReport::default();
        for (input, result) in results {
            match result {
                Ok(output) => report.converted.push(output),
                Err(e) => {
                    error!(input = %input.display(), "Conversion failed: {}", e);
                    report.failed.push((input, e));
                }
            }
        }

        info!(
            converted = report.converted.len(),
            failed = report.failed.len(),
            "Batch conversion complete"
        );
        Ok(report)
    }
}

/// Converts a dump with the default configuration.
pub fn convert(raw: &[u8], geometry: &FrameGeometry, gain: f64) -> Result<RasterImage> {
    RawToTiffPipeline::new(ConversionConfig::default()).convert(raw, geometry, gain)
}

/// `dir/frame.raw` -> `output_dir/frame.tiff`
pub fn output_path_for(input: &Path, output_dir: &Path) -> PathBuf {
    let mut name = input.file_stem().unwrap_or(input.as_os_str()).to_os_string();
    name.push(".");
    name.push(TIFF_EXTENSION);
    output_dir.join(name)
}

/// Writes `bytes` to a temporary sibling of `path`, then renames it into place.
fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let write_error =
        |e: std::io::Error| ConversionError::OutputWriteError(format!("{}: {}", path.display(), e));

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir).map_err(write_error)?;
    file.write_all(bytes).map_err(write_error)?;
    file.as_file().sync_all().map_err(write_error)?;
    file.persist(path).map_err(|e| write_error(e.error))?;
    Ok(())
}

fn list_raw_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| ConversionError::InputReadError(format!("{}: {}", dir.display(), e)))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let is_raw = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(RAW_EXTENSION));
        if is_raw && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
