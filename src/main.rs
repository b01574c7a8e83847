use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, bail};
use clap::{Parser, ValueEnum};
use sensor_raw_rs::image_pipeline::{
    ConversionConfig, RawToTiffPipeline, SampleEndianness, TiffCompression,
};
use sensor_raw_rs::logger;

use tracing::{error, info};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CompressionArg {
    None,
    Lzw,
    DeflateFast,
    Deflate,
    DeflateBest,
}

impl From<CompressionArg> for TiffCompression {
    fn from(arg: CompressionArg) -> Self {
        match arg {
            CompressionArg::None => TiffCompression::None,
            CompressionArg::Lzw => TiffCompression::Lzw,
            CompressionArg::DeflateFast => TiffCompression::DeflateFast,
            CompressionArg::Deflate => TiffCompression::DeflateBalanced,
            CompressionArg::DeflateBest => TiffCompression::DeflateBest,
        }
    }
}

#[derive(Parser)]
#[command(name = "sensor_raw", version, about = "Convert raw Bayer sensor dumps to RGB TIFF")]
struct Args {
    /// Raw dump (`<name>.raw` with a `<name>.raw.info` sidecar), or a directory with --batch
    input: PathBuf,

    /// Output file, or output directory with --batch
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Exposure gain applied to the sensor samples
    #[arg(short, long, default_value_t = 1.0)]
    gain: f64,

    /// Convert every .raw file in the input directory
    #[arg(long)]
    batch: bool,

    /// TIFF compression
    #[arg(long, value_enum, default_value_t = CompressionArg::None)]
    compression: CompressionArg,

    /// Use the horizontal differencing predictor
    #[arg(long)]
    predictor: bool,

    /// Write the gained CFA mosaic as grayscale instead of debayering
    #[arg(long)]
    mosaic: bool,

    /// Unpacked 16-bit dumps are big-endian
    #[arg(long)]
    big_endian: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    logger::init_with_default(if args.verbose { "debug" } else { "info" });

    let config = ConversionConfig::builder()
        .compression(args.compression.into())
        .predictor(args.predictor.then_some(2))
        .debayer(!args.mosaic)
        .gain(args.gain)
        .sample_endianness(if args.big_endian {
            SampleEndianness::Big
        } else {
            SampleEndianness::Little
        })
        .build();
    let pipeline = RawToTiffPipeline::new(config);

    info!("Compression: {:?}", pipeline.config().compression);
    info!("Gain: {}", pipeline.config().gain);

    if args.batch {
        if !args.input.is_dir() {
            bail!("{} is not a directory", args.input.display());
        }
        let output_dir = args.output.unwrap_or_else(|| args.input.clone());
        let report = pipeline
            .convert_dir(&args.input, &output_dir)
            .with_context(|| format!("batch conversion of {}", args.input.display()))?;

        info!(
            "Converted {} file(s), {} failed",
            report.converted.len(),
            report.failed.len()
        );
        return Ok(if report.is_success() { ExitCode::SUCCESS } else { ExitCode::FAILURE });
    }

    let output = args.output.unwrap_or_else(|| args.input.with_extension("tiff"));
    match pipeline.convert_file(&args.input, &output) {
        Ok(()) => {
            info!("Conversion successful: {}", output.display());
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            error!("Conversion failed: {}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}
