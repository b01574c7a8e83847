//! Image processing pipeline module
//!
//! This module turns raw sensor dumps into RGB rasters, with separate modules
//! for raw frame decoding, debayering, exposure, TIFF writing, and
//! conversion orchestration.

pub mod raw;
pub mod debayer;
pub mod exposure;
pub mod tiff;
pub mod conversions;
pub mod common;

pub use common::{
    ConversionError,
    Result,
};

pub use raw::{
    FrameGeometry,
    RawImageReader,
    RawLayout,
    SampleEndianness,
    SampleGrid,
    SensorFrameReader,
    unpack_10bit_packed,
};

pub use debayer::{
    CfaPattern,
    CpuDebayer,
    RasterImage,
    demosaic,
    resolve_pattern,
};

pub use exposure::Exposure;

pub use self::tiff::{
    TiffCompression,
    ConversionConfig,
    ConversionConfigBuilder,
    TiffWriter,
    StandardTiffWriter,
};

pub use conversions::{
    BatchReport,
    RawToTiffPipeline,
    convert,
};
