use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("Failed to read input file: {0}")]
    InputReadError(String),

    #[error("Failed to write output file: {0}")]
    OutputWriteError(String),

    #[error("Invalid frame metadata: {0}")]
    MetadataError(String),

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Unsupported CFA pattern: {0}")]
    UnsupportedPattern(String),

    #[error("Unrecognized raw format: {len} bytes for a {width}x{height} frame")]
    UnrecognizedFormat {
        len: usize,
        width: usize,
        height: usize,
    },

    #[error("Failed to encode TIFF image: {0}")]
    EncodeError(String),

    #[error("Invalid image dimensions: width={0}, height={1}")]
    InvalidDimensions(usize, usize),

    #[error("Invalid gain: {0}")]
    InvalidGain(f64),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConversionError>;
