//! Debayering module for converting CFA mosaics to RGB

pub mod cpu_debayer;
pub mod pattern;
pub mod types;

pub use cpu_debayer::{CpuDebayer, demosaic};
pub use pattern::{DEFAULT_PATTERN, SENSOR_PREFIX, resolve_pattern};
pub use types::{CfaColor, CfaPattern, RasterImage, TileCells};
