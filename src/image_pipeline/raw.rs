//! RAW sensor frame reading module
//!
//! This module turns a sensor dump plus its declared geometry into a dense
//! single-channel CFA sample grid.

mod reader;
mod frame_reader;
pub mod sidecar;
pub mod types;
pub mod unpack;

pub use reader::RawImageReader;
pub use frame_reader::SensorFrameReader;
pub use sidecar::{read_info_file, sidecar_path};
pub use types::{FrameGeometry, RawLayout, SampleEndianness, SampleGrid};
pub use unpack::{pack_10bit_group, unpack_10bit_packed};
