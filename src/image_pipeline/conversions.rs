//! Pipeline conversions module
//!
//! This module contains orchestration logic for raw frame conversions.

mod raw_to_tiff;


pub use raw_to_tiff::{BatchReport, RawToTiffPipeline, convert, output_path_for};
