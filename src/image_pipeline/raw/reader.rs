use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::raw::types::{FrameGeometry, SampleGrid};

pub trait RawImageReader {
    fn read_raw(&self, data: &[u8], geometry: &FrameGeometry) -> Result<SampleGrid>;
}
