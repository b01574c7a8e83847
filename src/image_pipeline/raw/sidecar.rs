//! Frame metadata sidecar (`<frame>.raw.info`).
//!
//! The capture tool writes one `key=value` pair per line:
//!
//! ```text
//! width=4608
//! height=2592
//! format=SBGGR10_CSI2P
//! stride=5760
//! ```

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::raw::types::FrameGeometry;

const SIDECAR_EXTENSION: &str = ".info";

/// Path of the sidecar written next to `raw_path` (`frame.raw` -> `frame.raw.info`).
pub fn sidecar_path(raw_path: &Path) -> PathBuf {
    let mut name = OsString::from(raw_path.as_os_str());
    name.push(SIDECAR_EXTENSION);
    PathBuf::from(name)
}

fn parse_u32(key: &str, value: Option<&str>) -> Result<u32> {
    let value = value.ok_or_else(|| ConversionError::MetadataError(format!("missing `{}`", key)))?;
    value.parse().map_err(|_| {
        ConversionError::MetadataError(format!("`{}` is not a number: {:?}", key, value))
    })
}

impl FrameGeometry {
    /// Parses the contents of a sidecar file.
    ///
    /// Blank lines, `#` comments and unknown keys are ignored.
    pub fn from_info_str(text: &str) -> Result<Self> {
        let (mut width, mut height, mut stride, mut format) = (None, None, None, None);

        for line in text.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                return Err(ConversionError::MetadataError(format!(
                    "expected key=value, got {:?}",
                    line
                )));
            };
            let value = value.trim();
            match key.trim() {
                "width" => width = Some(value),
                "height" => height = Some(value),
                "stride" => stride = Some(value),
                "format" => format = Some(value),
                other => debug!(key = other, "Ignoring unknown sidecar key"),
            }
        }

        let format_tag = format
            .filter(|f| !f.is_empty())
            .ok_or_else(|| ConversionError::MetadataError("missing `format`".to_string()))?;

        Ok(FrameGeometry {
            width: parse_u32("width", width)?,
            height: parse_u32("height", height)?,
            row_stride: parse_u32("stride", stride)?,
            format_tag: format_tag.to_string(),
        })
    }
}

/// Reads and parses a sidecar file.
pub fn read_info_file(path: &Path) -> Result<FrameGeometry> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        ConversionError::InputReadError(format!("{}: {}", path.display(), e))
    })?;
    FrameGeometry::from_info_str(&text).map_err(|e| match e {
        ConversionError::MetadataError(msg) => {
            ConversionError::MetadataError(format!("{}: {}", path.display(), msg))
        }
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_capture_sidecar() {
        let text = "width=4608\nheight=2592\nformat=SBGGR10_CSI2P\nstride=5760\n";
        let geometry = FrameGeometry::from_info_str(text).unwrap();
        assert_eq!(geometry, FrameGeometry::new(4608, 2592, 5760, "SBGGR10_CSI2P"));
    }

    #[test]
    fn test_whitespace_comments_and_unknown_keys() {
        let text = "# frame 12\n width = 8 \n\nheight=4\nsequence=12\nformat= S_RGGB10_PACKED\nstride=10";
        let geometry = FrameGeometry::from_info_str(text).unwrap();
        assert_eq!(geometry, FrameGeometry::new(8, 4, 10, "S_RGGB10_PACKED"));
    }

    #[test]
    fn test_missing_key() {
        let err = FrameGeometry::from_info_str("width=8\nheight=4\nformat=SRGGB8\n").unwrap_err();
        assert!(matches!(err, ConversionError::MetadataError(ref m) if m.contains("stride")));
    }

    #[test]
    fn test_non_numeric_value() {
        let text = "width=wide\nheight=4\nformat=SRGGB8\nstride=8";
        let err = FrameGeometry::from_info_str(text).unwrap_err();
        assert!(matches!(err, ConversionError::MetadataError(ref m) if m.contains("width")));
    }

    #[test]
    fn test_line_without_separator() {
        let err = FrameGeometry::from_info_str("width 8").unwrap_err();
        assert!(matches!(err, ConversionError::MetadataError(_)));
    }

    #[test]
    fn test_sidecar_path() {
        assert_eq!(
            sidecar_path(Path::new("/captures/frame_0001.raw")),
            PathBuf::from("/captures/frame_0001.raw.info")
        );
    }
}
