use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::debayer::types::CfaPattern;

/// First character of a sensor pixel format tag (`SRGGB10_CSI2P`).
pub const SENSOR_PREFIX: char = 'S';

/// Pattern used when the format tag carries no sensor prefix.
pub const DEFAULT_PATTERN: CfaPattern = CfaPattern::Rggb;

/// Strips the sensor marker (either case) and one optional `_` separator.
///
/// Returns the text starting at the pattern code, or `None` for tags without
/// the marker.
pub fn strip_sensor_prefix(format_tag: &str) -> Option<&str> {
    let marker = format_tag.chars().next()?;
    if !marker.eq_ignore_ascii_case(&SENSOR_PREFIX) {
        return None;
    }
    let rest = &format_tag[marker.len_utf8()..];
    Some(rest.strip_prefix('_').unwrap_or(rest))
}

/// Maps a sensor format tag to its CFA pattern.
///
/// `SBGGR10_CSI2P` and `S_BGGR10_PACKED` both resolve to BGGR. Tags shorter
/// than five characters or without the `S` prefix fall back to
/// [`DEFAULT_PATTERN`]; a prefixed tag with an unknown code is an error.
pub fn resolve_pattern(format_tag: &str) -> Result<CfaPattern> {
    if format_tag.chars().count() < 5 {
        return Ok(DEFAULT_PATTERN);
    }
    let Some(rest) = strip_sensor_prefix(format_tag) else {
        return Ok(DEFAULT_PATTERN);
    };

    let code: String = rest.chars().take(4).collect();
    if code.chars().count() < 4 {
        return Err(ConversionError::UnsupportedPattern(format_tag.to_string()));
    }
    code.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_libcamera_tags() {
        assert_eq!(resolve_pattern("SRGGB10_CSI2P").unwrap(), CfaPattern::Rggb);
        assert_eq!(resolve_pattern("SBGGR10_CSI2P").unwrap(), CfaPattern::Bggr);
        assert_eq!(resolve_pattern("SGRBG10_CSI2P").unwrap(), CfaPattern::Grbg);
        assert_eq!(resolve_pattern("SGBRG16").unwrap(), CfaPattern::Gbrg);
    }

    #[test]
    fn test_separator_and_case() {
        assert_eq!(resolve_pattern("S_RGGB10_PACKED").unwrap(), CfaPattern::Rggb);
        assert_eq!(resolve_pattern("SbGgR8").unwrap(), CfaPattern::Bggr);
        assert_eq!(resolve_pattern("sbggr10_csi2p").unwrap(), CfaPattern::Bggr);
        assert_eq!(resolve_pattern("s_gbrg10_packed").unwrap(), CfaPattern::Gbrg);
    }

    #[test]
    fn test_strip_sensor_prefix() {
        assert_eq!(strip_sensor_prefix("SRGGB10_CSI2P"), Some("RGGB10_CSI2P"));
        assert_eq!(strip_sensor_prefix("s_bggr8"), Some("bggr8"));
        assert_eq!(strip_sensor_prefix("RAW10"), None);
        assert_eq!(strip_sensor_prefix(""), None);
    }

    #[test]
    fn test_default_pattern() {
        assert_eq!(resolve_pattern("RAW10").unwrap(), DEFAULT_PATTERN);
        assert_eq!(resolve_pattern("SRGG").unwrap(), DEFAULT_PATTERN);
        assert_eq!(resolve_pattern("").unwrap(), DEFAULT_PATTERN);
    }

    #[test]
    fn test_unknown_code() {
        assert!(matches!(
            resolve_pattern("SXYZW10"),
            Err(ConversionError::UnsupportedPattern(code)) if code == "XYZW"
        ));
        assert!(matches!(
            resolve_pattern("S_RGG"),
            Err(ConversionError::UnsupportedPattern(_))
        ));
    }
}
