//! File-level conversion tests: sidecar + dump in, TIFF out

use std::fs;
use std::path::Path;

use sensor_raw_rs::image_pipeline::raw::pack_10bit_group;
use sensor_raw_rs::image_pipeline::{ConversionConfig, ConversionError, RawToTiffPipeline, TiffCompression};
use tempfile::TempDir;
use tiff::ColorType;
use tiff::decoder::{Decoder, DecodingResult};

fn write_frame(dir: &Path, name: &str, info: &str, data: &[u8]) -> std::path::PathBuf {
    let raw = dir.join(name);
    fs::write(&raw, data).unwrap();
    fs::write(dir.join(format!("{}.info", name)), info).unwrap();
    raw
}

/// 4x2 BGGR frame, packed 10-bit with 3 bytes of row padding.
fn packed_frame() -> (String, Vec<u8>) {
    let mut data = Vec::new();
    data.extend(pack_10bit_group([100, 200, 300, 400]));
    data.extend([0xee; 3]);
    data.extend(pack_10bit_group([500, 600, 700, 800]));
    data.extend([0xee; 3]);
    let info = "width=4\nheight=2\nformat=SBGGR10_CSI2P\nstride=8\n".to_string();
    (info, data)
}

fn read_tiff(path: &Path) -> (u32, u32, ColorType, Vec<u16>) {
    let mut decoder = Decoder::new(fs::File::open(path).unwrap()).unwrap();
    let (width, height) = decoder.dimensions().unwrap();
    let color = decoder.colortype().unwrap();
    match decoder.read_image().unwrap() {
        DecodingResult::U16(data) => (width, height, color, data),
        _ => panic!("expected 16-bit samples"),
    }
}

#[test]
fn test_convert_file_writes_rgb_tiff() {
    let dir = TempDir::new().unwrap();
    let (info, data) = packed_frame();
    let raw = write_frame(dir.path(), "frame.raw", &info, &data);
    let output = dir.path().join("frame.tiff");

    let config = ConversionConfig::builder()
        .compression(TiffCompression::DeflateBalanced)
        .build();
    RawToTiffPipeline::new(config).convert_file(&raw, &output).unwrap();

    let (width, height, color, samples) = read_tiff(&output);
    assert_eq!((width, height), (4, 2));
    assert_eq!(color, ColorType::RGB(16));
    // BGGR tile: B=100, G=200/500, R=600
    assert_eq!(&samples[..3], &[600 * 64, 350 * 64, 100 * 64]);
    assert_eq!(&samples[3..6], &[600 * 64, 200 * 64, 100 * 64]);
}

#[test]
fn test_convert_file_mosaic_output() {
    let dir = TempDir::new().unwrap();
    let (info, data) = packed_frame();
    let raw = write_frame(dir.path(), "frame.raw", &info, &data);
    let output = dir.path().join("mosaic.tiff");

    let config = ConversionConfig::builder().debayer(false).gain(2.0).build();
    RawToTiffPipeline::new(config).convert_file(&raw, &output).unwrap();

    let (width, height, color, samples) = read_tiff(&output);
    assert_eq!((width, height), (4, 2));
    assert_eq!(color, ColorType::Gray(16));
    assert_eq!(samples[0], 100 * 64 * 2);
    assert_eq!(samples[7], u16::MAX);
}

#[test]
fn test_failed_conversion_leaves_no_output() {
    let dir = TempDir::new().unwrap();
    let raw = write_frame(
        dir.path(),
        "short.raw",
        "width=8\nheight=4\nformat=SRGGB10_CSI2P\nstride=10\n",
        &[0u8; 12],
    );
    let output = dir.path().join("short.tiff");

    let err = RawToTiffPipeline::new(ConversionConfig::default())
        .convert_file(&raw, &output)
        .unwrap_err();

    assert!(matches!(err, ConversionError::MalformedInput(_)));
    assert!(!output.exists());
}

#[test]
fn test_missing_sidecar() {
    let dir = TempDir::new().unwrap();
    let raw = dir.path().join("lonely.raw");
    fs::write(&raw, [0u8; 4]).unwrap();

    let err = RawToTiffPipeline::new(ConversionConfig::default())
        .convert_file(&raw, dir.path().join("lonely.tiff"))
        .unwrap_err();
    assert!(matches!(err, ConversionError::InputReadError(_)));
}

#[test]
fn test_convert_dir_continues_past_failures() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let (info, data) = packed_frame();

    write_frame(input.path(), "a.raw", &info, &data);
    write_frame(input.path(), "b.raw", "width=2\nheight=2\nformat=SGRBG8\nstride=2\n", &[1, 2, 3, 4]);
    write_frame(input.path(), "c.raw", "width=2\nheight=2\nformat=SGRBG8\nstride=2\n", &[1, 2, 3]);
    fs::write(input.path().join("notes.txt"), "not a frame").unwrap();

    let report = RawToTiffPipeline::new(ConversionConfig::default())
        .convert_dir(input.path(), output.path())
        .unwrap();

    assert_eq!(report.converted.len(), 2);
    assert_eq!(report.failed.len(), 1);
    assert!(!report.is_success());
    assert!(report.failed[0].0.ends_with("c.raw"));
    assert!(matches!(report.failed[0].1, ConversionError::UnrecognizedFormat { .. }));
    assert!(output.path().join("a.tiff").exists());
    assert!(output.path().join("b.tiff").exists());
    assert!(!output.path().join("c.tiff").exists());
}

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn test_failed_output_write_leaves_no_temp_files() {
    let dir = TempDir::new().unwrap();
    let (info, data) = packed_frame();
    let raw = write_frame(dir.path(), "frame.raw", &info, &data);
    // A directory in the way makes the final rename fail after encoding
    let output = dir.path().join("frame.tiff");
    fs::create_dir(&output).unwrap();

    let err = RawToTiffPipeline::new(ConversionConfig::default())
        .convert_file(&raw, &output)
        .unwrap_err();

    assert!(matches!(err, ConversionError::OutputWriteError(_)));
    assert!(output.is_dir());
    assert_eq!(file_names(dir.path()), ["frame.raw", "frame.raw.info", "frame.tiff"]);
}

#[test]
fn test_convert_file_replaces_existing_output() {
    let dir = TempDir::new().unwrap();
    let (info, data) = packed_frame();
    let raw = write_frame(dir.path(), "frame.raw", &info, &data);
    let output = dir.path().join("frame.tiff");
    fs::write(&output, b"stale").unwrap();

    RawToTiffPipeline::new(ConversionConfig::default())
        .convert_file(&raw, &output)
        .unwrap();

    let (width, height, _, _) = read_tiff(&output);
    assert_eq!((width, height), (4, 2));
    assert_eq!(file_names(dir.path()), ["frame.raw", "frame.raw.info", "frame.tiff"]);
}
