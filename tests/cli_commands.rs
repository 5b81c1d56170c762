//! Tests for the command helpers behind the `ros-introspect` binary.

use anyhow::Result;
use clap::Parser;
use ros_introspect::{
    decode_lines, extract_lines, type_lines, Config, DecodeConfig, DecodeOpts, SchemaOpts,
    WholeDecodeOpts,
};
use std::io::Write;
use tempfile::NamedTempFile;

const POSE_ARRAY: &str = "\
# An array of poses with a header for global reference.
Header header
Point[] points
uint8 KIND_A=1
================================================================================
MSG: std_msgs/Header
uint32 seq
time stamp
string frame_id
================================================================================
MSG: geometry_msgs/Point
float64 x
float64 y
";

fn write_temp(contents: &[u8]) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    file.write_all(contents)?;
    file.flush()?;
    Ok(file)
}

fn schema_opts(file: &NamedTempFile) -> SchemaOpts {
    SchemaOpts {
        schema: file.path().to_path_buf(),
        root_type: "geometry_msgs/PointArray".to_string(),
    }
}

fn buffer(points: &[(f64, f64)]) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(&7u32.to_le_bytes());
    buf.extend_from_slice(&1u32.to_le_bytes());
    buf.extend_from_slice(&2u32.to_le_bytes());
    buf.extend_from_slice(&3u32.to_le_bytes());
    buf.extend_from_slice(b"map");
    buf.extend_from_slice(&(points.len() as u32).to_le_bytes());
    for (x, y) in points {
        buf.extend_from_slice(&x.to_le_bytes());
        buf.extend_from_slice(&y.to_le_bytes());
    }
    buf
}

#[test]
fn test_decode_lines() -> Result<()> {
    let schema = write_temp(POSE_ARRAY.as_bytes())?;
    let registry = schema_opts(&schema).load_registry()?;
    let settings = DecodeConfig {
        prefix: "pa".to_string(),
        ..DecodeConfig::default()
    };

    let lines = decode_lines(
        &registry,
        "geometry_msgs/PointArray",
        &buffer(&[(1.0, 2.0)]),
        &settings,
    )?;
    assert_eq!(
        lines,
        vec![
            "pa/header/seq: 7",
            "pa/header/stamp: 1.000000002",
            "pa/points/0/x: 1",
            "pa/points/0/y: 2",
            "pa/header/frame_id: map",
        ]
    );
    Ok(())
}

#[test]
fn test_decode_lines_trailing_bytes() -> Result<()> {
    let schema = write_temp(POSE_ARRAY.as_bytes())?;
    let registry = schema_opts(&schema).load_registry()?;
    let mut buf = buffer(&[]);
    buf.push(0xff);

    let strict = DecodeConfig::default();
    let err = decode_lines(&registry, "geometry_msgs/PointArray", &buf, &strict)
        .expect_err("one byte too many");
    assert!(format!("{err:#}").contains("Failed to decode geometry_msgs/PointArray"));

    let lenient = WholeDecodeOpts {
        allow_trailing: true,
        ..WholeDecodeOpts::default()
    }
    .resolve(&strict);
    let lines = decode_lines(&registry, "geometry_msgs/PointArray", &buf, &lenient)?;
    assert_eq!(lines.len(), 3);
    Ok(())
}

#[test]
fn test_type_lines() -> Result<()> {
    let schema = write_temp(POSE_ARRAY.as_bytes())?;
    let registry = schema_opts(&schema).load_registry()?;
    let lines = type_lines(&registry);
    assert_eq!(
        lines,
        vec![
            "geometry_msgs/PointArray",
            "  std_msgs/Header header",
            "  geometry_msgs/Point[] points",
            "  uint8 KIND_A = 1",
            "std_msgs/Header",
            "  uint32 seq",
            "  time stamp",
            "  string frame_id",
            "geometry_msgs/Point",
            "  float64 x",
            "  float64 y",
        ]
    );
    Ok(())
}

#[test]
fn test_extract_lines() -> Result<()> {
    let schema = write_temp(POSE_ARRAY.as_bytes())?;
    let registry = schema_opts(&schema).load_registry()?;
    let lines = extract_lines(
        &registry,
        "geometry_msgs/PointArray",
        "geometry_msgs/Point",
        &buffer(&[(1.5, -1.0), (0.0, 4.0)]),
        &DecodeConfig::default(),
    )?;
    assert_eq!(
        lines,
        vec![
            "points/0/x: 1.5",
            "points/0/y: -1",
            "points/1/x: 0",
            "points/1/y: 4",
        ]
    );
    Ok(())
}

#[test]
fn test_missing_schema_file() {
    let opts = SchemaOpts {
        schema: "/nonexistent/schema.msg".into(),
        root_type: "pkg/Nope".to_string(),
    };
    let err = opts.load_registry().expect_err("file does not exist");
    assert!(err.to_string().contains("Failed to read schema file"));
}

#[test]
fn test_flags_override_config_file() -> Result<()> {
    let file = write_temp(b"[decode]\nmax_array_size = 3\nprefix = \"file\"\n")?;
    let config = Config::from_file(file.path())?;

    let from_file = DecodeOpts::default().resolve(&config.decode);
    assert_eq!(from_file.max_array_size, 3);
    assert_eq!(from_file.prefix, "file");
    assert!(from_file.require_exhausted);

    let overridden = DecodeOpts {
        max_array_size: Some(50),
        prefix: Some("cli".to_string()),
    }
    .resolve(&config.decode);
    assert_eq!(overridden.max_array_size, 50);
    assert_eq!(overridden.prefix, "cli");
    Ok(())
}

#[test]
fn test_allow_trailing_is_decode_only() -> Result<()> {
    let whole = WholeDecodeOpts::try_parse_from(["decode", "--allow-trailing", "--prefix", "p"])?;
    assert!(whole.allow_trailing);
    assert!(!whole.resolve(&DecodeConfig::default()).require_exhausted);
    assert_eq!(whole.decode.prefix.as_deref(), Some("p"));

    let err = DecodeOpts::try_parse_from(["extract", "--allow-trailing"])
        .expect_err("extract has no --allow-trailing");
    assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    Ok(())
}
