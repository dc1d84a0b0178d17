//! Front-end tests: argument handling and the text reports

mod common;

use std::io::Cursor;

use aiff::config::Options;
use aiff::report::{format_frames, format_summary};
use aiff::sound::{AiffDecoder, SoundDecoder};
use aiff::{Cli, LogLevel};
use clap::Parser;
use common::*;

#[test]
fn test_cli_to_options() {
    let cli = Cli::try_parse_from(["aiffinfo", "-c", "--dump-bytes", "0", "kick.aif"]).unwrap();
    let opts = cli.merge_into_options(Options::default()).unwrap();
    assert!(opts.list_chunks);
    assert_eq!(opts.dump_bytes, 0);
    assert_eq!(opts.log_level, LogLevel::Warning);
}

#[test]
fn test_cli_rejects_oversized_dump() {
    let cli = Cli::try_parse_from(["aiffinfo", "--dump-bytes", "100000", "kick.aif"]).unwrap();
    assert!(cli.merge_into_options(Options::default()).is_err());
}

#[test]
fn test_summary_for_kick() {
    let mut dec = AiffDecoder::new(Cursor::new(kick_aif()), None);
    dec.parse().unwrap();
    let summary = format_summary(&dec).unwrap();

    assert!(summary.contains("container:   FORM AIFF (9642 bytes declared)"));
    assert!(summary.contains("channels:    1"));
    assert!(summary.contains("bit depth:   16"));
    assert!(summary.contains("sample rate: 22050 Hz"));
    assert!(summary.contains("frames:      4484 declared, 4484 decoded\n"));
    assert!(summary.contains("duration:    0.203356 s"));
}

#[test]
fn test_summary_marks_truncation() {
    let mut bytes = kick_aif();
    bytes.truncate(bytes.len() - 100);
    let mut dec = AiffDecoder::new(Cursor::new(bytes), None);
    dec.parse().unwrap();
    let summary = format_summary(&dec).unwrap();
    assert!(summary.contains("4484 declared, 4434 decoded (truncated)"));
}

#[test]
fn test_summary_with_zero_rate() {
    let bytes = AiffBuilder::new().comm(1, 10, 8, 0.0).build();
    let mut dec = AiffDecoder::new(Cursor::new(bytes), None);
    dec.parse().unwrap();
    let summary = format_summary(&dec).unwrap();
    assert!(summary.contains("duration:    undefined (sample rate is 0)"));
}

#[test]
fn test_summary_before_parse_fails() {
    let dec = AiffDecoder::new(Cursor::new(kick_aif()), None);
    assert!(format_summary(&dec).is_err());
}

#[test]
fn test_frame_listing() {
    let mut dec = AiffDecoder::new(Cursor::new(kick_aif()), None);
    let (_, frames) = dec.frames().unwrap();
    let text = format_frames(frames, 3);
    let expected: String = (0..3)
        .map(|i| format!("{:>8}: {}\n", i, kick_sample(i)))
        .collect();
    assert_eq!(text, expected);
}
