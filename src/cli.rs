use crate::config::{parse_count, parse_dump_bytes, parse_log_level, Options};
use crate::logging::LogLevel;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

/// Inspect AIFF files: container layout, format, duration and samples
#[derive(Parser, Debug)]
#[command(name = "aiffinfo")]
#[command(version)]
#[command(about = "Decode and describe AIFF audio files", long_about = None)]
pub struct Cli {
    /// AIFF file to inspect
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// List every chunk instead of decoding the audio
    #[arg(short, long)]
    pub chunks: bool,

    /// Print the first N decoded frames
    #[arg(short, long, value_name = "N")]
    pub frames: Option<String>,

    /// Bytes of each chunk body to hex-dump when listing chunks
    #[arg(long = "dump-bytes", value_name = "N")]
    pub dump_bytes: Option<String>,

    /// Log level (nothing, error, warning, info, debug, all or 0-6)
    #[arg(short, long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Shorthand for --log-level debug
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Merge CLI arguments into the options struct
    pub fn merge_into_options(&self, mut opts: Options) -> Result<Options> {
        if let Some(ref level) = self.log_level {
            opts.log_level = parse_log_level(level).context("Invalid --log-level")?;
        }
        if self.verbose {
            opts.log_level = LogLevel::Debug;
        }

        if self.chunks {
            opts.list_chunks = true;
        }

        if let Some(ref n) = self.frames {
            opts.show_frames = parse_count(n, "frame count")?;
        }

        if let Some(ref n) = self.dump_bytes {
            opts.dump_bytes = parse_dump_bytes(n)?;
        }

        Ok(opts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_defaults_pass_through() {
        let cli = parse(&["aiffinfo", "kick.aif"]);
        assert_eq!(cli.file, PathBuf::from("kick.aif"));
        let opts = cli.merge_into_options(Options::default()).unwrap();
        assert_eq!(opts, Options::default());
    }

    #[test]
    fn test_merge_all_flags() {
        let cli = parse(&[
            "aiffinfo",
            "--chunks",
            "--frames",
            "8",
            "--dump-bytes",
            "32",
            "--log-level",
            "info",
            "kick.aif",
        ]);
        let opts = cli.merge_into_options(Options::default()).unwrap();
        assert!(opts.list_chunks);
        assert_eq!(opts.show_frames, 8);
        assert_eq!(opts.dump_bytes, 32);
        assert_eq!(opts.log_level, LogLevel::Info);
    }

    #[test]
    fn test_verbose_overrides_level() {
        let cli = parse(&["aiffinfo", "-l", "error", "-v", "kick.aif"]);
        let opts = cli.merge_into_options(Options::default()).unwrap();
        assert_eq!(opts.log_level, LogLevel::Debug);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let cli = parse(&["aiffinfo", "-f", "many", "kick.aif"]);
        assert!(cli.merge_into_options(Options::default()).is_err());

        let cli = parse(&["aiffinfo", "-l", "shouty", "kick.aif"]);
        assert!(cli.merge_into_options(Options::default()).is_err());
    }

    #[test]
    fn test_file_is_required() {
        assert!(Cli::try_parse_from(["aiffinfo"]).is_err());
    }
}
