use anyhow::{Context, Result};

use crate::logging::LogLevel;

/// Bytes hex-dumped per chunk when listing chunks
pub const DEFAULT_DUMP_BYTES: usize = 16;
const MAX_DUMP_BYTES: usize = 4096;

/// Front-end options that can be set via CLI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub log_level: LogLevel,
    /// Walk the file in streaming mode and describe every chunk
    pub list_chunks: bool,
    /// Number of leading frames to print after decoding
    pub show_frames: usize,
    pub dump_bytes: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Warning,
            list_chunks: false,
            show_frames: 0,
            dump_bytes: DEFAULT_DUMP_BYTES,
        }
    }
}

/// Parse a log level given by name ("warning") or number ("3")
pub fn parse_log_level(s: &str) -> Result<LogLevel> {
    let level = match s.trim().to_ascii_lowercase().as_str() {
        "nothing" | "off" | "none" => LogLevel::Nothing,
        "user" => LogLevel::User,
        "error" => LogLevel::Error,
        "warning" | "warn" => LogLevel::Warning,
        "info" => LogLevel::Info,
        "debug" => LogLevel::Debug,
        "all" | "trace" => LogLevel::All,
        other => {
            let n: i32 = other
                .parse()
                .with_context(|| format!("Invalid log level '{}'", s))?;
            if !(0..=6).contains(&n) {
                anyhow::bail!("Log level must be between 0 and 6");
            }
            LogLevel::from_i32(n)
        }
    };
    Ok(level)
}

/// Parse a non-negative count such as a frame or byte count
pub fn parse_count(s: &str, what: &str) -> Result<usize> {
    s.trim()
        .parse::<usize>()
        .with_context(|| format!("Invalid {} '{}'", what, s))
}

/// Parse the hex-dump length, capped so one chunk cannot flood the terminal
pub fn parse_dump_bytes(s: &str) -> Result<usize> {
    let n = parse_count(s, "dump length")?;
    if n > MAX_DUMP_BYTES {
        anyhow::bail!("Dump length out of range (0 to {})", MAX_DUMP_BYTES);
    }
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_level_names() {
        assert_eq!(parse_log_level("debug").unwrap(), LogLevel::Debug);
        assert_eq!(parse_log_level("WARN").unwrap(), LogLevel::Warning);
        assert_eq!(parse_log_level(" off ").unwrap(), LogLevel::Nothing);
        assert_eq!(parse_log_level("trace").unwrap(), LogLevel::All);
    }

    #[test]
    fn test_parse_log_level_numbers() {
        assert_eq!(parse_log_level("0").unwrap(), LogLevel::Nothing);
        assert_eq!(parse_log_level("4").unwrap(), LogLevel::Info);
        assert!(parse_log_level("7").is_err());
        assert!(parse_log_level("-1").is_err());
        assert!(parse_log_level("loud").is_err());
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("12", "frame count").unwrap(), 12);
        assert!(parse_count("-3", "frame count").is_err());
        assert!(parse_count("ten", "frame count").is_err());
    }

    #[test]
    fn test_parse_dump_bytes() {
        assert_eq!(parse_dump_bytes("0").unwrap(), 0);
        assert_eq!(parse_dump_bytes("4096").unwrap(), 4096);
        assert!(parse_dump_bytes("4097").is_err());
    }

    #[test]
    fn test_options_default() {
        let opts = Options::default();
        assert_eq!(opts.log_level, LogLevel::Warning);
        assert!(!opts.list_chunks);
        assert_eq!(opts.show_frames, 0);
        assert_eq!(opts.dump_bytes, DEFAULT_DUMP_BYTES);
    }
}
