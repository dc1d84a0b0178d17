use aiff::cli::Cli;
use aiff::config::Options;
use aiff::logging;
use aiff::report;
use aiff::sound::{AiffDecoder, SoundDecoder};
use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::BufReader;

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();
    let options = cli.merge_into_options(Options::default())?;

    // Initialize logging (early)
    logging::init(options.log_level);
    log::debug!("options: {:?}", options);

    if options.list_chunks {
        let file = File::open(&cli.file)
            .with_context(|| format!("Failed to open {}", cli.file.display()))?;
        let listing = report::list_chunks(BufReader::new(file), options.dump_bytes)
            .with_context(|| format!("Failed to scan {}", cli.file.display()))?;
        print!("{}", report::format_listing(&listing));
        return Ok(());
    }

    let mut decoder = AiffDecoder::open(&cli.file)
        .with_context(|| format!("Failed to open {}", cli.file.display()))?;
    let (_, frames) = decoder
        .frames()
        .with_context(|| format!("Failed to decode {}", cli.file.display()))?;
    let frames_text = report::format_frames(frames, options.show_frames);

    print!("{}", report::format_summary(&decoder)?);
    if options.show_frames > 0 {
        print!("{}", frames_text);
    }
    Ok(())
}
