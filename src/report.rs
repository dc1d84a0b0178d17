//! Text reports for the `aiffinfo` front end

use std::fmt::Write as _;
use std::io::Read;
use std::thread;

use crossbeam::channel;

use crate::sound::{AiffDecoder, ChunkId, DecodeError, DecodeResult, Frame, SoundDecoder};

/// One line of a chunk listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkListing {
    pub id: ChunkId,
    pub size: u32,
    /// Leading body bytes, at most the requested dump length
    pub head: Vec<u8>,
}

/// Walk `source` in streaming mode and record every top-level chunk
///
/// The decoder runs on its own thread; this thread is the consumer.
pub fn list_chunks<R>(source: R, dump_bytes: usize) -> DecodeResult<Vec<ChunkListing>>
where
    R: Read + Send + 'static,
{
    let (tx, rx) = channel::bounded(0);
    let mut decoder = AiffDecoder::new(source, Some(tx));
    let worker = thread::spawn(move || decoder.parse());

    let mut listing = Vec::new();
    let mut failure = None;
    for mut chunk in rx {
        let take = (chunk.size() as usize).min(dump_bytes);
        let mut head = vec![0u8; take];
        let read = chunk.read_be(&mut head);
        listing.push(ChunkListing {
            id: chunk.id(),
            size: chunk.size(),
            head,
        });
        chunk.done();
        if let Err(e) = read {
            // Dropping the receiver stops the decoder at the next chunk.
            failure = Some(e);
            break;
        }
    }

    let decoded = worker
        .join()
        .map_err(|_| DecodeError::Io("decoder thread panicked".to_string()))?;
    if let Some(e) = failure {
        return Err(e);
    }
    decoded?;
    Ok(listing)
}

/// Format bytes as `00 11 22 ...  |ascii|`
pub fn hex_dump(bytes: &[u8]) -> String {
    let mut out = String::new();
    for (row, line) in bytes.chunks(16).enumerate() {
        let _ = write!(out, "{:08x}  ", row * 16);
        for i in 0..16 {
            match line.get(i) {
                Some(b) => {
                    let _ = write!(out, "{:02x} ", b);
                }
                None => out.push_str("   "),
            }
        }
        out.push_str(" |");
        for &b in line {
            out.push(if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' });
        }
        out.push_str("|\n");
    }
    out
}

pub fn format_listing(listing: &[ChunkListing]) -> String {
    let mut out = String::new();
    for entry in listing {
        let _ = writeln!(
            out,
            "{}  {:>10} bytes  {}",
            entry.id,
            entry.size,
            entry.id.describe()
        );
        if !entry.head.is_empty() {
            out.push_str(&hex_dump(&entry.head));
        }
    }
    out
}

/// Summary of a fully decoded stream
pub fn format_summary<R: Read + Send>(decoder: &AiffDecoder<R>) -> DecodeResult<String> {
    let info = decoder.audio_info()?;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "container:   {} {} ({} bytes declared)",
        decoder.container_id()?,
        decoder.form_type()?,
        decoder.container_size()?
    );
    let _ = writeln!(out, "channels:    {}", info.channels);
    let _ = writeln!(out, "bit depth:   {}", info.bit_depth);
    let _ = writeln!(out, "sample rate: {} Hz", info.sample_rate);
    let _ = writeln!(
        out,
        "frames:      {} declared, {} decoded{}",
        decoder.sample_frames()?,
        decoder.decoded_frame_count(),
        if decoder.is_truncated() { " (truncated)" } else { "" }
    );
    match decoder.duration() {
        Ok(d) => {
            let _ = writeln!(out, "duration:    {:.6} s", d.as_secs_f64());
        }
        Err(DecodeError::DivisionUndefined) => {
            let _ = writeln!(out, "duration:    undefined (sample rate is 0)");
        }
        Err(e) => return Err(e),
    }

    let text = decoder.text_metadata();
    if let Some(name) = &text.name {
        let _ = writeln!(out, "name:        {}", name);
    }
    if let Some(author) = &text.author {
        let _ = writeln!(out, "author:      {}", author);
    }
    if let Some(copyright) = &text.copyright {
        let _ = writeln!(out, "copyright:   {}", copyright);
    }
    for anno in &text.annotations {
        let _ = writeln!(out, "annotation:  {}", anno);
    }
    Ok(out)
}

pub fn format_frames(frames: &[Frame], count: usize) -> String {
    let mut out = String::new();
    for (i, frame) in frames.iter().take(count).enumerate() {
        let samples: Vec<String> = frame.iter().map(|s| s.to_string()).collect();
        let _ = writeln!(out, "{:>8}: {}", i, samples.join(" "));
    }
    out
}
