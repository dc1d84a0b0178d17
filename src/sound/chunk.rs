//! IFF chunk scanning
//!
//! Every AIFF record is a 4-byte tag, a big-endian `u32` body length and the
//! body itself, followed by one NUL pad byte when the length is odd.

use std::fmt;
use std::io::Read;

use byteorder::{BigEndian, ByteOrder};
use log::debug;

use super::cursor::ByteCursor;
use super::decoder::{DecodeError, DecodeResult};

/// Four-character chunk tag
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ChunkId(pub [u8; 4]);

impl ChunkId {
    pub const FORM: ChunkId = ChunkId(*b"FORM");
    pub const AIFF: ChunkId = ChunkId(*b"AIFF");
    pub const AIFC: ChunkId = ChunkId(*b"AIFC");
    pub const COMM: ChunkId = ChunkId(*b"COMM");
    pub const SSND: ChunkId = ChunkId(*b"SSND");
    pub const MARK: ChunkId = ChunkId(*b"MARK");
    pub const INST: ChunkId = ChunkId(*b"INST");
    pub const MIDI: ChunkId = ChunkId(*b"MIDI");
    pub const AESD: ChunkId = ChunkId(*b"AESD");
    pub const APPL: ChunkId = ChunkId(*b"APPL");
    pub const COMT: ChunkId = ChunkId(*b"COMT");
    pub const NAME: ChunkId = ChunkId(*b"NAME");
    pub const AUTH: ChunkId = ChunkId(*b"AUTH");
    pub const COPYRIGHT: ChunkId = ChunkId(*b"(c) ");
    pub const ANNO: ChunkId = ChunkId(*b"ANNO");

    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    /// Human-readable name of a well-known chunk
    pub fn describe(&self) -> &'static str {
        match *self {
            ChunkId::FORM => "container",
            ChunkId::COMM => "common (format description)",
            ChunkId::SSND => "sound data",
            ChunkId::MARK => "markers",
            ChunkId::INST => "instrument",
            ChunkId::MIDI => "MIDI data",
            ChunkId::AESD => "audio recording",
            ChunkId::APPL => "application specific",
            ChunkId::COMT => "comments",
            ChunkId::NAME => "name",
            ChunkId::AUTH => "author",
            ChunkId::COPYRIGHT => "copyright",
            ChunkId::ANNO => "annotation",
            _ => "unknown",
        }
    }
}

impl From<[u8; 4]> for ChunkId {
    fn from(bytes: [u8; 4]) -> Self {
        ChunkId(bytes)
    }
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            if b.is_ascii_graphic() || b == b' ' {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{:02x}", b)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChunkId(\"{}\")", self)
    }
}

/// Tag and declared body length of one chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    pub id: ChunkId,
    pub size: u32,
}

impl ChunkHeader {
    /// Body length rounded up to the next even byte count
    pub fn padded_size(&self) -> u64 {
        u64::from(self.size) + u64::from(self.size & 1)
    }
}

/// Chunk-level reader over a byte cursor
///
/// Tracks how much of the current body is still unread so that the next
/// header is always read from a chunk boundary.
#[derive(Debug)]
pub struct ChunkScanner<R> {
    cursor: ByteCursor<R>,
    current: Option<ChunkHeader>,
    remaining: u64,
    pad: bool,
}

impl<R: Read> ChunkScanner<R> {
    pub fn new(source: R) -> Self {
        Self {
            cursor: ByteCursor::new(source),
            current: None,
            remaining: 0,
            pad: false,
        }
    }

    pub fn bytes_consumed(&self) -> u64 {
        self.cursor.consumed()
    }

    /// Unread body bytes of the current chunk (pad byte excluded)
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Read the next chunk header
    ///
    /// Returns `Ok(None)` when the source ends exactly at a chunk boundary.
    pub fn next_chunk(&mut self) -> DecodeResult<Option<ChunkHeader>> {
        debug_assert!(
            self.remaining == 0 && !self.pad,
            "next_chunk called with {} unread body bytes",
            self.remaining
        );
        if self.remaining > 0 || self.pad {
            self.finish_chunk()?;
        }

        let mut raw = [0u8; 8];
        match self.cursor.fill(&mut raw)? {
            0 => {
                self.current = None;
                return Ok(None);
            }
            8 => {}
            _ => return Err(DecodeError::UnexpectedEof),
        }

        let header = ChunkHeader {
            id: ChunkId([raw[0], raw[1], raw[2], raw[3]]),
            size: BigEndian::read_u32(&raw[4..]),
        };
        debug!("chunk {} ({} bytes) at offset {}", header.id, header.size, self.cursor.consumed() - 8);

        self.current = Some(header);
        self.remaining = u64::from(header.size);
        self.pad = header.size % 2 == 1;
        Ok(Some(header))
    }

    /// Treat the rest of the current body as a sequence of sub-chunks
    ///
    /// Used for the container, whose body is the chunk list itself.
    pub fn descend(&mut self) {
        self.remaining = 0;
        self.pad = false;
    }

    fn take_body(&mut self, n: u64) -> DecodeResult<()> {
        if n > self.remaining {
            let id = self.current.map(|h| h.id).unwrap_or_default();
            return Err(DecodeError::malformed(
                id,
                format!("read of {} bytes exceeds {} remaining", n, self.remaining),
            ));
        }
        self.remaining -= n;
        Ok(())
    }

    /// Fill `buf` from the current body
    pub fn read_body(&mut self, buf: &mut [u8]) -> DecodeResult<()> {
        self.take_body(buf.len() as u64)?;
        self.cursor.read_raw(buf)
    }

    pub fn read_body_u16(&mut self) -> DecodeResult<u16> {
        self.take_body(2)?;
        self.cursor.read_u16()
    }

    pub fn read_body_u32(&mut self) -> DecodeResult<u32> {
        self.take_body(4)?;
        self.cursor.read_u32()
    }

    /// Read up to `n` body bytes, tolerating a source that ends early
    ///
    /// When the source ends first, the rest of the body is considered lost and
    /// the scanner is left at end of stream.
    pub fn read_body_up_to(&mut self, n: u64) -> DecodeResult<Vec<u8>> {
        let want = n.min(self.remaining);
        let bytes = self.cursor.read_up_to(want)?;
        if (bytes.len() as u64) < want {
            self.remaining = 0;
            self.pad = false;
        } else {
            self.remaining -= want;
        }
        Ok(bytes)
    }

    /// Read the whole unread body
    ///
    /// The buffer grows as bytes arrive, so an oversized declaration in a
    /// short stream ends in `UnexpectedEof` rather than a huge allocation.
    pub fn read_body_to_end(&mut self) -> DecodeResult<Vec<u8>> {
        let want = self.remaining;
        let bytes = self.read_body_up_to(want)?;
        if (bytes.len() as u64) < want {
            return Err(DecodeError::UnexpectedEof);
        }
        Ok(bytes)
    }

    /// Skip up to `n` body bytes, tolerating a source that ends early
    ///
    /// Returns the count skipped. A short skip leaves the scanner at end of
    /// stream like [`ChunkScanner::read_body_up_to`].
    pub fn skip_body_up_to(&mut self, n: u64) -> DecodeResult<u64> {
        let want = n.min(self.remaining);
        let skipped = self.cursor.skip_up_to(want)?;
        if skipped < want {
            self.remaining = 0;
            self.pad = false;
        } else {
            self.remaining -= want;
        }
        Ok(skipped)
    }

    /// Discard the rest of the current body and its pad byte
    ///
    /// A missing final pad byte is tolerated; some encoders omit it on the
    /// last chunk of the file.
    pub fn finish_chunk(&mut self) -> DecodeResult<()> {
        let rest = self.remaining;
        self.remaining = 0;
        if rest > 0 {
            self.cursor.skip(rest)?;
        }
        if self.pad {
            self.pad = false;
            let mut byte = [0u8; 1];
            self.cursor.fill(&mut byte)?;
        }
        Ok(())
    }
}
