//! Caller-driven chunk streaming
//!
//! In streaming mode the decoder does not interpret chunks. It hands each one
//! to the consumer as a [`Chunk`] over a rendezvous channel and waits for the
//! token to be completed before it reads the next header. Only one chunk is
//! ever in flight, and whatever the consumer leaves unread is discarded by
//! the decoder.
//!
//! ```no_run
//! use std::thread;
//! use crossbeam::channel;
//! use aiff::sound::{AiffDecoder, SoundDecoder};
//!
//! let (tx, rx) = channel::bounded(0);
//! let mut decoder = AiffDecoder::open_streaming("kick.aif", tx)?;
//! let worker = thread::spawn(move || decoder.parse());
//!
//! for mut chunk in rx {
//!     if chunk.id() != aiff::sound::ChunkId::SSND {
//!         let body = chunk.read_body()?;
//!         println!("{} {:?}", chunk.id(), body);
//!     }
//!     chunk.done();
//! }
//! worker.join().expect("decoder thread panicked")?;
//! # Ok::<(), aiff::sound::DecodeError>(())
//! ```

use std::io::{self, Read};
use std::sync::Arc;

use crossbeam::channel::Sender;
use parking_lot::Mutex;

use super::chunk::{ChunkHeader, ChunkId, ChunkScanner};
use super::decoder::DecodeResult;

/// Scanner shared between the decoder and the chunk currently in flight
pub(crate) type SharedScanner<R> = Arc<Mutex<ChunkScanner<R>>>;

/// Handle to one chunk whose body is still in the source
///
/// The decoder stays blocked until this token is completed with
/// [`Chunk::done`] or dropped.
pub struct Chunk<R> {
    header: ChunkHeader,
    scanner: SharedScanner<R>,
    done: Option<Sender<()>>,
}

impl<R: Read> Chunk<R> {
    pub(crate) fn new(header: ChunkHeader, scanner: SharedScanner<R>, done: Sender<()>) -> Self {
        Self {
            header,
            scanner,
            done: Some(done),
        }
    }

    pub fn id(&self) -> ChunkId {
        self.header.id
    }

    /// Declared body size
    pub fn size(&self) -> u32 {
        self.header.size
    }

    pub fn header(&self) -> ChunkHeader {
        self.header
    }

    /// Body bytes not yet read through this token
    pub fn remaining(&self) -> u64 {
        self.scanner.lock().remaining()
    }

    /// Fill `buf` with the next body bytes
    ///
    /// Fails with `MalformedChunk` if `buf` is longer than the unread body and
    /// with `UnexpectedEof` if the source ends first.
    pub fn read_be(&mut self, buf: &mut [u8]) -> DecodeResult<()> {
        self.scanner.lock().read_body(buf)
    }

    /// Read the whole unread body
    ///
    /// Fails with `UnexpectedEof` if the source ends before the declared size.
    pub fn read_body(&mut self) -> DecodeResult<Vec<u8>> {
        self.scanner.lock().read_body_to_end()
    }

    /// Signal that the consumer is finished with this chunk
    ///
    /// Unread body bytes and the pad byte are skipped by the decoder.
    pub fn done(mut self) {
        if let Some(done) = self.done.take() {
            // The decoder is either waiting for this or already gone.
            let _ = done.send(());
        }
    }
}

impl<R: Read> Read for Chunk<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut scanner = self.scanner.lock();
        let n = (scanner.remaining().min(buf.len() as u64)) as usize;
        if n == 0 {
            return Ok(0);
        }
        scanner
            .read_body(&mut buf[..n])
            .map_err(|e| io::Error::new(io::ErrorKind::UnexpectedEof, e))?;
        Ok(n)
    }
}

impl<R> std::fmt::Debug for Chunk<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chunk")
            .field("id", &self.header.id)
            .field("size", &self.header.size)
            .field("done", &self.done.is_none())
            .finish()
    }
}
